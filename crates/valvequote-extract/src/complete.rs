//! Heuristic completion for fields still empty after the rule overlay.
//!
//! Rules run in a fixed order (connection, then structure, sealing, and
//! drive) and each is a total function of fields that are already final:
//! product type, material, bore. Each rule writes only when its field is
//! still empty.

use valvequote_core::{ProductType, ValveAttributes};

fn stainless(material: &str) -> bool {
    material == "P" || material == "R"
}

/// Fill every field the composer needs that is still unset.
pub fn complete(attrs: &mut ValveAttributes) {
    complete_connection(attrs);
    complete_structure(attrs);
    complete_sealing(attrs);
    complete_drive(attrs);
}

fn complete_connection(attrs: &mut ValveAttributes) {
    if !attrs.connection.is_empty() {
        return;
    }
    attrs.connection = if attrs.product_type == ProductType::Butterfly {
        "7" // wafer
    } else if attrs.bore <= 40 {
        "1"
    } else {
        "4"
    }
    .to_string();

    // Material overrides: copper below DN100 and stainless up to DN40 are
    // always threaded.
    if attrs.material == "T" && attrs.bore < 100 {
        attrs.connection = "1".to_string();
    } else if stainless(&attrs.material) && attrs.bore <= 40 {
        attrs.connection = "1".to_string();
    }
}

fn complete_structure(attrs: &mut ValveAttributes) {
    if !attrs.structure.is_empty() {
        return;
    }
    attrs.structure = if attrs.product_type == ProductType::Gate {
        if attrs.material == "T" {
            "5" // copper gate valves are bonnet-less (non-rising stem)
        } else if attrs.bore <= 50 {
            "1"
        } else {
            "5"
        }
    } else {
        "1"
    }
    .to_string();
}

fn complete_sealing(attrs: &mut ValveAttributes) {
    if !attrs.sealing.is_empty() {
        return;
    }
    let ball = attrs.product_type == ProductType::Ball;
    attrs.sealing = if attrs.material == "T" || stainless(&attrs.material) {
        if ball { "F" } else { "W" }
    } else {
        "X"
    }
    .to_string();
}

fn complete_drive(attrs: &mut ValveAttributes) {
    if !attrs.drive_mode.is_empty() {
        return;
    }
    // Large butterfly valves get a worm gear; everything else stays manual.
    if attrs.product_type == ProductType::Butterfly && attrs.bore >= 125 {
        attrs.drive_mode = "3".to_string();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attrs(product: ProductType, material: &str, bore: u32) -> ValveAttributes {
        let mut a = ValveAttributes::new(product);
        a.material = material.to_string();
        a.bore = bore;
        a
    }

    #[test]
    fn butterfly_defaults_wafer() {
        let mut a = attrs(ProductType::Butterfly, "Q", 100);
        complete(&mut a);
        assert_eq!(a.connection, "7");
    }

    #[test]
    fn connection_by_bore_threshold() {
        let mut small = attrs(ProductType::Gate, "Q", 40);
        complete(&mut small);
        assert_eq!(small.connection, "1");

        let mut large = attrs(ProductType::Gate, "Q", 80);
        complete(&mut large);
        assert_eq!(large.connection, "4");
    }

    #[test]
    fn copper_under_dn100_is_threaded() {
        let mut a = attrs(ProductType::Globe, "T", 80);
        complete(&mut a);
        assert_eq!(a.connection, "1");

        let mut big = attrs(ProductType::Globe, "T", 100);
        complete(&mut big);
        assert_eq!(big.connection, "4");
    }

    #[test]
    fn stainless_small_bore_is_threaded() {
        let mut a = attrs(ProductType::Ball, "R", 40);
        complete(&mut a);
        assert_eq!(a.connection, "1");
    }

    #[test]
    fn explicit_connection_survives() {
        let mut a = attrs(ProductType::Gate, "T", 50);
        a.connection = "4".to_string();
        complete(&mut a);
        assert_eq!(a.connection, "4");
    }

    #[test]
    fn gate_structure_by_bore_and_material() {
        let mut rising = attrs(ProductType::Gate, "Q", 50);
        complete(&mut rising);
        assert_eq!(rising.structure, "1");

        let mut buried = attrs(ProductType::Gate, "Q", 80);
        complete(&mut buried);
        assert_eq!(buried.structure, "5");

        let mut copper = attrs(ProductType::Gate, "T", 25);
        complete(&mut copper);
        assert_eq!(copper.structure, "5");
    }

    #[test]
    fn non_gate_structure_defaults_to_one() {
        let mut a = attrs(ProductType::Check, "Q", 150);
        complete(&mut a);
        assert_eq!(a.structure, "1");
    }

    #[test]
    fn sealing_split_by_material_and_family() {
        let mut copper_ball = attrs(ProductType::Ball, "T", 25);
        complete(&mut copper_ball);
        assert_eq!(copper_ball.sealing, "F");

        let mut copper_globe = attrs(ProductType::Globe, "T", 25);
        complete(&mut copper_globe);
        assert_eq!(copper_globe.sealing, "W");

        let mut ss_ball = attrs(ProductType::Ball, "P", 25);
        complete(&mut ss_ball);
        assert_eq!(ss_ball.sealing, "F");

        let mut iron_gate = attrs(ProductType::Gate, "Q", 80);
        complete(&mut iron_gate);
        assert_eq!(iron_gate.sealing, "X");
    }

    #[test]
    fn large_butterfly_gets_worm_gear() {
        let mut a = attrs(ProductType::Butterfly, "Q", 125);
        complete(&mut a);
        assert_eq!(a.drive_mode, "3");

        let mut small = attrs(ProductType::Butterfly, "Q", 100);
        complete(&mut small);
        assert_eq!(small.drive_mode, "");
    }

    #[test]
    fn completion_is_total() {
        // Every composer-required field is set afterwards, whatever the input.
        for code in ["Z", "D", "Q", "H", "J", "G", "A", "S"] {
            let mut a = attrs(ProductType::from_code(code).unwrap(), "Q", 65);
            complete(&mut a);
            assert!(!a.connection.is_empty());
            assert!(!a.structure.is_empty());
            assert!(!a.sealing.is_empty());
            assert!(!a.pressure.is_empty());
            assert!(!a.material.is_empty());
        }
    }
}
