//! Product families and the per-row attribute record.
//!
//! A `ValveAttributes` is created by the extractor, filled in by the rule
//! overlay and the completion heuristics, and finally serialized by
//! [`crate::code::compose`]. Code fields hold either a vocabulary code or
//! the empty string, meaning "unset" (for drive mode: manual).

/// Product family, split into general families that follow the positional
/// code grammar and special families with their own fixed grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProductType {
    /// 闸阀 (Z)
    Gate,
    /// 蝶阀 (D)
    Butterfly,
    /// 球阀 (Q)
    Ball,
    /// 止回阀 (H)
    Check,
    /// 截止阀 (J)
    Globe,
    /// 节流阀 (L)
    Throttle,
    /// 柱塞阀 (U)
    Plunger,
    /// 隔膜阀 (G)
    Diaphragm,
    /// 安全阀 (A)
    Safety,
    /// 杠杆式安全阀 (GA)
    LeverSafety,
    /// 减压阀 (Y)
    PressureReducing,
    /// 蒸汽疏水阀 (S)
    SteamTrap,
    /// 排气阀 (P)
    Vent,
    /// 旋塞阀 (X)
    Plug,
    /// 遥控浮球阀 (100X)
    RemoteFloat,
    /// 可调式减压阀 (200X)
    AdjustableReducing,
    /// 泄压/持压阀 (500X)
    ReliefSustain,
    /// 缓闭式止回阀 (800X)
    SlowClosingCheck,
}

impl ProductType {
    /// The code this family contributes to the canonical product code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Gate => "Z",
            Self::Butterfly => "D",
            Self::Ball => "Q",
            Self::Check => "H",
            Self::Globe => "J",
            Self::Throttle => "L",
            Self::Plunger => "U",
            Self::Diaphragm => "G",
            Self::Safety => "A",
            Self::LeverSafety => "GA",
            Self::PressureReducing => "Y",
            Self::SteamTrap => "S",
            Self::Vent => "P",
            Self::Plug => "X",
            Self::RemoteFloat => "100X",
            Self::AdjustableReducing => "200X",
            Self::ReliefSustain => "500X",
            Self::SlowClosingCheck => "800X",
        }
    }

    /// Parse a family from its code. Returns `None` for unknown codes.
    pub fn from_code(code: &str) -> Option<Self> {
        Some(match code {
            "Z" => Self::Gate,
            "D" => Self::Butterfly,
            "Q" => Self::Ball,
            "H" => Self::Check,
            "J" => Self::Globe,
            "L" => Self::Throttle,
            "U" => Self::Plunger,
            "G" => Self::Diaphragm,
            "A" => Self::Safety,
            "GA" => Self::LeverSafety,
            "Y" => Self::PressureReducing,
            "S" => Self::SteamTrap,
            "P" => Self::Vent,
            "X" => Self::Plug,
            "100X" => Self::RemoteFloat,
            "200X" => Self::AdjustableReducing,
            "500X" => Self::ReliefSustain,
            "800X" => Self::SlowClosingCheck,
            _ => return None,
        })
    }

    /// Special families bypass the positional grammar entirely.
    pub fn is_special(&self) -> bool {
        matches!(
            self,
            Self::RemoteFloat
                | Self::AdjustableReducing
                | Self::ReliefSustain
                | Self::SlowClosingCheck
        )
    }

    /// Display label, as used in rule documents and option lists.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Gate => "闸阀",
            Self::Butterfly => "蝶阀",
            Self::Ball => "球阀",
            Self::Check => "止回阀",
            Self::Globe => "截止阀",
            Self::Throttle => "节流阀",
            Self::Plunger => "柱塞阀",
            Self::Diaphragm => "隔膜阀",
            Self::Safety => "安全阀",
            Self::LeverSafety => "杠杆式安全阀",
            Self::PressureReducing => "减压阀",
            Self::SteamTrap => "蒸汽疏水阀",
            Self::Vent => "排气阀",
            Self::Plug => "旋塞阀",
            Self::RemoteFloat => "遥控浮球阀",
            Self::AdjustableReducing => "可调式减压阀",
            Self::ReliefSustain => "泄压/持压阀",
            Self::SlowClosingCheck => "缓闭式止回阀",
        }
    }
}

/// Attribute record for one inquiry row.
///
/// Mutated in place by the overlay and completion stages; each stage only
/// writes fields that are still empty, except that non-empty customer
/// defaults override extracted values.
#[derive(Debug, Clone, PartialEq)]
pub struct ValveAttributes {
    pub product_type: ProductType,
    /// Drive mode code; empty means manual.
    pub drive_mode: String,
    pub connection: String,
    pub structure: String,
    pub sealing: String,
    /// Pressure class digits: 10 × the rating in MPa.
    pub pressure: String,
    /// Body material code.
    pub material: String,
    /// Nominal bore (DN) in millimetres.
    pub bore: u32,
    /// Original inquiry text, retained for keyword fallback matching.
    pub raw_name: String,
    pub raw_spec: String,
}

/// Interactive fields, in the order the completion UI presents them.
const INTERACTIVE_FIELDS: &[&str] =
    &["drive_mode", "connection", "structure", "sealing", "pressure"];

impl ValveAttributes {
    /// New record with conservative numeric defaults (DN50, PN16, ductile
    /// iron body) and all code fields unset.
    pub fn new(product_type: ProductType) -> Self {
        Self {
            product_type,
            drive_mode: String::new(),
            connection: String::new(),
            structure: String::new(),
            sealing: String::new(),
            pressure: "16".to_string(),
            material: "Q".to_string(),
            bore: 50,
            raw_name: String::new(),
            raw_spec: String::new(),
        }
    }

    /// Names of interactive fields that are still empty, for the external
    /// completion loop. Drive mode counts as missing so the user can
    /// confirm manual operation.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        INTERACTIVE_FIELDS
            .iter()
            .copied()
            .filter(|field| self.field(field).is_empty())
            .collect()
    }

    /// Read a code field by name. Unknown names read as empty.
    pub fn field(&self, name: &str) -> &str {
        match name {
            "drive_mode" => &self.drive_mode,
            "connection" => &self.connection,
            "structure" => &self.structure,
            "sealing" => &self.sealing,
            "pressure" => &self.pressure,
            "material" => &self.material,
            _ => "",
        }
    }

    /// Write a code field by name. Unknown names are ignored.
    pub fn set_field(&mut self, name: &str, value: &str) {
        let slot = match name {
            "drive_mode" => &mut self.drive_mode,
            "connection" => &mut self.connection,
            "structure" => &mut self.structure,
            "sealing" => &mut self.sealing,
            "pressure" => &mut self.pressure,
            "material" => &mut self.material,
            _ => return,
        };
        slot.clear();
        slot.push_str(value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn code_round_trips() {
        for code in ["Z", "D", "Q", "GA", "100X", "800X"] {
            let pt = ProductType::from_code(code).unwrap();
            assert_eq!(pt.code(), code);
        }
        assert_eq!(ProductType::from_code("W"), None);
        assert_eq!(ProductType::from_code(""), None);
    }

    #[test]
    fn special_split() {
        assert!(ProductType::RemoteFloat.is_special());
        assert!(ProductType::ReliefSustain.is_special());
        assert!(!ProductType::Gate.is_special());
        assert!(!ProductType::LeverSafety.is_special());
    }

    #[test]
    fn new_record_defaults() {
        let attrs = ValveAttributes::new(ProductType::Gate);
        assert_eq!(attrs.bore, 50);
        assert_eq!(attrs.pressure, "16");
        assert_eq!(attrs.material, "Q");
        assert!(attrs.drive_mode.is_empty());
    }

    #[test]
    fn missing_fields_tracks_empties() {
        let mut attrs = ValveAttributes::new(ProductType::Ball);
        assert_eq!(
            attrs.missing_fields(),
            vec!["drive_mode", "connection", "structure", "sealing"]
        );

        attrs.connection = "4".to_string();
        attrs.sealing = "F".to_string();
        assert_eq!(attrs.missing_fields(), vec!["drive_mode", "structure"]);
    }

    #[test]
    fn field_access_by_name() {
        let mut attrs = ValveAttributes::new(ProductType::Check);
        attrs.set_field("connection", "4");
        attrs.set_field("no_such_field", "9");
        assert_eq!(attrs.field("connection"), "4");
        assert_eq!(attrs.field("no_such_field"), "");
    }
}
