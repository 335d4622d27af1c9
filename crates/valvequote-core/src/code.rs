//! Canonical product code composition.
//!
//! Two grammars, selected by product family:
//!
//! - General: `type + drive + connection + structure + sealing + "-" +
//!   pressure + material`. A manual drive contributes nothing: the code
//!   simply shortens, there is no placeholder digit.
//! - Special (100X/200X/500X/800X): `["8"] + family + "-" + pressure +
//!   material`, where the `8` prefix appears only for clamp/groove
//!   connections. No other field participates.

use crate::attributes::ValveAttributes;

/// Compose the canonical code for a fully resolved attribute record.
///
/// Total for every record whose pressure and material are set; unset
/// optional fields shorten the code rather than failing.
pub fn compose(attrs: &ValveAttributes) -> String {
    if attrs.product_type.is_special() {
        return compose_special(attrs);
    }

    let mut code = String::from(attrs.product_type.code());
    code.push_str(&attrs.drive_mode);
    code.push_str(&attrs.connection);
    code.push_str(&attrs.structure);
    code.push_str(&attrs.sealing);
    code.push('-');
    code.push_str(&attrs.pressure);
    code.push_str(&attrs.material);
    code
}

fn compose_special(attrs: &ValveAttributes) -> String {
    let mut code = String::new();
    if attrs.connection == "8" {
        code.push('8');
    }
    code.push_str(attrs.product_type.code());
    code.push('-');
    code.push_str(&attrs.pressure);
    code.push_str(&attrs.material);
    code
}
