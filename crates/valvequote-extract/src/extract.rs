//! Attribute extraction from free-form inquiry text.
//!
//! Inquiry rows mix Chinese and English, abbreviations, and embedded units
//! ("手动闸阀DN50、PN16 法兰"). Extraction is a set of ordered,
//! first-match-wins keyword tables plus a handful of regexes for the
//! numeric fields. Order encodes specificity: "不锈钢304" must win over
//! the generic "不锈钢", and MPa notation is authoritative over any
//! co-occurring PN-looking substring.
//!
//! A few product families (flow meters, strainers, backflow preventers,
//! copper pressure-reducing valves) have code grammars incompatible with
//! the positional composition rule; for those, extraction short-circuits
//! straight to a finished code string.

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;
use tracing::debug;

use valvequote_core::{ProductType, ValveAttributes};

#[derive(Debug, Error)]
pub enum ExtractError {
    /// No product-type keyword matched. Surfaced per row; never guessed.
    #[error("no recognizable product type in {0:?}")]
    Unrecognized(String),

    #[error("empty inquiry text")]
    Empty,
}

/// Result of extraction: either a partial attribute record for the
/// overlay/completion/composition pipeline, or a finished code from a
/// short-circuit family.
#[derive(Debug, Clone, PartialEq)]
pub enum Extraction {
    Attributes(ValveAttributes),
    Direct(String),
}

type KeywordRules = &'static [(&'static [&'static str], &'static str)];

/// First-match-wins scan over an ordered keyword table.
fn scan(rules: KeywordRules, text: &str) -> Option<&'static str> {
    rules
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|k| text.contains(*k)))
        .map(|(_, code)| *code)
}

// Specific material grades precede the generic stainless keyword; copper
// is handled separately because bare 铜 must not fire on 铜芯 (seal face).
const SPECIFIC_MATERIALS: KeywordRules = &[
    (&["UPVC", "upvc", "PVC", "pvc"], "U"),
    (&["PP", "pp塑料"], "V"),
    (&["不锈钢304", "304不锈钢", "304"], "P"),
    (&["不锈钢316", "316不锈钢", "316"], "R"),
    (&["不锈钢"], "P"),
];

const CAST_MATERIALS: KeywordRules = &[
    (&["碳钢", "铸钢"], "C"),
    (&["球墨铸铁"], "Q"),
    (&["灰铸铁"], "Z"),
    (&["可锻铸铁"], "K"),
];

const DRIVE_RULES: KeywordRules = &[
    (&["电磁"], "0"),
    (&["电动"], "9"),
    (&["气动"], "6"),
    (&["液动"], "7"),
    (&["涡轮", "蜗轮"], "3"),
    (&["锥齿轮"], "5"),
];

// 外螺纹 must precede the generic thread keywords or code 2 is unreachable.
const CONNECTION_RULES: KeywordRules = &[
    (&["外螺纹"], "2"),
    (&["丝扣", "丝口", "内螺纹", "螺纹"], "1"),
    (&["法兰"], "4"),
    (&["对夹"], "7"),
    (&["卡箍", "沟槽", "快装"], "8"),
    (&["焊接", "承插"], "6"),
];

const STRUCTURE_RULES: KeywordRules = &[
    (&["暗杆"], "5"),
    (&["明杆"], "1"),
    (&["橡胶瓣"], "4"),
];

static BORE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"DN(\d+)").unwrap());
static MPA_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)([0-9]+(?:\.[0-9]+)?)\s*(?:MPa|兆帕)").unwrap());
static PN_NUM_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)PN[\s:：=]*([0-9]+(?:\.[0-9]+)?)").unwrap());
static PN_TIGHT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"PN(\d+)").unwrap());
static PN_LOOSE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)PN\s*(\d{1,2})[^0-9]").unwrap());

/// Extract valve attributes from an inquiry row's name and specification
/// cells. Combined-cell inputs pass all text as `name` with an empty
/// specification.
pub fn extract(name: &str, specification: &str) -> Result<Extraction, ExtractError> {
    let name = name.trim();
    let spec = specification.trim();
    let text = if spec.is_empty() {
        name.to_string()
    } else {
        format!("{name} {spec}")
    };
    if text.is_empty() {
        return Err(ExtractError::Empty);
    }

    let bore = extract_bore(name, spec);
    let pressure = extract_pressure(&text);
    let material = extract_material(&text);
    debug!(bore, pressure, material, "numeric fields extracted");

    let mut copper_insert = false;
    let mut attrs = match classify(&text, material, bore, pressure) {
        Outcome::Direct(code) => return Ok(Extraction::Direct(code)),
        Outcome::Unrecognized => return Err(ExtractError::Unrecognized(name.to_string())),
        Outcome::General(product) => {
            let mut attrs = ValveAttributes::new(product);
            attrs.material = material.to_string();
            attrs
        }
        Outcome::CopperInsertGate => {
            // Water-supply gate valves with a copper insert: fixed seal and
            // body regardless of what the material scan found.
            copper_insert = true;
            let mut attrs = ValveAttributes::new(ProductType::Gate);
            attrs.sealing = "T".to_string();
            attrs.material = "Q".to_string();
            attrs.structure = "1".to_string();
            attrs
        }
    };

    attrs.bore = bore;
    attrs.pressure = pressure.to_string();
    attrs.raw_name = name.to_string();
    attrs.raw_spec = spec.to_string();

    // Explicit keywords override family presets; absence leaves them.
    if let Some(code) = scan(DRIVE_RULES, &text) {
        attrs.drive_mode = code.to_string();
    }
    if let Some(code) = scan(CONNECTION_RULES, &text) {
        attrs.connection = code.to_string();
    }
    if let Some(code) = scan(STRUCTURE_RULES, &text) {
        attrs.structure = code.to_string();
    }
    if text.contains("铜芯") {
        attrs.sealing = "T".to_string();
    } else if attrs.product_type == ProductType::Diaphragm && attrs.sealing.is_empty() {
        attrs.sealing = "J".to_string();
    }

    // The copper-insert family defaults to flanged when no connection
    // keyword was present.
    if copper_insert && attrs.connection.is_empty() {
        attrs.connection = "4".to_string();
    }

    Ok(Extraction::Attributes(attrs))
}

enum Outcome {
    General(ProductType),
    CopperInsertGate,
    Direct(String),
    Unrecognized,
}

const GENERAL_PRODUCTS: &[(&[&str], ProductType)] = &[
    (&["闸阀"], ProductType::Gate),
    (&["蝶阀"], ProductType::Butterfly),
    (&["球阀"], ProductType::Ball),
    (&["止回阀", "逆止阀"], ProductType::Check),
    (&["截止阀"], ProductType::Globe),
    (&["节流阀", "针型阀"], ProductType::Throttle),
    (&["柱塞阀"], ProductType::Plunger),
    (&["隔膜阀"], ProductType::Diaphragm),
    (&["疏水阀"], ProductType::SteamTrap),
    (&["排气阀"], ProductType::Vent),
    (&["旋塞阀"], ProductType::Plug),
];

/// Ordered product classification. Special families that bypass the
/// positional grammar resolve to finished codes here.
fn classify(text: &str, material: &str, bore: u32, pressure: u32) -> Outcome {
    if text.contains("铸铁镶铜闸阀")
        || text.contains("给水闸阀")
        || (text.contains("铸铁") && text.contains("闸阀"))
    {
        return Outcome::CopperInsertGate;
    }
    if text.contains("电磁流量计") {
        return Outcome::Direct(format!("L04X-{pressure}P"));
    }
    if text.contains("遥控浮球阀") {
        return Outcome::General(ProductType::RemoteFloat);
    }
    if text.contains("泄压") || text.contains("持压") {
        return Outcome::General(ProductType::ReliefSustain);
    }
    if text.contains("减压阀") {
        // Copper pressure-reducing valves use the fixed Y11X designation.
        return if material == "T" {
            Outcome::Direct(format!("Y11X-{pressure}T"))
        } else {
            Outcome::General(ProductType::AdjustableReducing)
        };
    }
    if text.contains("缓闭") && text.contains("止") {
        return Outcome::General(ProductType::SlowClosingCheck);
    }

    if text.contains("安全阀") {
        return Outcome::General(if text.contains("杠杆") {
            ProductType::LeverSafety
        } else {
            ProductType::Safety
        });
    }
    for (keywords, product) in GENERAL_PRODUCTS {
        if keywords.iter().any(|k| text.contains(*k)) {
            return Outcome::General(*product);
        }
    }

    if text.contains("过滤器") {
        return Outcome::Direct(strainer_code(material, bore, pressure));
    }
    if text.contains("倒流防止器") || text.contains("逆流防止器") || text.contains("防回流") {
        let family = if text.contains("低阻力") { "LHS41X" } else { "HS41X" };
        return Outcome::Direct(format!("{family}-{pressure}{material}"));
    }

    Outcome::Unrecognized
}

/// Strainer designations depend on body material and bore.
fn strainer_code(material: &str, bore: u32, pressure: u32) -> String {
    match material {
        "P" | "R" if bore <= 40 => format!("GL11W-{pressure}{material}"),
        "P" | "R" => format!("GL41W-{pressure}{material}"),
        "U" => format!("GL11U-{pressure}U"),
        _ => format!("GL41H-{pressure}{material}"),
    }
}

/// Nominal bore from `DN<digits>`, preferring the specification cell and
/// falling back to the name (combined-cell inputs have no specification).
fn extract_bore(name: &str, spec: &str) -> u32 {
    BORE_RE
        .captures(spec)
        .or_else(|| BORE_RE.captures(name))
        .and_then(|c| c[1].parse().ok())
        .unwrap_or(50)
}

/// Pressure class (10 × MPa) from the combined text.
///
/// Ordered fallback over the four notations seen in practice; MPa wins
/// over any co-occurring PN substring, and the loose `PN NN` form is
/// bounded to [1, 64] to avoid swallowing bore digits.
fn extract_pressure(text: &str) -> u32 {
    if let Some(c) = MPA_RE.captures(text)
        && let Ok(mpa) = c[1].parse::<f64>()
    {
        return (mpa * 10.0).round() as u32;
    }

    if let Some(c) = PN_NUM_RE.captures(text) {
        let raw = &c[1];
        if raw.contains('.') {
            if let Ok(mpa) = raw.parse::<f64>() {
                return (mpa * 10.0).round() as u32;
            }
        } else if let Ok(pn) = raw.parse::<u32>() {
            return pn;
        }
    }

    if let Some(c) = PN_TIGHT_RE.captures(text)
        && let Ok(pn) = c[1].parse::<u32>()
    {
        return pn;
    }

    let padded = format!(" {text} ");
    if let Some(c) = PN_LOOSE_RE.captures(&padded)
        && let Ok(pn) = c[1].parse::<u32>()
        && (1..=64).contains(&pn)
    {
        return pn;
    }

    16
}

fn extract_material(text: &str) -> &'static str {
    if let Some(code) = scan(SPECIFIC_MATERIALS, text) {
        return code;
    }
    if copper_body(text) {
        return "T";
    }
    scan(CAST_MATERIALS, text).unwrap_or("Q")
}

// 铜芯 names the seal face, not the body.
fn copper_body(text: &str) -> bool {
    text.contains("黄铜")
        || text.contains("铜制")
        || (text.contains('铜') && !text.contains("铜芯"))
}

/// Missing-parameter report for the interactive completion loop.
#[derive(Debug, Clone)]
pub struct MissingReport {
    pub attributes: ValveAttributes,
    pub missing: Vec<&'static str>,
}

/// Analyze a row without applying any defaults: `None` when the row needs
/// no interaction (short-circuit family, unrecognized, or nothing missing).
pub fn analyze_missing(name: &str, specification: &str) -> Option<MissingReport> {
    match extract(name, specification) {
        Ok(Extraction::Attributes(attrs)) => {
            let missing = attrs.missing_fields();
            if missing.is_empty() {
                None
            } else {
                Some(MissingReport {
                    attributes: attrs,
                    missing,
                })
            }
        }
        _ => None,
    }
}
