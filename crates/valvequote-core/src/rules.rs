//! Customer rule documents: per-product default attribute values and a
//! global pricing discount.
//!
//! Documents are structured key-value data (serde); where they live on disk
//! is the hosting service's concern. Loading validates every code against
//! the fixed vocabularies; an unknown code is rejected rather than
//! silently carried into composition.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::attributes::ProductType;
use crate::vocab;

#[derive(Debug, Error)]
pub enum RuleError {
    #[error("discount {0} outside (0, 1]")]
    InvalidDiscount(f64),

    #[error("unknown product type code: {0}")]
    UnknownProductType(String),

    #[error("invalid {field} code {code:?} for product type {product}")]
    InvalidCode {
        product: String,
        field: &'static str,
        code: String,
    },

    #[error("rule document parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// Repository-level failure (storage backend, lock poisoning).
    #[error("rule repository error: {0}")]
    Repository(String),
}

/// Default attribute values for one product family. Empty strings mean "no
/// default" and never override an extracted value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldDefaults {
    /// Display name; only custom products carry one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub drive_mode: String,
    #[serde(default)]
    pub connection: String,
    #[serde(default)]
    pub structure: String,
    #[serde(default)]
    pub sealing: String,
    #[serde(default)]
    pub pressure: String,
    #[serde(default)]
    pub material: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pricing {
    /// Discount multiplier in (0, 1]; 1.0 means list price.
    pub discount: f64,
}

impl Default for Pricing {
    fn default() -> Self {
        Self { discount: 1.0 }
    }
}

/// One customer's rule document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CustomerRules {
    #[serde(default)]
    pub pricing: Pricing,
    /// Standard families, keyed by product type code.
    #[serde(default)]
    pub product_defaults: BTreeMap<String, FieldDefaults>,
    /// Special/custom families, keyed by product type code.
    #[serde(default)]
    pub custom_products: BTreeMap<String, FieldDefaults>,
}

impl CustomerRules {
    /// Parse and validate a JSON rule document.
    pub fn from_json(text: &str) -> Result<Self, RuleError> {
        let rules: Self = serde_json::from_str(text)?;
        rules.validate()?;
        Ok(rules)
    }

    pub fn to_json(&self) -> Result<String, RuleError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Defaults for a product family, searching standard families first
    /// and custom products second.
    pub fn defaults_for(&self, product: ProductType) -> Option<&FieldDefaults> {
        let code = product.code();
        self.product_defaults
            .get(code)
            .or_else(|| self.custom_products.get(code))
    }

    /// Discount multiplier, clamped to 1.0 when the stored value is out of
    /// range (a malformed discount must not inflate or zero a quote).
    pub fn discount(&self) -> f64 {
        let d = self.pricing.discount;
        if d > 0.0 && d <= 1.0 { d } else { 1.0 }
    }

    /// Check every code in the document against the fixed vocabularies.
    pub fn validate(&self) -> Result<(), RuleError> {
        let d = self.pricing.discount;
        if !(d > 0.0 && d <= 1.0) {
            return Err(RuleError::InvalidDiscount(d));
        }
        for (code, defaults) in self.product_defaults.iter().chain(&self.custom_products) {
            let product = ProductType::from_code(code)
                .ok_or_else(|| RuleError::UnknownProductType(code.clone()))?;
            validate_defaults(product, defaults)?;
        }
        Ok(())
    }

    /// Built-in system document: the last-resort default when a customer
    /// has no rules of their own and no template customer exists.
    pub fn system_default() -> Self {
        let mut product_defaults = BTreeMap::new();
        for (code, defaults) in [
            ("Z", flanged("1", "T", "Q")),
            ("D", wafer()),
            ("Q", flanged("1", "W", "Q")),
            ("H", flanged("1", "T", "Q")),
            ("J", flanged("1", "T", "Q")),
            ("L", threaded("1", "X", "Q")),
            ("U", threaded("1", "X", "Q")),
            ("G", flanged("1", "J", "Q")),
            ("A", flanged("2", "X", "Q")),
            ("GA", flanged("2", "X", "Q")),
            ("Y", threaded("1", "X", "T")),
            ("S", threaded("1", "X", "Q")),
            ("P", threaded("1", "X", "Q")),
            ("X", threaded("3", "X", "Q")),
        ] {
            product_defaults.insert(code.to_string(), defaults);
        }

        let mut custom_products = BTreeMap::new();
        for product in [
            ProductType::RemoteFloat,
            ProductType::AdjustableReducing,
            ProductType::ReliefSustain,
            ProductType::SlowClosingCheck,
        ] {
            let mut defaults = flanged("1", "X", "Q");
            defaults.name = Some(product.label().to_string());
            custom_products.insert(product.code().to_string(), defaults);
        }

        Self {
            pricing: Pricing::default(),
            product_defaults,
            custom_products,
        }
    }
}

// Butterfly valves default to wafer connection with a rubber seat.
fn wafer() -> FieldDefaults {
    FieldDefaults {
        connection: "7".into(),
        structure: "1".into(),
        sealing: "X".into(),
        pressure: "16".into(),
        material: "Q".into(),
        ..Default::default()
    }
}

fn flanged(structure: &str, sealing: &str, material: &str) -> FieldDefaults {
    FieldDefaults {
        connection: "4".into(),
        structure: structure.into(),
        sealing: sealing.into(),
        pressure: "16".into(),
        material: material.into(),
        ..Default::default()
    }
}

fn threaded(structure: &str, sealing: &str, material: &str) -> FieldDefaults {
    FieldDefaults {
        connection: "1".into(),
        structure: structure.into(),
        sealing: sealing.into(),
        pressure: "16".into(),
        material: material.into(),
        ..Default::default()
    }
}

fn validate_defaults(product: ProductType, defaults: &FieldDefaults) -> Result<(), RuleError> {
    let check = |ok: bool, field: &'static str, code: &str| {
        if ok {
            Ok(())
        } else {
            Err(RuleError::InvalidCode {
                product: product.code().to_string(),
                field,
                code: code.to_string(),
            })
        }
    };
    check(
        vocab::is_valid_drive_mode(&defaults.drive_mode),
        "drive_mode",
        &defaults.drive_mode,
    )?;
    check(
        vocab::is_valid_connection(&defaults.connection),
        "connection",
        &defaults.connection,
    )?;
    check(
        vocab::is_valid_structure(product, &defaults.structure),
        "structure",
        &defaults.structure,
    )?;
    check(
        vocab::is_valid_sealing(&defaults.sealing),
        "sealing",
        &defaults.sealing,
    )?;
    check(
        vocab::is_valid_pressure(&defaults.pressure),
        "pressure",
        &defaults.pressure,
    )?;
    check(
        vocab::is_valid_material(&defaults.material),
        "material",
        &defaults.material,
    )?;
    Ok(())
}
