//! Customer default-rule overlay.
//!
//! Rule documents are loaded through an injected [`RuleRepository`]
//! capability, batch-scoped rather than process-global. Customer intent takes
//! precedence over textual inference: a non-empty customer default
//! overrides whatever the extractor found, while an empty default never
//! erases a found value.

use std::collections::HashMap;
use std::sync::Mutex;

use tracing::{debug, warn};

use valvequote_core::{CustomerRules, RuleError, ValveAttributes};

/// Load/save access to per-customer rule documents. The on-disk format is
/// the hosting service's concern; the engine only needs these two
/// operations.
pub trait RuleRepository {
    /// Load a customer's document; `Ok(None)` when the customer has none.
    fn load(&self, customer_id: &str) -> Result<Option<CustomerRules>, RuleError>;

    fn save(&self, customer_id: &str, rules: &CustomerRules) -> Result<(), RuleError>;
}

/// Load a customer's rules, creating them on first access.
///
/// New customers are seeded from `template` (when given and present),
/// otherwise from the built-in system document; the seeded copy is saved
/// back so the next call finds it (idempotent). Load or save failures
/// degrade to the system document: a broken rule file must never fail a
/// batch.
pub fn load_or_init<R: RuleRepository>(
    repo: &R,
    customer_id: &str,
    template: Option<&str>,
) -> CustomerRules {
    match repo.load(customer_id) {
        Ok(Some(rules)) => return rules,
        Ok(None) => {}
        Err(err) => {
            warn!(customer_id, %err, "rule document unreadable, using system defaults");
            return CustomerRules::system_default();
        }
    }

    let seeded = template
        .and_then(|t| repo.load(t).ok().flatten())
        .unwrap_or_else(CustomerRules::system_default);
    if let Err(err) = repo.save(customer_id, &seeded) {
        warn!(customer_id, %err, "could not persist seeded rule document");
    }
    debug!(customer_id, "seeded rule document for new customer");
    seeded
}

/// Apply a customer's defaults for the row's product family.
///
/// No entry for the family leaves the record untouched. Applying the same
/// document twice is a no-op after the first application.
pub fn overlay(rules: &CustomerRules, attrs: &mut ValveAttributes) {
    let Some(defaults) = rules.defaults_for(attrs.product_type) else {
        return;
    };

    for (field, value) in [
        ("drive_mode", &defaults.drive_mode),
        ("connection", &defaults.connection),
        ("structure", &defaults.structure),
        ("sealing", &defaults.sealing),
        ("pressure", &defaults.pressure),
        ("material", &defaults.material),
    ] {
        if !value.is_empty() {
            attrs.set_field(field, value);
        }
    }
}

/// In-memory repository for tests and single-process use.
#[derive(Default)]
pub struct MemoryRuleRepository {
    docs: Mutex<HashMap<String, CustomerRules>>,
}

impl MemoryRuleRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate a customer's document (e.g. a template customer).
    pub fn insert(&self, customer_id: &str, rules: CustomerRules) {
        if let Ok(mut docs) = self.docs.lock() {
            docs.insert(customer_id.to_string(), rules);
        }
    }
}

impl RuleRepository for MemoryRuleRepository {
    fn load(&self, customer_id: &str) -> Result<Option<CustomerRules>, RuleError> {
        let docs = self
            .docs
            .lock()
            .map_err(|e| RuleError::Repository(format!("lock poisoned: {e}")))?;
        Ok(docs.get(customer_id).cloned())
    }

    fn save(&self, customer_id: &str, rules: &CustomerRules) -> Result<(), RuleError> {
        let mut docs = self
            .docs
            .lock()
            .map_err(|e| RuleError::Repository(format!("lock poisoned: {e}")))?;
        docs.insert(customer_id.to_string(), rules.clone());
        Ok(())
    }
}
