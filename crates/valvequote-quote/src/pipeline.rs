//! Per-row quote pipeline over one price catalog.
//!
//! Rows are independent: the catalog and the customer's rule document are
//! read-only for the duration of a batch, so rows fan out across a rayon
//! pool and the output vector comes back in input order. A failure on one
//! row (unrecognized product, no catalog hit, malformed quantity) degrades
//! that row's line item and never aborts the batch.

use rayon::prelude::*;
use tracing::{debug, info};

use valvequote_catalog::{CatalogRow, InquiryRow, MatchResult, match_catalog};
use valvequote_core::{CustomerRules, compose};
use valvequote_extract::{ExtractError, Extraction, RuleRepository, complete, extract, load_or_init, overlay};

/// How a line ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineStatus {
    /// Resolved and priced.
    Quoted,
    /// Resolved, but no catalog row matched.
    NoMatch,
    /// No recognizable product type; surfaced, never guessed.
    Unrecognized,
    /// Sheet footer / blank row, carried through untouched.
    Summary,
}

impl LineStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Quoted => "quoted",
            Self::NoMatch => "no_match",
            Self::Unrecognized => "unrecognized",
            Self::Summary => "summary",
        }
    }
}

/// One output line, in input-row order.
#[derive(Debug, Clone)]
pub struct LineItem {
    pub index: usize,
    pub name: String,
    pub specification: String,
    pub quantity: String,
    /// Canonical code; `None` when the product type was unrecognized.
    pub code: Option<String>,
    pub status: LineStatus,
    pub matched: MatchResult,
    /// Matched price after the customer discount.
    pub unit_price: f64,
    /// `unit_price × quantity`; zero when the quantity is absent or
    /// malformed rather than dropping the row.
    pub total: f64,
}

/// Resolve one row to its canonical code: extract, overlay the customer's
/// defaults, complete the remainder, compose. Short-circuit families skip
/// straight to their finished code.
pub fn resolve_code(rules: &CustomerRules, name: &str, specification: &str) -> Result<String, ExtractError> {
    match extract(name, specification)? {
        Extraction::Direct(code) => Ok(code),
        Extraction::Attributes(mut attrs) => {
            overlay(rules, &mut attrs);
            complete(&mut attrs);
            Ok(compose(&attrs))
        }
    }
}

/// Batch quote engine holding the rule repository capability.
pub struct QuoteEngine<R: RuleRepository> {
    repo: R,
    template_customer: Option<String>,
}

impl<R: RuleRepository> QuoteEngine<R> {
    pub fn new(repo: R) -> Self {
        Self {
            repo,
            template_customer: None,
        }
    }

    /// Seed first-time customers from this customer's document instead of
    /// the built-in system defaults.
    pub fn with_template(mut self, customer_id: &str) -> Self {
        self.template_customer = Some(customer_id.to_string());
        self
    }

    /// Load the customer's rule document (creating it on first access).
    pub fn rules_for(&self, customer_id: &str) -> CustomerRules {
        load_or_init(&self.repo, customer_id, self.template_customer.as_deref())
    }

    /// Quote a whole inquiry sheet against one catalog.
    ///
    /// Output is one line per input row, in input order regardless of
    /// which worker finished first.
    pub fn quote_batch(
        &self,
        customer_id: &str,
        rows: &[InquiryRow],
        catalog: &[CatalogRow],
        selected_brand: Option<&str>,
    ) -> Vec<LineItem> {
        let rules = self.rules_for(customer_id);
        let discount = rules.discount();
        info!(
            customer_id,
            rows = rows.len(),
            catalog = catalog.len(),
            discount,
            "quoting batch"
        );

        rows.par_iter()
            .map(|row| quote_row(row, &rules, catalog, selected_brand, discount))
            .collect()
    }
}

fn quote_row(
    row: &InquiryRow,
    rules: &CustomerRules,
    catalog: &[CatalogRow],
    selected_brand: Option<&str>,
    discount: f64,
) -> LineItem {
    if row.is_summary() {
        return LineItem {
            index: row.index,
            name: row.name.clone(),
            specification: row.specification.clone(),
            quantity: row.quantity.clone(),
            code: None,
            status: LineStatus::Summary,
            matched: MatchResult::no_match(),
            unit_price: 0.0,
            total: 0.0,
        };
    }

    let code = match resolve_code(rules, &row.name, &row.specification) {
        Ok(code) => Some(code),
        Err(err) => {
            debug!(row = row.index, %err, "row not resolved");
            None
        }
    };

    // A row-level brand column wins over the batch-level selection.
    let brand = if row.brand.trim().is_empty() {
        selected_brand
    } else {
        Some(row.brand.as_str())
    };

    let matched = match_catalog(
        &row.name,
        &row.specification,
        code.as_deref().unwrap_or(""),
        catalog,
        brand,
    );

    let unit_price = if matched.matched {
        matched.price * discount
    } else {
        0.0
    };
    let total = if matched.matched {
        parse_quantity(&row.quantity)
            .map(|q| unit_price * q)
            .unwrap_or(0.0)
    } else {
        0.0
    };

    let status = if code.is_none() {
        LineStatus::Unrecognized
    } else if matched.matched {
        LineStatus::Quoted
    } else {
        LineStatus::NoMatch
    };

    LineItem {
        index: row.index,
        name: row.name.clone(),
        specification: row.specification.clone(),
        quantity: row.quantity.clone(),
        code,
        status,
        matched,
        unit_price,
        total,
    }
}

fn parse_quantity(quantity: &str) -> Option<f64> {
    quantity.trim().parse().ok()
}

/// Sheet total over all line totals.
pub fn batch_total(items: &[LineItem]) -> f64 {
    items.iter().map(|item| item.total).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use valvequote_extract::MemoryRuleRepository;

    fn inquiry(index: usize, name: &str, spec: &str, quantity: &str) -> InquiryRow {
        InquiryRow {
            index,
            name: name.to_string(),
            specification: spec.to_string(),
            quantity: quantity.to_string(),
            brand: String::new(),
        }
    }

    fn catalog_row(model: &str, spec: &str, brand: &str, price: f64) -> CatalogRow {
        CatalogRow {
            name: String::new(),
            model: model.to_string(),
            specification: spec.to_string(),
            brand: brand.to_string(),
            price,
        }
    }

    fn engine() -> QuoteEngine<MemoryRuleRepository> {
        QuoteEngine::new(MemoryRuleRepository::new())
    }

    #[test]
    fn resolve_code_is_deterministic() {
        let rules = CustomerRules::default();
        let first = resolve_code(&rules, "手动闸阀DN50、PN16 法兰", "").unwrap();
        for _ in 0..3 {
            assert_eq!(resolve_code(&rules, "手动闸阀DN50、PN16 法兰", "").unwrap(), first);
        }
    }

    #[test]
    fn gate_valve_scenario_composes_with_default_material() {
        // No customer defaults: extraction + completion only.
        let rules = CustomerRules::default();
        let code = resolve_code(&rules, "手动闸阀DN50、PN16 法兰", "").unwrap();
        assert_eq!(code, "Z41X-16Q");
    }

    #[test]
    fn stainless_ball_valve_scenario() {
        let rules = CustomerRules::default();
        let code = resolve_code(&rules, "球阀 不锈钢304 DN25 PN16 丝口", "").unwrap();
        assert_eq!(code, "Q11F-16P");
    }

    #[test]
    fn customer_default_wins_over_extracted_value() {
        // Precedence law: a non-empty customer default replaces what the
        // extractor found.
        let rules = CustomerRules::system_default();
        let code = resolve_code(&rules, "丝口闸阀DN25 PN16", "").unwrap();
        // System document forces flanged gate valves with copper-insert seal.
        assert_eq!(code, "Z41T-16Q");
    }

    #[test]
    fn direct_families_skip_overlay_and_completion() {
        let rules = CustomerRules::system_default();
        let code = resolve_code(&rules, "电磁流量计 PN16", "").unwrap();
        assert_eq!(code, "L04X-16P");
    }

    #[test]
    fn batch_preserves_row_order_and_isolates_failures() {
        let catalog = vec![
            catalog_row("Z41X-16Q", "DN50", "A", 230.0),
            catalog_row("Q11F-16P", "DN25", "A", 45.0),
        ];
        let rows = vec![
            inquiry(0, "闸阀", "DN50", "10"),
            inquiry(1, "电机配件", "", "2"),
            inquiry(2, "球阀 不锈钢304", "DN25 丝口", "4"),
            inquiry(3, "合计", "", ""),
        ];

        let items = engine().quote_batch("acme", &rows, &catalog, None);
        assert_eq!(items.len(), 4);
        assert_eq!(
            items.iter().map(|i| i.index).collect::<Vec<_>>(),
            vec![0, 1, 2, 3]
        );
        assert_eq!(items[0].status, LineStatus::Quoted);
        assert_eq!(items[1].status, LineStatus::Unrecognized);
        assert!(items[1].code.is_none());
        assert_eq!(items[2].status, LineStatus::Quoted);
        assert_eq!(items[3].status, LineStatus::Summary);
    }

    #[test]
    fn totals_multiply_and_degrade_to_zero() {
        let catalog = vec![catalog_row("Z41X-16Q", "DN50", "", 230.0)];
        let rows = vec![
            inquiry(0, "闸阀", "DN50", "10"),
            inquiry(1, "闸阀", "DN50", "两个"),
            inquiry(2, "闸阀", "DN50", ""),
        ];
        let items = engine().quote_batch("acme", &rows, &catalog, None);
        assert_eq!(items[0].total, 2300.0);
        assert_eq!(items[1].total, 0.0);
        assert_eq!(items[2].total, 0.0);
        assert_eq!(batch_total(&items), 2300.0);
    }

    #[test]
    fn discount_applies_to_unit_price() {
        let repo = MemoryRuleRepository::new();
        let mut rules = CustomerRules::system_default();
        rules.pricing.discount = 0.8;
        repo.insert("acme", rules);

        let catalog = vec![catalog_row("Z41T-16Q", "DN50", "", 100.0)];
        let rows = vec![inquiry(0, "闸阀", "DN50", "3")];
        let items = QuoteEngine::new(repo).quote_batch("acme", &rows, &catalog, None);
        assert_eq!(items[0].unit_price, 80.0);
        assert_eq!(items[0].total, 240.0);
    }

    #[test]
    fn no_match_is_not_an_error() {
        let rows = vec![inquiry(0, "闸阀", "DN50", "10")];
        let items = engine().quote_batch("acme", &rows, &[], None);
        assert_eq!(items[0].status, LineStatus::NoMatch);
        assert!(!items[0].matched.matched);
        assert_eq!(items[0].total, 0.0);
    }

    #[test]
    fn row_brand_overrides_batch_brand() {
        let catalog = vec![
            catalog_row("Z41X-16Q", "DN50", "A", 230.0),
            catalog_row("Z41X-16Q", "DN50", "B", 200.0),
        ];
        let mut row = inquiry(0, "闸阀", "DN50", "1");
        row.brand = "B".to_string();
        let items = engine().quote_batch("acme", &[row], &catalog, Some("A"));
        assert_eq!(items[0].matched.brand, "B");
    }
}
