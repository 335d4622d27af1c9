//! Multi-brand quoting: match one inquiry sheet against several brand
//! catalogs at once.
//!
//! Each catalog's matching is independent and runs on its own rayon task;
//! results are merged by row index afterwards, so output order never
//! depends on completion order.

use std::collections::BTreeMap;

use rayon::prelude::*;
use tracing::info;

use valvequote_catalog::{CatalogRow, InquiryRow, MatchResult, match_catalog};
use valvequote_extract::RuleRepository;

use crate::pipeline::{QuoteEngine, resolve_code};

/// One company's price catalog.
#[derive(Debug, Clone)]
pub struct BrandCatalog {
    pub company: String,
    pub rows: Vec<CatalogRow>,
}

/// Per-row aggregation across companies.
#[derive(Debug, Clone)]
pub struct AggregatedLine {
    pub index: usize,
    pub name: String,
    pub specification: String,
    pub quantity: String,
    /// Company → its best match for this row (matched companies only).
    pub company_prices: BTreeMap<String, MatchResult>,
    pub min_price: f64,
    pub max_price: f64,
    pub avg_price: f64,
    /// Company offering the lowest price.
    pub best_company: String,
    pub match_count: usize,
}

impl AggregatedLine {
    fn new(row: &InquiryRow, company_prices: BTreeMap<String, MatchResult>) -> Self {
        let prices: Vec<(&str, f64)> = company_prices
            .iter()
            .map(|(company, result)| (company.as_str(), result.price))
            .collect();

        let (mut min_price, mut max_price, mut best_company) = (0.0, 0.0, String::new());
        let mut avg_price = 0.0;
        if !prices.is_empty() {
            min_price = f64::INFINITY;
            for (company, price) in &prices {
                if *price < min_price {
                    min_price = *price;
                    best_company = (*company).to_string();
                }
                if *price > max_price {
                    max_price = *price;
                }
            }
            avg_price = prices.iter().map(|(_, p)| p).sum::<f64>() / prices.len() as f64;
        }

        Self {
            index: row.index,
            name: row.name.clone(),
            specification: row.specification.clone(),
            quantity: row.quantity.clone(),
            match_count: company_prices.len(),
            company_prices,
            min_price,
            max_price,
            avg_price,
            best_company,
        }
    }
}

impl<R: RuleRepository> QuoteEngine<R> {
    /// Match every inquiry row against every brand catalog and aggregate
    /// the prices per row. Summary rows are dropped from the aggregation.
    pub fn quote_multi(
        &self,
        customer_id: &str,
        rows: &[InquiryRow],
        catalogs: &[BrandCatalog],
    ) -> Vec<AggregatedLine> {
        let rules = self.rules_for(customer_id);
        info!(
            customer_id,
            rows = rows.len(),
            catalogs = catalogs.len(),
            "multi-brand quote"
        );

        // Resolution is shared across catalogs; do it once per row.
        let codes: Vec<Option<String>> = rows
            .iter()
            .map(|row| {
                if row.is_summary() {
                    None
                } else {
                    resolve_code(&rules, &row.name, &row.specification).ok()
                }
            })
            .collect();

        let per_company: Vec<(String, Vec<MatchResult>)> = catalogs
            .par_iter()
            .map(|catalog| {
                let results = rows
                    .iter()
                    .zip(&codes)
                    .map(|(row, code)| {
                        if row.is_summary() {
                            MatchResult::no_match()
                        } else {
                            match_catalog(
                                &row.name,
                                &row.specification,
                                code.as_deref().unwrap_or(""),
                                &catalog.rows,
                                None,
                            )
                        }
                    })
                    .collect();
                (catalog.company.clone(), results)
            })
            .collect();

        rows.iter()
            .enumerate()
            .filter(|(_, row)| !row.is_summary())
            .map(|(pos, row)| {
                let mut company_prices = BTreeMap::new();
                for (company, results) in &per_company {
                    let result = &results[pos];
                    if result.matched {
                        company_prices.insert(company.clone(), result.clone());
                    }
                }
                AggregatedLine::new(row, company_prices)
            })
            .collect()
    }
}
