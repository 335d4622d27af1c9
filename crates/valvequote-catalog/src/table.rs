//! Catalog and inquiry ingestion from Arrow RecordBatches.
//!
//! Upstream services materialize spreadsheets as Arrow tables; headers are
//! whatever the customer's file used. Columns are resolved by ordered
//! keyword containment on the lowercased header, not by position or exact
//! schema, so "规格型号", "产品型号", and "Model No." all land where they
//! should. Unknown columns are ignored.

use arrow::array::{Array, Float64Array, Int64Array, LargeStringArray, StringArray};
use arrow::record_batch::RecordBatch;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum TableError {
    #[error("missing required column (any of: {0})")]
    MissingColumn(&'static str),
}

/// One price-table record. Immutable for the duration of a matching
/// session. `name` and `brand` are empty when the table has no such column.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogRow {
    pub name: String,
    pub model: String,
    pub specification: String,
    pub brand: String,
    pub price: f64,
}

/// One inquiry-sheet row. Quantity is kept raw: a malformed quantity
/// degrades the line total to zero later instead of dropping the row here.
#[derive(Debug, Clone, PartialEq)]
pub struct InquiryRow {
    pub index: usize,
    pub name: String,
    pub specification: String,
    pub quantity: String,
    pub brand: String,
}

impl InquiryRow {
    /// Sheet footer rows (totals) and blank rows carry no product.
    pub fn is_summary(&self) -> bool {
        let name = self.name.trim();
        name.is_empty() || name == "合计" || name == "总计"
    }
}

// Ordered per role; a header is claimed by the first role it matches.
const MODEL_KEYS: &[&str] = &["型号", "model"];
const SPEC_KEYS: &[&str] = &["规格", "spec", "dn", "口径"];
const BRAND_KEYS: &[&str] = &["品牌", "brand", "厂商", "厂家"];
const PRICE_KEYS: &[&str] = &["价格", "price", "单价", "报价"];
const NAME_KEYS: &[&str] = &["产品名称", "品名", "名称", "物料"];
const QTY_KEYS: &[&str] = &["数量", "quantity", "qty"];

fn header_matches(header: &str, keys: &[&str]) -> bool {
    keys.iter().any(|k| header.contains(k))
}

/// Build a catalog from price-table batches.
///
/// Requires model, specification, and price columns; name and brand are
/// optional. Rows with no model and no name are skipped; a malformed price
/// reads as 0.0.
pub fn catalog_from_batches(batches: &[RecordBatch]) -> Result<Vec<CatalogRow>, TableError> {
    let mut rows = Vec::new();

    for batch in batches {
        let mut model = None;
        let mut spec = None;
        let mut brand = None;
        let mut price = None;
        let mut name = None;

        for (i, field) in batch.schema().fields().iter().enumerate() {
            let header = field.name().trim().to_lowercase();
            if model.is_none() && header_matches(&header, MODEL_KEYS) {
                model = Some(i);
            } else if spec.is_none() && header_matches(&header, SPEC_KEYS) {
                spec = Some(i);
            } else if brand.is_none() && header_matches(&header, BRAND_KEYS) {
                brand = Some(i);
            } else if price.is_none() && header_matches(&header, PRICE_KEYS) {
                price = Some(i);
            } else if name.is_none() && header_matches(&header, NAME_KEYS) {
                name = Some(i);
            }
        }

        let model = model.ok_or(TableError::MissingColumn("型号/model"))?;
        let spec = spec.ok_or(TableError::MissingColumn("规格/spec"))?;
        let price = price.ok_or(TableError::MissingColumn("价格/price"))?;

        for row in 0..batch.num_rows() {
            let record = CatalogRow {
                name: name.map(|i| cell_string(batch, i, row)).unwrap_or_default(),
                model: cell_string(batch, model, row),
                specification: cell_string(batch, spec, row),
                brand: brand.map(|i| cell_string(batch, i, row)).unwrap_or_default(),
                price: cell_f64(batch, price, row).unwrap_or(0.0),
            };
            if record.model.trim().is_empty() && record.name.trim().is_empty() {
                continue;
            }
            rows.push(record);
        }
    }

    info!(rows = rows.len(), "catalog loaded");
    Ok(rows)
}

/// Build inquiry rows from inquiry-sheet batches. Only the product name
/// column is required. Row indices follow sheet order across batches.
pub fn inquiry_from_batches(batches: &[RecordBatch]) -> Result<Vec<InquiryRow>, TableError> {
    let mut rows = Vec::new();

    for batch in batches {
        let mut name = None;
        let mut spec = None;
        let mut qty = None;
        let mut brand = None;

        for (i, field) in batch.schema().fields().iter().enumerate() {
            let header = field.name().trim().to_lowercase();
            if name.is_none() && header_matches(&header, NAME_KEYS) {
                name = Some(i);
            } else if spec.is_none() && header_matches(&header, SPEC_KEYS) {
                spec = Some(i);
            } else if qty.is_none() && header_matches(&header, QTY_KEYS) {
                qty = Some(i);
            } else if brand.is_none() && header_matches(&header, BRAND_KEYS) {
                brand = Some(i);
            }
        }

        let name = name.ok_or(TableError::MissingColumn("品名/产品名称"))?;

        for row in 0..batch.num_rows() {
            rows.push(InquiryRow {
                index: rows.len(),
                name: cell_string(batch, name, row),
                specification: spec.map(|i| cell_string(batch, i, row)).unwrap_or_default(),
                quantity: qty.map(|i| cell_string(batch, i, row)).unwrap_or_default(),
                brand: brand.map(|i| cell_string(batch, i, row)).unwrap_or_default(),
            });
        }
    }

    info!(rows = rows.len(), "inquiry sheet loaded");
    Ok(rows)
}

// ── Cell readers ──

/// Read a cell as text, whatever the column's Arrow type. Nulls and
/// unsupported types read as empty.
fn cell_string(batch: &RecordBatch, col: usize, row: usize) -> String {
    let array = batch.column(col);
    if array.is_null(row) {
        return String::new();
    }
    if let Some(a) = array.as_any().downcast_ref::<StringArray>() {
        return a.value(row).trim().to_string();
    }
    if let Some(a) = array.as_any().downcast_ref::<LargeStringArray>() {
        return a.value(row).trim().to_string();
    }
    if let Some(a) = array.as_any().downcast_ref::<Int64Array>() {
        return a.value(row).to_string();
    }
    if let Some(a) = array.as_any().downcast_ref::<Float64Array>() {
        return a.value(row).to_string();
    }
    String::new()
}

/// Read a cell as a number, accepting numeric columns or numeric text.
fn cell_f64(batch: &RecordBatch, col: usize, row: usize) -> Option<f64> {
    let array = batch.column(col);
    if array.is_null(row) {
        return None;
    }
    if let Some(a) = array.as_any().downcast_ref::<Float64Array>() {
        return Some(a.value(row));
    }
    if let Some(a) = array.as_any().downcast_ref::<Int64Array>() {
        return Some(a.value(row) as f64);
    }
    let text = cell_string(batch, col, row);
    text.trim().parse().ok()
}
