//! Quote orchestration: runs the resolve → match → price pipeline over a
//! whole inquiry sheet, in parallel, with per-row failure isolation.

pub mod multi;
pub mod pipeline;

pub use multi::{AggregatedLine, BrandCatalog};
pub use pipeline::{LineItem, LineStatus, QuoteEngine, batch_total, resolve_code};
