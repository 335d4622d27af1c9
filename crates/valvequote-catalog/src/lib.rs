//! Table layer: Arrow ingestion of price catalogs and inquiry sheets, and
//! the two-tier catalog matcher.

pub mod matcher;
pub mod table;

pub use matcher::{MatchKind, MatchResult, match_catalog};
pub use table::{CatalogRow, InquiryRow, TableError, catalog_from_batches, inquiry_from_batches};
