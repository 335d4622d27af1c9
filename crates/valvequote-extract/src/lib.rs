//! Resolution layer: turns raw inquiry text into fully resolved valve
//! attributes via extraction, customer rule overlay, and heuristic
//! completion.

pub mod complete;
pub mod extract;
pub mod overlay;

pub use complete::complete;
pub use extract::{ExtractError, Extraction, MissingReport, analyze_missing, extract};
pub use overlay::{MemoryRuleRepository, RuleRepository, load_or_init, overlay};
