pub mod attributes;
pub mod code;
pub mod rules;
pub mod vocab;

pub use attributes::{ProductType, ValveAttributes};
pub use code::compose;
pub use rules::{CustomerRules, FieldDefaults, RuleError};
