pub mod analysis;
pub mod distribution;
pub mod eligibility;
pub mod error;
pub mod scenarios;
pub mod schedule;
pub mod tax_rules;
pub mod transaction;
pub mod types;

pub use error::SaleTaxError;
pub use types::*;

/// Standard result type for all sale-tax operations
pub type SaleTaxResult<T> = Result<T, SaleTaxError>;
