pub mod assumptions;
pub mod audit;
pub mod constants;
pub mod cross_validation;
pub mod engine;
pub mod error;
pub mod formulas;
pub mod types;
pub mod yearly;

pub use error::ProFormaError;
pub use types::*;

/// Standard result type for all pro forma operations
pub type ProFormaResult<T> = Result<T, ProFormaError>;
