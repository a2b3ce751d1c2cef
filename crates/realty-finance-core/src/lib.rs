pub mod error;
pub mod time_value;
pub mod types;

#[cfg(feature = "lending")]
pub mod lending;

#[cfg(feature = "collateral")]
pub mod collateral;

pub use error::RealtyFinanceError;
pub use types::*;

#[cfg(feature = "lending")]
pub use lending::amortization::compute_amortization;

#[cfg(feature = "collateral")]
pub use collateral::{ltv::assess_collateral, valuation::estimate_valuation};

/// Standard result type for all realty-finance operations
pub type RealtyFinanceResult<T> = Result<T, RealtyFinanceError>;
