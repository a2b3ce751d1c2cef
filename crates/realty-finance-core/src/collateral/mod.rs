pub mod ltv;
pub mod valuation;
