pub mod collateral;
pub mod lending;
