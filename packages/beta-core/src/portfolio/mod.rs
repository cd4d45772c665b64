//! Portfolio and fund beta.
//!
//! Provides allocation handling, per-holding betas, weighted beta and the
//! combined portfolio return series.

mod allocation;
mod beta;

pub use allocation::{fund_weighted_beta, normalized_weights, total_allocation, weighted_beta};
pub use beta::{portfolio_returns, stock_betas};
