//! Risk metrics calculator.
//!
//! Pure functions over return slices: keyed alignment, OLS beta, alpha,
//! volatility, Sharpe ratio and risk classification. Nothing here holds state,
//! so every function is safe to call from any thread.

mod metrics;
mod regression;

pub use metrics::{
    calculate_risk_metrics, classify, compute_alpha, compute_sharpe_ratio, compute_volatility,
};
pub use regression::{align, align_with_min, compute_beta, regress, MIN_SAMPLES};
