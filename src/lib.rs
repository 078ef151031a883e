//! # Portfolio Risk Analytics
//!
//! `portfolio_risk_rs` computes portfolio-level return and risk statistics
//! from historical per-asset return series: blended metrics, historical
//! VaR/CVaR, long-only weight optimization and Monte Carlo terminal-value
//! simulation. All computations are synchronous pure functions over
//! caller-supplied in-memory data; market-data fetching and presentation
//! stay outside the crate boundary.
//!
//! ## Modules
//!
//! | Module         | Description                                                                 |
//! |----------------|-----------------------------------------------------------------------------|
//! | [`data`]       | Return containers, simplex weight vectors and close-price preprocessing.    |
//! | [`metrics`]    | Blended portfolio statistics and benchmark attribution.                     |
//! | [`risk`]       | Historical VaR/CVaR, drawdown and the bundled risk report.                  |
//! | [`optimizers`] | Nelder-Mead and random-search weight optimization with signaled fallbacks.  |
//! | [`simulation`] | Monte Carlo terminal values and random frontier sampling.                   |
//! | [`engine`]     | Caller-owned configuration facade over the computation modules.             |
//! | [`types`]      | Shared enums, result containers and the error taxonomy.                     |
//!
//! ## Conventions
//!
//! - Returns are per-period fractions; annualization reads the engine's
//!   `periods_per_year` (252 for daily data by default).
//! - Quantiles interpolate linearly between order statistics at position
//!   `level * (n - 1)`, for VaR and Monte Carlo percentiles alike.
//! - Degraded optimizer answers carry `used_fallback = true` and emit a
//!   `tracing` warning; nothing degrades silently.
//!
//! ## Parallelism
//!
//! Monte Carlo paths are independent and drawn with `rayon`. Everything
//! else is single-threaded; engines hold no shared mutable state.

pub mod data;
pub mod engine;
pub mod metrics;
pub mod optimizers;
pub mod risk;
pub mod simulation;
pub mod types;

pub use data::align_return_series;
pub use data::correlation_matrix;
pub use data::log_returns_series;
pub use data::simple_returns_series;
pub use data::ReturnMatrix;
pub use data::WeightVector;
pub use data::WEIGHT_SUM_TOLERANCE;
pub use engine::PortfolioRiskEngine;
pub use engine::RiskEngineConfig;
pub use metrics::performance_attribution;
pub use metrics::portfolio_metrics;
pub use optimizers::optimize_with_method;
pub use risk::conditional_value_at_risk;
pub use risk::max_drawdown;
pub use risk::risk_report;
pub use risk::value_at_risk;
pub use simulation::efficient_frontier;
pub use simulation::monte_carlo;
pub use types::AttributionReport;
pub use types::FrontierPoint;
pub use types::MonteCarloSummary;
pub use types::Objective;
pub use types::OptimizationResult;
pub use types::OptimizerMethod;
pub use types::PortfolioMetrics;
pub use types::Result;
pub use types::RiskError;
pub use types::RiskReport;
pub use types::TerminalPercentiles;
