use anyhow::Context;
use anyhow::Result;

use portfolio_risk_rs::simple_returns_series;
use portfolio_risk_rs::Objective;
use portfolio_risk_rs::OptimizerMethod;
use portfolio_risk_rs::PortfolioRiskEngine;
use portfolio_risk_rs::ReturnMatrix;
use portfolio_risk_rs::RiskEngineConfig;
use portfolio_risk_rs::WeightVector;

fn main() -> Result<()> {
  // synthetic daily close histories for three assets
  let closes = vec![
    (
      "TECH",
      vec![
        100.0, 101.2, 100.4, 102.1, 103.0, 101.8, 104.2, 105.0, 104.1, 106.3, 107.0, 105.9,
        108.2, 109.5, 108.8, 110.4,
      ],
    ),
    (
      "BOND",
      vec![
        50.0, 50.1, 50.2, 50.15, 50.3, 50.25, 50.4, 50.45, 50.5, 50.48, 50.6, 50.65, 50.7,
        50.68, 50.8, 50.85,
      ],
    ),
    (
      "GOLD",
      vec![
        180.0, 179.2, 181.0, 180.5, 182.3, 181.7, 180.9, 183.1, 182.4, 184.0, 183.2, 185.1,
        184.6, 186.0, 185.3, 187.2,
      ],
    ),
  ];

  let series = closes
    .into_iter()
    .map(|(symbol, prices)| (symbol.to_string(), simple_returns_series(&prices)))
    .collect();
  let returns = ReturnMatrix::from_series(series)?;

  let engine = PortfolioRiskEngine::new(RiskEngineConfig::default());
  let weights = WeightVector::equal(returns.assets());

  println!("Equal-weight portfolio");
  let metrics = engine.portfolio_metrics(&returns, &weights)?;
  println!("  total return:      {:>9.4}", metrics.total_return);
  println!("  annualized return: {:>9.4}", metrics.annualized_return);
  println!("  volatility:        {:>9.4}", metrics.volatility);
  println!("  Sharpe ratio:      {:>9.4}", metrics.sharpe);
  println!("  max drawdown:      {:>9.4}", metrics.max_drawdown);

  let tech = returns
    .series("TECH")
    .context("TECH series missing from the demo matrix")?
    .to_vec();
  let report = engine.risk_report(&tech, 0.05)?;
  println!("\nTECH risk report at the 5% level");
  println!("  VaR:  {:>9.4}", report.var);
  println!("  CVaR: {:>9.4}", report.cvar);

  for objective in [Objective::MaxSharpe, Objective::MinVolatility] {
    let result = engine.optimize(&returns, objective)?;
    println!("\nOptimized weights ({objective})");
    for (asset, weight) in result.weights.entries() {
      println!("  {asset}: {weight:.4}");
    }
    println!("  objective value: {:.4}", result.objective_value);
    println!("  used fallback:   {}", result.used_fallback);
  }

  let heuristic = PortfolioRiskEngine::new(RiskEngineConfig {
    optimizer: OptimizerMethod::RandomSearch,
    ..RiskEngineConfig::default()
  });
  let sampled = heuristic.optimize(&returns, Objective::MaxSharpe)?;
  println!("\nRandom-search weights (heuristic, no convergence guarantee)");
  for (asset, weight) in sampled.weights.entries() {
    println!("  {asset}: {weight:.4}");
  }

  let simulated = engine.monte_carlo(&returns, &weights, 2000, 252)?;
  println!("\nMonte Carlo terminal growth multiples over one year");
  println!("  p5:  {:>7.4}", simulated.percentiles.p5);
  println!("  p50: {:>7.4}", simulated.percentiles.p50);
  println!("  p95: {:>7.4}", simulated.percentiles.p95);

  Ok(())
}
