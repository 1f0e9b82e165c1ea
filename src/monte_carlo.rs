//! Monte Carlo Funding Sweep
//!
//! Runs the weekly simulator over many noisy funding paths and reports the
//! spread of end-of-horizon outcomes. Each path is compound growth from
//! `F0` times mean-one log-normal noise per week.
//!
//! ## Metrics
//! - Final spot price (P5 / P50 / P95)
//! - Final reserve (P5 / P50 / P95)
//! - Final funding pool (P5 / P50 / P95)
//! - Mean required ROI multiple in the last week

use rand::prelude::*;

use crate::config::CurveConfig;
use crate::error::{Result, SimulationError};
use crate::funding::{GrowthFunding, NoisyFunding};
use crate::metrics::roi_points;
use crate::simulator::Simulator;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MonteCarloConfig {
    pub runs: usize,
    pub volatility: f64, // Log-normal sigma of weekly funding
    pub seed: u64,
}

impl Default for MonteCarloConfig {
    fn default() -> Self {
        Self {
            runs: 1_000,
            volatility: 0.3,
            seed: 42,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Spread {
    pub p5: f64,
    pub p50: f64,
    pub p95: f64,
}

impl Spread {
    fn from_samples(samples: &[f64]) -> Self {
        let mut sorted = samples.to_vec();
        sorted.sort_by(|a, b| a.total_cmp(b));
        Self {
            p5: percentile(&sorted, 0.05),
            p50: percentile(&sorted, 0.50),
            p95: percentile(&sorted, 0.95),
        }
    }
}

#[derive(Debug, Clone)]
pub struct MonteCarloResult {
    pub runs: usize,
    pub horizon: usize,
    pub volatility: f64,

    pub final_prices: Vec<f64>,
    pub final_reserves: Vec<f64>,
    pub final_pools: Vec<f64>,

    pub price: Spread,
    pub reserve: Spread,
    pub funding_pool: Spread,
    pub mean_required_multiple: f64,
}

impl MonteCarloResult {
    pub fn print(&self) {
        println!("  Runs:                    {}", self.runs);
        println!("  Horizon:                 {} weeks", self.horizon);
        println!("  Funding volatility:      {:.2}", self.volatility);
        println!(
            "  Final price:             {:.4} / {:.4} / {:.4} EUR (P5/P50/P95)",
            self.price.p5, self.price.p50, self.price.p95
        );
        println!(
            "  Final reserve:           {:.0} / {:.0} / {:.0} EUR",
            self.reserve.p5, self.reserve.p50, self.reserve.p95
        );
        println!(
            "  Final funding pool:      {:.0} / {:.0} / {:.0} EUR",
            self.funding_pool.p5, self.funding_pool.p50, self.funding_pool.p95
        );
        println!("  Mean ROI multiple:       {:.2}x", self.mean_required_multiple);
    }
}

fn percentile(sorted: &[f64], p: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    let idx = ((sorted.len() as f64 - 1.0) * p).round() as usize;
    sorted[idx.min(sorted.len() - 1)]
}

pub fn run_monte_carlo(config: &CurveConfig, mc: &MonteCarloConfig) -> Result<MonteCarloResult> {
    if mc.runs == 0 {
        return Err(SimulationError::config("Monte Carlo needs at least one run"));
    }

    let simulator = Simulator::new(config)?;
    let baseline = GrowthFunding::from_config(config, simulator.constants());
    let horizon = config.horizon_weeks;
    let mut rng = StdRng::seed_from_u64(mc.seed);

    let mut final_prices = Vec::with_capacity(mc.runs);
    let mut final_reserves = Vec::with_capacity(mc.runs);
    let mut final_pools = Vec::with_capacity(mc.runs);
    let mut multiples = Vec::with_capacity(mc.runs);

    for _ in 0..mc.runs {
        let funding = NoisyFunding::new(baseline, mc.volatility, horizon, &mut rng)?;
        let series = simulator.run(horizon, &funding)?;
        let last = series.last();

        final_prices.push(last.price);
        final_reserves.push(last.reserve);
        final_pools.push(last.funding_pool);

        if let Some(point) = roi_points(&series).last() {
            if point.required_multiple.is_finite() {
                multiples.push(point.required_multiple);
            }
        }
    }

    let mean_required_multiple = if multiples.is_empty() {
        f64::NAN
    } else {
        multiples.iter().sum::<f64>() / multiples.len() as f64
    };

    log::info!(
        "Monte Carlo: {} runs over {} weeks, median final price {:.4}",
        mc.runs,
        horizon,
        Spread::from_samples(&final_prices).p50
    );

    Ok(MonteCarloResult {
        runs: mc.runs,
        horizon,
        volatility: mc.volatility,
        price: Spread::from_samples(&final_prices),
        reserve: Spread::from_samples(&final_reserves),
        funding_pool: Spread::from_samples(&final_pools),
        final_prices,
        final_reserves,
        final_pools,
        mean_required_multiple,
    })
}
