//! Derived Metrics
//!
//! Post-hoc figures computed from a finished [`WeekSeries`]:
//!
//! - Break-even price: the token price at which a week's donation is
//!   worth what the donor paid, `F(i-1) / minted[i]`
//! - Required multiple: break-even price over the current spot price
//! - Projected annual platform revenue, `F(i) * rF * 52`
//! - Funding received in an early window relative to a funding goal
//!
//! Weeks that mint nothing yield NaN or infinite ROI figures. Those are
//! reported as data, not errors.

use serde::Serialize;

use crate::config::{CurveConfig, WEEKS_PER_YEAR};
use crate::error::{Result, SimulationError};
use crate::simulator::WeekSeries;

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct RoiPoint {
    pub week: usize,
    pub break_even_price: f64,
    pub required_multiple: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct FundingSummary {
    pub window_weeks: usize, // Weeks actually summed, at most the horizon
    pub window_funding: f64,
    pub funding_goal: f64,
    pub target_ratio: f64,
    pub initial_reserve: f64,
    pub kappa: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Metrics {
    pub roi: Vec<RoiPoint>,       // Weeks 1..N
    pub annual_revenue: Vec<f64>, // Weeks 0..N
    pub summary: FundingSummary,
}

impl Metrics {
    pub fn compute(series: &WeekSeries, config: &CurveConfig) -> Result<Self> {
        Ok(Self {
            roi: roi_points(series),
            annual_revenue: annual_revenue(series, config.funding_fee_rate),
            summary: funding_summary(series, config.target_window_weeks, config.funding_goal)?,
        })
    }

    pub fn roi_for_week(&self, week: usize) -> Option<&RoiPoint> {
        week.checked_sub(1).and_then(|idx| self.roi.get(idx))
    }
}

pub fn roi_points(series: &WeekSeries) -> Vec<RoiPoint> {
    series
        .records()
        .windows(2)
        .map(|pair| {
            let (prev, cur) = (&pair[0], &pair[1]);
            let break_even_price = prev.funding / cur.minted;
            RoiPoint {
                week: cur.week,
                break_even_price,
                required_multiple: break_even_price / cur.price,
            }
        })
        .collect()
}

pub fn annual_revenue(series: &WeekSeries, funding_fee_rate: f64) -> Vec<f64> {
    series
        .records()
        .iter()
        .map(|r| r.funding * funding_fee_rate * WEEKS_PER_YEAR as f64)
        .collect()
}

/// Funding received over the first `window` weeks (capped at the horizon)
/// as a fraction of `goal`.
pub fn funding_summary(series: &WeekSeries, window: usize, goal: f64) -> Result<FundingSummary> {
    if !goal.is_finite() || goal <= 0.0 {
        return Err(SimulationError::config(format!(
            "funding goal must be positive, got {}",
            goal
        )));
    }

    let window_weeks = window.min(series.len());
    let window_funding: f64 = series.records()[..window_weeks]
        .iter()
        .map(|r| r.funding)
        .sum();
    let constants = series.constants();

    Ok(FundingSummary {
        window_weeks,
        window_funding,
        funding_goal: goal,
        target_ratio: window_funding / goal,
        initial_reserve: constants.initial_reserve,
        kappa: constants.kappa,
    })
}
