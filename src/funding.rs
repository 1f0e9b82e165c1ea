//! Funding Inflow Models
//!
//! The simulator only sees a function from week index to EUR of funding.
//! The reference assumption is compound growth from `F0`; the other models
//! let alternate inflow assumptions be swapped in without touching the
//! recurrence.
//!
//! ## Models
//! - Compound growth `F0 * (1 + iW)^week` (reference)
//! - Constant weekly amount
//! - Step change at a given week
//! - Externally supplied schedule
//! - Growth with log-normal noise (seeded)
//! - Any `Fn(usize) -> f64` closure

use rand::prelude::*;
use rand_distr::{Distribution, LogNormal};

use crate::config::CurveConfig;
use crate::error::{Result, SimulationError};
use crate::params::DerivedConstants;

pub trait FundingModel {
    /// EUR of funding arriving in `week`.
    fn inflow(&self, week: usize) -> f64;

    fn name(&self) -> String {
        "custom".to_string()
    }
}

impl<F> FundingModel for F
where
    F: Fn(usize) -> f64,
{
    fn inflow(&self, week: usize) -> f64 {
        self(week)
    }
}

/// Checks weeks `0..weeks` and reports the first negative or non-finite value.
pub fn validate_inflow(funding: &dyn FundingModel, weeks: usize) -> Result<()> {
    for week in 0..weeks {
        let value = funding.inflow(week);
        if !value.is_finite() || value < 0.0 {
            log::warn!(
                "Rejecting funding model '{}': week {} yields {}",
                funding.name(),
                week,
                value
            );
            return Err(SimulationError::InvalidFundingSeries { week, value });
        }
    }
    Ok(())
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GrowthFunding {
    pub initial: f64,
    pub weekly_rate: f64,
}

impl GrowthFunding {
    pub fn from_config(config: &CurveConfig, constants: &DerivedConstants) -> Self {
        Self {
            initial: config.initial_weekly_funding,
            weekly_rate: constants.weekly_growth_rate,
        }
    }
}

impl FundingModel for GrowthFunding {
    fn inflow(&self, week: usize) -> f64 {
        self.initial * (1.0 + self.weekly_rate).powf(week as f64)
    }

    fn name(&self) -> String {
        format!("growth ({:.4}%/week)", self.weekly_rate * 100.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ConstantFunding(pub f64);

impl FundingModel for ConstantFunding {
    fn inflow(&self, _week: usize) -> f64 {
        self.0
    }

    fn name(&self) -> String {
        format!("constant ({:.0} EUR/week)", self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StepFunding {
    pub before: f64,
    pub after: f64,
    pub step_week: usize, // First week paying `after`
}

impl FundingModel for StepFunding {
    fn inflow(&self, week: usize) -> f64 {
        if week < self.step_week {
            self.before
        } else {
            self.after
        }
    }

    fn name(&self) -> String {
        format!(
            "step ({:.0} -> {:.0} EUR/week at week {})",
            self.before, self.after, self.step_week
        )
    }
}

/// Externally supplied weekly amounts. Weeks past the end receive nothing.
#[derive(Clone, Debug, PartialEq)]
pub struct ScheduleFunding(pub Vec<f64>);

impl FundingModel for ScheduleFunding {
    fn inflow(&self, week: usize) -> f64 {
        self.0.get(week).copied().unwrap_or(0.0)
    }

    fn name(&self) -> String {
        format!("schedule ({} weeks)", self.0.len())
    }
}

/// Compound growth with multiplicative log-normal noise per week.
///
/// The noise is drawn once for `weeks` weeks when the model is built, so
/// `inflow` stays a pure function of the week index and the simulator can
/// validate the series before running it.
#[derive(Clone, Debug)]
pub struct NoisyFunding {
    baseline: GrowthFunding,
    volatility: f64,
    factors: Vec<f64>,
}

impl NoisyFunding {
    pub fn new(
        baseline: GrowthFunding,
        volatility: f64,
        weeks: usize,
        rng: &mut impl Rng,
    ) -> Result<Self> {
        if !volatility.is_finite() || volatility < 0.0 {
            return Err(SimulationError::config(format!(
                "funding volatility must be finite and non-negative, got {}",
                volatility
            )));
        }

        // Mean-one factors: E[exp(N(mu, sigma))] = exp(mu + sigma^2 / 2)
        let mu = -0.5 * volatility.powi(2);
        let lognormal = LogNormal::new(mu, volatility)
            .map_err(|e| SimulationError::config(format!("funding noise: {}", e)))?;
        let factors = (0..weeks).map(|_| lognormal.sample(rng)).collect();

        Ok(Self {
            baseline,
            volatility,
            factors,
        })
    }

    pub fn seeded(
        baseline: GrowthFunding,
        volatility: f64,
        weeks: usize,
        seed: u64,
    ) -> Result<Self> {
        let mut rng = StdRng::seed_from_u64(seed);
        Self::new(baseline, volatility, weeks, &mut rng)
    }
}

impl FundingModel for NoisyFunding {
    fn inflow(&self, week: usize) -> f64 {
        let factor = self.factors.get(week).copied().unwrap_or(1.0);
        self.baseline.inflow(week) * factor
    }

    fn name(&self) -> String {
        format!("noisy growth (sigma {:.2})", self.volatility)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_growth_matches_reference_formula() {
        let config = CurveConfig::default();
        let constants = DerivedConstants::derive(&config).unwrap();
        let funding = GrowthFunding::from_config(&config, &constants);

        assert!((funding.inflow(0) - 10_000.0).abs() < 1e-9);
        assert!((funding.inflow(52) - 15_000.0).abs() < 1e-6);
    }

    #[test]
    fn test_step_and_schedule() {
        let step = StepFunding {
            before: 100.0,
            after: 500.0,
            step_week: 3,
        };
        assert_eq!(step.inflow(2), 100.0);
        assert_eq!(step.inflow(3), 500.0);

        let schedule = ScheduleFunding(vec![1.0, 2.0]);
        assert_eq!(schedule.inflow(1), 2.0);
        assert_eq!(schedule.inflow(5), 0.0);
    }

    #[test]
    fn test_closure_is_a_model() {
        let funding = |week: usize| week as f64 * 10.0;
        assert_eq!(funding.inflow(4), 40.0);
        assert_eq!(FundingModel::name(&funding), "custom");
    }

    #[test]
    fn test_validate_reports_first_bad_week() {
        let funding = ScheduleFunding(vec![1.0, 2.0, -3.0, f64::NAN]);
        match validate_inflow(&funding, 4) {
            Err(SimulationError::InvalidFundingSeries { week, value }) => {
                assert_eq!(week, 2);
                assert_eq!(value, -3.0);
            }
            other => panic!("unexpected result: {:?}", other),
        }
        assert!(validate_inflow(&funding, 2).is_ok());
        assert!(validate_inflow(&|_: usize| f64::INFINITY, 1).is_err());
    }

    #[test]
    fn test_noisy_funding_is_seeded_and_positive() {
        let baseline = GrowthFunding {
            initial: 10_000.0,
            weekly_rate: 0.01,
        };
        let a = NoisyFunding::seeded(baseline, 0.3, 50, 7).unwrap();
        let b = NoisyFunding::seeded(baseline, 0.3, 50, 7).unwrap();

        for week in 0..50 {
            assert_eq!(a.inflow(week), b.inflow(week));
            assert!(a.inflow(week) > 0.0);
        }
        assert_eq!(a.inflow(60), baseline.inflow(60));
    }

    #[test]
    fn test_zero_volatility_is_baseline() {
        let baseline = GrowthFunding {
            initial: 10_000.0,
            weekly_rate: 0.01,
        };
        let noisy = NoisyFunding::seeded(baseline, 0.0, 10, 1).unwrap();
        for week in 0..10 {
            assert!((noisy.inflow(week) - baseline.inflow(week)).abs() < 1e-9);
        }
        assert!(NoisyFunding::seeded(baseline, -0.1, 10, 1).is_err());
    }
}
