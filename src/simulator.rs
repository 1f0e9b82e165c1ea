//! Weekly Simulator
//!
//! Forward recurrence of reserve, supply and price under the invariant
//! `S^kappa = V0 * R`. Each week:
//!
//! 1. Funding net of the platform fee mints tokens for the donor; that
//!    share flows into the reserve.
//! 2. A burn hook may take reserve out (no burn mechanism is active by
//!    default).
//! 3. Supply is derived from the new reserve by inverting the invariant.
//! 4. Spot price is the invariant's dR/dS at the new reserve.
//! 5. The funding pool collects the platform fee; projects receive the rest.
//!
//! Week `i` only reads week `i - 1`, so the loop is strictly sequential.
//! Per-week deltas live in one `WeekRecord` per week.

use serde::Serialize;

use crate::config::CurveConfig;
use crate::error::{Result, SimulationError};
use crate::funding::{validate_inflow, FundingModel};
use crate::params::DerivedConstants;

/// Reserve taken out in a given week, e.g. by tokens burned on sale.
///
/// Called with the week being computed and the previous week's reserve and
/// supply. Must return a finite, non-negative amount.
pub trait ReserveBurn {
    fn reserve_decrease(&self, week: usize, reserve: f64, supply: f64) -> f64;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct NoBurn;

impl ReserveBurn for NoBurn {
    fn reserve_decrease(&self, _week: usize, _reserve: f64, _supply: f64) -> f64 {
        0.0
    }
}

impl<F> ReserveBurn for F
where
    F: Fn(usize, f64, f64) -> f64,
{
    fn reserve_decrease(&self, week: usize, reserve: f64, supply: f64) -> f64 {
        self(week, reserve, supply)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct WeekRecord {
    pub week: usize,
    pub funding: f64,        // EUR arriving this week, F(week)
    pub reserve_delta: f64,  // Reserve added from last week's funding
    pub burn_delta: f64,     // Reserve removed by the burn hook
    pub minted: f64,         // Tokens minted this week (may be negative under burn)
    pub reserve: f64,
    pub supply: f64,
    pub price: f64,           // Marginal spot price
    pub funding_pool: f64,    // Cumulative EUR in the platform's funding pool
    pub project_funding: f64, // Cumulative EUR passed on to projects
}

/// Per-week state of one simulation run. Index 0 holds the initial
/// conditions; the series is read-only once the run returns it.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct WeekSeries {
    constants: DerivedConstants,
    records: Vec<WeekRecord>,
}

impl WeekSeries {
    pub fn constants(&self) -> &DerivedConstants {
        &self.constants
    }

    pub fn records(&self) -> &[WeekRecord] {
        &self.records
    }

    pub fn get(&self, week: usize) -> Option<&WeekRecord> {
        self.records.get(week)
    }

    pub fn last(&self) -> &WeekRecord {
        // A series always holds at least the initial conditions.
        &self.records[self.records.len() - 1]
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn funding(&self) -> Vec<f64> {
        self.records.iter().map(|r| r.funding).collect()
    }

    pub fn reserve(&self) -> Vec<f64> {
        self.records.iter().map(|r| r.reserve).collect()
    }

    pub fn supply(&self) -> Vec<f64> {
        self.records.iter().map(|r| r.supply).collect()
    }

    pub fn price(&self) -> Vec<f64> {
        self.records.iter().map(|r| r.price).collect()
    }

    pub fn funding_pool(&self) -> Vec<f64> {
        self.records.iter().map(|r| r.funding_pool).collect()
    }

    pub fn project_funding(&self) -> Vec<f64> {
        self.records.iter().map(|r| r.project_funding).collect()
    }
}

pub struct Simulator {
    config: CurveConfig,
    constants: DerivedConstants,
    burn: Box<dyn ReserveBurn>,
}

impl Simulator {
    pub fn new(config: &CurveConfig) -> Result<Self> {
        let constants = DerivedConstants::derive(config)?;
        Ok(Self {
            config: config.clone(),
            constants,
            burn: Box::new(NoBurn),
        })
    }

    pub fn with_burn(mut self, burn: impl ReserveBurn + 'static) -> Self {
        self.burn = Box::new(burn);
        self
    }

    pub fn constants(&self) -> &DerivedConstants {
        &self.constants
    }

    fn initial_record(&self, funding: &dyn FundingModel) -> WeekRecord {
        let c = &self.constants;
        WeekRecord {
            week: 0,
            funding: funding.inflow(0),
            reserve_delta: 0.0,
            burn_delta: 0.0,
            minted: 0.0,
            reserve: c.initial_reserve,
            supply: c.initial_supply,
            price: c.spot_price(c.initial_reserve),
            funding_pool: self.config.allocation_fraction * self.config.initial_raise,
            project_funding: 0.0,
        }
    }

    fn step(
        &self,
        prev: &WeekRecord,
        week: usize,
        funding: &dyn FundingModel,
    ) -> Result<WeekRecord> {
        let c = &self.constants;
        let rates = &self.config;
        let inflow = funding.inflow(week - 1);

        let reserve_delta = inflow * (1.0 - rates.funding_fee_rate) * rates.donor_mint_rate;

        let burn_delta = self.burn.reserve_decrease(week, prev.reserve, prev.supply);
        if !burn_delta.is_finite() || burn_delta < 0.0 {
            return Err(SimulationError::InvalidFundingSeries { week, value: burn_delta });
        }

        let reserve = prev.reserve + reserve_delta - burn_delta;
        if reserve <= 0.0 {
            log::warn!("Burn of {} in week {} would empty the reserve", burn_delta, week);
            return Err(SimulationError::InvalidFundingSeries { week, value: burn_delta });
        }

        // S0 = d0 / p0 and (V0 * R0)^(1/kappa) differ by rounding; an unchanged
        // reserve mints nothing.
        let minted = if reserve == prev.reserve {
            0.0
        } else {
            c.supply_for_reserve(reserve) - prev.supply
        };
        let supply = prev.supply + minted;
        let price = c.spot_price(reserve);

        let record = WeekRecord {
            week,
            funding: funding.inflow(week),
            reserve_delta,
            burn_delta,
            minted,
            reserve,
            supply,
            price,
            funding_pool: prev.funding_pool + inflow * rates.funding_fee_rate,
            project_funding: prev.project_funding
                + inflow * (1.0 - rates.funding_fee_rate) * (1.0 - rates.donor_mint_rate),
        };
        log::trace!(
            "week {}: R={:.2} S={:.2} P={:.6} minted={:.2}",
            week,
            reserve,
            supply,
            price,
            minted
        );
        Ok(record)
    }

    /// Runs `horizon` weeks (including week 0) against `funding`.
    pub fn run(&self, horizon: usize, funding: &dyn FundingModel) -> Result<WeekSeries> {
        if horizon < 1 {
            return Err(SimulationError::InvalidHorizon(horizon));
        }
        validate_inflow(funding, horizon)?;

        let mut records = Vec::with_capacity(horizon);
        records.push(self.initial_record(funding));

        for week in 1..horizon {
            let record = self.step(&records[week - 1], week, funding)?;
            records.push(record);
        }

        let series = WeekSeries {
            constants: self.constants,
            records,
        };
        let last = series.last();
        log::debug!(
            "Simulated {} weeks with {}: final reserve {:.2}, supply {:.2}, price {:.6}",
            horizon,
            funding.name(),
            last.reserve,
            last.supply,
            last.price
        );
        Ok(series)
    }
}

/// Runs the configured horizon with the default (no-burn) simulator.
pub fn simulate(config: &CurveConfig, funding: &dyn FundingModel) -> Result<WeekSeries> {
    Simulator::new(config)?.run(config.horizon_weeks, funding)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::funding::{ConstantFunding, GrowthFunding, ScheduleFunding};

    fn rel_diff(a: f64, b: f64) -> f64 {
        (a - b).abs() / b.abs().max(1e-300)
    }

    fn reference_run(config: &CurveConfig) -> WeekSeries {
        let constants = DerivedConstants::derive(config).unwrap();
        let funding = GrowthFunding::from_config(config, &constants);
        simulate(config, &funding).unwrap()
    }

    #[test]
    fn test_series_length_matches_horizon() {
        let series = reference_run(&CurveConfig::default());
        assert_eq!(series.len(), 209);
        assert_eq!(series.records().first().unwrap().week, 0);
        assert_eq!(series.last().week, 208);
    }

    #[test]
    fn test_invariant_preserved_every_week() {
        let series = reference_run(&CurveConfig::default());
        let c = series.constants();

        for r in series.records() {
            let lhs = r.supply.powf(c.kappa);
            let rhs = c.invariant_scale * r.reserve;
            assert!(rel_diff(lhs, rhs) < 1e-9, "week {}: {} vs {}", r.week, lhs, rhs);
        }
    }

    #[test]
    fn test_reserve_and_supply_monotonic() {
        let series = reference_run(&CurveConfig::default());
        for pair in series.records().windows(2) {
            assert!(pair[1].reserve >= pair[0].reserve);
            assert!(pair[1].supply >= pair[0].supply);
            assert!(pair[1].funding_pool >= pair[0].funding_pool);
            assert!(pair[1].project_funding >= pair[0].project_funding);
        }
    }

    #[test]
    fn test_runs_are_deterministic() {
        let config = CurveConfig::default();
        assert_eq!(reference_run(&config), reference_run(&config));
    }

    #[test]
    fn test_single_week_horizon_is_initial_conditions() {
        let config = CurveConfig {
            horizon_weeks: 1,
            ..CurveConfig::default()
        };
        let series = reference_run(&config);
        let r = &series.records()[0];

        assert_eq!(series.len(), 1);
        assert!((r.reserve - 50_000.0).abs() < 1e-6);
        assert!((r.supply - 1_000_000.0).abs() < 1e-3);
        assert!(rel_diff(r.price, config.post_hatch_price) < 1e-9);
        assert!((r.funding_pool - 50_000.0).abs() < 1e-6);
        assert_eq!(r.project_funding, 0.0);
    }

    #[test]
    fn test_five_week_scenario() {
        let config = CurveConfig {
            horizon_weeks: 5,
            ..CurveConfig::default()
        };
        let series = reference_run(&config);
        let c = series.constants();

        assert!((c.kappa - 6.0).abs() < 1e-9);
        assert!((c.initial_reserve - 50_000.0).abs() < 1e-6);
        assert!((c.initial_supply - 1_000_000.0).abs() < 1e-3);
        assert_eq!(series.len(), 5);

        for pair in series.records().windows(2) {
            assert!(pair[1].reserve > pair[0].reserve);
            assert!(pair[1].supply > pair[0].supply);
        }

        // Week 1 receives F(0) = 10000 EUR: 950 EUR to the reserve.
        let week1 = &series.records()[1];
        assert!((week1.reserve_delta - 950.0).abs() < 1e-9);
        assert!((week1.reserve - 50_950.0).abs() < 1e-6);
        assert!((week1.funding_pool - 50_500.0).abs() < 1e-6);
        assert!((week1.project_funding - 8_550.0).abs() < 1e-6);
    }

    #[test]
    fn test_price_matches_invariant_derivative() {
        let series = reference_run(&CurveConfig::default());
        let c = series.constants();

        for r in series.records().iter().step_by(13) {
            let h = r.supply * 1e-6;
            let rise = c.reserve_for_supply(r.supply + h) - c.reserve_for_supply(r.supply - h);
            let numeric = rise / (2.0 * h);
            assert!(rel_diff(r.price, numeric) < 1e-6, "week {}", r.week);
            assert!(rel_diff(r.price, c.price_for_supply(r.supply)) < 1e-9);
        }
    }

    #[test]
    fn test_zero_horizon_rejected() {
        let config = CurveConfig::default();
        let sim = Simulator::new(&config).unwrap();
        assert!(matches!(
            sim.run(0, &ConstantFunding(1000.0)),
            Err(SimulationError::InvalidHorizon(0))
        ));
    }

    #[test]
    fn test_negative_funding_rejected_before_running() {
        let config = CurveConfig::default();
        let sim = Simulator::new(&config).unwrap();
        let funding = ScheduleFunding(vec![100.0, 100.0, -1.0]);

        match sim.run(10, &funding) {
            Err(SimulationError::InvalidFundingSeries { week, .. }) => assert_eq!(week, 2),
            other => panic!("unexpected result: {:?}", other),
        }
        assert!(sim.run(10, &|_: usize| f64::NAN).is_err());
    }

    #[test]
    fn test_zero_funding_keeps_state() {
        let config = CurveConfig::default();
        let series = Simulator::new(&config).unwrap().run(4, &ConstantFunding(0.0)).unwrap();
        let initial = &series.records()[0];

        for r in &series.records()[1..] {
            assert_eq!(r.minted, 0.0);
            assert_eq!(r.supply, initial.supply);
            assert_eq!(r.reserve, initial.reserve);
        }
        for pair in series.records().windows(2) {
            assert!(pair[1].supply >= pair[0].supply);
        }
    }

    #[test]
    fn test_column_accessors_match_records() {
        let series = reference_run(&CurveConfig {
            horizon_weeks: 8,
            ..CurveConfig::default()
        });
        let records = series.records();

        assert!(!series.is_empty());
        assert_eq!(series.get(3), Some(&records[3]));
        assert_eq!(series.get(8), None);

        let columns: [(Vec<f64>, fn(&WeekRecord) -> f64); 6] = [
            (series.funding(), |r| r.funding),
            (series.reserve(), |r| r.reserve),
            (series.supply(), |r| r.supply),
            (series.price(), |r| r.price),
            (series.funding_pool(), |r| r.funding_pool),
            (series.project_funding(), |r| r.project_funding),
        ];
        for (column, field) in columns {
            assert_eq!(column.len(), records.len());
            for (value, record) in column.iter().zip(records) {
                assert_eq!(*value, field(record));
            }
        }
    }

    #[test]
    fn test_burn_hook_reduces_reserve() {
        let config = CurveConfig::default();
        let sim = Simulator::new(&config)
            .unwrap()
            .with_burn(|_week: usize, _reserve: f64, _supply: f64| 100.0);
        let series = sim.run(3, &ConstantFunding(10_000.0)).unwrap();
        let c = series.constants();

        let week1 = &series.records()[1];
        assert!((week1.burn_delta - 100.0).abs() < 1e-12);
        assert!((week1.reserve - (50_000.0 + 950.0 - 100.0)).abs() < 1e-6);
        assert!(rel_diff(week1.supply.powf(c.kappa), c.invariant_scale * week1.reserve) < 1e-9);
    }

    #[test]
    fn test_burn_emptying_reserve_rejected() {
        let config = CurveConfig::default();
        let sim = Simulator::new(&config)
            .unwrap()
            .with_burn(|_week: usize, reserve: f64, _supply: f64| reserve * 2.0);
        assert!(matches!(
            sim.run(3, &ConstantFunding(10_000.0)),
            Err(SimulationError::InvalidFundingSeries { week: 1, .. })
        ));
    }
}
