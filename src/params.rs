//! Curve Parameters
//!
//! Derives the static constants of the power-function invariant
//! `V(R, S) = S^kappa / R` from a [`CurveConfig`]:
//!
//! - `kappa = p1 / (p0 * (1 - theta))`
//! - weekly growth `(1 + i)^(1/52) - 1`
//! - `R0 = (1 - theta) * d0`, `S0 = d0 / p0`, `V0 = S0^kappa / R0`
//!
//! Constants are computed once and never mutated.

use serde::Serialize;

use crate::config::{CurveConfig, WEEKS_PER_YEAR};
use crate::error::{Result, SimulationError};

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct DerivedConstants {
    pub kappa: f64,
    pub weekly_growth_rate: f64,
    pub initial_reserve: f64,
    pub initial_supply: f64,
    pub invariant_scale: f64,
}

impl DerivedConstants {
    pub fn derive(config: &CurveConfig) -> Result<Self> {
        config.validate()?;

        let weekly_growth_rate =
            (1.0 + config.annual_growth_rate).powf(1.0 / WEEKS_PER_YEAR as f64) - 1.0;

        let initial_reserve = (1.0 - config.allocation_fraction) * config.initial_raise;
        if initial_reserve <= 0.0 {
            return Err(SimulationError::config(format!(
                "initial reserve must be positive, got {}",
                initial_reserve
            )));
        }

        let initial_supply = config.initial_raise / config.pre_hatch_price;

        let kappa = config.post_hatch_price
            / (config.pre_hatch_price * (1.0 - config.allocation_fraction));
        if !kappa.is_finite() || kappa <= 0.0 {
            return Err(SimulationError::config(format!(
                "invariant exponent must be positive and finite, got {}",
                kappa
            )));
        }

        let invariant_scale = initial_supply.powf(kappa) / initial_reserve;
        if !invariant_scale.is_finite() || invariant_scale <= 0.0 {
            return Err(SimulationError::config(format!(
                "invariant scale S0^kappa / R0 is out of range ({}); kappa {} is too large for supply {}",
                invariant_scale, kappa, initial_supply
            )));
        }

        let constants = Self {
            kappa,
            weekly_growth_rate,
            initial_reserve,
            initial_supply,
            invariant_scale,
        };
        log::debug!("Derived curve constants: {:?}", constants);
        Ok(constants)
    }

    /// Marginal price at a given reserve: `kappa * R^((kappa-1)/kappa) / V0^(1/kappa)`.
    pub fn spot_price(&self, reserve: f64) -> f64 {
        self.kappa * reserve.powf((self.kappa - 1.0) / self.kappa)
            / self.invariant_scale.powf(1.0 / self.kappa)
    }

    /// Supply that satisfies the invariant for `reserve`.
    pub fn supply_for_reserve(&self, reserve: f64) -> f64 {
        (self.invariant_scale * reserve).powf(1.0 / self.kappa)
    }

    pub fn reserve_for_supply(&self, supply: f64) -> f64 {
        supply.powf(self.kappa) / self.invariant_scale
    }

    /// dR/dS of the invariant at `supply`.
    pub fn price_for_supply(&self, supply: f64) -> f64 {
        self.kappa * supply.powf(self.kappa - 1.0) / self.invariant_scale
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rel_diff(a: f64, b: f64) -> f64 {
        (a - b).abs() / b.abs().max(1e-300)
    }

    #[test]
    fn test_reference_constants() {
        let c = DerivedConstants::derive(&CurveConfig::default()).unwrap();

        assert!((c.kappa - 6.0).abs() < 1e-9);
        assert!((c.initial_reserve - 50_000.0).abs() < 1e-6);
        assert!((c.initial_supply - 1_000_000.0).abs() < 1e-3);
        assert!(rel_diff(c.invariant_scale, 1e36 / 50_000.0) < 1e-9);
        assert!(rel_diff((1.0 + c.weekly_growth_rate).powi(52), 1.5) < 1e-12);
    }

    #[test]
    fn test_initial_spot_price_is_post_hatch_price() {
        let config = CurveConfig::default();
        let c = DerivedConstants::derive(&config).unwrap();

        assert!(rel_diff(c.spot_price(c.initial_reserve), config.post_hatch_price) < 1e-9);
        assert!(rel_diff(c.price_for_supply(c.initial_supply), config.post_hatch_price) < 1e-9);
    }

    #[test]
    fn test_supply_and_reserve_are_inverse() {
        let c = DerivedConstants::derive(&CurveConfig::default()).unwrap();
        for reserve in [1.0, 50_000.0, 1.0e6, 3.3e7] {
            let supply = c.supply_for_reserve(reserve);
            assert!(rel_diff(c.reserve_for_supply(supply), reserve) < 1e-9);
            assert!(rel_diff(c.price_for_supply(supply), c.spot_price(reserve)) < 1e-9);
        }
    }

    #[test]
    fn test_full_allocation_is_invalid() {
        let config = CurveConfig {
            allocation_fraction: 1.0,
            ..CurveConfig::default()
        };
        assert!(matches!(
            DerivedConstants::derive(&config),
            Err(SimulationError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_degenerate_inputs_are_invalid() {
        let cases = [
            CurveConfig {
                annual_growth_rate: -1.0,
                ..CurveConfig::default()
            },
            CurveConfig {
                pre_hatch_price: 0.0,
                ..CurveConfig::default()
            },
            CurveConfig {
                post_hatch_price: -0.3,
                ..CurveConfig::default()
            },
            CurveConfig {
                initial_raise: 0.0,
                ..CurveConfig::default()
            },
            CurveConfig {
                post_hatch_price: 1.0e6,
                ..CurveConfig::default()
            },
        ];
        for config in cases {
            assert!(
                matches!(DerivedConstants::derive(&config), Err(SimulationError::InvalidConfig(_))),
                "expected InvalidConfig for {:?}",
                config
            );
        }
    }

    #[test]
    fn test_derivation_is_deterministic() {
        let config = CurveConfig::default();
        assert_eq!(
            DerivedConstants::derive(&config).unwrap(),
            DerivedConstants::derive(&config).unwrap()
        );
    }
}
