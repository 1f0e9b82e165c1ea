//! Curve Configuration
//!
//! Scalar economic inputs of an augmented bonding curve, loadable from TOML.
//! Every field has a default, so a config file only needs to name the
//! parameters it changes.
//!
//! ```toml
//! annual_growth_rate = 0.5
//! initial_weekly_funding = 10000.0
//! horizon_weeks = 209
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{Result, SimulationError};

pub const WEEKS_PER_YEAR: usize = 52;

/// Four years of weekly steps plus the initial state.
pub const DEFAULT_HORIZON: usize = 4 * WEEKS_PER_YEAR + 1;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CurveConfig {
    pub annual_growth_rate: f64,     // Annual growth of platform funding
    pub initial_weekly_funding: f64, // EUR funded in week 0 (F0)
    pub initial_raise: f64,          // EUR raised during the hatch (d0)
    pub allocation_fraction: f64,    // Share of the raise sent to the funding pool (theta)
    pub pre_hatch_price: f64,        // Token price during the hatch (p0)
    pub post_hatch_price: f64,       // Token price right after the hatch (p1)
    pub funding_fee_rate: f64,       // Platform fee on project funding (rF)
    pub sale_fee_rate: f64,          // Exit tribute when selling tokens (rS)
    pub donor_mint_rate: f64,        // Share of post-fee funding minted for the donor (rT)
    pub horizon_weeks: usize,
    pub target_window_weeks: usize,
    pub funding_goal: f64, // EUR the target window is measured against
}

impl Default for CurveConfig {
    fn default() -> Self {
        Self {
            annual_growth_rate: 0.5,
            initial_weekly_funding: 10_000.0,
            initial_raise: 100_000.0,
            allocation_fraction: 0.5,
            pre_hatch_price: 0.1,
            post_hatch_price: 0.3,
            funding_fee_rate: 0.05,
            sale_fee_rate: 0.05,
            donor_mint_rate: 0.1,
            horizon_weeks: DEFAULT_HORIZON,
            target_window_weeks: 499,
            funding_goal: 5_000.0 * 2_000.0,
        }
    }
}

impl CurveConfig {
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| SimulationError::ConfigIo {
            path: path.to_path_buf(),
            source,
        })?;
        log::debug!("Loaded curve config from {:?}", path);
        Self::from_toml_str(&contents)
    }

    /// Checks the parameter ranges that curve derivation relies on.
    pub fn validate(&self) -> Result<()> {
        if !self.annual_growth_rate.is_finite() || self.annual_growth_rate <= -1.0 {
            return Err(SimulationError::config(format!(
                "annual growth rate must be finite and greater than -1, got {}",
                self.annual_growth_rate
            )));
        }
        if !self.initial_weekly_funding.is_finite() || self.initial_weekly_funding < 0.0 {
            return Err(SimulationError::config(format!(
                "initial weekly funding must be finite and non-negative, got {}",
                self.initial_weekly_funding
            )));
        }
        if !self.initial_raise.is_finite() || self.initial_raise <= 0.0 {
            return Err(SimulationError::config(format!(
                "initial raise must be positive, got {}",
                self.initial_raise
            )));
        }
        if !(self.allocation_fraction > 0.0 && self.allocation_fraction < 1.0) {
            return Err(SimulationError::config(format!(
                "allocation fraction must lie in (0, 1), got {}",
                self.allocation_fraction
            )));
        }
        if !self.pre_hatch_price.is_finite() || self.pre_hatch_price <= 0.0 {
            return Err(SimulationError::config(format!(
                "pre-hatch price must be positive, got {}",
                self.pre_hatch_price
            )));
        }
        if !self.post_hatch_price.is_finite() || self.post_hatch_price <= 0.0 {
            return Err(SimulationError::config(format!(
                "post-hatch price must be positive, got {}",
                self.post_hatch_price
            )));
        }
        for (name, rate) in [
            ("funding fee rate", self.funding_fee_rate),
            ("donor mint rate", self.donor_mint_rate),
        ] {
            if !(0.0..=1.0).contains(&rate) {
                return Err(SimulationError::config(format!(
                    "{} must lie in [0, 1], got {}",
                    name, rate
                )));
            }
        }
        if !(0.0..1.0).contains(&self.sale_fee_rate) {
            return Err(SimulationError::config(format!(
                "sale fee rate must lie in [0, 1), got {}",
                self.sale_fee_rate
            )));
        }
        Ok(())
    }
}

/// Named parameter sets. Each one is a full `CurveConfig`, so sweeping
/// assumptions means picking a different scenario, not a different code path.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Scenario {
    Reference,        // 50% annual growth over four years
    FlatGrowth,       // Funding stays at F0 every week
    AggressiveGrowth, // Funding doubles every year
    ShortHorizon,     // Reference parameters over five weeks
}

impl Scenario {
    pub fn all() -> Vec<Self> {
        vec![
            Self::Reference,
            Self::FlatGrowth,
            Self::AggressiveGrowth,
            Self::ShortHorizon,
        ]
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Reference => "Reference (+50%/year, 4 years)",
            Self::FlatGrowth => "Flat funding (0%/year)",
            Self::AggressiveGrowth => "Aggressive growth (+100%/year)",
            Self::ShortHorizon => "Short horizon (5 weeks)",
        }
    }

    pub fn key(&self) -> &'static str {
        match self {
            Self::Reference => "reference",
            Self::FlatGrowth => "flat",
            Self::AggressiveGrowth => "aggressive",
            Self::ShortHorizon => "short",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::all().into_iter().find(|s| s.key() == key)
    }

    pub fn config(&self) -> CurveConfig {
        let base = CurveConfig::default();
        match self {
            Self::Reference => base,
            Self::FlatGrowth => CurveConfig {
                annual_growth_rate: 0.0,
                ..base
            },
            Self::AggressiveGrowth => CurveConfig {
                annual_growth_rate: 1.0,
                ..base
            },
            Self::ShortHorizon => CurveConfig {
                horizon_weeks: 5,
                ..base
            },
        }
    }
}
