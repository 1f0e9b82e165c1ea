//! Invariant curve shape and sell quotes.
//!
//! Independent of time: samples `P(S) = kappa * S^(kappa-1) / V0` and
//! `R(S) = S^kappa / V0` over a linear sweep of supply, and prices an exit
//! along the curve.

use serde::Serialize;

use crate::error::{Result, SimulationError};
use crate::params::DerivedConstants;

pub const DEFAULT_MAX_SUPPLY: f64 = 5.0e6;
pub const DEFAULT_POINTS: usize = 1000;

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct CurvePoint {
    pub supply: f64,
    pub reserve: f64,
    pub price: f64,
}

pub fn sample_curve(
    constants: &DerivedConstants,
    max_supply: f64,
    points: usize,
) -> Result<Vec<CurvePoint>> {
    if points < 2 {
        return Err(SimulationError::config(format!(
            "curve sampling needs at least 2 points, got {}",
            points
        )));
    }
    if !max_supply.is_finite() || max_supply <= 0.0 {
        return Err(SimulationError::config(format!(
            "maximum supply must be positive, got {}",
            max_supply
        )));
    }

    let step = max_supply / (points - 1) as f64;
    Ok((0..points)
        .map(|j| {
            let supply = step * j as f64;
            CurvePoint {
                supply,
                reserve: constants.reserve_for_supply(supply),
                price: constants.price_for_supply(supply),
            }
        })
        .collect())
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct SellQuote {
    pub tokens: f64,
    pub released: f64, // Reserve released by burning `tokens`
    pub exit_fee: f64, // Goes to the funding pool
    pub proceeds: f64, // Paid to the seller
    pub reserve_after: f64,
    pub supply_after: f64,
}

/// Quote for burning `tokens` out of `supply`, with the reserve held on
/// the invariant.
pub fn sell_quote(
    constants: &DerivedConstants,
    supply: f64,
    tokens: f64,
    sale_fee_rate: f64,
) -> Result<SellQuote> {
    if !tokens.is_finite() || tokens < 0.0 || tokens > supply {
        return Err(SimulationError::config(format!(
            "cannot sell {} tokens out of a supply of {}",
            tokens, supply
        )));
    }

    let supply_after = supply - tokens;
    let reserve_after = constants.reserve_for_supply(supply_after);
    let released = constants.reserve_for_supply(supply) - reserve_after;
    let exit_fee = released * sale_fee_rate;

    Ok(SellQuote {
        tokens,
        released,
        exit_fee,
        proceeds: released - exit_fee,
        reserve_after,
        supply_after,
    })
}
