//! Augmented Bonding Curve Simulation Library
//!
//! Projects the weekly trajectory of an augmented bonding curve that funds a
//! platform: given growth in external funding, how the token reserve, supply
//! and price evolve, and what that means for the funding pool, platform
//! revenue and donor return multiples.
//!
//! ## Modules
//!
//! - `config`: economic inputs, TOML loading and named scenarios
//! - `params`: constants derived from the config (kappa, R0, S0, V0)
//! - `funding`: pluggable weekly funding-inflow models
//! - `simulator`: the weekly reserve/supply/price recurrence
//! - `metrics`: ROI figures, revenue and funding-goal summary
//! - `curve`: static invariant curve samples and sell quotes
//! - `monte_carlo`: sweep over noisy funding paths
//! - `report`: console, CSV and JSON reporters
//!
//! ## Usage
//!
//! ```bash
//! # Reference scenario, table every 13 weeks
//! cargo run --bin abc-sim --release -- simulate --stride 13
//!
//! # Weekly series as CSV for plotting
//! cargo run --bin abc-sim --release -- simulate --format csv > weeks.csv
//!
//! # Run Monte Carlo over noisy funding
//! cargo run --bin monte_carlo --release
//! ```

pub mod config;
pub mod curve;
pub mod error;
pub mod funding;
pub mod metrics;
pub mod monte_carlo;
pub mod params;
pub mod report;
pub mod simulator;

pub use config::{CurveConfig, Scenario};
pub use error::{Result, SimulationError};
pub use funding::FundingModel;
pub use metrics::Metrics;
pub use params::DerivedConstants;
pub use simulator::{simulate, Simulator, WeekRecord, WeekSeries};
