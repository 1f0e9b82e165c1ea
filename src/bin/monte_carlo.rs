//! Monte Carlo Funding Sweep Binary
//!
//! Runs the reference curve over noisy funding paths at several volatility
//! levels and prints the spread of outcomes.
//!
//! ## Usage
//! ```bash
//! cargo run --bin monte_carlo --release
//! ```

use abc_simulation::monte_carlo::{run_monte_carlo, MonteCarloConfig};
use abc_simulation::Scenario;
use std::error::Error;

const SIMULATION_RUNS: usize = 2_000;
const VOLATILITIES: [f64; 3] = [0.1, 0.3, 0.6];

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    println!("=======================================================");
    println!("  Monte Carlo Funding Sweep");
    println!("  Augmented bonding curve under noisy funding");
    println!("=======================================================");
    println!();
    println!("Parameters:");
    println!("  Runs per level: {}", SIMULATION_RUNS);
    println!("  Volatility levels: {:?}", VOLATILITIES);
    println!();

    for scenario in [Scenario::Reference, Scenario::FlatGrowth, Scenario::AggressiveGrowth] {
        println!("=======================================================");
        println!("Scenario: {}", scenario.name());
        println!("=======================================================");
        println!();

        let config = scenario.config();
        for volatility in VOLATILITIES {
            println!("Volatility: {:.1}", volatility);
            println!("{}", "-".repeat(50));

            let mc = MonteCarloConfig {
                runs: SIMULATION_RUNS,
                volatility,
                ..MonteCarloConfig::default()
            };
            run_monte_carlo(&config, &mc)?.print();
            println!();
        }
    }

    println!("=======================================================");
    println!("  Interpretation:");
    println!("  - Spread widens with funding volatility");
    println!("  - ROI multiple > 1.0 means donors need price growth to break even");
    println!("=======================================================");
    Ok(())
}
