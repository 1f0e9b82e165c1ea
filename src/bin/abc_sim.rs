//! Augmented Bonding Curve Simulation CLI
//!
//! ## Usage
//! ```bash
//! cargo run --bin abc-sim --release -- simulate --scenario reference --stride 13
//! cargo run --bin abc-sim --release -- simulate --config curve.toml --format json
//! cargo run --bin abc-sim --release -- curve --points 200 > curve.csv
//! cargo run --bin abc-sim --release -- scenarios
//! ```

use abc_simulation::curve::{sample_curve, DEFAULT_MAX_SUPPLY, DEFAULT_POINTS};
use abc_simulation::funding::{
    ConstantFunding, FundingModel, GrowthFunding, NoisyFunding, StepFunding,
};
use abc_simulation::report::{ConsoleReport, CsvReport, JsonReport, Reporter};
use abc_simulation::{CurveConfig, DerivedConstants, Metrics, Scenario, SimulationError, Simulator};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::error::Error;
use std::io;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "abc-sim")]
#[command(about = "Simulate the weekly trajectory of an augmented bonding curve")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the weekly simulation and report the series
    Simulate {
        #[command(flatten)]
        source: ConfigSource,

        /// Override the number of weeks (including week 0)
        #[arg(long)]
        horizon: Option<usize>,

        /// Funding inflow model
        #[arg(long, value_enum, default_value = "growth")]
        funding: FundingKind,

        /// Weekly amount for the constant model, or the amount after the step
        #[arg(long, default_value = "10000")]
        amount: f64,

        /// First week paying `amount` in the step model
        #[arg(long, default_value = "52")]
        step_week: usize,

        /// Log-normal sigma for the noisy model
        #[arg(long, default_value = "0.3")]
        volatility: f64,

        /// Seed for the noisy model
        #[arg(long, default_value = "42")]
        seed: u64,

        /// Output format
        #[arg(short, long, value_enum, default_value = "console")]
        format: OutputFormat,

        /// Print every n-th week in the console table
        #[arg(long, default_value = "4")]
        stride: usize,
    },

    /// Sample the invariant curve (supply, reserve, price) as CSV
    Curve {
        #[command(flatten)]
        source: ConfigSource,

        /// Largest supply to sample
        #[arg(long, default_value_t = DEFAULT_MAX_SUPPLY)]
        max_supply: f64,

        /// Number of sample points
        #[arg(short = 'n', long, default_value_t = DEFAULT_POINTS)]
        points: usize,
    },

    /// List the built-in scenarios
    Scenarios,
}

#[derive(Args)]
struct ConfigSource {
    /// Path to a TOML curve configuration
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Built-in scenario used when no config file is given
    #[arg(short, long, default_value = "reference")]
    scenario: String,
}

impl ConfigSource {
    fn resolve(&self) -> Result<CurveConfig, SimulationError> {
        match &self.config {
            Some(path) => CurveConfig::load(path),
            None => Scenario::from_key(&self.scenario)
                .map(|s| s.config())
                .ok_or_else(|| {
                    SimulationError::InvalidConfig(format!("unknown scenario '{}'", self.scenario))
                }),
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum FundingKind {
    Growth,
    Constant,
    Step,
    Noisy,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Console,
    Csv,
    Json,
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match Cli::parse().command {
        Command::Simulate {
            source,
            horizon,
            funding,
            amount,
            step_week,
            volatility,
            seed,
            format,
            stride,
        } => {
            let mut config = source.resolve()?;
            if let Some(weeks) = horizon {
                config.horizon_weeks = weeks;
            }

            let simulator = Simulator::new(&config)?;
            let baseline = GrowthFunding::from_config(&config, simulator.constants());
            let model: Box<dyn FundingModel> = match funding {
                FundingKind::Growth => Box::new(baseline),
                FundingKind::Constant => Box::new(ConstantFunding(amount)),
                FundingKind::Step => Box::new(StepFunding {
                    before: config.initial_weekly_funding,
                    after: amount,
                    step_week,
                }),
                FundingKind::Noisy => Box::new(NoisyFunding::seeded(
                    baseline,
                    volatility,
                    config.horizon_weeks,
                    seed,
                )?),
            };
            log::info!(
                "Simulating {} weeks with {} funding",
                config.horizon_weeks,
                model.name()
            );

            let series = simulator.run(config.horizon_weeks, model.as_ref())?;
            let metrics = Metrics::compute(&series, &config)?;

            let mut reporter: Box<dyn Reporter> = match format {
                OutputFormat::Console => Box::new(ConsoleReport::stdout(stride)),
                OutputFormat::Csv => Box::new(CsvReport::new(io::stdout())),
                OutputFormat::Json => Box::new(JsonReport::new(io::stdout())),
            };
            reporter.render(&series, &metrics)?;
        }

        Command::Curve {
            source,
            max_supply,
            points,
        } => {
            let config = source.resolve()?;
            let constants = DerivedConstants::derive(&config)?;
            println!("supply,reserve,price");
            for p in sample_curve(&constants, max_supply, points)? {
                println!("{},{},{}", p.supply, p.reserve, p.price);
            }
        }

        Command::Scenarios => {
            println!("| Key        | Scenario                         | Growth | Weeks |");
            println!("|------------|----------------------------------|--------|-------|");
            for scenario in Scenario::all() {
                let config = scenario.config();
                println!(
                    "| {:10} | {:32} | {:5.0}% | {:5} |",
                    scenario.key(),
                    scenario.name(),
                    config.annual_growth_rate * 100.0,
                    config.horizon_weeks
                );
            }
        }
    }

    Ok(())
}
