mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;

use commands::sale::{AnalyzeArgs, EligibilityArgs, ScheduleArgs, TaxArgs};

/// Capital-gains tax and valuation scenarios for company sales
#[derive(Parser)]
#[command(
    name = "saletax",
    version,
    about = "Capital-gains tax and valuation scenarios for company sales",
    long_about = "Computes after-tax proceeds from selling a stake in a company under \
                  individual or corporate capital-gains rules, tests eligibility for the \
                  participation exemption, and compares conservative, base, optimistic \
                  and custom valuation scenarios. Set RUST_LOG=debug for diagnostics."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the four-scenario analysis and pick the best outcome
    Analyze(AnalyzeArgs),
    /// Test participation exemption eligibility (Article 21 LIS)
    Eligibility(EligibilityArgs),
    /// Calculate tax on a single valuation
    Tax(TaxArgs),
    /// Print the rate schedule in use
    Schedule(ScheduleArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn main() {
    pretty_env_logger::init();
    let cli = Cli::parse();

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Analyze(args) => commands::sale::run_analyze(args),
        Commands::Eligibility(args) => commands::sale::run_eligibility(args),
        Commands::Tax(args) => commands::sale::run_tax(args),
        Commands::Schedule(args) => commands::sale::run_schedule(args),
        Commands::Version => {
            println!("saletax {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            log::debug!("command failed: {e:?}");
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
