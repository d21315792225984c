use chrono::{Local, NaiveDate};
use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use saletax_core::analysis::{self, EligibilityInput, SaleTaxInput, TransactionAnalysisInput};
use saletax_core::scenarios::generator::{clamp_custom_multiplier, DEFAULT_CUSTOM_MULTIPLIER};
use saletax_core::scenarios::ScenarioId;
use saletax_core::schedule::TaxRateSchedule;
use saletax_core::transaction::TransactionInputs;

use crate::input;

/// Arguments for a full scenario analysis
#[derive(Args)]
pub struct AnalyzeArgs {
    /// Path to JSON file with the transaction details
    #[arg(long)]
    pub input: Option<String>,

    /// Multiplier for the custom scenario (clamped to 0.5-2.0)
    #[arg(long)]
    pub custom_multiplier: Option<Decimal>,

    /// Valuation date (YYYY-MM-DD); defaults to today
    #[arg(long)]
    pub as_of: Option<NaiveDate>,

    /// Path to a JSON rate schedule; defaults to the bundled one
    #[arg(long)]
    pub schedule: Option<String>,

    /// Scenario to project the net/tax split for: conservative, base, optimistic, custom
    #[arg(long)]
    pub distribution: Option<String>,
}

/// Arguments for the participation exemption test
#[derive(Args)]
pub struct EligibilityArgs {
    /// Path to JSON file with the transaction details
    #[arg(long)]
    pub input: Option<String>,

    /// Valuation date (YYYY-MM-DD); defaults to today
    #[arg(long)]
    pub as_of: Option<NaiveDate>,

    /// Path to a JSON rate schedule; defaults to the bundled one
    #[arg(long)]
    pub schedule: Option<String>,
}

/// Arguments for taxing a single valuation
#[derive(Args)]
pub struct TaxArgs {
    /// Path to JSON file with the transaction details
    #[arg(long)]
    pub input: Option<String>,

    /// Full (100%) valuation to tax; defaults to the sale price
    #[arg(long)]
    pub valuation: Option<Decimal>,

    /// Valuation date (YYYY-MM-DD); defaults to today
    #[arg(long)]
    pub as_of: Option<NaiveDate>,

    /// Path to a JSON rate schedule; defaults to the bundled one
    #[arg(long)]
    pub schedule: Option<String>,
}

/// Arguments for printing the rate schedule in use
#[derive(Args)]
pub struct ScheduleArgs {
    /// Path to a JSON rate schedule; defaults to the bundled one
    #[arg(long)]
    pub schedule: Option<String>,
}

fn read_transaction(
    path: Option<&str>,
    what: &str,
) -> Result<TransactionInputs, Box<dyn std::error::Error>> {
    if let Some(path) = path {
        log::debug!("reading transaction from {path}");
        input::file::read_json(path)
    } else if let Some(data) = input::stdin::read_stdin()? {
        log::debug!("reading transaction from stdin");
        Ok(serde_json::from_value(data)?)
    } else {
        Err(format!("--input <file.json> or stdin required for {what}").into())
    }
}

fn load_schedule(
    path: Option<&str>,
) -> Result<Option<TaxRateSchedule>, Box<dyn std::error::Error>> {
    let Some(path) = path else {
        return Ok(None);
    };
    let schedule: TaxRateSchedule = input::file::read_json(path)?;
    schedule.validate()?;
    log::info!("using rate schedule {} from {path}", schedule.version);
    Ok(Some(schedule))
}

/// Today's date, read once per invocation.
fn resolve_as_of(as_of: Option<NaiveDate>) -> NaiveDate {
    as_of.unwrap_or_else(|| {
        let today = Local::now().date_naive();
        log::debug!("no --as-of given, using {today}");
        today
    })
}

fn parse_scenario(id: &str) -> Result<ScenarioId, Box<dyn std::error::Error>> {
    ScenarioId::ALL
        .into_iter()
        .find(|s| s.to_string() == id.to_lowercase())
        .ok_or_else(|| {
            format!(
                "Unknown scenario '{id}'. Available scenarios: conservative, base, optimistic, custom"
            )
            .into()
        })
}

pub fn run_analyze(args: AnalyzeArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let transaction = read_transaction(args.input.as_deref(), "scenario analysis")?;
    let schedule = load_schedule(args.schedule.as_deref())?;

    let requested = args.custom_multiplier.unwrap_or(DEFAULT_CUSTOM_MULTIPLIER);
    let custom_multiplier = clamp_custom_multiplier(requested);
    if custom_multiplier != requested {
        log::warn!("custom multiplier {requested} clamped to {custom_multiplier}");
    }

    let distribution_scenario = args
        .distribution
        .as_deref()
        .map(parse_scenario)
        .transpose()?;

    let analysis_input = TransactionAnalysisInput {
        transaction,
        custom_multiplier,
        as_of: resolve_as_of(args.as_of),
        schedule,
        distribution_scenario,
    };
    let result = analysis::analyze_transaction(&analysis_input)?;
    log::info!(
        "best scenario: {} ({} warnings)",
        result.result.scenarios.best_scenario(),
        result.warnings.len()
    );
    Ok(serde_json::to_value(result)?)
}

pub fn run_eligibility(args: EligibilityArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let transaction = read_transaction(args.input.as_deref(), "eligibility assessment")?;
    let eligibility_input = EligibilityInput {
        transaction,
        as_of: resolve_as_of(args.as_of),
        schedule: load_schedule(args.schedule.as_deref())?,
    };
    let result = analysis::assess_eligibility(&eligibility_input)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_tax(args: TaxArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let transaction = read_transaction(args.input.as_deref(), "tax calculation")?;
    let tax_input = SaleTaxInput {
        transaction,
        valuation: args.valuation,
        as_of: resolve_as_of(args.as_of),
        schedule: load_schedule(args.schedule.as_deref())?,
    };
    let result = analysis::calculate_sale_tax(&tax_input)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_schedule(args: ScheduleArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let schedule = match load_schedule(args.schedule.as_deref())? {
        Some(s) => s,
        None => TaxRateSchedule::bundled()?,
    };
    Ok(serde_json::to_value(schedule)?)
}
