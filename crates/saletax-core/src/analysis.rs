use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::distribution::{project_distribution, DistributionEntry};
use crate::eligibility::{evaluate_eligibility, EligibilityVerdict};
use crate::error::SaleTaxError;
use crate::scenarios::generator::{
    DEFAULT_CUSTOM_MULTIPLIER, MAX_CUSTOM_MULTIPLIER, MIN_CUSTOM_MULTIPLIER,
};
use crate::scenarios::{evaluate_scenarios, generate_scenarios, ScenarioId, ScenarioSet};
use crate::schedule::TaxRateSchedule;
use crate::tax_rules::{apply_tax_rules, TaxCalculationResult};
use crate::transaction::{TaxpayerType, TransactionInputs};
use crate::types::*;
use crate::SaleTaxResult;

// ---------------------------------------------------------------------------
// Scenario analysis
// ---------------------------------------------------------------------------

fn default_custom_multiplier() -> Multiple {
    DEFAULT_CUSTOM_MULTIPLIER
}

/// Input for a full scenario analysis of a company sale
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionAnalysisInput {
    pub transaction: TransactionInputs,
    #[serde(default = "default_custom_multiplier")]
    pub custom_multiplier: Multiple,
    /// Date the holding period is measured to.
    pub as_of: NaiveDate,
    /// Rate tables to apply; the bundled schedule when absent.
    #[serde(default)]
    pub schedule: Option<TaxRateSchedule>,
    /// Scenario to project the net/tax split for; the best one when absent.
    #[serde(default)]
    pub distribution_scenario: Option<ScenarioId>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TransactionAnalysisOutput {
    pub schedule_version: String,
    #[serde(flatten)]
    pub scenarios: ScenarioSet,
    pub distribution_scenario: ScenarioId,
    pub distribution: Vec<DistributionEntry>,
}

/// Run the conservative/base/optimistic/custom analysis for a sale.
///
/// Generates the scenarios, evaluates them against one snapshot of `as_of`,
/// picks the best by net return and projects its net/tax split.
pub fn analyze_transaction(
    input: &TransactionAnalysisInput,
) -> SaleTaxResult<ComputationOutput<TransactionAnalysisOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let schedule = resolve_schedule(input.schedule.as_ref())?;
    validate_custom_multiplier(input.custom_multiplier)?;
    validate_as_of(&input.transaction, input.as_of)?;

    let tx = &input.transaction;
    let scenarios = generate_scenarios(tx.sale_price(), input.custom_multiplier);
    let set = evaluate_scenarios(tx, &scenarios, &schedule, input.as_of)?;

    collect_relief_warnings(tx, &schedule, &mut warnings);
    if let Some(reason) = set.eligibility().failing_reason {
        warnings.push(format!("Participation exemption not applied: {reason}"));
    }
    for r in set.results() {
        if r.tax_detail.gross_gain <= Decimal::ZERO {
            warnings.push(format!(
                "Scenario '{}' has no taxable gain (valuation {} vs acquisition value {})",
                r.id,
                r.valuation,
                tx.acquisition_value()
            ));
        }
    }

    let distribution_scenario = input
        .distribution_scenario
        .unwrap_or_else(|| set.best_scenario());
    let projected = set.get(distribution_scenario).ok_or_else(|| {
        SaleTaxError::InvalidInput {
            field: "distribution_scenario".into(),
            reason: format!("Unknown scenario '{distribution_scenario}'"),
        }
    })?;
    let distribution = project_distribution(projected);

    let output = TransactionAnalysisOutput {
        schedule_version: schedule.version.clone(),
        scenarios: set,
        distribution_scenario,
        distribution,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Multiplier Scenario Analysis of Company Sale (capital-gains tax, Article 21 LIS)",
        &serde_json::json!({
            "schedule_version": schedule.version,
            "taxpayer_type": tx.taxpayer_type(),
            "sale_percentage": tx.sale_percentage().to_string(),
            "custom_multiplier": input.custom_multiplier.to_string(),
            "as_of": input.as_of.to_string(),
            "valuation_rounding": "whole units, half away from zero",
        }),
        warnings,
        elapsed,
        output,
    ))
}

// ---------------------------------------------------------------------------
// Eligibility only
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EligibilityInput {
    pub transaction: TransactionInputs,
    pub as_of: NaiveDate,
    #[serde(default)]
    pub schedule: Option<TaxRateSchedule>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EligibilityOutput {
    pub verdict: EligibilityVerdict,
    pub years_held: i64,
    pub applicable: bool,
}

/// Decide participation-exemption eligibility without running any scenarios.
pub fn assess_eligibility(
    input: &EligibilityInput,
) -> SaleTaxResult<ComputationOutput<EligibilityOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let schedule = resolve_schedule(input.schedule.as_ref())?;
    validate_as_of(&input.transaction, input.as_of)?;

    let tx = &input.transaction;
    let applicable = tx.taxpayer_type() == TaxpayerType::Company && tx.apply_article21();
    if !applicable {
        warnings.push(
            "Participation exemption only applies to corporate sellers that request it".into(),
        );
    }

    let output = EligibilityOutput {
        verdict: evaluate_eligibility(tx, &schedule, input.as_of),
        years_held: tx.years_held(input.as_of),
        applicable,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Participation Exemption Test (stake, holding period, subject-to-tax, activity)",
        &serde_json::json!({
            "schedule_version": schedule.version,
            "min_participation_pct": schedule.participation_min_percentage.to_string(),
            "min_acquisition_value": schedule.participation_min_acquisition_value.to_string(),
            "min_holding_years": schedule.participation_min_holding_years,
            "as_of": input.as_of.to_string(),
        }),
        warnings,
        elapsed,
        output,
    ))
}

// ---------------------------------------------------------------------------
// Single valuation
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaleTaxInput {
    pub transaction: TransactionInputs,
    /// Full (100%) valuation to tax; the transaction's sale price when absent.
    #[serde(default)]
    pub valuation: Option<Money>,
    pub as_of: NaiveDate,
    #[serde(default)]
    pub schedule: Option<TaxRateSchedule>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaleTaxOutput {
    pub valuation: Money,
    pub eligibility: EligibilityVerdict,
    pub tax: TaxCalculationResult,
}

/// Tax due on one valuation, with its relief breakdown.
pub fn calculate_sale_tax(
    input: &SaleTaxInput,
) -> SaleTaxResult<ComputationOutput<SaleTaxOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let schedule = resolve_schedule(input.schedule.as_ref())?;
    validate_as_of(&input.transaction, input.as_of)?;

    let tx = &input.transaction;
    let valuation = input.valuation.unwrap_or_else(|| tx.sale_price());
    if valuation < Decimal::ZERO {
        return Err(SaleTaxError::InvalidInput {
            field: "valuation".into(),
            reason: "Valuation cannot be negative".into(),
        });
    }

    let eligibility = evaluate_eligibility(tx, &schedule, input.as_of);
    let tax = apply_tax_rules(tx, valuation, &eligibility, &schedule)?;

    collect_relief_warnings(tx, &schedule, &mut warnings);
    if tax.gross_gain <= Decimal::ZERO {
        warnings.push("No taxable gain at this valuation".into());
    }

    let output = SaleTaxOutput {
        valuation,
        eligibility,
        tax,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Capital-Gains Tax on Company Sale",
        &serde_json::json!({
            "schedule_version": schedule.version,
            "taxpayer_type": tx.taxpayer_type(),
            "valuation": valuation.to_string(),
            "as_of": input.as_of.to_string(),
        }),
        warnings,
        elapsed,
        output,
    ))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn resolve_schedule(schedule: Option<&TaxRateSchedule>) -> SaleTaxResult<TaxRateSchedule> {
    match schedule {
        Some(s) => {
            s.validate()?;
            Ok(s.clone())
        }
        None => TaxRateSchedule::bundled(),
    }
}

fn validate_custom_multiplier(multiplier: Multiple) -> SaleTaxResult<()> {
    if multiplier < MIN_CUSTOM_MULTIPLIER || multiplier > MAX_CUSTOM_MULTIPLIER {
        return Err(SaleTaxError::InvalidInput {
            field: "custom_multiplier".into(),
            reason: format!(
                "Custom multiplier must be between {MIN_CUSTOM_MULTIPLIER} and {MAX_CUSTOM_MULTIPLIER} (got {multiplier})"
            ),
        });
    }
    Ok(())
}

fn validate_as_of(tx: &TransactionInputs, as_of: NaiveDate) -> SaleTaxResult<()> {
    if as_of < tx.acquisition_date() {
        return Err(SaleTaxError::DateError(format!(
            "Valuation date {as_of} precedes acquisition date {}",
            tx.acquisition_date()
        )));
    }
    Ok(())
}

fn collect_relief_warnings(
    tx: &TransactionInputs,
    schedule: &TaxRateSchedule,
    warnings: &mut Vec<String>,
) {
    if tx.taxpayer_type() == TaxpayerType::Company && tx.vitalicia_plan() {
        warnings.push("Life-annuity relief only applies to individual sellers; ignored".into());
    }
    if tx.taxpayer_type() == TaxpayerType::Individual && tx.reinvestment_plan() {
        warnings.push("Reinvestment deferral only applies to corporate sellers; ignored".into());
    }
    if tx.vitalicia_plan() && tx.vitalicia_amount() > schedule.annuity_exclusion_ceiling {
        warnings.push(format!(
            "Life-annuity amount {} exceeds the exclusion ceiling of {}; excess is taxed",
            tx.vitalicia_amount(),
            schedule.annuity_exclusion_ceiling
        ));
    }
    let max_gain = (tx.sale_price() - tx.acquisition_value()) * tx.sale_fraction();
    if tx.reinvestment_plan() && max_gain > Decimal::ZERO && tx.reinvestment_amount() > max_gain {
        warnings.push(format!(
            "Reinvestment amount {} exceeds the gain at the sale price ({max_gain}); relief is capped at the gain",
            tx.reinvestment_amount()
        ));
    }
}
