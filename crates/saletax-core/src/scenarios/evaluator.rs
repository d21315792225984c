use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::eligibility::{evaluate_eligibility, EligibilityVerdict};
use crate::error::SaleTaxError;
use crate::scenarios::generator::{ScenarioDefinition, ScenarioId};
use crate::schedule::TaxRateSchedule;
use crate::tax_rules::{apply_tax_rules, TaxCalculationResult};
use crate::transaction::TransactionInputs;
use crate::types::{round_units, Money, Multiple, Rate};
use crate::SaleTaxResult;

/// Outcome of one valuation scenario.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioResult {
    pub id: ScenarioId,
    pub name: String,
    pub multiplier: Multiple,
    pub valuation: Money,
    pub total_tax: Money,
    pub net_return: Money,
    pub roi: Rate,
    pub effective_tax_rate: Rate,
    pub tax_detail: TaxCalculationResult,
}

/// The full, consistent set of scenario results for one calculation.
///
/// Built only by [`evaluate_scenarios`]; there is no way to add, drop or
/// replace a single scenario.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScenarioSet {
    results: Vec<ScenarioResult>,
    best_scenario: ScenarioId,
    eligibility: EligibilityVerdict,
    years_held: i64,
    #[serde(skip)]
    best_index: usize,
}

impl ScenarioSet {
    pub fn results(&self) -> &[ScenarioResult] {
        &self.results
    }

    pub fn best_scenario(&self) -> ScenarioId {
        self.best_scenario
    }

    pub fn best(&self) -> &ScenarioResult {
        &self.results[self.best_index]
    }

    pub fn get(&self, id: ScenarioId) -> Option<&ScenarioResult> {
        self.results.iter().find(|r| r.id == id)
    }

    pub fn eligibility(&self) -> &EligibilityVerdict {
        &self.eligibility
    }

    pub fn years_held(&self) -> i64 {
        self.years_held
    }

}

/// Evaluate every scenario against the same inputs and `as_of` date.
///
/// Eligibility depends only on the inputs, so it is decided once and shared.
/// Either all scenarios evaluate or the whole call fails.
pub fn evaluate_scenarios(
    inputs: &TransactionInputs,
    scenarios: &[ScenarioDefinition],
    schedule: &TaxRateSchedule,
    as_of: NaiveDate,
) -> SaleTaxResult<ScenarioSet> {
    validate_scenarios(inputs, scenarios)?;
    schedule.validate()?;

    let eligibility = evaluate_eligibility(inputs, schedule, as_of);
    let years_held = inputs.years_held(as_of);
    let acquisition_value = inputs.acquisition_value();
    let roi_denominator = acquisition_value.max(Decimal::ONE);

    let results = scenarios
        .iter()
        .map(|scenario| {
            let valuation = round_units(scenario.base_valuation * scenario.multiplier);
            let tax = apply_tax_rules(inputs, valuation, &eligibility, schedule)?;
            let net_return = tax.net_after_tax;
            Ok(ScenarioResult {
                id: scenario.id,
                name: scenario.name.clone(),
                multiplier: scenario.multiplier,
                valuation,
                total_tax: tax.total_tax,
                net_return,
                roi: (net_return - acquisition_value) / roi_denominator,
                effective_tax_rate: tax.effective_tax_rate,
                tax_detail: tax,
            })
        })
        .collect::<SaleTaxResult<Vec<_>>>()?;

    let best_index = best_index(&results);
    Ok(ScenarioSet {
        best_scenario: results[best_index].id,
        results,
        eligibility,
        years_held,
        best_index,
    })
}

/// Highest net return; the earliest scenario wins a tie.
fn best_index(results: &[ScenarioResult]) -> usize {
    let mut best = 0;
    for (i, r) in results.iter().enumerate().skip(1) {
        if r.net_return > results[best].net_return {
            best = i;
        }
    }
    best
}

fn validate_scenarios(
    inputs: &TransactionInputs,
    scenarios: &[ScenarioDefinition],
) -> SaleTaxResult<()> {
    if scenarios.len() != ScenarioId::ALL.len() {
        return Err(SaleTaxError::InvalidInput {
            field: "scenarios".into(),
            reason: format!(
                "Expected {} scenarios (got {})",
                ScenarioId::ALL.len(),
                scenarios.len()
            ),
        });
    }
    for id in ScenarioId::ALL {
        let count = scenarios.iter().filter(|s| s.id == id).count();
        if count != 1 {
            return Err(SaleTaxError::InvalidInput {
                field: format!("scenarios:{id}"),
                reason: format!("Scenario must appear exactly once (found {count})"),
            });
        }
    }
    for s in scenarios {
        if s.multiplier <= Decimal::ZERO {
            return Err(SaleTaxError::InvalidInput {
                field: format!("scenarios:{} multiplier", s.id),
                reason: "Multiplier must be positive".into(),
            });
        }
        // Scenarios vary the multiplier only; every one prices the same stake
        if s.base_valuation != inputs.sale_price() {
            return Err(SaleTaxError::InvalidInput {
                field: format!("scenarios:{} base_valuation", s.id),
                reason: format!(
                    "Base valuation {} does not match the sale price {}",
                    s.base_valuation,
                    inputs.sale_price()
                ),
            });
        }
    }
    Ok(())
}
