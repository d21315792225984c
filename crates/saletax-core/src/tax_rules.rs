use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::eligibility::EligibilityVerdict;
use crate::schedule::{BracketSlice, TaxRateSchedule};
use crate::transaction::{TaxpayerType, TransactionInputs};
use crate::types::{ratio_or_zero, round_cents, Money, Rate};
use crate::SaleTaxResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Reliefs applied to a gain. Each amount is zero when its toggle is off.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReliefBreakdown {
    /// Gain exempted under the participation exemption.
    pub exemption_amount: Money,
    /// Gain deferred through corporate reinvestment.
    pub reinvestment_deferral_amount: Money,
    /// Gain excluded through a life-annuity plan.
    pub annuity_exclusion_amount: Money,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxCalculationResult {
    /// Proceeds attributable to the stake sold.
    pub gross_proceeds: Money,
    /// Gain on the stake sold; negative for a loss.
    pub gross_gain: Money,
    pub taxable_base: Money,
    pub total_tax: Money,
    pub net_after_tax: Money,
    pub effective_tax_rate: Rate,
    pub reliefs: ReliefBreakdown,
    /// Savings brackets occupied by the gain (individuals only).
    pub bracket_slices: Vec<BracketSlice>,
}

// ---------------------------------------------------------------------------
// Rule application
// ---------------------------------------------------------------------------

/// Tax due on selling `inputs.sale_percentage` of a company valued at
/// `gross_valuation`.
///
/// Losses and break-even sales are never taxed and no relief is recorded for
/// them. Individuals pay the progressive savings schedule stacked on their
/// existing base; companies pay the flat corporate rate after any
/// participation exemption and reinvestment deferral.
pub fn apply_tax_rules(
    inputs: &TransactionInputs,
    gross_valuation: Money,
    verdict: &EligibilityVerdict,
    schedule: &TaxRateSchedule,
) -> SaleTaxResult<TaxCalculationResult> {
    schedule.validate()?;

    let fraction = inputs.sale_fraction();
    let gross_proceeds = gross_valuation * fraction;
    let gross_gain = (gross_valuation - inputs.acquisition_value()) * fraction;

    if gross_gain <= Decimal::ZERO {
        return Ok(TaxCalculationResult {
            gross_proceeds,
            gross_gain,
            taxable_base: Decimal::ZERO,
            total_tax: Decimal::ZERO,
            net_after_tax: gross_proceeds,
            effective_tax_rate: Decimal::ZERO,
            reliefs: ReliefBreakdown::default(),
            bracket_slices: Vec::new(),
        });
    }

    let (taxable_base, raw_tax, reliefs, bracket_slices) = match inputs.taxpayer_type() {
        TaxpayerType::Individual => individual_tax(inputs, gross_gain, schedule),
        TaxpayerType::Company => company_tax(inputs, gross_gain, verdict, schedule),
    };

    // Rounding to cents must never push tax past the gain itself
    let total_tax = round_cents(raw_tax).clamp(Decimal::ZERO, gross_gain);
    let effective_tax_rate = ratio_or_zero(total_tax, gross_gain).min(Decimal::ONE);

    Ok(TaxCalculationResult {
        gross_proceeds,
        gross_gain,
        taxable_base,
        total_tax,
        net_after_tax: gross_proceeds - total_tax,
        effective_tax_rate,
        reliefs,
        bracket_slices,
    })
}

fn individual_tax(
    inputs: &TransactionInputs,
    gain: Money,
    schedule: &TaxRateSchedule,
) -> (Money, Money, ReliefBreakdown, Vec<BracketSlice>) {
    let annuity_exclusion_amount = if inputs.vitalicia_plan() {
        inputs
            .vitalicia_amount()
            .min(schedule.annuity_exclusion_ceiling)
            .min(gain)
    } else {
        Decimal::ZERO
    };

    let taxable = (gain - annuity_exclusion_amount).max(Decimal::ZERO);
    let slices = schedule.stacked_slices(inputs.current_tax_base(), taxable);
    let tax: Money = slices.iter().map(|s| s.tax).sum();

    let reliefs = ReliefBreakdown {
        annuity_exclusion_amount,
        ..ReliefBreakdown::default()
    };
    (taxable, tax, reliefs, slices)
}

fn company_tax(
    inputs: &TransactionInputs,
    gain: Money,
    verdict: &EligibilityVerdict,
    schedule: &TaxRateSchedule,
) -> (Money, Money, ReliefBreakdown, Vec<BracketSlice>) {
    let exemption_amount = if verdict.eligible {
        gain * schedule.participation_exemption_rate
    } else {
        Decimal::ZERO
    };
    let remainder = gain - exemption_amount;

    let reinvestment_deferral_amount = if inputs.reinvestment_plan() {
        // Proportional to the share of the gain reinvested; share first,
        // money times money overflows Decimal at large amounts
        let reinvested_share = inputs.reinvestment_amount().min(gain) / gain;
        remainder * reinvested_share
    } else {
        Decimal::ZERO
    };

    let taxable = (remainder - reinvestment_deferral_amount).max(Decimal::ZERO);
    let tax = taxable * schedule.corporate_rate;

    let reliefs = ReliefBreakdown {
        exemption_amount,
        reinvestment_deferral_amount,
        annuity_exclusion_amount: Decimal::ZERO,
    };
    (taxable, tax, reliefs, Vec::new())
}
