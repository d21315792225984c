use chrono::NaiveDate;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::SaleTaxError;
use crate::types::{Money, Percent};
use crate::SaleTaxResult;

const DAYS_PER_YEAR: Decimal = dec!(365.25);

/// Which tax regime the seller falls under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaxpayerType {
    Individual,
    Company,
}

/// Caller-supplied transaction details, before normalisation.
///
/// Optional toggles default to off and amounts default to zero so a form only
/// has to send the fields it shows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionDraft {
    pub sale_price: Money,
    pub taxpayer_type: TaxpayerType,
    pub acquisition_value: Money,
    pub acquisition_date: NaiveDate,
    /// Share of the company being sold, 0-100.
    pub sale_percentage: Percent,
    #[serde(default)]
    pub current_tax_base: Money,
    #[serde(default)]
    pub reinvestment_plan: bool,
    #[serde(default)]
    pub reinvestment_amount: Money,
    #[serde(default)]
    pub vitalicia_plan: bool,
    #[serde(default)]
    pub vitalicia_amount: Money,
    #[serde(default)]
    pub apply_article21: bool,
    #[serde(default)]
    pub participation_percentage: Percent,
    #[serde(default)]
    pub meets_subject_to_tax_requirement: bool,
    #[serde(default)]
    pub meets_economic_activity_requirement: bool,
}

/// Validated, normalised inputs for one calculation.
///
/// Only constructible through [`TransactionInputs::new`], which rejects
/// out-of-range values and zeroes amounts whose toggle is off. Fields that do
/// not apply to the taxpayer type are reset as well, so downstream code never
/// has to second-guess them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "TransactionDraft")]
pub struct TransactionInputs {
    sale_price: Money,
    taxpayer_type: TaxpayerType,
    acquisition_value: Money,
    acquisition_date: NaiveDate,
    sale_percentage: Percent,
    current_tax_base: Money,
    reinvestment_plan: bool,
    reinvestment_amount: Money,
    vitalicia_plan: bool,
    vitalicia_amount: Money,
    apply_article21: bool,
    participation_percentage: Percent,
    meets_subject_to_tax_requirement: bool,
    meets_economic_activity_requirement: bool,
}

impl TryFrom<TransactionDraft> for TransactionInputs {
    type Error = SaleTaxError;

    fn try_from(draft: TransactionDraft) -> SaleTaxResult<Self> {
        TransactionInputs::new(draft)
    }
}

impl TransactionInputs {
    pub fn new(draft: TransactionDraft) -> SaleTaxResult<Self> {
        validate_draft(&draft)?;

        let is_company = draft.taxpayer_type == TaxpayerType::Company;
        let is_individual = !is_company;

        Ok(TransactionInputs {
            sale_price: draft.sale_price,
            taxpayer_type: draft.taxpayer_type,
            acquisition_value: draft.acquisition_value,
            acquisition_date: draft.acquisition_date,
            sale_percentage: draft.sale_percentage,
            current_tax_base: if is_individual {
                draft.current_tax_base
            } else {
                Decimal::ZERO
            },
            reinvestment_plan: draft.reinvestment_plan,
            reinvestment_amount: if draft.reinvestment_plan {
                draft.reinvestment_amount
            } else {
                Decimal::ZERO
            },
            vitalicia_plan: draft.vitalicia_plan,
            vitalicia_amount: if draft.vitalicia_plan {
                draft.vitalicia_amount
            } else {
                Decimal::ZERO
            },
            apply_article21: is_company && draft.apply_article21,
            participation_percentage: if is_company {
                draft.participation_percentage
            } else {
                Decimal::ZERO
            },
            meets_subject_to_tax_requirement: is_company
                && draft.meets_subject_to_tax_requirement,
            meets_economic_activity_requirement: is_company
                && draft.meets_economic_activity_requirement,
        })
    }

    pub fn sale_price(&self) -> Money {
        self.sale_price
    }

    pub fn taxpayer_type(&self) -> TaxpayerType {
        self.taxpayer_type
    }

    pub fn acquisition_value(&self) -> Money {
        self.acquisition_value
    }

    pub fn acquisition_date(&self) -> NaiveDate {
        self.acquisition_date
    }

    pub fn sale_percentage(&self) -> Percent {
        self.sale_percentage
    }

    pub fn current_tax_base(&self) -> Money {
        self.current_tax_base
    }

    pub fn reinvestment_plan(&self) -> bool {
        self.reinvestment_plan
    }

    pub fn reinvestment_amount(&self) -> Money {
        self.reinvestment_amount
    }

    pub fn vitalicia_plan(&self) -> bool {
        self.vitalicia_plan
    }

    pub fn vitalicia_amount(&self) -> Money {
        self.vitalicia_amount
    }

    pub fn apply_article21(&self) -> bool {
        self.apply_article21
    }

    pub fn participation_percentage(&self) -> Percent {
        self.participation_percentage
    }

    pub fn meets_subject_to_tax_requirement(&self) -> bool {
        self.meets_subject_to_tax_requirement
    }

    pub fn meets_economic_activity_requirement(&self) -> bool {
        self.meets_economic_activity_requirement
    }

    /// Fraction of the company being sold, as a decimal (50% -> 0.5).
    pub fn sale_fraction(&self) -> Decimal {
        self.sale_percentage / Decimal::ONE_HUNDRED
    }

    /// Whole years between acquisition and `as_of`, using 365.25-day years.
    /// Negative when `as_of` precedes the acquisition.
    pub fn years_held(&self, as_of: NaiveDate) -> i64 {
        let days = Decimal::from((as_of - self.acquisition_date).num_days());
        (days / DAYS_PER_YEAR).floor().to_i64().unwrap_or(0)
    }
}

fn validate_draft(draft: &TransactionDraft) -> SaleTaxResult<()> {
    let money_fields = [
        ("sale_price", draft.sale_price),
        ("acquisition_value", draft.acquisition_value),
        ("current_tax_base", draft.current_tax_base),
        ("reinvestment_amount", draft.reinvestment_amount),
        ("vitalicia_amount", draft.vitalicia_amount),
    ];
    for (field, value) in money_fields {
        if value < Decimal::ZERO {
            return Err(SaleTaxError::InvalidInput {
                field: field.into(),
                reason: "Amount cannot be negative".into(),
            });
        }
    }

    if draft.sale_percentage <= Decimal::ZERO || draft.sale_percentage > Decimal::ONE_HUNDRED {
        return Err(SaleTaxError::InvalidInput {
            field: "sale_percentage".into(),
            reason: format!(
                "Sale percentage must be in (0, 100] (got {})",
                draft.sale_percentage
            ),
        });
    }

    if draft.participation_percentage < Decimal::ZERO
        || draft.participation_percentage > Decimal::ONE_HUNDRED
    {
        return Err(SaleTaxError::InvalidInput {
            field: "participation_percentage".into(),
            reason: "Participation percentage must be between 0 and 100".into(),
        });
    }
    Ok(())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    pub(crate) fn individual_draft() -> TransactionDraft {
        TransactionDraft {
            sale_price: dec!(1_000_000),
            taxpayer_type: TaxpayerType::Individual,
            acquisition_value: dec!(100_000),
            acquisition_date: date(2015, 3, 1),
            sale_percentage: dec!(100),
            current_tax_base: Decimal::ZERO,
            reinvestment_plan: false,
            reinvestment_amount: Decimal::ZERO,
            vitalicia_plan: false,
            vitalicia_amount: Decimal::ZERO,
            apply_article21: false,
            participation_percentage: Decimal::ZERO,
            meets_subject_to_tax_requirement: false,
            meets_economic_activity_requirement: false,
        }
    }

    pub(crate) fn company_draft() -> TransactionDraft {
        TransactionDraft {
            taxpayer_type: TaxpayerType::Company,
            apply_article21: true,
            participation_percentage: dec!(30),
            meets_subject_to_tax_requirement: true,
            meets_economic_activity_requirement: true,
            ..individual_draft()
        }
    }

    #[test]
    fn test_disabled_reliefs_are_zeroed() {
        let draft = TransactionDraft {
            reinvestment_plan: false,
            reinvestment_amount: dec!(50_000),
            vitalicia_plan: false,
            vitalicia_amount: dec!(80_000),
            ..individual_draft()
        };
        let inputs = TransactionInputs::new(draft).unwrap();
        assert_eq!(inputs.reinvestment_amount(), Decimal::ZERO);
        assert_eq!(inputs.vitalicia_amount(), Decimal::ZERO);
    }

    #[test]
    fn test_enabled_reliefs_are_kept() {
        let draft = TransactionDraft {
            vitalicia_plan: true,
            vitalicia_amount: dec!(80_000),
            ..individual_draft()
        };
        let inputs = TransactionInputs::new(draft).unwrap();
        assert_eq!(inputs.vitalicia_amount(), dec!(80_000));
    }

    #[test]
    fn test_company_fields_reset_for_individual() {
        let draft = TransactionDraft {
            apply_article21: true,
            participation_percentage: dec!(40),
            meets_subject_to_tax_requirement: true,
            ..individual_draft()
        };
        let inputs = TransactionInputs::new(draft).unwrap();
        assert!(!inputs.apply_article21());
        assert_eq!(inputs.participation_percentage(), Decimal::ZERO);
        assert!(!inputs.meets_subject_to_tax_requirement());
    }

    #[test]
    fn test_tax_base_reset_for_company() {
        let draft = TransactionDraft {
            current_tax_base: dec!(60_000),
            ..company_draft()
        };
        let inputs = TransactionInputs::new(draft).unwrap();
        assert_eq!(inputs.current_tax_base(), Decimal::ZERO);
    }

    #[test]
    fn test_rejects_zero_sale_percentage() {
        let draft = TransactionDraft {
            sale_percentage: Decimal::ZERO,
            ..individual_draft()
        };
        assert!(matches!(
            TransactionInputs::new(draft),
            Err(SaleTaxError::InvalidInput { ref field, .. }) if field == "sale_percentage"
        ));
    }

    #[test]
    fn test_rejects_sale_percentage_above_hundred() {
        let draft = TransactionDraft {
            sale_percentage: dec!(100.01),
            ..individual_draft()
        };
        assert!(TransactionInputs::new(draft).is_err());
    }

    #[test]
    fn test_rejects_negative_money() {
        let draft = TransactionDraft {
            acquisition_value: dec!(-1),
            ..individual_draft()
        };
        assert!(matches!(
            TransactionInputs::new(draft),
            Err(SaleTaxError::InvalidInput { ref field, .. }) if field == "acquisition_value"
        ));
    }

    #[test]
    fn test_years_held_floors_partial_years() {
        let inputs = TransactionInputs::new(individual_draft()).unwrap();
        // 2015-03-01 -> 2017-02-28 is 730 days, just short of 2 * 365.25
        assert_eq!(inputs.years_held(date(2017, 2, 28)), 1);
        assert_eq!(inputs.years_held(date(2017, 3, 2)), 2);
    }

    #[test]
    fn test_years_held_before_acquisition_is_negative() {
        let inputs = TransactionInputs::new(individual_draft()).unwrap();
        assert_eq!(inputs.years_held(date(2015, 2, 1)), -1);
    }

    #[test]
    fn test_deserialize_normalises() {
        let json = r#"{
            "sale_price": "500000",
            "taxpayer_type": "individual",
            "acquisition_value": "200000",
            "acquisition_date": "2018-06-15",
            "sale_percentage": "50",
            "reinvestment_amount": "10000"
        }"#;
        let inputs: TransactionInputs = serde_json::from_str(json).unwrap();
        assert_eq!(inputs.sale_fraction(), dec!(0.5));
        assert!(!inputs.reinvestment_plan());
        assert_eq!(inputs.reinvestment_amount(), Decimal::ZERO);
    }

    #[test]
    fn test_deserialize_rejects_invalid() {
        let json = r#"{
            "sale_price": "500000",
            "taxpayer_type": "company",
            "acquisition_value": "200000",
            "acquisition_date": "2018-06-15",
            "sale_percentage": "0"
        }"#;
        assert!(serde_json::from_str::<TransactionInputs>(json).is_err());
    }
}
