use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::schedule::TaxRateSchedule;
use crate::transaction::{TaxpayerType, TransactionInputs};

/// The first participation-exemption test a seller failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailingReason {
    InsufficientParticipation,
    InsufficientHolding,
    FailsSubjectToTax,
    FailsEconomicActivity,
}

impl std::fmt::Display for FailingReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            FailingReason::InsufficientParticipation => {
                "participation below the minimum stake and acquisition value"
            }
            FailingReason::InsufficientHolding => "holding period below the minimum",
            FailingReason::FailsSubjectToTax => "subsidiary not subject to a comparable tax",
            FailingReason::FailsEconomicActivity => "subsidiary does not carry on an economic activity",
        };
        f.write_str(text)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EligibilityVerdict {
    pub eligible: bool,
    /// `None` when eligible or when the exemption was not requested.
    pub failing_reason: Option<FailingReason>,
}

impl EligibilityVerdict {
    pub const NOT_APPLICABLE: EligibilityVerdict = EligibilityVerdict {
        eligible: false,
        failing_reason: None,
    };

    fn fails(reason: FailingReason) -> Self {
        EligibilityVerdict {
            eligible: false,
            failing_reason: Some(reason),
        }
    }
}

/// Decide whether a corporate seller qualifies for the participation
/// exemption (Article 21 LIS).
///
/// Tests run in a fixed order and the first failure is reported:
/// stake size (percentage or acquisition value), holding period,
/// subject-to-tax, economic activity.
pub fn evaluate_eligibility(
    inputs: &TransactionInputs,
    schedule: &TaxRateSchedule,
    as_of: NaiveDate,
) -> EligibilityVerdict {
    if inputs.taxpayer_type() != TaxpayerType::Company || !inputs.apply_article21() {
        return EligibilityVerdict::NOT_APPLICABLE;
    }

    // Either path qualifies on its own
    let meets_participation = inputs.participation_percentage()
        >= schedule.participation_min_percentage
        || inputs.acquisition_value() >= schedule.participation_min_acquisition_value;
    if !meets_participation {
        return EligibilityVerdict::fails(FailingReason::InsufficientParticipation);
    }

    if inputs.years_held(as_of) < schedule.participation_min_holding_years {
        return EligibilityVerdict::fails(FailingReason::InsufficientHolding);
    }

    if !inputs.meets_subject_to_tax_requirement() {
        return EligibilityVerdict::fails(FailingReason::FailsSubjectToTax);
    }

    if !inputs.meets_economic_activity_requirement() {
        return EligibilityVerdict::fails(FailingReason::FailsEconomicActivity);
    }

    EligibilityVerdict {
        eligible: true,
        failing_reason: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transaction::tests::{company_draft, date, individual_draft};
    use crate::transaction::TransactionDraft;
    use rust_decimal_macros::dec;

    fn schedule() -> TaxRateSchedule {
        TaxRateSchedule::bundled().unwrap()
    }

    fn verdict(draft: TransactionDraft, as_of: NaiveDate) -> EligibilityVerdict {
        let inputs = TransactionInputs::new(draft).unwrap();
        evaluate_eligibility(&inputs, &schedule(), as_of)
    }

    #[test]
    fn test_individual_is_not_applicable() {
        let v = verdict(individual_draft(), date(2025, 1, 1));
        assert_eq!(v, EligibilityVerdict::NOT_APPLICABLE);
    }

    #[test]
    fn test_company_without_article21_is_not_applicable() {
        let draft = TransactionDraft {
            apply_article21: false,
            ..company_draft()
        };
        assert_eq!(
            verdict(draft, date(2025, 1, 1)),
            EligibilityVerdict::NOT_APPLICABLE
        );
    }

    #[test]
    fn test_all_requirements_met() {
        let v = verdict(company_draft(), date(2025, 1, 1));
        assert!(v.eligible);
        assert_eq!(v.failing_reason, None);
    }

    #[test]
    fn test_small_stake_small_cost_fails_participation() {
        let draft = TransactionDraft {
            participation_percentage: dec!(3),
            acquisition_value: dec!(1_000_000),
            acquisition_date: date(2023, 1, 1),
            ..company_draft()
        };
        let v = verdict(draft, date(2025, 1, 2));
        assert!(!v.eligible);
        assert_eq!(
            v.failing_reason,
            Some(FailingReason::InsufficientParticipation)
        );
    }

    #[test]
    fn test_monetary_threshold_is_alternate_path() {
        let draft = TransactionDraft {
            participation_percentage: dec!(3),
            acquisition_value: dec!(25_000_000),
            acquisition_date: date(2023, 1, 1),
            ..company_draft()
        };
        assert!(verdict(draft, date(2025, 1, 2)).eligible);
    }

    #[test]
    fn test_exactly_five_percent_qualifies() {
        let draft = TransactionDraft {
            participation_percentage: dec!(5),
            acquisition_value: dec!(10_000),
            ..company_draft()
        };
        assert!(verdict(draft, date(2025, 1, 1)).eligible);
    }

    #[test]
    fn test_short_holding_fails() {
        let draft = TransactionDraft {
            acquisition_date: date(2024, 6, 1),
            ..company_draft()
        };
        assert_eq!(
            verdict(draft, date(2025, 1, 1)).failing_reason,
            Some(FailingReason::InsufficientHolding)
        );
    }

    #[test]
    fn test_first_failure_wins() {
        // Everything fails; participation is reported
        let draft = TransactionDraft {
            participation_percentage: dec!(1),
            acquisition_value: dec!(1_000),
            acquisition_date: date(2024, 12, 1),
            meets_subject_to_tax_requirement: false,
            meets_economic_activity_requirement: false,
            ..company_draft()
        };
        assert_eq!(
            verdict(draft.clone(), date(2025, 1, 1)).failing_reason,
            Some(FailingReason::InsufficientParticipation)
        );

        // Fix participation; holding is next
        let draft = TransactionDraft {
            participation_percentage: dec!(10),
            ..draft
        };
        assert_eq!(
            verdict(draft.clone(), date(2025, 1, 1)).failing_reason,
            Some(FailingReason::InsufficientHolding)
        );

        // Fix holding; subject-to-tax is next
        let draft = TransactionDraft {
            acquisition_date: date(2020, 1, 1),
            ..draft
        };
        assert_eq!(
            verdict(draft.clone(), date(2025, 1, 1)).failing_reason,
            Some(FailingReason::FailsSubjectToTax)
        );

        let draft = TransactionDraft {
            meets_subject_to_tax_requirement: true,
            ..draft
        };
        assert_eq!(
            verdict(draft, date(2025, 1, 1)).failing_reason,
            Some(FailingReason::FailsEconomicActivity)
        );
    }
}
