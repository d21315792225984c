use chrono::{Duration, NaiveDate};
use proptest::prelude::{any, prop_assert, prop_assert_eq, prop_assume, proptest};
use rust_decimal::Decimal;

use saletax_core::eligibility::{evaluate_eligibility, FailingReason};
use saletax_core::scenarios::{evaluate_scenarios, generate_scenarios, ScenarioSet};
use saletax_core::schedule::TaxRateSchedule;
use saletax_core::transaction::{TaxpayerType, TransactionDraft, TransactionInputs};

fn as_of() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 7, 1).unwrap()
}

fn bp(value: u32) -> Decimal {
    Decimal::new(value as i64, 4)
}

#[allow(clippy::too_many_arguments)]
fn inputs(
    company: bool,
    sale_price: u64,
    acquisition_value: u64,
    sale_pct: u32,
    held_days: i64,
    current_base: u64,
    reinvest: Option<u64>,
    annuity: Option<u64>,
    article21: bool,
) -> TransactionInputs {
    TransactionInputs::new(TransactionDraft {
        sale_price: Decimal::from(sale_price),
        taxpayer_type: if company {
            TaxpayerType::Company
        } else {
            TaxpayerType::Individual
        },
        acquisition_value: Decimal::from(acquisition_value),
        acquisition_date: as_of() - Duration::days(held_days),
        sale_percentage: Decimal::from(sale_pct),
        current_tax_base: Decimal::from(current_base),
        reinvestment_plan: reinvest.is_some(),
        reinvestment_amount: Decimal::from(reinvest.unwrap_or(0)),
        vitalicia_plan: annuity.is_some(),
        vitalicia_amount: Decimal::from(annuity.unwrap_or(0)),
        apply_article21: article21,
        participation_percentage: Decimal::from(sale_pct),
        meets_subject_to_tax_requirement: true,
        meets_economic_activity_requirement: true,
    })
    .unwrap()
}

fn evaluate(inputs: &TransactionInputs, custom_bp: u32) -> ScenarioSet {
    let schedule = TaxRateSchedule::bundled().unwrap();
    let scenarios = generate_scenarios(inputs.sale_price(), bp(custom_bp));
    evaluate_scenarios(inputs, &scenarios, &schedule, as_of()).unwrap()
}

proptest! {
    #![proptest_config(proptest::test_runner::Config::with_cases(64))]

    #[test]
    fn prop_tax_is_bounded_and_proceeds_are_conserved(
        company in any::<bool>(),
        sale_price in 0u64..50_000_000,
        acquisition_value in 0u64..30_000_000,
        sale_pct in 1u32..=100,
        held_days in 0i64..5_000,
        current_base in 0u64..500_000,
        reinvest in proptest::option::of(0u64..10_000_000),
        annuity in proptest::option::of(0u64..600_000),
        article21 in any::<bool>(),
        custom_bp in 5_000u32..=20_000
    ) {
        let tx = inputs(company, sale_price, acquisition_value, sale_pct, held_days,
            current_base, reinvest, annuity, article21);
        let set = evaluate(&tx, custom_bp);

        prop_assert_eq!(set.results().len(), 4);
        for r in set.results() {
            prop_assert!(r.total_tax >= Decimal::ZERO);
            prop_assert!(r.effective_tax_rate >= Decimal::ZERO);
            prop_assert!(r.effective_tax_rate <= Decimal::ONE);
            prop_assert_eq!(r.net_return + r.total_tax, r.valuation * tx.sale_fraction());

            if reinvest.is_none() {
                prop_assert_eq!(r.tax_detail.reliefs.reinvestment_deferral_amount, Decimal::ZERO);
            }
            if annuity.is_none() {
                prop_assert_eq!(r.tax_detail.reliefs.annuity_exclusion_amount, Decimal::ZERO);
            }
        }

        let best = set.best();
        prop_assert!(set.results().iter().all(|r| r.net_return <= best.net_return));
    }

    #[test]
    fn prop_evaluation_is_idempotent(
        company in any::<bool>(),
        sale_price in 0u64..50_000_000,
        acquisition_value in 0u64..30_000_000,
        sale_pct in 1u32..=100,
        held_days in 0i64..5_000,
        custom_bp in 5_000u32..=20_000
    ) {
        let tx = inputs(company, sale_price, acquisition_value, sale_pct, held_days,
            0, None, None, true);
        prop_assert_eq!(evaluate(&tx, custom_bp), evaluate(&tx, custom_bp));
    }

    #[test]
    fn prop_higher_multiplier_never_lowers_net_return(
        company in any::<bool>(),
        sale_price in 100_000u64..50_000_000,
        acquisition_value in 0u64..20_000_000,
        sale_pct in 1u32..=100,
        current_base in 0u64..500_000,
        reinvest in proptest::option::of(0u64..10_000_000),
        annuity in proptest::option::of(0u64..600_000),
        low_bp in 5_000u32..20_000,
        step_bp in 1u32..10_000
    ) {
        let high_bp = (low_bp + step_bp).min(20_000);
        prop_assume!(high_bp > low_bp);
        // Non-negative gains only
        prop_assume!(sale_price * low_bp as u64 / 10_000 >= acquisition_value);

        let tx = inputs(company, sale_price, acquisition_value, sale_pct, 800,
            current_base, reinvest, annuity, true);
        let low = evaluate(&tx, low_bp);
        let high = evaluate(&tx, high_bp);
        let (low, high) = (&low.results()[3], &high.results()[3]);

        prop_assert!(high.valuation > low.valuation);
        prop_assert!(high.net_return >= low.net_return);
    }

    #[test]
    fn prop_failing_reason_is_first_unmet_check(
        participation in 0u32..=100,
        acquisition_value in 0u64..40_000_000,
        held_days in 0i64..1_000,
        subject_to_tax in any::<bool>(),
        economic_activity in any::<bool>()
    ) {
        let tx = TransactionInputs::new(TransactionDraft {
            sale_price: Decimal::from(1_000_000u64),
            taxpayer_type: TaxpayerType::Company,
            acquisition_value: Decimal::from(acquisition_value),
            acquisition_date: as_of() - Duration::days(held_days),
            sale_percentage: Decimal::ONE_HUNDRED,
            current_tax_base: Decimal::ZERO,
            reinvestment_plan: false,
            reinvestment_amount: Decimal::ZERO,
            vitalicia_plan: false,
            vitalicia_amount: Decimal::ZERO,
            apply_article21: true,
            participation_percentage: Decimal::from(participation),
            meets_subject_to_tax_requirement: subject_to_tax,
            meets_economic_activity_requirement: economic_activity,
        }).unwrap();
        let schedule = TaxRateSchedule::bundled().unwrap();
        let verdict = evaluate_eligibility(&tx, &schedule, as_of());

        let expected = if participation < 5 && acquisition_value < 20_000_000 {
            Some(FailingReason::InsufficientParticipation)
        } else if tx.years_held(as_of()) < 1 {
            Some(FailingReason::InsufficientHolding)
        } else if !subject_to_tax {
            Some(FailingReason::FailsSubjectToTax)
        } else if !economic_activity {
            Some(FailingReason::FailsEconomicActivity)
        } else {
            None
        };

        prop_assert_eq!(verdict.failing_reason, expected);
        prop_assert_eq!(verdict.eligible, expected.is_none());
    }
}
