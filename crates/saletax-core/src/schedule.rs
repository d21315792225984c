use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::SaleTaxError;
use crate::types::{Money, Percent, Rate};
use crate::SaleTaxResult;

const BUNDLED_SCHEDULE: &str = include_str!("../schedules/es-2025.json");

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// One band of the progressive savings-income schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavingsBracket {
    pub lower: Money,
    /// `None` for the open-ended top band.
    pub upper: Option<Money>,
    pub rate: Rate,
}

/// Versioned rate tables for the sale-tax rules.
///
/// Everything numeric that the rules depend on lives here so that a new tax
/// year is a data change, not a code change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxRateSchedule {
    pub version: String,
    pub savings_brackets: Vec<SavingsBracket>,
    pub corporate_rate: Rate,
    /// Share of the gain exempt when the participation exemption applies.
    pub participation_exemption_rate: Rate,
    pub participation_min_percentage: Percent,
    pub participation_min_acquisition_value: Money,
    pub participation_min_holding_years: i64,
    /// Cap on the gain that may be excluded through a life-annuity plan.
    pub annuity_exclusion_ceiling: Money,
}

/// The portion of a gain that fell into one savings bracket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BracketSlice {
    pub lower: Money,
    pub upper: Option<Money>,
    pub rate: Rate,
    pub taxable: Money,
    pub tax: Money,
}

// ---------------------------------------------------------------------------
// Loading and validation
// ---------------------------------------------------------------------------

impl TaxRateSchedule {
    /// The schedule shipped with the crate (`schedules/es-2025.json`).
    pub fn bundled() -> SaleTaxResult<Self> {
        Self::from_json(BUNDLED_SCHEDULE)
    }

    /// Parse and validate a schedule from JSON.
    pub fn from_json(json: &str) -> SaleTaxResult<Self> {
        let schedule: TaxRateSchedule = serde_json::from_str(json)?;
        schedule.validate()?;
        Ok(schedule)
    }

    /// Check the tables are internally consistent.
    ///
    /// Brackets must start at zero, be contiguous and ascending, and only the
    /// last one may be open-ended.
    pub fn validate(&self) -> SaleTaxResult<()> {
        if self.savings_brackets.is_empty() {
            return Err(invalid("savings_brackets", "At least one bracket required"));
        }

        let mut expected_lower = Decimal::ZERO;
        let last = self.savings_brackets.len() - 1;
        for (i, bracket) in self.savings_brackets.iter().enumerate() {
            let field = format!("savings_brackets[{i}]");
            if bracket.lower != expected_lower {
                return Err(invalid(
                    &field,
                    &format!(
                        "Bracket must start at {expected_lower} (got {})",
                        bracket.lower
                    ),
                ));
            }
            validate_rate(&format!("{field}.rate"), bracket.rate)?;
            match bracket.upper {
                Some(upper) if upper <= bracket.lower => {
                    return Err(invalid(&field, "Upper bound must exceed lower bound"));
                }
                Some(upper) => expected_lower = upper,
                None if i != last => {
                    return Err(invalid(&field, "Only the last bracket may be open-ended"));
                }
                None => {}
            }
        }
        if self.savings_brackets[last].upper.is_some() {
            return Err(invalid(
                &format!("savings_brackets[{last}]"),
                "Last bracket must be open-ended",
            ));
        }

        validate_rate("corporate_rate", self.corporate_rate)?;
        validate_rate(
            "participation_exemption_rate",
            self.participation_exemption_rate,
        )?;

        if self.participation_min_percentage < Decimal::ZERO
            || self.participation_min_percentage > Decimal::ONE_HUNDRED
        {
            return Err(invalid(
                "participation_min_percentage",
                "Must be between 0 and 100",
            ));
        }
        if self.participation_min_acquisition_value < Decimal::ZERO {
            return Err(invalid(
                "participation_min_acquisition_value",
                "Cannot be negative",
            ));
        }
        if self.participation_min_holding_years < 0 {
            return Err(invalid("participation_min_holding_years", "Cannot be negative"));
        }
        if self.annuity_exclusion_ceiling < Decimal::ZERO {
            return Err(invalid("annuity_exclusion_ceiling", "Cannot be negative"));
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Progressive schedule
    // -----------------------------------------------------------------------

    /// Tax on the whole of `base` under the savings schedule.
    pub fn savings_tax(&self, base: Money) -> Money {
        self.stacked_slices(Decimal::ZERO, base)
            .iter()
            .map(|s| s.tax)
            .sum()
    }

    /// Split `amount`, stacked on top of `existing_base`, into the brackets it
    /// occupies. Only the marginal slice belonging to `amount` is returned.
    pub fn stacked_slices(&self, existing_base: Money, amount: Money) -> Vec<BracketSlice> {
        let existing_base = existing_base.max(Decimal::ZERO);
        if amount <= Decimal::ZERO {
            return Vec::new();
        }
        let from = existing_base;
        let to = existing_base + amount;

        self.savings_brackets
            .iter()
            .filter_map(|b| {
                let lo = b.lower.max(from);
                let hi = match b.upper {
                    Some(upper) => upper.min(to),
                    None => to,
                };
                if hi <= lo {
                    return None;
                }
                let taxable = hi - lo;
                Some(BracketSlice {
                    lower: b.lower,
                    upper: b.upper,
                    rate: b.rate,
                    taxable,
                    tax: taxable * b.rate,
                })
            })
            .collect()
    }
}

fn validate_rate(field: &str, rate: Rate) -> SaleTaxResult<()> {
    if rate < Decimal::ZERO || rate > Decimal::ONE {
        return Err(invalid(field, "Rate must be between 0 and 1"));
    }
    Ok(())
}

fn invalid(field: &str, reason: &str) -> SaleTaxError {
    SaleTaxError::InvalidSchedule {
        field: field.into(),
        reason: reason.into(),
    }
}
