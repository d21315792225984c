use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::types::{Money, Multiple};

pub const CONSERVATIVE_MULTIPLIER: Multiple = dec!(0.85);
pub const BASE_MULTIPLIER: Multiple = Decimal::ONE;
pub const OPTIMISTIC_MULTIPLIER: Multiple = dec!(1.15);
pub const DEFAULT_CUSTOM_MULTIPLIER: Multiple = Decimal::ONE;

/// Allowed range for the user-adjustable multiplier.
pub const MIN_CUSTOM_MULTIPLIER: Multiple = dec!(0.5);
pub const MAX_CUSTOM_MULTIPLIER: Multiple = dec!(2.0);

/// The four canonical scenarios, in generation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScenarioId {
    Conservative,
    Base,
    Optimistic,
    Custom,
}

impl ScenarioId {
    pub const ALL: [ScenarioId; 4] = [
        ScenarioId::Conservative,
        ScenarioId::Base,
        ScenarioId::Optimistic,
        ScenarioId::Custom,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ScenarioId::Conservative => "Conservador",
            ScenarioId::Base => "Base",
            ScenarioId::Optimistic => "Optimista",
            ScenarioId::Custom => "Personalizado",
        }
    }
}

impl std::fmt::Display for ScenarioId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let id = match self {
            ScenarioId::Conservative => "conservative",
            ScenarioId::Base => "base",
            ScenarioId::Optimistic => "optimistic",
            ScenarioId::Custom => "custom",
        };
        f.write_str(id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioDefinition {
    pub id: ScenarioId,
    pub name: String,
    pub multiplier: Multiple,
    pub base_valuation: Money,
}

/// Expand a base valuation into the conservative, base, optimistic and custom
/// scenarios, always in that order.
///
/// `base_valuation` must be the sale price of the inputs the scenarios are
/// later evaluated against.
/// `custom_multiplier` is expected to be within
/// [`MIN_CUSTOM_MULTIPLIER`, `MAX_CUSTOM_MULTIPLIER`]; clamping is the caller's job.
pub fn generate_scenarios(
    base_valuation: Money,
    custom_multiplier: Multiple,
) -> Vec<ScenarioDefinition> {
    ScenarioId::ALL
        .iter()
        .map(|&id| {
            let multiplier = match id {
                ScenarioId::Conservative => CONSERVATIVE_MULTIPLIER,
                ScenarioId::Base => BASE_MULTIPLIER,
                ScenarioId::Optimistic => OPTIMISTIC_MULTIPLIER,
                ScenarioId::Custom => custom_multiplier,
            };
            ScenarioDefinition {
                id,
                name: id.name().to_string(),
                multiplier,
                base_valuation,
            }
        })
        .collect()
}

/// Pull a multiplier into the allowed custom range.
pub fn clamp_custom_multiplier(multiplier: Multiple) -> Multiple {
    multiplier.clamp(MIN_CUSTOM_MULTIPLIER, MAX_CUSTOM_MULTIPLIER)
}
