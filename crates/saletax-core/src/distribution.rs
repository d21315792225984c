use serde::{Deserialize, Serialize};

use crate::scenarios::ScenarioResult;
use crate::types::Money;

pub const NET_LABEL: &str = "Neto";
pub const TAX_LABEL: &str = "Impuestos";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistributionEntry {
    pub name: String,
    pub value: Money,
}

/// Split a scenario's proceeds into what the seller keeps and what goes to tax.
///
/// The two entries add up to the proceeds of the stake sold
/// (`valuation * sale_percentage / 100`).
pub fn project_distribution(result: &ScenarioResult) -> Vec<DistributionEntry> {
    vec![
        DistributionEntry {
            name: NET_LABEL.to_string(),
            value: result.net_return,
        },
        DistributionEntry {
            name: TAX_LABEL.to_string(),
            value: result.total_tax,
        },
    ]
}
