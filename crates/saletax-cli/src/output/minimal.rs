use serde_json::Value;

use super::{format_value, result_body, split_sections};

/// Print just the key answer value from the output.
///
/// Looks for the headline field of each command in priority order, then
/// falls back to the first scalar field.
pub fn print_minimal(value: &Value) {
    let sections = split_sections(result_body(value));

    let priority_keys = [
        "best_scenario",
        "verdict.eligible",
        "tax.total_tax",
        "version",
    ];

    for key in &priority_keys {
        if let Some((_, val)) = sections.fields.iter().find(|(k, _)| k == key) {
            if !val.is_null() {
                println!("{}", format_value(val));
                return;
            }
        }
    }

    if let Some((key, val)) = sections.fields.first() {
        println!("{}: {}", key, format_value(val));
        return;
    }

    println!("{}", format_value(value));
}
