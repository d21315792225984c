use serde_json::Value;
use std::io;

use super::{format_value, result_body, scalar_columns, split_sections};

/// Write output as CSV to stdout.
///
/// Scenario analyses print one row per scenario; everything else prints
/// `field,value` pairs.
pub fn print_csv(value: &Value) {
    let stdout = io::stdout();
    let mut wtr = csv::Writer::from_writer(stdout.lock());
    let sections = split_sections(result_body(value));

    let scenario_rows = sections
        .tables
        .iter()
        .find(|(name, _)| name == "results")
        .map(|(_, records)| *records);

    if let Some(records) = scenario_rows {
        let headers = scalar_columns(records);
        let _ = wtr.write_record(&headers);
        for item in records {
            let row: Vec<String> = headers
                .iter()
                .map(|h| item.get(h).map(format_value).unwrap_or_default())
                .collect();
            let _ = wtr.write_record(&row);
        }
    } else {
        let _ = wtr.write_record(["field", "value"]);
        for (key, val) in &sections.fields {
            let _ = wtr.write_record([key.as_str(), &format_value(val)]);
        }
    }

    let _ = wtr.flush();
}
