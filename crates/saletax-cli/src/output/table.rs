use serde_json::Value;
use tabled::{builder::Builder, Table};

use super::{format_value, result_body, scalar_columns, split_sections};

/// Format output as tables: one for the scalar fields of the result, one per
/// list of records (scenarios, distribution, brackets), then warnings.
pub fn print_table(value: &Value) {
    let body = result_body(value);
    let sections = split_sections(body);

    if !sections.fields.is_empty() {
        let mut builder = Builder::default();
        builder.push_record(["Field", "Value"]);
        for (key, val) in &sections.fields {
            builder.push_record([key.clone(), format_value(val)]);
        }
        println!("{}", Table::from(builder));
    }

    for (name, records) in &sections.tables {
        println!("\n{}:", name);
        print_records(records);
    }

    if let Some(Value::Array(warnings)) = value.get("warnings") {
        if !warnings.is_empty() {
            println!("\nWarnings:");
            for w in warnings {
                println!("  - {}", format_value(w));
            }
        }
    }

    if let Some(Value::String(meth)) = value.get("methodology") {
        println!("\nMethodology: {}", meth);
    }
}

fn print_records(records: &[Value]) {
    let headers = scalar_columns(records);
    if headers.is_empty() {
        println!("(empty)");
        return;
    }

    let mut builder = Builder::default();
    builder.push_record(headers.iter().cloned());
    for item in records {
        let row: Vec<String> = headers
            .iter()
            .map(|h| item.get(h).map(format_value).unwrap_or_default())
            .collect();
        builder.push_record(row);
    }
    println!("{}", Table::from(builder));
}
