pub mod csv_out;
pub mod json;
pub mod minimal;
pub mod table;

use crate::OutputFormat;
use serde_json::{Map, Value};

/// Dispatch output to the appropriate formatter.
pub fn format_output(format: &OutputFormat, value: &Value) {
    match format {
        OutputFormat::Json => json::print_json(value),
        OutputFormat::Table => table::print_table(value),
        OutputFormat::Csv => csv_out::print_csv(value),
        OutputFormat::Minimal => minimal::print_minimal(value),
    }
}

/// The computation result inside the standard envelope, or the value itself
/// when there is no envelope (e.g. a printed schedule).
pub(crate) fn result_body(value: &Value) -> &Value {
    value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value)
}

/// A result split into scalar fields (nested objects joined with dots) and
/// the arrays of records it contains, such as scenario rows.
#[derive(Default)]
pub(crate) struct Sections<'a> {
    pub fields: Vec<(String, &'a Value)>,
    pub tables: Vec<(String, &'a [Value])>,
}

pub(crate) fn split_sections(value: &Value) -> Sections<'_> {
    let mut sections = Sections::default();
    if let Value::Object(map) = value {
        collect(&mut sections, "", map);
    }
    sections
}

fn collect<'a>(sections: &mut Sections<'a>, prefix: &str, map: &'a Map<String, Value>) {
    for (key, val) in map {
        let name = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{prefix}.{key}")
        };
        match val {
            Value::Object(inner) => collect(sections, &name, inner),
            Value::Array(items) if items.iter().any(Value::is_object) => {
                sections.tables.push((name, items.as_slice()));
            }
            _ => sections.fields.push((name, val)),
        }
    }
}

/// Column names for a list of records: the scalar fields of the first one.
pub(crate) fn scalar_columns(records: &[Value]) -> Vec<String> {
    match records.first() {
        Some(Value::Object(first)) => first
            .iter()
            .filter(|(_, v)| !v.is_object() && !v.is_array())
            .map(|(k, _)| k.clone())
            .collect(),
        _ => Vec::new(),
    }
}

pub(crate) fn format_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        Value::Array(arr) => {
            let items: Vec<String> = arr.iter().map(format_value).collect();
            items.join(", ")
        }
        Value::Object(_) => serde_json::to_string(value).unwrap_or_default(),
    }
}
