use serde_json::{Map, Value};
use tabled::{builder::Builder, Table};

use super::{cell, flatten, headers, payload};

/// Format output as a table using the tabled crate.
///
/// Arrays (schedules, scenario sweeps, monthly series) become one row per
/// element; objects become a field/value listing. Envelope warnings and
/// methodology follow the table.
pub fn print_table(value: &Value) {
    match payload(value) {
        Value::Array(arr) => print_rows(arr),
        Value::Object(_) => print_fields(payload(value)),
        other => println!("{}", cell(other)),
    }

    if let Value::Object(envelope) = value {
        print_notes(envelope);
    }
}

fn print_rows(arr: &[Value]) {
    if arr.is_empty() {
        println!("(empty)");
        return;
    }

    let rows: Vec<Map<String, Value>> = arr.iter().map(flatten).collect();
    let headers = headers(&rows);
    let mut builder = Builder::default();
    builder.push_record(headers.iter().map(String::as_str));
    for row in &rows {
        builder.push_record(
            headers
                .iter()
                .map(|h| row.get(h).map(cell).unwrap_or_default()),
        );
    }
    println!("{}", Table::from(builder));
}

fn print_fields(value: &Value) {
    let mut builder = Builder::default();
    builder.push_record(["Field", "Value"]);
    for (key, val) in flatten(value) {
        builder.push_record([key, cell(&val)]);
    }
    println!("{}", Table::from(builder));
}

fn print_notes(envelope: &Map<String, Value>) {
    if let Some(Value::Array(warnings)) = envelope.get("warnings") {
        if !warnings.is_empty() {
            println!("\nWarnings:");
            for w in warnings.iter().filter_map(Value::as_str) {
                println!("  - {}", w);
            }
        }
    }

    if let Some(Value::String(meth)) = envelope.get("methodology") {
        println!("\nMethodology: {}", meth);
    }
}
