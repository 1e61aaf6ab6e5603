use serde_json::Value;

use super::{cell, payload};

/// Fields that answer each command's question, most specific first.
const PRIORITY_KEYS: [&str; 11] = [
    "monthlyPayment",
    "required_payment",
    "requiredPayment",
    "payoffDate",
    "payoff_date",
    "months_saved",
    "debt_free_date",
    "net",
    "total_balance",
    "months",
    "total_months",
];

/// Print just the key answer value from the output.
///
/// Arrays print their length; objects print the first priority field
/// present (skipping nulls), falling back to the first field.
pub fn print_minimal(value: &Value) {
    println!("{}", minimal_answer(payload(value)));
}

fn minimal_answer(result: &Value) -> String {
    match result {
        Value::Array(arr) => arr.len().to_string(),
        Value::Object(map) => {
            for key in PRIORITY_KEYS {
                if let Some(val) = map.get(key).filter(|v| !v.is_null()) {
                    return cell(val);
                }
            }
            match map.iter().next() {
                Some((key, val)) => format!("{}: {}", key, cell(val)),
                None => String::new(),
            }
        }
        other => cell(other),
    }
}
