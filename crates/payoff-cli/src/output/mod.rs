pub mod csv_out;
pub mod minimal;
pub mod table;

use crate::OutputFormat;
use serde_json::{Map, Value};

/// Dispatch output to the appropriate formatter.
pub fn format_output(format: &OutputFormat, value: &Value) {
    match format {
        OutputFormat::Json => match serde_json::to_string_pretty(value) {
            Ok(s) => println!("{}", s),
            Err(e) => eprintln!("JSON serialization error: {}", e),
        },
        OutputFormat::Table => table::print_table(value),
        OutputFormat::Csv => csv_out::print_csv(value),
        OutputFormat::Minimal => minimal::print_minimal(value),
    }
}

/// The payload of a computation envelope, or the value itself.
pub(crate) fn payload(value: &Value) -> &Value {
    value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value)
}

/// Flatten nested objects into dotted keys so one schedule row or debt
/// summary fits on a single table/CSV line. Arrays stay as JSON text.
pub(crate) fn flatten(value: &Value) -> Map<String, Value> {
    let mut out = Map::new();
    flatten_into("", value, &mut out);
    out
}

fn flatten_into(prefix: &str, value: &Value, out: &mut Map<String, Value>) {
    match value {
        Value::Object(map) => {
            for (key, val) in map {
                let name = if prefix.is_empty() {
                    key.clone()
                } else {
                    format!("{prefix}.{key}")
                };
                flatten_into(&name, val, out);
            }
        }
        other => {
            out.insert(prefix.to_string(), other.clone());
        }
    }
}

/// Render a scalar for text output.
pub(crate) fn cell(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}

/// Column headers across all rows, in first-seen order.
pub(crate) fn headers(rows: &[Map<String, Value>]) -> Vec<String> {
    let mut headers: Vec<String> = Vec::new();
    for row in rows {
        for key in row.keys() {
            if !headers.contains(key) {
                headers.push(key.clone());
            }
        }
    }
    headers
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_flatten_nested_projection() {
        let row = json!({
            "name": "Card",
            "projection": { "status": "paid_off", "total_months": 31 }
        });
        let flat = flatten(&row);
        assert_eq!(
            flat.keys().cloned().collect::<Vec<_>>(),
            vec!["name", "projection.status", "projection.total_months"]
        );
        assert_eq!(flat["projection.total_months"], json!(31));
    }

    #[test]
    fn test_payload_unwraps_envelope() {
        let env = json!({ "result": { "a": 1 }, "warnings": [] });
        assert_eq!(payload(&env), &json!({ "a": 1 }));
        let bare = json!([1, 2]);
        assert_eq!(payload(&bare), &bare);
    }

    #[test]
    fn test_headers_union_in_order() {
        let rows = vec![
            flatten(&json!({ "a": 1, "b": 2 })),
            flatten(&json!({ "a": 1, "c": 3 })),
        ];
        assert_eq!(headers(&rows), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_cell_rendering() {
        assert_eq!(cell(&json!("2030-01-01")), "2030-01-01");
        assert_eq!(cell(&json!(428.04)), "428.04");
        assert_eq!(cell(&Value::Null), "");
        assert_eq!(cell(&json!(["x"])), "[\"x\"]");
    }
}
