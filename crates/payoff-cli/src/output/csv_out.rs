use serde_json::{Map, Value};
use std::io;

use super::{cell, flatten, headers, payload};

/// Write output as CSV to stdout.
///
/// Arrays produce a header row plus one record per element; objects produce
/// two-column `field,value` records.
pub fn print_csv(value: &Value) {
    let stdout = io::stdout();
    let mut wtr = csv::Writer::from_writer(stdout.lock());

    let result = match payload(value) {
        Value::Array(arr) => write_rows(&mut wtr, arr),
        Value::Object(_) => write_fields(&mut wtr, payload(value)),
        other => wtr.write_record([cell(other)]),
    };
    if let Err(e) = result.and_then(|_| wtr.flush().map_err(csv::Error::from)) {
        eprintln!("CSV write error: {}", e);
    }
}

fn write_rows<W: io::Write>(wtr: &mut csv::Writer<W>, arr: &[Value]) -> csv::Result<()> {
    let rows: Vec<Map<String, Value>> = arr.iter().map(flatten).collect();
    let headers = headers(&rows);
    if headers.is_empty() {
        return Ok(());
    }
    wtr.write_record(&headers)?;
    for row in &rows {
        wtr.write_record(
            headers
                .iter()
                .map(|h| row.get(h).map(cell).unwrap_or_default()),
        )?;
    }
    Ok(())
}

fn write_fields<W: io::Write>(wtr: &mut csv::Writer<W>, value: &Value) -> csv::Result<()> {
    wtr.write_record(["field", "value"])?;
    for (key, val) in flatten(value) {
        wtr.write_record([key, cell(&val)])?;
    }
    Ok(())
}
