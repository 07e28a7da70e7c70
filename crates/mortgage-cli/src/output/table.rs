use serde_json::{Map, Value};
use tabled::{builder::Builder, Table};

use super::{format_scalar, is_record_array};

/// Format output as tables using the tabled crate.
///
/// Scalar fields go into one Field/Value table; every array of records
/// (schedules, yearly buckets, scenario rows) gets a table of its own.
pub fn print_table(value: &Value) {
    match value {
        Value::Object(map) => {
            if let Some(Value::Object(result)) = map.get("result") {
                print_object(result);
                print_envelope_notes(map);
            } else {
                print_object(map);
            }
        }
        Value::Array(arr) => print_array_table(arr),
        _ => println!("{}", value),
    }
}

fn print_object(map: &Map<String, Value>) {
    let mut builder = Builder::default();
    builder.push_record(["Field", "Value"]);
    let mut scalar_rows = 0;
    for (key, val) in map {
        if is_record_array(val) {
            continue;
        }
        let cell = match val {
            Value::Object(inner) => inline_object(inner),
            other => format_scalar(other),
        };
        builder.push_record([key.as_str(), &cell]);
        scalar_rows += 1;
    }
    if scalar_rows > 0 {
        println!("{}", Table::from(builder));
    }

    for (key, val) in map {
        if let Value::Array(rows) = val {
            if is_record_array(val) {
                println!("\n{}:", title(key));
                print_array_table(rows);
            }
        }
    }
}

fn print_envelope_notes(envelope: &Map<String, Value>) {
    if let Some(Value::Array(warnings)) = envelope.get("warnings") {
        if !warnings.is_empty() {
            println!("\nWarnings:");
            for w in warnings {
                if let Value::String(s) = w {
                    println!("  - {}", s);
                }
            }
        }
    }

    if let Some(Value::String(meth)) = envelope.get("methodology") {
        println!("\nMethodology: {}", meth);
    }
}

fn print_array_table(arr: &[Value]) {
    if arr.is_empty() {
        println!("(empty)");
        return;
    }

    if let Some(Value::Object(first)) = arr.first() {
        let headers: Vec<String> = first.keys().cloned().collect();
        let mut builder = Builder::default();
        builder.push_record(headers.clone());

        for item in arr {
            if let Value::Object(map) = item {
                let row: Vec<String> = headers
                    .iter()
                    .map(|h| map.get(h.as_str()).map(format_scalar).unwrap_or_default())
                    .collect();
                builder.push_record(row);
            }
        }

        println!("{}", Table::from(builder));
    } else {
        for item in arr {
            println!("{}", format_scalar(item));
        }
    }
}

/// `key: value` pairs for a nested object such as a ranking pick.
fn inline_object(map: &Map<String, Value>) -> String {
    map.iter()
        .map(|(k, v)| format!("{k}: {}", format_scalar(v)))
        .collect::<Vec<_>>()
        .join(", ")
}

fn title(key: &str) -> String {
    key.replace('_', " ")
}
