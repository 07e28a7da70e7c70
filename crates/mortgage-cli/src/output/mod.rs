pub mod csv_out;
pub mod json;
pub mod minimal;
pub mod table;

use crate::OutputFormat;
use rust_decimal::Decimal;
use serde_json::Value;

/// Dispatch output to the appropriate formatter.
pub fn format_output(format: &OutputFormat, value: &Value) {
    match format {
        OutputFormat::Json => json::print_json(value),
        OutputFormat::Table => table::print_table(value),
        OutputFormat::Csv => csv_out::print_csv(value),
        OutputFormat::Minimal => minimal::print_minimal(value),
    }
}

/// Round every decimal string in `value` to `dp` places, in place.
///
/// Money and rates serialize as strings, so only strings that parse as a
/// decimal with more than `dp` places are touched.
pub fn round_decimals(value: &mut Value, dp: u32) {
    match value {
        Value::String(s) => {
            if let Ok(d) = s.parse::<Decimal>() {
                if d.scale() > dp {
                    *s = d.round_dp(dp).to_string();
                }
            }
        }
        Value::Array(items) => items.iter_mut().for_each(|v| round_decimals(v, dp)),
        Value::Object(map) => map.values_mut().for_each(|v| round_decimals(v, dp)),
        _ => {}
    }
}

/// Render a scalar for a table cell or CSV field.
pub fn format_scalar(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}

/// True for a non-empty array whose first element is an object.
pub fn is_record_array(value: &Value) -> bool {
    matches!(value, Value::Array(items) if matches!(items.first(), Some(Value::Object(_))))
}
