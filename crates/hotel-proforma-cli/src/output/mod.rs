pub mod csv_out;
pub mod json;
pub mod minimal;
pub mod table;

use crate::OutputFormat;
use serde_json::Value;

/// Route a command's payload to the selected renderer.
///
/// Payloads are either a computation envelope (projection, audit,
/// crosscheck) or a bare yearly array. The json renderer emits the
/// envelope verbatim and the table renderer carries its warnings in a
/// footer; csv and minimal strip the envelope, so warnings are surfaced
/// on stderr before rendering.
pub fn format_output(format: &OutputFormat, value: &Value) {
    match format {
        OutputFormat::Json => json::print_json(value),
        OutputFormat::Table => table::print_table(value),
        OutputFormat::Csv => {
            report_warnings(value);
            csv_out::print_csv(value);
        }
        OutputFormat::Minimal => {
            report_warnings(value);
            minimal::print_minimal(value);
        }
    }
}

fn report_warnings(value: &Value) {
    let Some(Value::Array(warnings)) = value.get("warnings") else {
        return;
    };
    for warning in warnings {
        if let Value::String(text) = warning {
            eprintln!("warning: {text}");
        }
    }
}
