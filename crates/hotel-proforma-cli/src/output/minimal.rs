use serde_json::Value;

/// Print just the key answer value from the output.
///
/// Projection runs reduce to the final cash position; audit runs to the
/// opinion; cross-validation runs to the failure count. Anything else
/// falls back to the first field of the result object.
pub fn print_minimal(value: &Value) {
    // Unwrap the computation envelope if present
    let result_obj = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    if let Value::Object(map) = result_obj {
        // Projection: last month's ending cash
        if let Some(Value::Array(months)) = map.get("months") {
            if let Some(Value::Object(last)) = months.last() {
                if let Some(cash) = last.get("ending_cash") {
                    println!("ending_cash: {}", format_minimal(cash));
                    return;
                }
            }
        }

        // Audit: the opinion
        if let Some(opinion) = map.get("opinion") {
            if !opinion.is_null() {
                println!("{}", format_minimal(opinion));
                return;
            }
        }

        // Cross-validation: pass/fail counts
        if let (Some(passed), Some(failed)) = (map.get("passed"), map.get("failed")) {
            println!(
                "passed: {} failed: {}",
                format_minimal(passed),
                format_minimal(failed)
            );
            return;
        }

        // Fall back to first field
        if let Some((key, val)) = map.iter().next() {
            println!("{}: {}", key, format_minimal(val));
            return;
        }
    }

    // Yearly output is a bare array: print each year's NOI
    if let Value::Array(years) = result_obj {
        for year in years {
            if let Value::Object(y) = year {
                let idx = y.get("year_index").map(format_minimal).unwrap_or_default();
                let noi = y.get("noi").map(format_minimal).unwrap_or_default();
                println!("year {}: noi {}", idx, noi);
            }
        }
        return;
    }

    println!("{}", format_minimal(result_obj));
}

fn format_minimal(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}
