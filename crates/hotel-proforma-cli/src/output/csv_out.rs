use serde_json::Value;
use std::io;

/// Write output as CSV to stdout.
///
/// Monthly and yearly sequences become one row per period with the full
/// field set; audit reports become one row per finding.
pub fn print_csv(value: &Value) {
    let stdout = io::stdout();
    let mut wtr = csv::Writer::from_writer(stdout.lock());

    match value {
        Value::Object(map) => {
            let result = map.get("result").unwrap_or(value);
            match result {
                Value::Object(res) if res.contains_key("months") => {
                    if let Some(Value::Array(months)) = res.get("months") {
                        write_array_csv(&mut wtr, months);
                    }
                }
                Value::Object(res) if res.contains_key("sections") => {
                    write_findings_csv(&mut wtr, res);
                }
                Value::Object(res) if res.contains_key("results") => {
                    if let Some(Value::Array(results)) = res.get("results") {
                        write_array_csv(&mut wtr, results);
                    }
                }
                Value::Object(res) => {
                    let _ = wtr.write_record(["field", "value"]);
                    for (key, val) in res {
                        let _ = wtr.write_record([key.as_str(), &format_csv_value(val)]);
                    }
                }
                Value::Array(arr) => write_array_csv(&mut wtr, arr),
                _ => {
                    let _ = wtr.write_record([&format_csv_value(result)]);
                }
            }
        }
        Value::Array(arr) => {
            write_array_csv(&mut wtr, arr);
        }
        _ => {
            let _ = wtr.write_record([&format_csv_value(value)]);
        }
    }

    let _ = wtr.flush();
}

fn write_array_csv(wtr: &mut csv::Writer<io::StdoutLock<'_>>, arr: &[Value]) {
    if arr.is_empty() {
        return;
    }

    if let Some(Value::Object(first)) = arr.first() {
        let headers: Vec<&str> = first.keys().map(|k| k.as_str()).collect();
        let _ = wtr.write_record(&headers);

        for item in arr {
            if let Value::Object(map) = item {
                let row: Vec<String> = headers
                    .iter()
                    .map(|h| map.get(*h).map(format_csv_value).unwrap_or_default())
                    .collect();
                let _ = wtr.write_record(&row);
            }
        }
    } else {
        for item in arr {
            let _ = wtr.write_record([&format_csv_value(item)]);
        }
    }
}

/// One row per audit finding, prefixed with its section.
fn write_findings_csv(wtr: &mut csv::Writer<io::StdoutLock<'_>>, report: &serde_json::Map<String, Value>) {
    let _ = wtr.write_record([
        "section", "rule", "severity", "passed", "expected", "actual", "variance",
        "workpaper_ref",
    ]);

    let Some(Value::Array(sections)) = report.get("sections") else {
        return;
    };
    for section in sections {
        let Value::Object(s) = section else { continue };
        let section_name = s.get("name").map(format_csv_value).unwrap_or_default();
        let Some(Value::Array(findings)) = s.get("findings") else {
            continue;
        };
        for finding in findings {
            if let Value::Object(f) = finding {
                let get = |k: &str| f.get(k).map(format_csv_value).unwrap_or_default();
                let _ = wtr.write_record([
                    section_name.clone(),
                    get("rule"),
                    get("severity"),
                    get("passed"),
                    get("expected"),
                    get("actual"),
                    get("variance"),
                    get("workpaper_ref"),
                ]);
            }
        }
    }
}

fn format_csv_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}
