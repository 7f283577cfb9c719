use serde_json::Value;
use tabled::{builder::Builder, Table};

/// Key P&L columns shown for monthly output; the full snapshot is far
/// too wide for a terminal, use --output json for every field.
const MONTH_COLUMNS: [&str; 9] = [
    "month_index",
    "date",
    "revenue_total",
    "gop",
    "noi",
    "debt_payment",
    "net_income",
    "cash_flow",
    "ending_cash",
];

const YEAR_COLUMNS: [&str; 8] = [
    "year_index",
    "revenue_total",
    "gop",
    "noi",
    "debt_payment",
    "net_income",
    "cash_flow",
    "ending_cash",
];

/// Format output as a table using the tabled crate.
pub fn print_table(value: &Value) {
    match value {
        Value::Object(map) => {
            if let Some(result) = map.get("result") {
                print_result_table(result, map);
            } else {
                print_flat_object(value);
            }
        }
        Value::Array(arr) => {
            print_projection_rows(arr, &YEAR_COLUMNS);
        }
        _ => {
            println!("{}", value);
        }
    }
}

fn print_result_table(result: &Value, envelope: &serde_json::Map<String, Value>) {
    match result {
        Value::Object(map) if map.contains_key("months") => {
            if let Some(Value::Array(months)) = map.get("months") {
                print_projection_rows(months, &MONTH_COLUMNS);
            }
            if let Some(refinance) = map.get("refinance") {
                println!("\nRefinance: {}", format_value(refinance));
            }
        }
        Value::Object(map) if map.contains_key("sections") => {
            print_audit_summary(map);
        }
        Value::Object(map) if map.contains_key("results") => {
            if let Some(Value::Array(results)) = map.get("results") {
                print_generic_rows(results);
            }
            println!(
                "\n{} checks, {} passed, {} failed",
                format_field(map, "total_checks"),
                format_field(map, "passed"),
                format_field(map, "failed")
            );
        }
        Value::Object(map) => {
            let mut builder = Builder::default();
            builder.push_record(["Field", "Value"]);
            for (key, val) in map {
                builder.push_record([key.as_str(), &format_value(val)]);
            }
            println!("{}", Table::from(builder));
        }
        _ => print_flat_object(&Value::Object(envelope.clone())),
    }

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

fn print_audit_summary(report: &serde_json::Map<String, Value>) {
    let mut builder = Builder::default();
    builder.push_record(["Section", "Passed", "Failed", "Material"]);
    if let Some(Value::Array(sections)) = report.get("sections") {
        for section in sections {
            if let Value::Object(s) = section {
                builder.push_record([
                    format_field(s, "name"),
                    format_field(s, "passed"),
                    format_field(s, "failed"),
                    format_field(s, "material_issues"),
                ]);
            }
        }
    }
    println!("{}", Table::from(builder));
    println!(
        "\nOpinion: {}\n{}",
        format_field(report, "opinion"),
        format_field(report, "opinion_text")
    );
}

/// Render an array of snapshot-shaped objects, keeping only the named
/// columns that actually appear in the data.
fn print_projection_rows(rows: &[Value], columns: &[&str]) {
    if rows.is_empty() {
        println!("(empty)");
        return;
    }

    let Some(Value::Object(first)) = rows.first() else {
        for item in rows {
            println!("{}", format_value(item));
        }
        return;
    };

    let headers: Vec<&str> = columns
        .iter()
        .copied()
        .filter(|c| first.contains_key(*c))
        .collect();

    let mut builder = Builder::default();
    builder.push_record(headers.iter().copied());
    for item in rows {
        if let Value::Object(map) = item {
            let row: Vec<String> = headers
                .iter()
                .map(|h| map.get(*h).map(format_value).unwrap_or_default())
                .collect();
            builder.push_record(row);
        }
    }
    println!("{}", Table::from(builder));
}

fn print_generic_rows(arr: &[Value]) {
    if arr.is_empty() {
        println!("(empty)");
        return;
    }

    if let Some(Value::Object(first)) = arr.first() {
        let headers: Vec<String> = first.keys().cloned().collect();
        let mut builder = Builder::default();
        builder.push_record(&headers);

        for item in arr {
            if let Value::Object(map) = item {
                let row: Vec<String> = headers
                    .iter()
                    .map(|h| map.get(h.as_str()).map(format_value).unwrap_or_default())
                    .collect();
                builder.push_record(row);
            }
        }
        println!("{}", Table::from(builder));
    } else {
        for item in arr {
            println!("{}", format_value(item));
        }
    }
}

fn print_flat_object(value: &Value) {
    if let Value::Object(map) = value {
        let mut builder = Builder::default();
        builder.push_record(["Field", "Value"]);
        for (key, val) in map {
            builder.push_record([key.as_str(), &format_value(val)]);
        }
        println!("{}", Table::from(builder));
    }
}

fn format_field(map: &serde_json::Map<String, Value>, key: &str) -> String {
    map.get(key).map(format_value).unwrap_or_default()
}

fn format_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        Value::Array(arr) => {
            let items: Vec<String> = arr.iter().map(format_value).collect();
            items.join(", ")
        }
        Value::Object(_) => serde_json::to_string(value).unwrap_or_default(),
    }
}
