use serde_json::Value;
use std::io::{self, Write};

/// Pretty-print the payload as JSON, envelope included.
pub fn print_json(value: &Value) {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    if let Err(e) = serde_json::to_writer_pretty(&mut handle, value) {
        eprintln!("JSON serialization error: {e}");
        return;
    }
    let _ = writeln!(handle);
}
