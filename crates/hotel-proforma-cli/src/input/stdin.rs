use serde::de::DeserializeOwned;
use std::io::{self, Read};

/// Read piped assumptions from stdin. Returns `None` when stdin is a
/// TTY (interactive) or the pipe is empty.
pub fn read_stdin<T: DeserializeOwned>() -> Result<Option<T>, Box<dyn std::error::Error>> {
    if atty::is(atty::Stream::Stdin) {
        return Ok(None);
    }

    let mut buffer = String::new();
    io::stdin().read_to_string(&mut buffer)?;

    let trimmed = buffer.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    parse_payload(trimmed).map(Some)
}

/// Piped input carries no file extension to dispatch on, so both
/// formats the file reader accepts are tried: JSON first, then YAML.
fn parse_payload<T: DeserializeOwned>(raw: &str) -> Result<T, Box<dyn std::error::Error>> {
    match serde_json::from_str(raw) {
        Ok(value) => Ok(value),
        Err(json_err) => serde_yaml::from_str(raw).map_err(|yaml_err| {
            format!("stdin parsed as neither JSON ({json_err}) nor YAML ({yaml_err})").into()
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hotel_proforma_core::assumptions::SimulationInput;

    #[test]
    fn test_json_payload_parses() {
        let raw = r#"{
            "global": { "model_start": "2026-01-01" },
            "property": {
                "property_name": "Piped Inn",
                "operations_start": "2026-01-01",
                "room_count": 10,
                "start_occupancy": "0.70",
                "max_occupancy": "0.85",
                "occupancy_growth_step": "0.02",
                "start_adr": "150",
                "adr_growth": "0.03",
                "purchase_price": "1000000",
                "improvements": "0",
                "financing": { "type": "full_equity" }
            }
        }"#;
        let sim: SimulationInput = parse_payload(raw).unwrap();
        assert_eq!(sim.property.property_name, "Piped Inn");
        assert_eq!(sim.property.room_count, 10);
    }

    #[test]
    fn test_yaml_payload_parses() {
        let raw = concat!(
            "global:\n",
            "  model_start: \"2026-01-01\"\n",
            "property:\n",
            "  property_name: Piped Inn\n",
            "  operations_start: \"2026-01-01\"\n",
            "  room_count: 10\n",
            "  start_occupancy: \"0.70\"\n",
            "  max_occupancy: \"0.85\"\n",
            "  occupancy_growth_step: \"0.02\"\n",
            "  start_adr: \"150\"\n",
            "  adr_growth: \"0.03\"\n",
            "  purchase_price: \"1000000\"\n",
            "  improvements: \"0\"\n",
            "  financing:\n",
            "    type: full_equity\n",
        );
        let sim: SimulationInput = parse_payload(raw).unwrap();
        assert_eq!(sim.property.property_name, "Piped Inn");
        assert_eq!(sim.property.room_count, 10);
    }

    #[test]
    fn test_unparseable_payload_names_both_formats() {
        let err = parse_payload::<SimulationInput>("{not json, not yaml: [")
            .err()
            .map(|e| e.to_string())
            .unwrap_or_default();
        assert!(err.contains("JSON"), "{err}");
        assert!(err.contains("YAML"), "{err}");
    }
}
