//! Parsing of daemon introspection output.
//!
//! Each parser has a narrow contract and never fails: input that does not
//! carry a usable signal yields `None` (or `false`), which the caller treats as
//! "try the next source".

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use super::DaemonState;

static DIGIT_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"[0-9]+").expect("valid digit regex"));

/// Keys that may carry the temperature in structured output.
const TEMPERATURE_KEYS: &[&str] = &["temperature", "temp", "kelvin"];

/// Parse the structured (JSON) introspection response.
///
/// - `{"running": false, ...}` means off, whatever else is present.
/// - A numeric temperature under one of [`TEMPERATURE_KEYS`] (number or
///   numeric string) means running at that temperature.
/// - A bare JSON number is taken as the temperature.
/// - Anything else, including malformed JSON, yields `None`.
pub fn parse_json_state(raw: &str) -> Option<DaemonState> {
    let value: Value = serde_json::from_str(raw.trim()).ok()?;

    match value {
        Value::Object(map) => {
            if map.get("running").and_then(Value::as_bool) == Some(false) {
                return Some(DaemonState::off());
            }
            TEMPERATURE_KEYS
                .iter()
                .find_map(|key| map.get(*key).and_then(json_kelvin))
                .map(DaemonState::running_at)
        }
        Value::Number(_) => json_kelvin(&value).map(DaemonState::running_at),
        _ => None,
    }
}

fn json_kelvin(value: &Value) -> Option<u32> {
    match value {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f.round() as u64))
            .and_then(|k| u32::try_from(k).ok()),
        Value::String(s) => s.trim().parse().ok().or_else(|| extract_kelvin(s)),
        _ => None,
    }
}

/// Whether plain-text output reports the effect as disabled.
pub fn is_disabled(text: &str) -> bool {
    text.to_ascii_lowercase().contains("disabled")
}

/// Extract the first standalone number of 3 to 5 digits.
///
/// Heuristic for a Kelvin value in free-form output such as
/// `"temperature: 4500K"`. Longer or shorter digit runs are skipped rather than
/// split, so `"123456"` and `"v0.3.2"` yield nothing.
pub fn extract_kelvin(text: &str) -> Option<u32> {
    DIGIT_RUN
        .find_iter(text)
        .map(|m| m.as_str())
        .find(|digits| (3..=5).contains(&digits.len()))
        .and_then(|digits| digits.parse().ok())
}
