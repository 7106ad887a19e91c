//! Trust boundary for model output
//!
//! Everything a model sends back passes through here before it reaches the
//! rest of the crate. The rules are deliberately forgiving: a payload is only
//! rejected when it is not a JSON object, or when it carries none of the
//! fields that identify an analysis. Every other defect is repaired:
//!
//! - numbers are coerced (numeric strings parsed, anything else becomes 0),
//!   rounded and clamped to [-100, 100]
//! - the verdict is always re-derived from the clamped score
//! - missing zones become `{exposure: 0, note: "No data"}`
//! - text fields that are absent or not strings become empty strings

use crate::analysis::{Analysis, PortfolioSynthesis};
use crate::error::SchemaError;
use crate::zones::{ZoneExposure, ZoneKey, Zones, clamp_score};
use regex::Regex;
use serde_json::{Map, Value};
use std::sync::LazyLock;

/// Fields of which at least one must be present for a payload to count as an analysis
pub const IDENTIFYING_FIELDS: [&str; 4] = ["name", "score", "verdict", "zones"];

static CODE_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"```(?:json)?").expect("code fence pattern is valid"));

/// Remove markdown code fences anywhere in the text and trim whitespace
pub fn strip_code_fences(text: &str) -> String {
    CODE_FENCE.replace_all(text, "").trim().to_string()
}

/// Strip fences and parse the remainder as JSON
pub fn parse_payload(text: &str) -> Result<Value, serde_json::Error> {
    serde_json::from_str(&strip_code_fences(text))
}

/// Coerce an arbitrary JSON value to an integer in [-100, 100]
///
/// Numbers are rounded, numeric strings are parsed, booleans become 1 or 0.
/// Anything that does not yield a finite number becomes 0.
pub fn coerce_score(value: Option<&Value>) -> i32 {
    let number = match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => {
            let s = s.trim();
            if s.is_empty() { Some(0.0) } else { s.parse::<f64>().ok() }
        }
        Some(Value::Bool(b)) => Some(if *b { 1.0 } else { 0.0 }),
        _ => None,
    };

    match number {
        Some(n) if n.is_finite() => clamp_score(n.round().clamp(-1.0e6, 1.0e6) as i32),
        _ => 0,
    }
}

/// Coerce an arbitrary JSON value to a string; non-strings become empty
pub fn coerce_text(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        _ => String::new(),
    }
}

fn as_object<'a>(raw: &'a Value, what: &str) -> Result<&'a Map<String, Value>, SchemaError> {
    raw.as_object().ok_or_else(|| {
        let found = match raw {
            Value::Null => "null",
            Value::Bool(_) => "a boolean",
            Value::Number(_) => "a number",
            Value::String(_) => "a string",
            Value::Array(_) => "an array",
            Value::Object(_) => "an object",
        };
        SchemaError::new(format!("{what} must be a JSON object, found {found}"))
    })
}

fn repair_zone(raw: Option<&Value>) -> ZoneExposure {
    match raw.and_then(Value::as_object) {
        Some(zone) => ZoneExposure::new(
            coerce_score(zone.get("exposure")),
            coerce_text(zone.get("note")),
        ),
        None => ZoneExposure::no_data(),
    }
}

fn repair_zones(raw: Option<&Value>) -> Zones {
    let zones = raw.and_then(Value::as_object);
    Zones::from_fn(|key: ZoneKey| repair_zone(zones.and_then(|z| z.get(key.as_str()))))
}

/// Validate and repair a candidate analysis
///
/// Fails only when `raw` is not an object or has none of
/// [`IDENTIFYING_FIELDS`]. A missing `name` is tolerated here.
pub fn validate(raw: &Value) -> Result<Analysis, SchemaError> {
    let object = as_object(raw, "analysis")?;

    if !IDENTIFYING_FIELDS.iter().any(|f| object.contains_key(*f)) {
        return Err(SchemaError::new(format!(
            "none of {} present",
            IDENTIFYING_FIELDS.join(", ")
        )));
    }

    let analysis = Analysis::new(
        coerce_text(object.get("name")),
        coerce_score(object.get("score")),
    )
    .with_tagline(coerce_text(object.get("tagline")))
    .with_wall_street(coerce_text(object.get("wallStreet")))
    .with_defense(coerce_text(object.get("defense")))
    .with_zones(repair_zones(object.get("zones")));

    Ok(analysis)
}

/// Validate and repair a candidate portfolio synthesis
///
/// Only a non-object is rejected.
pub fn validate_synthesis(raw: &Value) -> Result<PortfolioSynthesis, SchemaError> {
    let object = as_object(raw, "synthesis")?;

    let mut synthesis = PortfolioSynthesis::new(coerce_score(object.get("overallScore")));
    synthesis.headline = coerce_text(object.get("headline"));
    synthesis.concentration = coerce_text(object.get("concentration"));
    synthesis.blind_spot = coerce_text(object.get("blindSpot"));
    synthesis.playbook = coerce_text(object.get("playbook"));

    Ok(synthesis)
}
