//! Gait JSON parser

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::LazyLock;

use super::parser::OutputParser;

// Flat object only, keys in prompt order. Nested braces or reordered keys
// do not match.
static MOTION_JSON_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\{[^{}]*"y_vel"[^{}]*"yaw_vel"[^{}]*"freq_offset"[^{}]*\}"#).unwrap()
});

/// Locomotion adjustments produced by the gait prompt.
///
/// Values are not range-checked; the prompt asks for `y_vel` and `yaw_vel`
/// in `-0.3..=0.3` and `freq_offset` in `-0.1..=0.1`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MotionResult {
    pub y_vel: f64,
    pub yaw_vel: f64,
    pub freq_offset: f64,
}

/// Extracts the first gait object from a reply.
#[derive(Debug, Clone, Copy, Default)]
pub struct MotionParser;

impl MotionParser {
    pub fn new() -> Self {
        Self
    }
}

/// Coerce a JSON value the way a lenient float conversion would: numbers,
/// numeric strings and booleans are accepted.
fn coerce_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        _ => None,
    }
}

fn field(object: &serde_json::Map<String, Value>, key: &str) -> Option<f64> {
    match object.get(key) {
        None => Some(0.0),
        Some(value) => coerce_f64(value),
    }
}

impl OutputParser for MotionParser {
    type Output = MotionResult;

    fn parse(&self, raw: &str) -> MotionResult {
        let Some(found) = MOTION_JSON_RE.find(raw) else {
            tracing::debug!("No gait object found in reply");
            return MotionResult::default();
        };

        let object = match serde_json::from_str::<Value>(found.as_str()) {
            Ok(Value::Object(object)) => object,
            Ok(_) => return MotionResult::default(),
            Err(e) => {
                tracing::debug!(error = %e, "Gait object is not valid JSON");
                return MotionResult::default();
            }
        };

        match (
            field(&object, "y_vel"),
            field(&object, "yaw_vel"),
            field(&object, "freq_offset"),
        ) {
            (Some(y_vel), Some(yaw_vel), Some(freq_offset)) => MotionResult {
                y_vel,
                yaw_vel,
                freq_offset,
            },
            _ => {
                tracing::debug!("Gait object has non-numeric fields");
                MotionResult::default()
            }
        }
    }

    fn can_parse(&self, raw: &str) -> bool {
        MOTION_JSON_RE.is_match(raw)
    }

    fn name(&self) -> &'static str {
        "motion"
    }
}
