//! Rubric extraction from judge replies
//!
//! Replies are expected to be a bare JSON object but models wrap them in
//! prose or code fences. Extraction ladder:
//! 1. Trimmed text is bracketed by `{` ... `}`: parse it whole
//! 2. Otherwise parse the span from the first `{` to the last `}`
//! 3. Otherwise fail with `MalformedJudgeOutput`

use serde::Deserialize;
use serde_json::Value;

use crate::errors::{EvalError, Result};

/// Rubric fields as returned by the judge, before validation
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RawRubric {
    pub relevance: f64,
    pub correctness: f64,
    pub grounding: f64,
    pub completeness: f64,
    pub reasoning_quality: f64,
    pub overall: f64,
    #[serde(default)]
    pub explanation: Option<Value>,
}

/// Locate the JSON object in a judge reply
pub fn extract_json_object(text: &str) -> Result<Value> {
    let trimmed = text.trim();

    if trimmed.starts_with('{') && trimmed.ends_with('}') {
        return serde_json::from_str(trimmed)
            .map_err(|e| EvalError::MalformedJudgeOutput(format!("invalid JSON: {}", e)));
    }

    match (trimmed.find('{'), trimmed.rfind('}')) {
        (Some(start), Some(end)) if end > start => serde_json::from_str(&trimmed[start..=end])
            .map_err(|e| EvalError::MalformedJudgeOutput(format!("invalid JSON: {}", e))),
        _ => Err(EvalError::MalformedJudgeOutput(
            "judge did not return a JSON object".to_string(),
        )),
    }
}

/// Read the six numeric rubric fields (and the explanation) from a reply
///
/// Numbers encoded as strings (`"0.8"`) are accepted; anything else that is
/// not a number counts as a missing field.
pub fn parse_rubric(text: &str) -> Result<RawRubric> {
    let mut value = extract_json_object(text)?;

    let object = value
        .as_object_mut()
        .ok_or_else(|| EvalError::MalformedJudgeOutput("top-level value is not an object".to_string()))?;

    for field in super::SCORE_FIELDS {
        let coerced = match object.get(field) {
            Some(Value::Number(n)) => n.as_f64(),
            Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
            _ => None,
        }
        .ok_or_else(|| {
            EvalError::MalformedJudgeOutput(format!("missing or non-numeric field `{}`", field))
        })?;

        object.insert(
            field.to_string(),
            serde_json::Number::from_f64(coerced)
                .map(Value::Number)
                .ok_or_else(|| {
                    EvalError::MalformedJudgeOutput(format!("non-finite value for `{}`", field))
                })?,
        );
    }

    serde_json::from_value(value).map_err(|e| EvalError::MalformedJudgeOutput(e.to_string()))
}
