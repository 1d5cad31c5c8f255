//! Defensive parsing of generative-model output for the consult flow.
//!
//! Models wrap their JSON in code fences, prose, or both, and sometimes
//! return a bare id array instead of the full contract object. Parsing is
//! staged, first success wins, and total failure degrades to an empty result
//! rather than an error; the raw text is kept by the caller for audit.

use serde_json::Value;
use tracing::warn;

/// Structured result of one consult response.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedConsult {
    pub recommended_ids: Vec<String>,
    pub explanation: String,
    pub soldier_needs: Vec<String>,
    pub mashak_needs: Vec<String>,
}

impl ParsedConsult {
    pub fn is_empty(&self) -> bool {
        self.recommended_ids.is_empty()
    }
}

/// Parse raw model output. Never fails:
/// 1. strip code fences, trim, full JSON parse (contract object or bare array)
/// 2. fall back to the first bracketed array of quoted strings in the text
/// 3. give up with an empty result
pub fn parse_consult_output(raw: &str) -> ParsedConsult {
    let cleaned = strip_code_fences(raw);

    if let Ok(value) = serde_json::from_str::<Value>(&cleaned) {
        if let Some(parsed) = from_value(&value) {
            return parsed;
        }
    }

    if let Some(ids) = extract_id_array(raw) {
        warn!("Consult output was not valid JSON; recovered id array from prose");
        return ParsedConsult {
            recommended_ids: ids,
            ..Default::default()
        };
    }

    warn!("Consult output unparsable ({} chars); returning empty result", raw.len());
    ParsedConsult::default()
}

/// Remove ```json / ``` markers and surrounding whitespace.
fn strip_code_fences(raw: &str) -> String {
    raw.replace("```json", "").replace("```", "").trim().to_string()
}

/// Interpret a parsed JSON value as the consult contract.
///
/// Accepts either the full object
/// `{recommendedIds, explanation, nextSteps: {soldierNeeds, mashakNeeds}}`
/// (missing or null fields tolerated) or a bare `["id", ...]` array.
fn from_value(value: &Value) -> Option<ParsedConsult> {
    if let Some(ids) = string_array(Some(value)) {
        return Some(ParsedConsult {
            recommended_ids: ids,
            ..Default::default()
        });
    }

    if !value.is_object() {
        return None;
    }

    let recommended_ids = string_array(value.get("recommendedIds")).unwrap_or_default();
    let explanation = value
        .get("explanation")
        .and_then(|v| v.as_str())
        .unwrap_or("")
        .to_string();

    let next_steps = value.get("nextSteps");
    let soldier_needs = next_steps
        .and_then(|ns| string_array(ns.get("soldierNeeds")))
        .unwrap_or_default();
    let mashak_needs = next_steps
        .and_then(|ns| string_array(ns.get("mashakNeeds")))
        .unwrap_or_default();

    Some(ParsedConsult {
        recommended_ids,
        explanation,
        soldier_needs,
        mashak_needs,
    })
}

/// A JSON array of strings, or None.
fn string_array(value: Option<&Value>) -> Option<Vec<String>> {
    let arr = value?.as_array()?;
    let mut out = Vec::with_capacity(arr.len());
    for item in arr {
        out.push(item.as_str()?.to_string());
    }
    Some(out)
}

/// Scan prose for the first `[...]` slice that parses as an array of quoted
/// strings. Used when the model explains itself around the answer.
fn extract_id_array(raw: &str) -> Option<Vec<String>> {
    let bytes = raw.as_bytes();
    for (start, &b) in bytes.iter().enumerate() {
        if b != b'[' {
            continue;
        }
        if let Some(len) = raw[start..].find(']') {
            let slice = &raw[start..=start + len];
            if let Ok(ids) = serde_json::from_str::<Vec<String>>(slice) {
                if !ids.is_empty() {
                    return Some(ids);
                }
            }
        }
    }
    None
}
