//! Frame decoding
//!
//! One raw stream message decodes into exactly one `Frame`. Decoding never
//! fails outward: anything unparseable becomes `Frame::Malformed`.

use serde_json::{Map, Value};

/// Terminal message sent by the pipeline after its last stage.
pub const SENTINEL: &str = "[DONE]";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    Sentinel,
    /// A structured payload; either field may be absent (both absent is a no-op)
    Data(DataFrame),
    Malformed { raw: String, reason: String },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DataFrame {
    /// Raw stage identifier as sent by the backend, not yet validated
    pub stage: Option<String>,
    /// Full report text (never a delta)
    pub report: Option<String>,
    /// Recognized fields that were present with the wrong type; the other
    /// field is still delivered
    pub rejected: Vec<String>,
}

impl DataFrame {
    pub fn is_empty(&self) -> bool {
        self.stage.is_none() && self.report.is_none()
    }
}

const STAGE_FIELD: &str = "node";
const REPORT_FIELD: &str = "report";

pub fn decode(raw: &str) -> Frame {
    if raw == SENTINEL {
        return Frame::Sentinel;
    }

    let value: Value = match serde_json::from_str(raw) {
        Ok(value) => value,
        Err(e) => return malformed(raw, e.to_string()),
    };
    let Value::Object(fields) = value else {
        return malformed(raw, "expected a JSON object".to_string());
    };

    let mut rejected = Vec::new();
    let mut field = |name: &str| match text_field(&fields, name) {
        Ok(text) => text,
        Err(reason) => {
            rejected.push(reason);
            None
        }
    };
    let stage = field(STAGE_FIELD);
    let report = field(REPORT_FIELD);

    if stage.is_none() && report.is_none() && !rejected.is_empty() {
        return malformed(raw, rejected.join("; "));
    }
    Frame::Data(DataFrame {
        stage,
        report,
        rejected,
    })
}

/// `null`, missing and empty strings all count as absent.
fn text_field(fields: &Map<String, Value>, name: &str) -> Result<Option<String>, String> {
    match fields.get(name) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(text)) if text.is_empty() => Ok(None),
        Some(Value::String(text)) => Ok(Some(text.clone())),
        Some(other) => Err(format!(
            "field `{}` expected a string, got {}",
            name,
            json_kind(other)
        )),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn malformed(raw: &str, reason: String) -> Frame {
    Frame::Malformed {
        raw: raw.to_string(),
        reason,
    }
}
