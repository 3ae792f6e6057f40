use std::fmt::Write as _;

use anyhow::Result;
use hubwire_api::{DecodeFailure, HubEvent};
use serde::Serialize;
use serde_json::{Value, json};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

/// Bytes shown by `--head`.
pub const HEAD_LEN: usize = 12;

/// Lowercase hex of at most the first `max` bytes.
pub fn hex_head(bytes: &[u8], max: usize) -> String {
    bytes.iter().take(max).fold(String::new(), |mut out, byte| {
        let _ = write!(out, "{:02x}", byte);
        out
    })
}

pub fn frame_line(frame: &[u8], head: bool) -> String {
    if head {
        format!("bin: len={} head={}", frame.len(), hex_head(frame, HEAD_LEN))
    } else {
        format!("bin: len={}", frame.len())
    }
}

/// One JSON line for a decoded event, stamped with the receive time and the
/// frame length.
pub fn event_line(event: &HubEvent, received: OffsetDateTime, len: usize) -> Result<String> {
    let mut value = serde_json::to_value(event)?;
    if let Value::Object(map) = &mut value {
        map.insert("recv".to_string(), Value::String(received.format(&Rfc3339)?));
        map.insert("len".to_string(), json!(len));
    }
    Ok(value.to_string())
}

pub fn failure_line(failure: &DecodeFailure) -> String {
    json!({
        "decode_error": failure.error.to_string(),
        "kind": failure.kind(),
        "len": failure.frame_len,
    })
    .to_string()
}

pub fn pretty<T: Serialize>(value: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}
