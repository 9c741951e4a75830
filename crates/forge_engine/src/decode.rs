use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use crate::{ClientError, FrameKind, Manifest, ProgressFrame, SubmitOutcome};

const COMPLETED_STAGE: &str = "completed";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("invalid json: {0}")]
    Json(String),
    #[error("unknown frame type {0:?}")]
    UnknownKind(String),
}

#[derive(Debug, Deserialize)]
struct WireFrame {
    #[serde(rename = "type", alias = "kind")]
    kind: String,
    #[serde(default)]
    stage: Option<String>,
    #[serde(default)]
    current_stage: Option<String>,
    #[serde(default)]
    progress: Option<f64>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// Decodes one live-channel text frame.
///
/// A `final` frame reporting `status: "failed"` decodes as an error frame so
/// that a decoded `Final` always means success.
pub fn decode_frame(text: &str) -> Result<ProgressFrame, DecodeError> {
    let wire: WireFrame =
        serde_json::from_str(text).map_err(|err| DecodeError::Json(err.to_string()))?;

    let frame = match wire.kind.as_str() {
        "progress" | "status" => ProgressFrame {
            kind: if wire.kind == "progress" {
                FrameKind::Progress
            } else {
                FrameKind::Status
            },
            stage: wire.stage.or(wire.current_stage).unwrap_or_default(),
            progress: wire.progress.unwrap_or(0.0),
            message: wire.message.or(wire.status).unwrap_or_default(),
        },
        "final" if wire.status.as_deref() == Some("failed") => ProgressFrame {
            kind: FrameKind::Error,
            stage: wire.stage.or(wire.current_stage).unwrap_or_default(),
            progress: wire.progress.unwrap_or(0.0),
            message: wire.error.or(wire.message).unwrap_or_default(),
        },
        "final" => ProgressFrame {
            kind: FrameKind::Final,
            stage: COMPLETED_STAGE.to_string(),
            progress: wire.progress.unwrap_or(100.0),
            message: wire.message.unwrap_or_default(),
        },
        "error" => ProgressFrame {
            kind: FrameKind::Error,
            stage: wire.stage.or(wire.current_stage).unwrap_or_default(),
            progress: wire.progress.unwrap_or(0.0),
            message: wire.message.or(wire.error).unwrap_or_default(),
        },
        other => return Err(DecodeError::UnknownKind(other.to_string())),
    };
    Ok(frame)
}

/// Interprets a successful submission body as either a queued job or a finished one.
pub fn decode_submit_response(body: &str) -> Result<SubmitOutcome, ClientError> {
    let value: Value =
        serde_json::from_str(body).map_err(|err| ClientError::Decode(err.to_string()))?;
    let task_id = value
        .get("task_id")
        .and_then(Value::as_str)
        .map(ToOwned::to_owned);

    let manifest = match value.get("manifest") {
        Some(Value::Null) | None => None,
        Some(raw) => Some(
            Manifest::deserialize(raw).map_err(|err| ClientError::Decode(err.to_string()))?,
        ),
    };
    let completed = manifest.is_some()
        || value.get("status").and_then(Value::as_str) == Some("completed");

    if completed {
        let task_id = task_id
            .or_else(|| manifest.as_ref().map(|m| m.manifest_id.clone()))
            .ok_or_else(|| ClientError::Decode("completed result without task_id".into()))?;
        return Ok(SubmitOutcome::Completed { task_id, manifest });
    }

    match task_id {
        Some(task_id) if !task_id.trim().is_empty() => Ok(SubmitOutcome::Accepted { task_id }),
        _ => Err(ClientError::Decode("response missing task_id".into())),
    }
}

/// Pulls a human-readable message out of an error body (`detail`, `message` or `error`).
pub fn extract_error_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    ["detail", "message", "error"]
        .iter()
        .filter_map(|key| value.get(*key))
        .find_map(|field| match field {
            Value::String(text) if !text.trim().is_empty() => Some(text.clone()),
            // FastAPI validation errors carry a list of `{ msg }` objects.
            Value::Array(items) => items
                .iter()
                .find_map(|item| item.get("msg").and_then(Value::as_str))
                .map(ToOwned::to_owned),
            _ => None,
        })
}
