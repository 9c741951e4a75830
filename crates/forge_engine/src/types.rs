use serde::{Deserialize, Serialize};

use crate::{ChannelError, ClientError};

pub type RunId = u64;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubmitRequest {
    pub idea: String,
    pub industry: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// Job queued; progress follows on the live channel.
    Accepted { task_id: String },
    /// Job already finished; the manifest is present when the backend inlined it.
    Completed {
        task_id: String,
        manifest: Option<Manifest>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameKind {
    Progress,
    Status,
    Final,
    Error,
}

impl FrameKind {
    pub fn is_terminal(self) -> bool {
        matches!(self, FrameKind::Final | FrameKind::Error)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProgressFrame {
    pub kind: FrameKind,
    pub stage: String,
    pub progress: f64,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Manifest {
    pub manifest_id: String,
    #[serde(default)]
    pub assets: Vec<Asset>,
    #[serde(default)]
    pub total_assets: Option<usize>,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Asset {
    pub asset_id: String,
    pub asset_type: String,
    pub url: String,
    #[serde(default)]
    pub quality_score: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ResultsResponse {
    #[serde(default)]
    pub task_id: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub manifest: Option<Manifest>,
    #[serde(default)]
    pub execution_time_seconds: Option<f64>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatusKind {
    Queued,
    Running,
    Completed,
    Failed,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TaskStatus {
    pub task_id: String,
    pub status: TaskStatusKind,
    #[serde(default)]
    pub progress: f64,
    #[serde(default)]
    pub current_stage: String,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct HealthReport {
    pub status: String,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub active_tasks: Option<u64>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    Submitted {
        run_id: RunId,
        result: Result<SubmitOutcome, ClientError>,
    },
    Frame {
        run_id: RunId,
        frame: ProgressFrame,
        received_at: String,
    },
    MalformedFrame {
        run_id: RunId,
        reason: String,
    },
    StreamFailed {
        run_id: RunId,
        error: ChannelError,
    },
    CompletionDue {
        run_id: RunId,
    },
    ResultsFetched {
        run_id: RunId,
        result: Result<Option<Manifest>, ClientError>,
    },
}
