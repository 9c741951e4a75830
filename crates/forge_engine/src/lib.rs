//! Luna engine: backend HTTP client, live progress channel and effect execution.
mod channel;
mod client;
mod decode;
mod engine;
mod error;
mod types;

pub use channel::{derive_ws_url, ChannelSettings, FrameSource, ProgressChannel, WsProgressChannel};
pub use client::{Backend, BackendSettings, ReqwestBackend};
pub use decode::{decode_frame, decode_submit_response, extract_error_message, DecodeError};
pub use engine::{Clock, EngineHandle, EngineSettings};
pub use error::{ChannelError, ClientError};
pub use types::{
    Asset, EngineEvent, FrameKind, HealthReport, Manifest, ProgressFrame, ResultsResponse, RunId,
    SubmitOutcome, SubmitRequest, TaskStatus, TaskStatusKind,
};
