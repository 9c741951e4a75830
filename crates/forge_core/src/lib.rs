//! Luna core: pure generation-session state machine and view-model helpers.
mod effect;
mod input;
mod manifest;
mod msg;
mod stage;
mod state;
mod update;
mod view_model;

pub use effect::Effect;
pub use input::{parse_idea, IdeaRequest, DEFAULT_INDUSTRY, INDUSTRY_DELIMITER};
pub use manifest::{AssetKind, AssetView, ResultManifest};
pub use msg::Msg;
pub use stage::{stage_label, COMPLETED_STAGE, INITIAL_STAGE, STAGE_LABELS};
pub use state::{
    clamp_percent, ErrorKind, LogEntry, ProgressUpdate, ResultsState, RunId, SessionError,
    SessionState, TaskId, UpdateKind, View, GENERIC_ERROR_MESSAGE, STREAM_ERROR_MESSAGE,
    SUBMISSION_ERROR_MESSAGE, VALIDATION_MESSAGE,
};
pub use update::update;
pub use view_model::{ErrorView, ResultsView, SessionViewModel};
