use crate::{ErrorKind, LogEntry, ResultManifest, View};

#[derive(Debug, Clone, PartialEq, Default)]
pub struct SessionViewModel {
    pub view: View,
    pub task_id: Option<String>,
    pub submitting: bool,
    pub progress: f64,
    /// Raw stage key as last reported.
    pub stage: String,
    pub stage_label: String,
    pub message: String,
    pub log: Vec<LogEntry>,
    pub error: Option<ErrorView>,
    pub results: ResultsView,
    pub dirty: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorView {
    pub kind: ErrorKind,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum ResultsView {
    #[default]
    Idle,
    Loading,
    Assets(ResultManifest),
    NoResults,
}
