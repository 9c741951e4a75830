use crate::stage::{stage_label, COMPLETED_STAGE, INITIAL_STAGE};
use crate::view_model::{ErrorView, ResultsView, SessionViewModel};
use crate::ResultManifest;

pub type RunId = u64;
pub type TaskId = String;

pub const VALIDATION_MESSAGE: &str = "Please describe your idea before generating.";
pub const SUBMISSION_ERROR_MESSAGE: &str = "Failed to start generation. Please try again.";
pub const STREAM_ERROR_MESSAGE: &str =
    "Connection to the generation service was lost. Please check your connection and try again.";
pub const GENERIC_ERROR_MESSAGE: &str = "Something went wrong.";

const COMPLETION_MESSAGE: &str = "Generation complete";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum View {
    #[default]
    Input,
    Progress,
    Results,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateKind {
    Progress,
    Status,
    Final,
    Error,
}

/// One frame from the live channel.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressUpdate {
    pub kind: UpdateKind,
    pub stage: String,
    pub progress: f64,
    pub message: String,
}

impl ProgressUpdate {
    pub fn new(
        kind: UpdateKind,
        stage: impl Into<String>,
        progress: f64,
        message: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            stage: stage.into(),
            progress,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LogEntry {
    pub at: String,
    /// Progress at the moment the entry was written.
    pub percent: f64,
    pub text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Rejected locally before contacting the backend.
    Validation,
    Submission,
    Stream,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionError {
    pub kind: ErrorKind,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum ResultsState {
    #[default]
    Idle,
    Loading,
    Loaded(ResultManifest),
    /// Dead end: manifest absent or fetch failed. Only reset leaves it.
    Empty,
}

/// Progress percentages outside `[0, 100]` are clamped; NaN reads as 0.
pub fn clamp_percent(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 100.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
struct ProgressTracker {
    percent: f64,
    stage: String,
    message: String,
    log: Vec<LogEntry>,
}

impl Default for ProgressTracker {
    fn default() -> Self {
        Self {
            percent: 0.0,
            stage: INITIAL_STAGE.to_string(),
            message: String::new(),
            log: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct SessionState {
    run_id: RunId,
    view: View,
    submitting: bool,
    task_id: Option<TaskId>,
    progress: ProgressTracker,
    stream_open: bool,
    completion_pending: bool,
    results: ResultsState,
    error: Option<SessionError>,
    dirty: bool,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn view(&self) -> SessionViewModel {
        SessionViewModel {
            view: self.view,
            task_id: self.task_id.clone(),
            submitting: self.submitting,
            progress: self.progress.percent,
            stage: self.progress.stage.clone(),
            stage_label: stage_label(&self.progress.stage).to_string(),
            message: self.progress.message.clone(),
            log: self.progress.log.clone(),
            error: self.error.as_ref().map(|error| ErrorView {
                kind: error.kind,
                message: if error.message.trim().is_empty() {
                    GENERIC_ERROR_MESSAGE.to_string()
                } else {
                    error.message.clone()
                },
            }),
            results: match &self.results {
                ResultsState::Idle => ResultsView::Idle,
                ResultsState::Loading => ResultsView::Loading,
                ResultsState::Loaded(manifest) => ResultsView::Assets(manifest.clone()),
                ResultsState::Empty => ResultsView::NoResults,
            },
            dirty: self.dirty,
        }
    }

    pub fn run_id(&self) -> RunId {
        self.run_id
    }

    pub fn current_view(&self) -> View {
        self.view
    }

    pub fn task_id(&self) -> Option<&str> {
        self.task_id.as_deref()
    }

    pub fn is_stream_open(&self) -> bool {
        self.stream_open
    }

    pub fn is_completion_pending(&self) -> bool {
        self.completion_pending
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    /// Returns whether anything visible changed since the last call, clearing the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub(crate) fn is_current(&self, run_id: RunId) -> bool {
        self.run_id == run_id
    }

    /// Starts a new run; anything tagged with an older run id becomes stale.
    pub(crate) fn begin_submission(&mut self) -> RunId {
        self.run_id += 1;
        self.submitting = true;
        self.mark_dirty();
        self.run_id
    }

    pub(crate) fn enter_progress(&mut self, task_id: TaskId) {
        self.submitting = false;
        self.view = View::Progress;
        self.task_id = Some(task_id);
        self.progress = ProgressTracker::default();
        self.stream_open = true;
        self.completion_pending = false;
        self.mark_dirty();
    }

    /// Enters `Results`; returns `true` when a manifest fetch is needed.
    pub(crate) fn enter_results(&mut self, manifest: Option<ResultManifest>) -> bool {
        self.submitting = false;
        self.view = View::Results;
        self.completion_pending = false;
        self.mark_dirty();
        match manifest {
            Some(manifest) => {
                self.results = ResultsState::Loaded(manifest);
                false
            }
            None => {
                self.results = ResultsState::Loading;
                true
            }
        }
    }

    pub(crate) fn set_task_id(&mut self, task_id: TaskId) {
        self.task_id = Some(task_id);
    }

    pub(crate) fn enter_error(&mut self, kind: ErrorKind, message: impl Into<String>) {
        self.submitting = false;
        self.view = View::Error;
        self.completion_pending = false;
        self.error = Some(SessionError {
            kind,
            message: message.into(),
        });
        self.mark_dirty();
    }

    /// Marks the live channel closed. Returns `true` only on the first call per stream.
    pub(crate) fn close_stream(&mut self) -> bool {
        std::mem::replace(&mut self.stream_open, false)
    }

    pub(crate) fn take_completion(&mut self) -> bool {
        std::mem::replace(&mut self.completion_pending, false)
    }

    pub(crate) fn is_awaiting_results(&self) -> bool {
        self.view == View::Results && self.results == ResultsState::Loading
    }

    pub(crate) fn accepts_stream_updates(&self) -> bool {
        self.view == View::Progress && self.stream_open && !self.completion_pending
    }

    pub(crate) fn apply_progress(&mut self, update: &ProgressUpdate, received_at: String) {
        self.progress.percent = clamp_percent(update.progress);
        if !update.stage.trim().is_empty() {
            self.progress.stage = update.stage.clone();
        }
        self.progress.message = update.message.clone();
        let text = self.describe_current();
        self.push_log(received_at, text);
    }

    pub(crate) fn apply_final(&mut self, update: &ProgressUpdate, received_at: String) {
        self.progress.percent = 100.0;
        self.progress.stage = COMPLETED_STAGE.to_string();
        self.progress.message = if update.message.trim().is_empty() {
            COMPLETION_MESSAGE.to_string()
        } else {
            update.message.clone()
        };
        self.completion_pending = true;
        let text = self.describe_current();
        self.push_log(received_at, text);
    }

    pub(crate) fn finish_results(&mut self, manifest: Option<ResultManifest>) {
        self.results = match manifest {
            Some(manifest) => ResultsState::Loaded(manifest),
            None => ResultsState::Empty,
        };
        self.mark_dirty();
    }

    /// Back to `Input`; the run id advances so in-flight responses for the old run are dropped.
    pub(crate) fn reset(&mut self) {
        *self = Self {
            run_id: self.run_id + 1,
            dirty: true,
            ..Self::default()
        };
    }

    fn describe_current(&self) -> String {
        let label = stage_label(&self.progress.stage);
        if self.progress.message.trim().is_empty() {
            format!("{label} ({:.0}%)", self.progress.percent)
        } else {
            format!("{label}: {}", self.progress.message)
        }
    }

    fn push_log(&mut self, at: String, text: String) {
        self.progress.log.push(LogEntry {
            at,
            percent: self.progress.percent,
            text,
        });
        self.mark_dirty();
    }
}
