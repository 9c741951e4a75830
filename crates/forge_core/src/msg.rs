use crate::{ProgressUpdate, ResultManifest, RunId, TaskId};

#[derive(Debug, Clone, PartialEq)]
pub enum Msg {
    /// User submitted free-text idea description.
    Submit(String),
    /// Backend accepted the job and will report progress on the live channel.
    SubmitAccepted { run_id: RunId, task_id: TaskId },
    /// Backend finished the job before answering the submission.
    SubmitCompleted {
        run_id: RunId,
        task_id: TaskId,
        manifest: Option<ResultManifest>,
    },
    /// Submission rejected or unreachable; `message` is the backend's text when it sent one.
    SubmitFailed {
        run_id: RunId,
        message: Option<String>,
    },
    /// One decoded frame from the live channel, stamped on arrival.
    StreamUpdate {
        run_id: RunId,
        update: ProgressUpdate,
        received_at: String,
    },
    /// Live channel delivered a frame that could not be decoded.
    StreamMalformed { run_id: RunId, reason: String },
    /// Live channel failed or closed before a terminal frame.
    StreamFailed { run_id: RunId, reason: String },
    /// Completion delay elapsed after a `final` update.
    CompletionDue { run_id: RunId },
    /// Move to results immediately, cancelling any pending completion delay.
    CompleteNow { run_id: RunId },
    /// Result fetch answered; `None` when the response carried no manifest.
    ResultsLoaded {
        run_id: RunId,
        manifest: Option<ResultManifest>,
    },
    /// Result fetch failed.
    ResultsFailed { run_id: RunId, reason: String },
    /// User asked to start over.
    Reset,
}
