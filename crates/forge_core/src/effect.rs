use crate::{IdeaRequest, RunId, TaskId};

/// Side effects requested by `update`; executed by the runtime, never by the core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    SubmitIdea { run_id: RunId, request: IdeaRequest },
    OpenStream { run_id: RunId, task_id: TaskId },
    CloseStream { run_id: RunId },
    ScheduleCompletion { run_id: RunId },
    CancelCompletion { run_id: RunId },
    FetchResults { run_id: RunId, task_id: TaskId },
    /// Local diagnostic output only; never user-visible.
    Diagnostic { message: String },
}
