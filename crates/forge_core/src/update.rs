use crate::{
    parse_idea, Effect, ErrorKind, Msg, ProgressUpdate, RunId, SessionState, UpdateKind, View,
    STREAM_ERROR_MESSAGE, SUBMISSION_ERROR_MESSAGE, VALIDATION_MESSAGE,
};

/// Pure update function: applies a message to state and returns any effects.
///
/// Messages tagged with a run id other than the current one are dropped, which
/// covers late responses and frames arriving after a reset.
pub fn update(mut state: SessionState, msg: Msg) -> (SessionState, Vec<Effect>) {
    let effects = match msg {
        Msg::Submit(text) => {
            if state.current_view() != View::Input || state.is_submitting() {
                return (state, Vec::new());
            }
            match parse_idea(&text) {
                Some(request) => {
                    let run_id = state.begin_submission();
                    vec![Effect::SubmitIdea { run_id, request }]
                }
                None => {
                    state.enter_error(ErrorKind::Validation, VALIDATION_MESSAGE);
                    Vec::new()
                }
            }
        }
        Msg::SubmitAccepted { run_id, task_id } => {
            if !state.is_current(run_id) || !state.is_submitting() {
                return (state, Vec::new());
            }
            state.enter_progress(task_id.clone());
            vec![Effect::OpenStream { run_id, task_id }]
        }
        Msg::SubmitCompleted {
            run_id,
            task_id,
            manifest,
        } => {
            if !state.is_current(run_id) || !state.is_submitting() {
                return (state, Vec::new());
            }
            state.set_task_id(task_id.clone());
            if state.enter_results(manifest) {
                vec![Effect::FetchResults { run_id, task_id }]
            } else {
                Vec::new()
            }
        }
        Msg::SubmitFailed { run_id, message } => {
            if !state.is_current(run_id) || !state.is_submitting() {
                return (state, Vec::new());
            }
            let message = message
                .filter(|text| !text.trim().is_empty())
                .unwrap_or_else(|| SUBMISSION_ERROR_MESSAGE.to_string());
            state.enter_error(ErrorKind::Submission, message);
            Vec::new()
        }
        Msg::StreamUpdate {
            run_id,
            update,
            received_at,
        } => {
            if !state.is_current(run_id) || !state.accepts_stream_updates() {
                return (state, Vec::new());
            }
            apply_stream_update(&mut state, run_id, update, received_at)
        }
        Msg::StreamMalformed { run_id, reason } => {
            if !state.is_current(run_id) {
                return (state, Vec::new());
            }
            vec![Effect::Diagnostic {
                message: format!("ignored malformed progress frame: {reason}"),
            }]
        }
        Msg::StreamFailed { run_id, reason } => {
            if !state.is_current(run_id) || !state.accepts_stream_updates() {
                return (state, Vec::new());
            }
            state.close_stream();
            state.enter_error(ErrorKind::Stream, STREAM_ERROR_MESSAGE);
            vec![
                Effect::CloseStream { run_id },
                Effect::Diagnostic {
                    message: format!("progress channel failed: {reason}"),
                },
            ]
        }
        Msg::CompletionDue { run_id } => {
            if !state.is_current(run_id)
                || state.current_view() != View::Progress
                || !state.take_completion()
            {
                return (state, Vec::new());
            }
            complete(&mut state, run_id, false)
        }
        Msg::CompleteNow { run_id } => {
            if !state.is_current(run_id) || state.current_view() != View::Progress {
                return (state, Vec::new());
            }
            let cancel_timer = state.take_completion();
            complete(&mut state, run_id, cancel_timer)
        }
        Msg::ResultsLoaded { run_id, manifest } => {
            if !state.is_current(run_id) || !state.is_awaiting_results() {
                return (state, Vec::new());
            }
            state.finish_results(manifest);
            Vec::new()
        }
        Msg::ResultsFailed { run_id, reason } => {
            if !state.is_current(run_id) || !state.is_awaiting_results() {
                return (state, Vec::new());
            }
            state.finish_results(None);
            vec![Effect::Diagnostic {
                message: format!("result fetch failed: {reason}"),
            }]
        }
        Msg::Reset => {
            let run_id = state.run_id();
            let mut effects = Vec::new();
            if state.close_stream() {
                effects.push(Effect::CloseStream { run_id });
            }
            if state.take_completion() {
                effects.push(Effect::CancelCompletion { run_id });
            }
            state.reset();
            effects
        }
    };

    (state, effects)
}

fn apply_stream_update(
    state: &mut SessionState,
    run_id: RunId,
    update: ProgressUpdate,
    received_at: String,
) -> Vec<Effect> {
    match update.kind {
        UpdateKind::Progress | UpdateKind::Status => {
            state.apply_progress(&update, received_at);
            Vec::new()
        }
        UpdateKind::Final => {
            state.apply_final(&update, received_at);
            state.close_stream();
            vec![
                Effect::CloseStream { run_id },
                Effect::ScheduleCompletion { run_id },
            ]
        }
        UpdateKind::Error => {
            state.close_stream();
            let message = if update.message.trim().is_empty() {
                STREAM_ERROR_MESSAGE.to_string()
            } else {
                update.message
            };
            state.enter_error(ErrorKind::Stream, message);
            vec![Effect::CloseStream { run_id }]
        }
    }
}

/// Leaves `Progress` for `Results`, releasing whatever the progress view still holds.
fn complete(state: &mut SessionState, run_id: RunId, cancel_timer: bool) -> Vec<Effect> {
    let mut effects = Vec::with_capacity(3);
    if state.close_stream() {
        effects.push(Effect::CloseStream { run_id });
    }
    if cancel_timer {
        effects.push(Effect::CancelCompletion { run_id });
    }
    if state.enter_results(None) {
        if let Some(task_id) = state.task_id() {
            effects.push(Effect::FetchResults {
                run_id,
                task_id: task_id.to_string(),
            });
        }
    }
    effects
}
