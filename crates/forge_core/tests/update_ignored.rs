use forge_core::{update, Msg, ProgressUpdate, SessionState, UpdateKind, View};
use pretty_assertions::assert_eq;

fn in_progress() -> SessionState {
    let (state, _) = update(SessionState::new(), Msg::Submit("idea".to_string()));
    let (state, _) = update(
        state,
        Msg::SubmitAccepted {
            run_id: 1,
            task_id: "t1".to_string(),
        },
    );
    state
}

fn progress(run_id: u64) -> Msg {
    Msg::StreamUpdate {
        run_id,
        update: ProgressUpdate::new(UpdateKind::Progress, "ideation", 10.0, "late"),
        received_at: "t".to_string(),
    }
}

fn assert_untouched(state: &SessionState, msg: Msg) {
    let (next, effects) = update(state.clone(), msg.clone());
    assert_eq!(&next, state, "{msg:?} changed state");
    assert!(effects.is_empty(), "{msg:?} produced {effects:?}");
}

#[test]
fn engine_messages_without_a_job_change_nothing() {
    forge_logging::initialize_for_tests();
    let idle = SessionState::new();
    for msg in [
        Msg::SubmitAccepted {
            run_id: 0,
            task_id: "t1".to_string(),
        },
        Msg::SubmitFailed {
            run_id: 0,
            message: None,
        },
        progress(0),
        Msg::StreamFailed {
            run_id: 0,
            reason: "gone".to_string(),
        },
        Msg::CompletionDue { run_id: 0 },
        Msg::CompleteNow { run_id: 0 },
        Msg::ResultsLoaded {
            run_id: 0,
            manifest: None,
        },
        Msg::ResultsFailed {
            run_id: 0,
            reason: "gone".to_string(),
        },
    ] {
        assert_untouched(&idle, msg);
    }
}

#[test]
fn messages_for_an_earlier_run_change_nothing() {
    forge_logging::initialize_for_tests();
    let state = in_progress();
    assert_eq!(state.run_id(), 1);
    for msg in [
        progress(0),
        Msg::StreamMalformed {
            run_id: 0,
            reason: "bad json".to_string(),
        },
        Msg::StreamFailed {
            run_id: 0,
            reason: "gone".to_string(),
        },
        Msg::CompleteNow { run_id: 0 },
        Msg::SubmitFailed {
            run_id: 0,
            message: Some("old".to_string()),
        },
    ] {
        assert_untouched(&state, msg);
    }
}

#[test]
fn submit_outside_input_view_is_ignored() {
    forge_logging::initialize_for_tests();
    let state = in_progress();
    assert_eq!(state.current_view(), View::Progress);
    assert_untouched(&state, Msg::Submit("another idea".to_string()));

    let (results, _) = update(state, Msg::CompleteNow { run_id: 1 });
    assert_untouched(&results, progress(1));
    assert_untouched(&results, Msg::Submit("another idea".to_string()));
}
