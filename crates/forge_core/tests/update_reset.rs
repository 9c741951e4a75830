use forge_core::{
    update, AssetKind, AssetView, Effect, Msg, ProgressUpdate, ResultManifest, ResultsView,
    SessionState, UpdateKind, View,
};
use pretty_assertions::assert_eq;

fn init_logging() {
    forge_logging::initialize_for_tests();
}

fn in_progress() -> SessionState {
    let (state, _) = update(SessionState::new(), Msg::Submit("idea".to_string()));
    let (state, _) = update(
        state,
        Msg::SubmitAccepted {
            run_id: 1,
            task_id: "t1".to_string(),
        },
    );
    let (state, _) = update(
        state,
        Msg::StreamUpdate {
            run_id: 1,
            update: ProgressUpdate::new(UpdateKind::Progress, "ideation", 30.0, "Thinking"),
            received_at: "t".to_string(),
        },
    );
    state
}

fn in_results() -> SessionState {
    let (state, _) = update(in_progress(), Msg::CompleteNow { run_id: 1 });
    state
}

fn assert_pristine_input(state: &SessionState) {
    let view = state.view();
    assert_eq!(view.view, View::Input);
    assert_eq!(view.task_id, None);
    assert!(view.log.is_empty());
    assert_eq!(view.error, None);
    assert_eq!(view.results, ResultsView::Idle);
    assert!(!state.is_stream_open());
    assert!(!state.is_completion_pending());
}

#[test]
fn reset_mid_stream_closes_stream_once() {
    init_logging();
    let (state, effects) = update(in_progress(), Msg::Reset);

    assert_eq!(effects, vec![Effect::CloseStream { run_id: 1 }]);
    assert_pristine_input(&state);

    let (state, effects) = update(state, Msg::Reset);
    assert!(effects.is_empty());
    assert_pristine_input(&state);
}

#[test]
fn reset_during_completion_delay_cancels_timer() {
    init_logging();
    let (state, _) = update(
        in_progress(),
        Msg::StreamUpdate {
            run_id: 1,
            update: ProgressUpdate::new(UpdateKind::Final, "", 100.0, "Done"),
            received_at: "t".to_string(),
        },
    );
    let (state, effects) = update(state, Msg::Reset);
    assert_eq!(effects, vec![Effect::CancelCompletion { run_id: 1 }]);
    assert_pristine_input(&state);

    // A stale timer firing for the old run does nothing.
    let (state, effects) = update(state, Msg::CompletionDue { run_id: 1 });
    assert!(effects.is_empty());
    assert_pristine_input(&state);
}

#[test]
fn reset_from_results_and_error() {
    init_logging();
    let (state, effects) = update(in_results(), Msg::Reset);
    assert!(effects.is_empty());
    assert_pristine_input(&state);

    let (state, _) = update(SessionState::new(), Msg::Submit("  ".to_string()));
    assert_eq!(state.current_view(), View::Error);
    let (state, effects) = update(state, Msg::Reset);
    assert!(effects.is_empty());
    assert_pristine_input(&state);
}

#[test]
fn frames_from_old_run_are_ignored_after_new_submission() {
    init_logging();
    let (state, _) = update(in_progress(), Msg::Reset);
    let (state, _) = update(state, Msg::Submit("second idea".to_string()));
    let run_id = state.run_id();
    assert!(run_id > 1);
    let (state, _) = update(
        state,
        Msg::SubmitAccepted {
            run_id,
            task_id: "t2".to_string(),
        },
    );

    let (state, effects) = update(
        state,
        Msg::StreamUpdate {
            run_id: 1,
            update: ProgressUpdate::new(UpdateKind::Error, "", 0.0, "old failure"),
            received_at: "t".to_string(),
        },
    );
    assert!(effects.is_empty());
    assert_eq!(state.current_view(), View::Progress);
    assert_eq!(state.task_id(), Some("t2"));
}

#[test]
fn results_loaded_renders_assets() {
    init_logging();
    let manifest = ResultManifest {
        manifest_id: "m1".to_string(),
        assets: vec![AssetView {
            asset_id: "deck_1".to_string(),
            kind: AssetKind::Deck,
            url: "https://canva.example.com/deck".to_string(),
            quality_score: None,
        }],
        total_assets: 1,
        created_at: None,
    };
    let (state, effects) = update(
        in_results(),
        Msg::ResultsLoaded {
            run_id: 1,
            manifest: Some(manifest.clone()),
        },
    );
    assert!(effects.is_empty());
    assert_eq!(state.view().results, ResultsView::Assets(manifest));

    // A second answer for the same fetch is ignored.
    let (state, _) = update(
        state,
        Msg::ResultsLoaded {
            run_id: 1,
            manifest: None,
        },
    );
    assert!(matches!(state.view().results, ResultsView::Assets(_)));
}

#[test]
fn missing_manifest_or_fetch_failure_is_no_results_not_error() {
    init_logging();
    let (state, _) = update(
        in_results(),
        Msg::ResultsLoaded {
            run_id: 1,
            manifest: None,
        },
    );
    let view = state.view();
    assert_eq!(view.view, View::Results);
    assert_eq!(view.results, ResultsView::NoResults);
    assert_eq!(view.error, None);

    let (state, effects) = update(
        in_results(),
        Msg::ResultsFailed {
            run_id: 1,
            reason: "http status 500".to_string(),
        },
    );
    let view = state.view();
    assert_eq!(view.view, View::Results);
    assert_eq!(view.results, ResultsView::NoResults);
    assert_eq!(view.error, None);
    assert!(matches!(effects.as_slice(), [Effect::Diagnostic { .. }]));
}
