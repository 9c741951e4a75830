//! One generation session: owns the core state and the engine that serves it.
//!
//! All transitions go through [`forge_core::update`]; the controller only moves
//! messages in and effects out, so there is exactly one place where state changes.

use std::sync::Arc;
use std::time::{Duration, Instant};

use forge_core::{update, Msg, ResultsView, SessionState, SessionViewModel, View};
use forge_engine::{Backend, EngineHandle, EngineSettings, ProgressChannel};

use crate::effects::{event_to_msg, EffectRunner};

pub struct SessionController {
    state: SessionState,
    runner: EffectRunner,
}

impl SessionController {
    pub fn new(engine: EngineHandle) -> Self {
        Self {
            state: SessionState::new(),
            runner: EffectRunner::new(engine),
        }
    }

    pub fn with_backend(
        settings: EngineSettings,
        backend: Arc<dyn Backend>,
        channel: Arc<dyn ProgressChannel>,
    ) -> std::io::Result<Self> {
        Ok(Self::new(EngineHandle::new(settings, backend, channel)?))
    }

    pub fn view(&self) -> SessionViewModel {
        self.state.view()
    }

    pub fn current_view(&self) -> View {
        self.state.current_view()
    }

    pub fn task_id(&self) -> Option<&str> {
        self.state.task_id()
    }

    pub fn submit(&mut self, text: &str) {
        self.dispatch(Msg::Submit(text.to_string()));
    }

    /// Leaves the progress view for results right away.
    pub fn complete_now(&mut self) {
        let run_id = self.state.run_id();
        self.dispatch(Msg::CompleteNow { run_id });
    }

    pub fn reset(&mut self) {
        self.dispatch(Msg::Reset);
    }

    /// Applies every engine event already queued. Returns whether the view changed.
    pub fn pump(&mut self) -> bool {
        while let Some(event) = self.runner.engine().try_recv() {
            self.dispatch(event_to_msg(event));
        }
        self.state.consume_dirty()
    }

    /// Waits up to `timeout` for the next engine event, then drains the queue.
    pub fn wait(&mut self, timeout: Duration) -> bool {
        if let Some(event) = self.runner.engine().recv_timeout(timeout) {
            self.dispatch(event_to_msg(event));
        }
        self.pump()
    }

    /// Pumps events until `done` holds for the view or `timeout` passes.
    pub fn run_until<F>(&mut self, timeout: Duration, mut done: F) -> bool
    where
        F: FnMut(&SessionViewModel) -> bool,
    {
        let deadline = Instant::now() + timeout;
        loop {
            if done(&self.view()) {
                return true;
            }
            let now = Instant::now();
            if now >= deadline {
                return false;
            }
            self.wait((deadline - now).min(Duration::from_millis(100)));
        }
    }

    /// True once the session can make no further progress without a reset.
    pub fn is_settled(&self) -> bool {
        is_settled(&self.view())
    }

    fn dispatch(&mut self, msg: Msg) {
        let state = std::mem::take(&mut self.state);
        let (state, effects) = update(state, msg);
        self.state = state;
        self.runner.run(effects);
    }
}

pub fn is_settled(view: &SessionViewModel) -> bool {
    match view.view {
        View::Error => true,
        View::Results => view.results != ResultsView::Loading,
        View::Input | View::Progress => false,
    }
}
