use std::io;
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use forge_logging::{forge_debug, forge_info, forge_warn};
use tokio::runtime::Runtime;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::channel::{FrameSource, ProgressChannel};
use crate::client::Backend;
use crate::decode::decode_frame;
use crate::{
    ChannelError, EngineEvent, FrameKind, ProgressFrame, RunId, SubmitRequest, TaskStatusKind,
};

/// Produces the arrival timestamp stamped on each frame.
pub type Clock = Arc<dyn Fn() -> String + Send + Sync>;

#[derive(Clone)]
pub struct EngineSettings {
    /// Pause between a `final` frame and the move to results.
    pub completion_delay: Duration,
    /// Silence on the live channel tolerated before the task status is checked.
    pub stall_timeout: Option<Duration>,
    pub clock: Clock,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            completion_delay: Duration::from_millis(1500),
            stall_timeout: Some(Duration::from_secs(600)),
            clock: Arc::new(|| chrono::Local::now().format("%H:%M:%S").to_string()),
        }
    }
}

enum EngineCommand {
    Submit { run_id: RunId, request: SubmitRequest },
    OpenStream { run_id: RunId, task_id: String },
    CloseStream { run_id: RunId },
    ScheduleCompletion { run_id: RunId },
    CancelCompletion { run_id: RunId },
    FetchResults { run_id: RunId, task_id: String },
    Shutdown,
}

/// Owns the IO worker thread. Dropping the handle closes any open stream and
/// joins the worker.
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    event_rx: mpsc::Receiver<EngineEvent>,
    worker: Option<thread::JoinHandle<()>>,
}

impl EngineHandle {
    pub fn new(
        settings: EngineSettings,
        backend: Arc<dyn Backend>,
        channel: Arc<dyn ProgressChannel>,
    ) -> io::Result<Self> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .enable_all()
            .build()?;
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();

        let worker = thread::Builder::new()
            .name("luna-engine".to_string())
            .spawn(move || {
                let mut worker = Worker {
                    runtime,
                    settings,
                    backend,
                    channel,
                    event_tx,
                    stream: None,
                    completion: None,
                };
                while let Ok(command) = cmd_rx.recv() {
                    if matches!(command, EngineCommand::Shutdown) {
                        break;
                    }
                    worker.handle(command);
                }
                worker.shutdown();
            })?;

        Ok(Self {
            cmd_tx,
            event_rx,
            worker: Some(worker),
        })
    }

    pub fn submit(&self, run_id: RunId, idea: impl Into<String>, industry: impl Into<String>) {
        self.send(EngineCommand::Submit {
            run_id,
            request: SubmitRequest {
                idea: idea.into(),
                industry: industry.into(),
            },
        });
    }

    pub fn open_stream(&self, run_id: RunId, task_id: impl Into<String>) {
        self.send(EngineCommand::OpenStream {
            run_id,
            task_id: task_id.into(),
        });
    }

    pub fn close_stream(&self, run_id: RunId) {
        self.send(EngineCommand::CloseStream { run_id });
    }

    pub fn schedule_completion(&self, run_id: RunId) {
        self.send(EngineCommand::ScheduleCompletion { run_id });
    }

    pub fn cancel_completion(&self, run_id: RunId) {
        self.send(EngineCommand::CancelCompletion { run_id });
    }

    pub fn fetch_results(&self, run_id: RunId, task_id: impl Into<String>) {
        self.send(EngineCommand::FetchResults {
            run_id,
            task_id: task_id.into(),
        });
    }

    pub fn try_recv(&self) -> Option<EngineEvent> {
        self.event_rx.try_recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<EngineEvent> {
        self.event_rx.recv_timeout(timeout).ok()
    }

    fn send(&self, command: EngineCommand) {
        if self.cmd_tx.send(command).is_err() {
            forge_warn!("Engine worker is gone; command dropped");
        }
    }
}

impl Drop for EngineHandle {
    fn drop(&mut self) {
        let _ = self.cmd_tx.send(EngineCommand::Shutdown);
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

struct ActiveStream {
    run_id: RunId,
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

struct PendingCompletion {
    run_id: RunId,
    cancel: CancellationToken,
}

struct Worker {
    runtime: Runtime,
    settings: EngineSettings,
    backend: Arc<dyn Backend>,
    channel: Arc<dyn ProgressChannel>,
    event_tx: mpsc::Sender<EngineEvent>,
    stream: Option<ActiveStream>,
    completion: Option<PendingCompletion>,
}

impl Worker {
    fn handle(&mut self, command: EngineCommand) {
        match command {
            EngineCommand::Submit { run_id, request } => {
                forge_info!("Submit run_id={}", run_id);
                let backend = self.backend.clone();
                let event_tx = self.event_tx.clone();
                self.runtime.spawn(async move {
                    let result = backend.submit(&request).await;
                    let _ = event_tx.send(EngineEvent::Submitted { run_id, result });
                });
            }
            EngineCommand::OpenStream { run_id, task_id } => {
                if let Some(previous) = self.stream.take() {
                    forge_warn!(
                        "Stream for run_id={} still open; closing before opening run_id={}",
                        previous.run_id,
                        run_id
                    );
                    previous.cancel.cancel();
                }
                forge_info!("OpenStream run_id={} task_id={}", run_id, task_id);
                let cancel = CancellationToken::new();
                let pump = StreamPump {
                    run_id,
                    task_id,
                    channel: self.channel.clone(),
                    backend: self.backend.clone(),
                    event_tx: self.event_tx.clone(),
                    stall_timeout: self.settings.stall_timeout,
                    clock: self.settings.clock.clone(),
                };
                let task = self.runtime.spawn(pump.run(cancel.clone()));
                self.stream = Some(ActiveStream {
                    run_id,
                    cancel,
                    task,
                });
            }
            EngineCommand::CloseStream { run_id } => match self.stream.take() {
                Some(active) if active.run_id == run_id => {
                    forge_info!("CloseStream run_id={}", run_id);
                    active.cancel.cancel();
                }
                other => {
                    forge_debug!("CloseStream run_id={} with no matching stream", run_id);
                    self.stream = other;
                }
            },
            EngineCommand::ScheduleCompletion { run_id } => {
                if let Some(previous) = self.completion.take() {
                    previous.cancel.cancel();
                }
                let cancel = CancellationToken::new();
                let delay = self.settings.completion_delay;
                let event_tx = self.event_tx.clone();
                let token = cancel.clone();
                self.runtime.spawn(async move {
                    tokio::select! {
                        _ = token.cancelled() => {}
                        _ = tokio::time::sleep(delay) => {
                            let _ = event_tx.send(EngineEvent::CompletionDue { run_id });
                        }
                    }
                });
                self.completion = Some(PendingCompletion { run_id, cancel });
            }
            EngineCommand::CancelCompletion { run_id } => match self.completion.take() {
                Some(pending) if pending.run_id == run_id => {
                    forge_debug!("CancelCompletion run_id={}", run_id);
                    pending.cancel.cancel();
                }
                other => self.completion = other,
            },
            EngineCommand::FetchResults { run_id, task_id } => {
                forge_info!("FetchResults run_id={} task_id={}", run_id, task_id);
                let backend = self.backend.clone();
                let event_tx = self.event_tx.clone();
                self.runtime.spawn(async move {
                    let result = backend.results(&task_id).await.map(|response| {
                        if response.manifest.is_none() {
                            if let Some(error) = response.error.as_deref() {
                                forge_warn!("Results for {} carry no manifest: {}", task_id, error);
                            }
                        }
                        response.manifest
                    });
                    let _ = event_tx.send(EngineEvent::ResultsFetched { run_id, result });
                });
            }
            EngineCommand::Shutdown => {}
        }
    }

    /// Releases the live stream and waits for its close handshake.
    fn shutdown(mut self) {
        if let Some(pending) = self.completion.take() {
            pending.cancel.cancel();
        }
        if let Some(active) = self.stream.take() {
            forge_info!("Shutting down open stream run_id={}", active.run_id);
            active.cancel.cancel();
            let _ = self.runtime.block_on(active.task);
        }
    }
}

struct StreamPump {
    run_id: RunId,
    task_id: String,
    channel: Arc<dyn ProgressChannel>,
    backend: Arc<dyn Backend>,
    event_tx: mpsc::Sender<EngineEvent>,
    stall_timeout: Option<Duration>,
    clock: Clock,
}

enum Next {
    Text(String),
    Failed(ChannelError),
    Stalled(Duration),
}

impl StreamPump {
    async fn run(self, cancel: CancellationToken) {
        let opened = tokio::select! {
            _ = cancel.cancelled() => return,
            opened = self.channel.open(&self.task_id) => opened,
        };
        let mut source = match opened {
            Ok(source) => source,
            Err(error) => {
                self.emit(EngineEvent::StreamFailed {
                    run_id: self.run_id,
                    error,
                });
                return;
            }
        };

        loop {
            let next = tokio::select! {
                _ = cancel.cancelled() => break,
                next = next_with_watchdog(source.as_mut(), self.stall_timeout) => next,
            };
            match next {
                Next::Text(text) => match decode_frame(&text) {
                    Ok(frame) => {
                        let terminal = frame.kind.is_terminal();
                        self.emit_frame(frame);
                        if terminal {
                            break;
                        }
                    }
                    Err(err) => {
                        forge_warn!("Malformed frame run_id={}: {}", self.run_id, err);
                        self.emit(EngineEvent::MalformedFrame {
                            run_id: self.run_id,
                            reason: err.to_string(),
                        });
                    }
                },
                Next::Failed(error) => {
                    forge_warn!("Stream failed run_id={}: {}", self.run_id, error);
                    self.emit(EngineEvent::StreamFailed {
                        run_id: self.run_id,
                        error,
                    });
                    break;
                }
                Next::Stalled(after) => {
                    self.resolve_stall(after).await;
                    break;
                }
            }
        }

        source.close().await;
        forge_debug!("Stream closed run_id={}", self.run_id);
    }

    /// Falls back to the status endpoint once the channel has gone quiet.
    async fn resolve_stall(&self, after: Duration) {
        forge_warn!(
            "No progress for {:?} on task {}; checking status",
            after,
            self.task_id
        );
        match self.backend.task_status(&self.task_id).await {
            Ok(status) if status.status == TaskStatusKind::Completed => {
                self.emit_frame(ProgressFrame {
                    kind: FrameKind::Final,
                    stage: "completed".to_string(),
                    progress: 100.0,
                    message: String::new(),
                });
            }
            Ok(status) if status.status == TaskStatusKind::Failed => {
                let message = self.failure_reason().await;
                self.emit_frame(ProgressFrame {
                    kind: FrameKind::Error,
                    stage: status.current_stage,
                    progress: status.progress,
                    message,
                });
            }
            Ok(_) | Err(_) => {
                self.emit(EngineEvent::StreamFailed {
                    run_id: self.run_id,
                    error: ChannelError::Stalled(after),
                });
            }
        }
    }

    /// The status record carries no error text; only the results record does.
    async fn failure_reason(&self) -> String {
        match self.backend.results(&self.task_id).await {
            Ok(response) => response.error.unwrap_or_default(),
            Err(err) => {
                forge_warn!("No failure reason for task {}: {}", self.task_id, err);
                String::new()
            }
        }
    }

    fn emit_frame(&self, frame: ProgressFrame) {
        self.emit(EngineEvent::Frame {
            run_id: self.run_id,
            frame,
            received_at: (self.clock)(),
        });
    }

    fn emit(&self, event: EngineEvent) {
        let _ = self.event_tx.send(event);
    }
}

async fn next_with_watchdog(source: &mut dyn FrameSource, stall_timeout: Option<Duration>) -> Next {
    let next = match stall_timeout {
        Some(limit) if !limit.is_zero() => {
            match tokio::time::timeout(limit, source.next_text()).await {
                Ok(next) => next,
                Err(_) => return Next::Stalled(limit),
            }
        }
        _ => source.next_text().await,
    };
    match next {
        Some(Ok(text)) => Next::Text(text),
        Some(Err(error)) => Next::Failed(error),
        None => Next::Failed(ChannelError::ClosedEarly),
    }
}
