use forge_core::{
    AssetKind, AssetView, Effect, Msg, ProgressUpdate, ResultManifest, UpdateKind,
};
use forge_engine::{EngineEvent, EngineHandle, FrameKind, Manifest, SubmitOutcome};
use forge_logging::{forge_info, forge_warn};

/// Executes core effects on the engine and turns engine events back into messages.
pub(crate) struct EffectRunner {
    engine: EngineHandle,
}

impl EffectRunner {
    pub(crate) fn new(engine: EngineHandle) -> Self {
        Self { engine }
    }

    pub(crate) fn run(&self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::SubmitIdea { run_id, request } => {
                    forge_info!(
                        "SubmitIdea run_id={} idea_len={} industry={}",
                        run_id,
                        request.idea.len(),
                        request.industry
                    );
                    self.engine.submit(run_id, request.idea, request.industry);
                }
                Effect::OpenStream { run_id, task_id } => {
                    self.engine.open_stream(run_id, task_id);
                }
                Effect::CloseStream { run_id } => self.engine.close_stream(run_id),
                Effect::ScheduleCompletion { run_id } => self.engine.schedule_completion(run_id),
                Effect::CancelCompletion { run_id } => self.engine.cancel_completion(run_id),
                Effect::FetchResults { run_id, task_id } => {
                    self.engine.fetch_results(run_id, task_id);
                }
                Effect::Diagnostic { message } => forge_warn!("{}", message),
            }
        }
    }

    pub(crate) fn engine(&self) -> &EngineHandle {
        &self.engine
    }
}

pub(crate) fn event_to_msg(event: EngineEvent) -> Msg {
    match event {
        EngineEvent::Submitted { run_id, result } => match result {
            Ok(SubmitOutcome::Accepted { task_id }) => Msg::SubmitAccepted { run_id, task_id },
            Ok(SubmitOutcome::Completed { task_id, manifest }) => Msg::SubmitCompleted {
                run_id,
                task_id,
                manifest: manifest.map(map_manifest),
            },
            Err(err) => {
                forge_warn!("Submission failed run_id={}: {}", run_id, err);
                Msg::SubmitFailed {
                    run_id,
                    message: err.backend_message().map(ToOwned::to_owned),
                }
            }
        },
        EngineEvent::Frame {
            run_id,
            frame,
            received_at,
        } => Msg::StreamUpdate {
            run_id,
            update: ProgressUpdate::new(
                map_kind(frame.kind),
                frame.stage,
                frame.progress,
                frame.message,
            ),
            received_at,
        },
        EngineEvent::MalformedFrame { run_id, reason } => Msg::StreamMalformed { run_id, reason },
        EngineEvent::StreamFailed { run_id, error } => Msg::StreamFailed {
            run_id,
            reason: error.to_string(),
        },
        EngineEvent::CompletionDue { run_id } => Msg::CompletionDue { run_id },
        EngineEvent::ResultsFetched { run_id, result } => match result {
            Ok(manifest) => Msg::ResultsLoaded {
                run_id,
                manifest: manifest.map(map_manifest),
            },
            Err(err) => Msg::ResultsFailed {
                run_id,
                reason: err.to_string(),
            },
        },
    }
}

fn map_kind(kind: FrameKind) -> UpdateKind {
    match kind {
        FrameKind::Progress => UpdateKind::Progress,
        FrameKind::Status => UpdateKind::Status,
        FrameKind::Final => UpdateKind::Final,
        FrameKind::Error => UpdateKind::Error,
    }
}

/// Converts a wire manifest into the core's render-only form.
pub fn map_manifest(manifest: Manifest) -> ResultManifest {
    let assets: Vec<AssetView> = manifest
        .assets
        .into_iter()
        .map(|asset| AssetView {
            asset_id: asset.asset_id,
            kind: AssetKind::from_wire(&asset.asset_type),
            url: asset.url,
            quality_score: asset.quality_score,
        })
        .collect();
    ResultManifest {
        manifest_id: manifest.manifest_id,
        total_assets: manifest.total_assets.unwrap_or(assets.len()),
        assets,
        created_at: manifest.created_at,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use forge_engine::{Asset, ClientError, ProgressFrame};

    #[test]
    fn failed_submission_keeps_only_backend_text() {
        let msg = event_to_msg(EngineEvent::Submitted {
            run_id: 1,
            result: Err(ClientError::HttpStatus {
                status: 422,
                message: Some("idea too short".to_string()),
            }),
        });
        assert_eq!(
            msg,
            Msg::SubmitFailed {
                run_id: 1,
                message: Some("idea too short".to_string()),
            }
        );

        let msg = event_to_msg(EngineEvent::Submitted {
            run_id: 1,
            result: Err(ClientError::Timeout),
        });
        assert_eq!(
            msg,
            Msg::SubmitFailed {
                run_id: 1,
                message: None,
            }
        );
    }

    #[test]
    fn frames_and_manifests_are_mapped() {
        let msg = event_to_msg(EngineEvent::Frame {
            run_id: 2,
            frame: ProgressFrame {
                kind: FrameKind::Final,
                stage: "completed".to_string(),
                progress: 100.0,
                message: "Done".to_string(),
            },
            received_at: "t".to_string(),
        });
        assert!(matches!(
            msg,
            Msg::StreamUpdate { run_id: 2, ref update, .. } if update.kind == UpdateKind::Final
        ));

        let manifest = map_manifest(Manifest {
            manifest_id: "m".to_string(),
            assets: vec![Asset {
                asset_id: "v".to_string(),
                asset_type: "video".to_string(),
                url: "https://x/v.mp4".to_string(),
                quality_score: Some(0.8),
            }],
            total_assets: None,
            created_at: None,
        });
        assert_eq!(manifest.total_assets, 1);
        assert_eq!(manifest.assets[0].kind, AssetKind::Video);
    }
}
