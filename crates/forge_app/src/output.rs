//! JSON record of a finished session, saved with `--output`.

use std::fs;
use std::path::Path;

use anyhow::Context;
use forge_core::{IdeaRequest, ResultManifest};
use forge_logging::forge_info;
use serde_json::{json, Value};

pub fn session_record(
    task_id: Option<&str>,
    input: Option<&IdeaRequest>,
    manifest: Option<&ResultManifest>,
) -> Value {
    json!({
        "task_id": task_id,
        "input": input.map(|request| json!({
            "idea": request.idea,
            "industry": request.industry,
        })),
        "manifest": manifest.map(manifest_json),
    })
}

fn manifest_json(manifest: &ResultManifest) -> Value {
    let assets: Vec<Value> = manifest
        .assets
        .iter()
        .map(|asset| {
            json!({
                "asset_id": asset.asset_id,
                "asset_type": asset.kind.label(),
                "url": asset.url,
                "quality_score": asset.quality_score,
            })
        })
        .collect();
    json!({
        "manifest_id": manifest.manifest_id,
        "assets": assets,
        "total_assets": manifest.total_assets,
        "created_at": manifest.created_at,
    })
}

/// Writes `record` as pretty-printed JSON, replacing any existing file.
pub fn write_record(path: &Path, record: &Value) -> anyhow::Result<()> {
    let text = serde_json::to_string_pretty(record)?;
    fs::write(path, text).with_context(|| format!("failed to write {}", path.display()))?;
    forge_info!("Saved session record to {}", path.display());
    Ok(())
}
