use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, bail, Context};
use clap::{Parser, Subcommand};
use forge_app::config::DEFAULT_CONFIG_FILE;
use forge_app::output::{session_record, write_record};
use forge_app::{map_manifest, ForgeConfig, Renderer, SessionController};
use forge_core::{parse_idea, ResultsView, View};
use forge_engine::{Backend, ReqwestBackend, WsProgressChannel};

#[derive(Parser, Debug)]
#[command(name = "luna", about = "Generate go-to-market assets from a one-line idea")]
struct Cli {
    /// Configuration file; missing is fine.
    #[arg(long, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,
    #[arg(long)]
    backend_url: Option<String>,
    #[arg(long)]
    ws_url: Option<String>,
    /// file, terminal, both or off.
    #[arg(long)]
    log: Option<String>,
    /// error, warn, info, debug or trace.
    #[arg(long)]
    log_level: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run one generation session, e.g. `luna generate AI scheduling tool in healthcare`.
    Generate {
        #[arg(required = true, num_args = 1..)]
        idea: Vec<String>,
        /// Save the finished session as JSON.
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Show the backend status of a task.
    Status { task_id: String },
    /// Show the result manifest of a task.
    Results {
        task_id: String,
        /// Save the manifest as JSON.
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Check that the backend is up.
    Health,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = ForgeConfig::load(&cli.config)?;
    config.apply_env();
    if let Some(url) = cli.backend_url {
        config.backend_url = url;
    }
    if let Some(url) = cli.ws_url {
        config.ws_url = Some(url);
    }
    if let Some(destination) = cli.log {
        config.log_destination = destination;
    }
    if let Some(level) = cli.log_level {
        config.log_level = level;
    }

    forge_logging::initialize(
        config.log_destination()?,
        config.log_level()?,
        &forge_logging::default_log_path(),
    );

    match cli.command {
        Command::Generate { idea, output } => {
            run_generate(&config, &idea.join(" "), output.as_deref())
        }
        Command::Status { task_id } => {
            let status = block_on_backend(&config, |backend| async move {
                backend.task_status(&task_id).await
            })?;
            println!(
                "{} {:?} {:.0}% {}",
                status.task_id, status.status, status.progress, status.current_stage
            );
            Ok(())
        }
        Command::Results { task_id, output } => {
            let response = block_on_backend(&config, |backend| {
                let task_id = task_id.clone();
                async move { backend.results(&task_id).await }
            })?;
            if let Some(path) = output.as_deref() {
                let manifest = response.manifest.clone().map(map_manifest);
                write_record(path, &session_record(Some(&task_id), None, manifest.as_ref()))?;
            }
            if let Some(error) = response.error.as_deref() {
                println!("Task {task_id} failed: {error}");
            }
            match response.manifest {
                Some(manifest) => {
                    println!("Manifest {}", manifest.manifest_id);
                    for asset in manifest.assets {
                        println!("  - [{}] {} {}", asset.asset_type, asset.asset_id, asset.url);
                    }
                }
                None => println!("No results available."),
            }
            Ok(())
        }
        Command::Health => {
            let health = block_on_backend(&config, |backend| async move { backend.health().await })?;
            println!(
                "{} (active tasks: {})",
                health.status,
                health
                    .active_tasks
                    .map(|n| n.to_string())
                    .unwrap_or_else(|| "?".to_string())
            );
            Ok(())
        }
    }
}

fn run_generate(config: &ForgeConfig, text: &str, output: Option<&Path>) -> anyhow::Result<()> {
    let backend = Arc::new(ReqwestBackend::new(&config.backend_settings())?);
    let channel = Arc::new(WsProgressChannel::new(config.channel_settings()?));
    let mut controller =
        SessionController::with_backend(config.engine_settings(), backend, channel)
            .context("failed to start engine")?;
    let mut renderer = Renderer::new();

    controller.submit(text);
    loop {
        let view = controller.view();
        for line in renderer.render(&view) {
            println!("{line}");
        }
        if controller.is_settled() {
            break;
        }
        controller.wait(Duration::from_millis(250));
    }

    if controller.current_view() == View::Error {
        let message = controller
            .view()
            .error
            .map(|error| error.message)
            .unwrap_or_default();
        bail!("generation failed: {message}");
    }
    if let Some(path) = output {
        let view = controller.view();
        let manifest = match &view.results {
            ResultsView::Assets(manifest) => Some(manifest),
            _ => None,
        };
        let input = parse_idea(text);
        write_record(
            path,
            &session_record(view.task_id.as_deref(), input.as_ref(), manifest),
        )?;
        println!("Saved to {}", path.display());
    }
    Ok(())
}

fn block_on_backend<T, F, Fut>(config: &ForgeConfig, call: F) -> anyhow::Result<T>
where
    F: FnOnce(Arc<dyn Backend>) -> Fut,
    Fut: std::future::Future<Output = Result<T, forge_engine::ClientError>>,
{
    let backend: Arc<dyn Backend> = Arc::new(ReqwestBackend::new(&config.backend_settings())?);
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime
        .block_on(call(backend))
        .map_err(|err| anyhow!("{err}"))
}
