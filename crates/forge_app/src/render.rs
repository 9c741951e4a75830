//! Plain-text rendering of the session view for the terminal.

use forge_core::{ResultsView, SessionViewModel, View};

/// Turns successive view models into the lines not yet printed.
#[derive(Debug, Default)]
pub struct Renderer {
    last_view: Option<View>,
    last_results: Option<ResultsView>,
    printed_log: usize,
}

impl Renderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn render(&mut self, view: &SessionViewModel) -> Vec<String> {
        let mut lines = Vec::new();
        let entered = self.last_view != Some(view.view);
        if entered {
            if view.view == View::Input {
                self.printed_log = 0;
            }
            if let Some(header) = header(view) {
                lines.push(header);
            }
            self.last_view = Some(view.view);
            self.last_results = None;
        }

        match view.view {
            View::Input => {}
            View::Progress => {
                for entry in view.log.iter().skip(self.printed_log) {
                    lines.push(format!(
                        "[{}] {:>3.0}% {}",
                        entry.at, entry.percent, entry.text
                    ));
                }
                self.printed_log = view.log.len();
            }
            View::Results => {
                if self.last_results.as_ref() != Some(&view.results) {
                    lines.extend(results_lines(&view.results));
                    self.last_results = Some(view.results.clone());
                }
            }
            View::Error => {
                if let Some(error) = view.error.as_ref().filter(|_| entered) {
                    lines.push(format!("Error: {}", error.message));
                }
            }
        }
        lines
    }
}

fn header(view: &SessionViewModel) -> Option<String> {
    match view.view {
        View::Input => None,
        View::Progress => Some(format!(
            "Generating assets for task {}",
            view.task_id.as_deref().unwrap_or("?")
        )),
        View::Results => Some(format!(
            "Results for task {}",
            view.task_id.as_deref().unwrap_or("?")
        )),
        View::Error => Some("Generation failed".to_string()),
    }
}

fn results_lines(results: &ResultsView) -> Vec<String> {
    match results {
        ResultsView::Idle => Vec::new(),
        ResultsView::Loading => vec!["Loading results...".to_string()],
        ResultsView::NoResults => vec!["No results available. Start over to try again.".to_string()],
        ResultsView::Assets(manifest) => {
            let mut lines = vec![format!(
                "Manifest {} ({} assets)",
                manifest.manifest_id, manifest.total_assets
            )];
            for asset in &manifest.assets {
                let score = asset
                    .quality_score
                    .map(|score| format!(" quality={score:.2}"))
                    .unwrap_or_default();
                lines.push(format!(
                    "  - [{}] {} {}{}",
                    asset.kind.label(),
                    asset.asset_id,
                    asset.url,
                    score
                ));
            }
            lines
        }
    }
}
