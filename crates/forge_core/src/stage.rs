/// Stage the backend reports first for every task.
pub const INITIAL_STAGE: &str = "initialization";
/// Stage forced by a `final` update.
pub const COMPLETED_STAGE: &str = "completed";

/// Display labels for the backend pipeline stages, in pipeline order.
pub const STAGE_LABELS: &[(&str, &str)] = &[
    ("initialization", "Initializing"),
    ("ideation", "Expanding Idea"),
    ("comparative_insight", "Analyzing Competitors"),
    ("pitch_writing", "Writing Pitch"),
    ("prompt_forge", "Crafting Prompts"),
    ("media_generation", "Generating Media"),
    ("qa_validation", "Quality Check"),
    ("publishing", "Publishing"),
    ("completed", "Completed!"),
];

/// Label for a stage key; unknown keys are shown verbatim.
pub fn stage_label(stage: &str) -> &str {
    STAGE_LABELS
        .iter()
        .find(|(key, _)| *key == stage)
        .map(|(_, label)| *label)
        .unwrap_or(stage)
}
