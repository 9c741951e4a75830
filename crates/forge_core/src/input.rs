/// Separates the idea from its industry in free text, e.g. `"AI tool in healthcare"`.
pub const INDUSTRY_DELIMITER: &str = " in ";
/// Industry sent when the text names none.
pub const DEFAULT_INDUSTRY: &str = "Technology";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdeaRequest {
    pub idea: String,
    pub industry: String,
}

impl IdeaRequest {
    pub fn new(idea: impl Into<String>, industry: impl Into<String>) -> Self {
        Self {
            idea: idea.into(),
            industry: industry.into(),
        }
    }
}

/// Splits free text into idea and industry at the last `" in "` (ASCII case-insensitive).
///
/// Returns `None` for blank input. Text without a usable delimiter becomes the
/// whole idea with [`DEFAULT_INDUSTRY`].
pub fn parse_idea(raw: &str) -> Option<IdeaRequest> {
    let text = raw.trim();
    if text.is_empty() {
        return None;
    }

    // ASCII lowering keeps byte offsets aligned with `text`.
    let lowered = text.to_ascii_lowercase();
    if let Some(pos) = lowered.rfind(INDUSTRY_DELIMITER) {
        let idea = text[..pos].trim();
        let industry = text[pos + INDUSTRY_DELIMITER.len()..].trim();
        if !idea.is_empty() && !industry.is_empty() {
            return Some(IdeaRequest::new(idea, industry));
        }
    }

    Some(IdeaRequest::new(text, DEFAULT_INDUSTRY))
}
