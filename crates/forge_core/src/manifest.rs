//! Render-only copy of the backend's result manifest.

#[derive(Debug, Clone, PartialEq)]
pub struct ResultManifest {
    pub manifest_id: String,
    pub assets: Vec<AssetView>,
    pub total_assets: usize,
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AssetView {
    pub asset_id: String,
    pub kind: AssetKind,
    pub url: String,
    pub quality_score: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetKind {
    Image,
    Video,
    Deck,
    Other(String),
}

impl AssetKind {
    pub fn from_wire(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "image" => AssetKind::Image,
            "video" => AssetKind::Video,
            "deck" => AssetKind::Deck,
            _ => AssetKind::Other(raw.to_string()),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            AssetKind::Image => "image",
            AssetKind::Video => "video",
            AssetKind::Deck => "deck",
            AssetKind::Other(raw) => raw,
        }
    }
}
