//! Luna application layer: session controller, configuration and terminal rendering.
pub mod config;
pub mod controller;
mod effects;
pub mod output;
pub mod render;

pub use config::ForgeConfig;
pub use controller::SessionController;
pub use effects::map_manifest;
pub use render::Renderer;
