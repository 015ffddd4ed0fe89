//! Error types for scene construction

use thiserror::Error;

/// Errors raised while building or starting a scene
#[derive(Error, Debug)]
pub enum SceneError {
    /// Malformed typeface description or glyph outline
    #[error("Font error: {0}")]
    Font(String),

    /// Malformed SVG path data
    #[error("Path error: {0}")]
    Path(String),

    /// Outline could not be tessellated into triangles
    #[error("Tessellation error: {0}")]
    Tessellation(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Tauri error: {0}")]
    Tauri(#[from] tauri::Error),
}

/// Result type alias using [`SceneError`]
pub type Result<T> = std::result::Result<T, SceneError>;
