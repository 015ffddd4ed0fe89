//! Configuration constants and settings for the logo scene
//!
//! Compile-time defaults live in the constant modules below. Everything a
//! caller may want to change per scene instance is gathered in
//! [`SceneConfig`], which is passed explicitly into scene construction
//! instead of being toggled through global state.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::error::{Result, SceneError};

/// Default width of the offscreen render target in pixels
pub const RENDER_WIDTH: u32 = 800;

/// Default height of the offscreen render target in pixels
pub const RENDER_HEIGHT: u32 = 600;

/// Target frames per second for the Bevy render loop
pub const TARGET_FPS: f64 = 60.0;

/// Number of pre-roll frames to skip before starting output
/// This allows the scene to fully load and stabilize
pub const PRE_ROLL_FRAMES: u32 = 30;

/// Environment variable naming an optional JSON scene config file
pub const SCENE_CONFIG_ENV: &str = "SCENE_CONFIG";

/// Camera drift and control settings
pub mod camera {
    /// Per-axis position ranges drawn on every drift reset
    pub const X_RANGE: (i32, i32) = (-200, 200);
    pub const Y_RANGE: (i32, i32) = (300, 500);
    pub const Z_RANGE: (i32, i32) = (-1000, 1000);

    /// Scene units travelled per millisecond at unit velocity
    pub const DRIFT_SPEED: f32 = 0.1;

    /// Milliseconds between automatic drift resets
    pub const RESET_INTERVAL_MS: f64 = 5000.0;

    /// Vertical field of view in degrees
    pub const FOV_DEGREES: f32 = 45.0;
    pub const NEAR: f32 = 1.0;
    pub const FAR: f32 = 10_000.0;

    /// Rotation speed multiplier for mouse drag
    pub const ROTATION_SPEED: f32 = 0.005;

    /// Zoom speed multiplier for scroll wheel
    pub const ZOOM_SPEED: f32 = 20.0;

    /// Minimum camera distance from the look-at target
    pub const MIN_DISTANCE: f32 = 50.0;

    /// Maximum camera distance from the look-at target
    pub const MAX_DISTANCE: f32 = 3000.0;

    /// Maximum pitch angle (radians) to prevent camera flipping
    pub const MAX_PITCH: f32 = 1.5;

    /// Minimum pitch angle (radians) to prevent camera flipping
    pub const MIN_PITCH: f32 = -1.5;
}

/// Performance monitoring settings
pub mod performance {
    /// Interval for logging performance stats (seconds)
    pub const STATS_PRINT_INTERVAL: f64 = 2.0;

    /// Number of frame timing samples to keep for averaging
    pub const FRAME_TIMING_SAMPLES: usize = 60;
}

/// Image compression settings
pub mod compression {
    /// JPEG quality level (0-100, higher = better quality but larger size)
    pub const JPEG_QUALITY: u8 = 85;
}

/// Geometry defaults for the text and logo meshes
pub mod geometry {
    /// Curve flattening tolerance in scene units
    pub const TOLERANCE: f32 = 0.25;

    pub const TEXT: &str = "HELLO";
    pub const TEXT_SIZE: f32 = 80.0;
    pub const TEXT_DEPTH: f32 = 20.0;

    pub const LOGO_DEPTH: f32 = 12.0;
    pub const LOGO_SCALE: f32 = 1.5;

    /// Logo outline: a rounded badge with a diamond cut-out, in SVG units
    pub const LOGO_PATH: &str = "M 0 20 Q 0 0 20 0 L 80 0 Q 100 0 100 20 L 100 80 \
        Q 100 100 80 100 L 20 100 Q 0 100 0 80 Z \
        M 50 25 L 25 50 L 50 75 L 75 50 Z";
}

/// Runtime settings for one scene instance
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// Initial canvas size used until the frontend reports its own
    pub width: u32,
    pub height: u32,
    pub target_fps: f64,
    pub pre_roll_frames: u32,

    /// Text rendered as the extruded text mesh
    pub text: String,
    /// Typeface JSON file; the bundled block font is used when unset
    pub font_path: Option<PathBuf>,
    pub text_size: f32,
    pub text_depth: f32,

    /// SVG path data for the logo mesh
    pub logo_path: String,
    pub logo_depth: f32,
    pub logo_scale: f32,

    pub tolerance: f32,

    /// Reuse parsed typefaces across scene instances
    pub cache_assets: bool,

    pub camera: CameraConfig,

    /// `env_logger` filter; `RUST_LOG` is consulted when unset
    pub log_filter: Option<String>,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            width: RENDER_WIDTH,
            height: RENDER_HEIGHT,
            target_fps: TARGET_FPS,
            pre_roll_frames: PRE_ROLL_FRAMES,
            text: geometry::TEXT.to_string(),
            font_path: None,
            text_size: geometry::TEXT_SIZE,
            text_depth: geometry::TEXT_DEPTH,
            logo_path: geometry::LOGO_PATH.to_string(),
            logo_depth: geometry::LOGO_DEPTH,
            logo_scale: geometry::LOGO_SCALE,
            tolerance: geometry::TOLERANCE,
            cache_assets: true,
            camera: CameraConfig::default(),
            log_filter: None,
        }
    }
}

/// Camera drift settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub x_range: (i32, i32),
    pub y_range: (i32, i32),
    pub z_range: (i32, i32),
    pub speed: f32,
    pub reset_interval_ms: f64,
    /// Fixed look-at target
    pub target: [f32; 3],
    /// Seed for the drift RNG; entropy-seeded when unset
    pub seed: Option<u64>,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            x_range: camera::X_RANGE,
            y_range: camera::Y_RANGE,
            z_range: camera::Z_RANGE,
            speed: camera::DRIFT_SPEED,
            reset_interval_ms: camera::RESET_INTERVAL_MS,
            target: [0.0, 0.0, 0.0],
            seed: None,
        }
    }
}

impl SceneConfig {
    /// Parse a JSON config; missing fields keep their defaults
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: SceneConfig =
            serde_json::from_str(json).map_err(|e| SceneError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Load from the file named by `SCENE_CONFIG`, or fall back to defaults
    pub fn load() -> Result<Self> {
        match std::env::var_os(SCENE_CONFIG_ENV) {
            Some(path) => Self::from_file(Path::new(&path)),
            None => Ok(Self::default()),
        }
    }

    fn validate(&self) -> Result<()> {
        let cam = &self.camera;
        for (axis, (lo, hi)) in [("x", cam.x_range), ("y", cam.y_range), ("z", cam.z_range)] {
            if lo > hi {
                return Err(SceneError::Config(format!(
                    "camera {axis}_range is empty: [{lo}, {hi}]"
                )));
            }
        }
        if self.target_fps <= 0.0 {
            return Err(SceneError::Config("target_fps must be positive".into()));
        }
        if self.tolerance <= 0.0 {
            return Err(SceneError::Config("tolerance must be positive".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_json_yields_defaults() {
        let config = SceneConfig::from_json_str("{}").unwrap();
        assert_eq!(config.width, RENDER_WIDTH);
        assert_eq!(config.height, RENDER_HEIGHT);
        assert_eq!(config.camera.x_range, (-200, 200));
        assert_eq!(config.camera.y_range, (300, 500));
        assert_eq!(config.camera.z_range, (-1000, 1000));
        assert_eq!(config.camera.reset_interval_ms, 5000.0);
        assert!(config.cache_assets);
    }

    #[test]
    fn partial_override_keeps_other_fields() {
        let config =
            SceneConfig::from_json_str(r#"{ "text": "HI", "camera": { "seed": 7 } }"#).unwrap();
        assert_eq!(config.text, "HI");
        assert_eq!(config.camera.seed, Some(7));
        assert_eq!(config.camera.speed, camera::DRIFT_SPEED);
        assert_eq!(config.text_size, geometry::TEXT_SIZE);
    }

    #[test]
    fn inverted_range_is_rejected() {
        let err = SceneConfig::from_json_str(r#"{ "camera": { "y_range": [5, 1] } }"#)
            .unwrap_err();
        assert!(matches!(err, SceneError::Config(_)));
    }

    #[test]
    fn malformed_json_is_a_config_error() {
        assert!(matches!(
            SceneConfig::from_json_str("{ nope").unwrap_err(),
            SceneError::Config(_)
        ));
    }
}
