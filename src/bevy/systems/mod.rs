//! Bevy systems
//!
//! Scene construction, camera drift and controls, resize handling,
//! teardown and frame readback.

pub mod camera;
pub mod frame_extraction;
pub mod lifecycle;
pub mod scene;
pub mod viewport;

pub use camera::{apply_camera_controls, dispose_camera_controls, drift_camera};
pub use frame_extraction::extract_and_process_frame;
pub use lifecycle::stop_when_destroyed;
pub use scene::setup_scene;
pub use viewport::{apply_canvas_resize, resize_render_target};
