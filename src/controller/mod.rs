//! Scene controller state
//!
//! Engine-independent pieces of the controller: the drifting camera and the
//! viewport. The Bevy systems in [`crate::bevy::systems`] drive them once
//! per frame.

pub mod drift;
pub mod viewport;

pub use drift::{CameraDrift, CameraState, DriftSettings, DriftStep};
pub use viewport::Viewport;
