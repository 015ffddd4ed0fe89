//! Bridge layer between Tauri and Bevy
//!
//! This module handles all communication between the Tauri frontend and
//! the Bevy rendering backend, including command handlers, custom protocols,
//! scene lifetime management and shared state.

pub mod commands;
pub mod manager;
pub mod protocol;
pub mod shared_state;

// Re-export commonly used types
pub use manager::SceneManager;
pub use shared_state::{
    Frame, SceneChannels, SharedCanvasSize, SharedFrameBuffer, SharedLifecycle, SharedMouseInput,
    SharedPerfStats,
};
