//! Bevy plugins
//!
//! This module contains custom Bevy plugins that extend the engine's
//! functionality for our specific use case.

pub mod image_copy;

pub use image_copy::{CapturedFrame, ImageCopier, ImageCopyPlugin};
