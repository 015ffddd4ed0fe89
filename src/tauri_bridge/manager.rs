//! Scene lifetime on the Tauri side
//!
//! The frontend creates a scene when its canvas mounts and destroys it when
//! the page goes away. Channels to the frontend outlive individual scenes,
//! so a recreated scene publishes into the same frame buffer.

use crate::bevy::SceneHandle;
use crate::config::SceneConfig;
use crate::error::Result;
use crate::geometry::FontLibrary;

use super::shared_state::{PerformanceStats, SceneChannels};

pub struct SceneManager {
    config: SceneConfig,
    fonts: FontLibrary,
    channels: SceneChannels,
    active: Option<SceneHandle>,
}

impl SceneManager {
    pub fn new(config: SceneConfig, channels: SceneChannels) -> Self {
        Self {
            config,
            fonts: FontLibrary::new(),
            channels,
            active: None,
        }
    }

    pub fn channels(&self) -> &SceneChannels {
        &self.channels
    }

    /// Whether a scene is rendering and has not been destroyed
    pub fn is_active(&self) -> bool {
        self.active.as_ref().is_some_and(|s| !s.is_destroyed())
    }

    /// Start a scene for a canvas of the given size
    ///
    /// Creating while a live scene exists only updates the canvas size.
    pub fn create(&mut self, width: u32, height: u32) -> Result<()> {
        self.channels.canvas_size.set(width, height);
        if self.is_active() {
            log::debug!("scene already running; canvas set to {width}x{height}");
            return Ok(());
        }

        self.retire_previous();

        let handle = SceneHandle::start(self.config.clone(), &mut self.fonts, self.channels.clone())?;
        log::info!("scene created at {width}x{height}");
        self.active = Some(handle);
        Ok(())
    }

    /// Wait out a destroyed scene's render thread, then clear what it left
    /// in the shared channels
    fn retire_previous(&mut self) {
        if let Some(previous) = self.active.take() {
            if !previous.is_finished() {
                log::debug!("waiting for previous render thread to finish its last frame");
            }
            previous.join();
        }

        // Stale output of an earlier scene must not reach the new canvas
        if let Ok(mut frame) = self.channels.frame_buffer.0.lock() {
            *frame = None;
        }
        if let Ok(mut stats) = self.channels.perf_stats.0.lock() {
            *stats = PerformanceStats::default();
        }
        if let Ok(mut input) = self.channels.mouse_input.0.lock() {
            *input = Default::default();
        }
    }

    /// Destroy the live scene, if any; repeated calls are no-ops
    pub fn destroy(&mut self) {
        if let Some(scene) = &self.active {
            scene.destroy();
        }
    }

    /// Report a new canvas size; ignored once the scene is destroyed
    pub fn resize(&self, width: u32, height: u32) -> bool {
        if !self.is_active() {
            return false;
        }
        self.channels.canvas_size.set(width, height);
        true
    }

    /// Destroy the live scene and wait for its render thread
    pub fn shutdown(&mut self) {
        if let Some(scene) = self.active.take() {
            scene.join();
        }
    }
}
