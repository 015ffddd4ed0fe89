//! Bevy application setup and execution
//!
//! This module handles the creation and configuration of the Bevy app,
//! including plugin registration and system scheduling, and owns the
//! background thread a scene instance renders on.

use bevy::{
    app::{App, ScheduleRunnerPlugin},
    prelude::*,
    window::ExitCondition,
};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::bevy::plugins::ImageCopyPlugin;
use crate::bevy::resources::*;
use crate::bevy::systems::*;
use crate::config::SceneConfig;
use crate::controller::{CameraDrift, Viewport};
use crate::error::Result;
use crate::geometry::{FontLibrary, SceneAssets};
use crate::tauri_bridge::shared_state::{SceneChannels, SharedLifecycle};

/// Create and configure the Bevy application for one scene instance
pub fn create_app(
    config: SceneConfig,
    assets: SceneAssets,
    channels: SceneChannels,
    lifecycle: SharedLifecycle,
) -> App {
    let mut app = App::new();

    // Use DefaultPlugins but configure for headless operation
    app.add_plugins(
        DefaultPlugins
            .set(WindowPlugin {
                primary_window: None,
                exit_condition: ExitCondition::DontExit,
                ..default()
            })
            .set(ImagePlugin::default_nearest()),
    );

    // Add schedule runner for controlled frame rate
    app.add_plugins(ScheduleRunnerPlugin::run_loop(Duration::from_secs_f64(
        1.0 / config.target_fps,
    )));

    // Add custom plugins
    app.add_plugins(ImageCopyPlugin);

    // Register systems
    app.add_systems(Startup, setup_scene);
    app.add_systems(
        PreUpdate,
        (
            (apply_canvas_resize, resize_render_target).chain(),
            dispose_camera_controls,
        ),
    );
    app.add_systems(Update, (apply_camera_controls, drift_camera).chain());
    app.add_systems(Last, (extract_and_process_frame, stop_when_destroyed));

    let size = channels
        .canvas_size
        .get()
        .map_or((config.width, config.height), |s| (s.width, s.height));

    // Insert resources
    app.insert_resource(Viewport::new(size.0, size.1));
    app.insert_resource(CameraDrift::from_config(&config.camera, 0.0));
    app.insert_resource(CameraControls::Active);
    app.insert_resource(LifecycleRes(lifecycle));
    app.insert_resource(FrameBufferRes(channels.frame_buffer));
    app.insert_resource(PerfStatsRes(channels.perf_stats));
    app.insert_resource(MouseInputRes(channels.mouse_input));
    app.insert_resource(CanvasSizeRes(channels.canvas_size));
    app.insert_resource(FrameCount::default());
    app.insert_resource(PreRollFrames(config.pre_roll_frames));
    app.insert_resource(FrameTimings::default());
    app.insert_resource(FrameRateLimiter::new(config.target_fps));
    app.insert_resource(PendingSceneAssets(assets));
    app.insert_resource(SceneSettings(config));

    log::info!("bevy app configured (headless, {}x{})", size.0, size.1);
    app
}

/// A running scene instance
///
/// The render loop lives on its own thread and stops after the frame in
/// flight once [`SceneHandle::destroy`] is called.
pub struct SceneHandle {
    lifecycle: SharedLifecycle,
    thread: Option<JoinHandle<()>>,
}

impl SceneHandle {
    /// Build the scene assets and start rendering in a background thread
    ///
    /// Asset parsing happens here, so malformed fonts or path data are
    /// reported to the caller and no thread is started.
    pub fn start(
        config: SceneConfig,
        fonts: &mut FontLibrary,
        channels: SceneChannels,
    ) -> Result<Self> {
        let assets = SceneAssets::build(&config, fonts)?;

        let lifecycle = SharedLifecycle::default();
        let thread_lifecycle = lifecycle.clone();
        let thread = thread::Builder::new()
            .name("bevy-scene".into())
            .spawn(move || {
                log::info!("render thread started");
                let mut app = create_app(config, assets, channels, thread_lifecycle);
                let exit = app.run();
                log::info!("render loop finished: {exit:?}");
            })?;

        Ok(Self {
            lifecycle,
            thread: Some(thread),
        })
    }

    #[cfg(test)]
    pub(crate) fn from_parts(lifecycle: SharedLifecycle, thread: JoinHandle<()>) -> Self {
        Self {
            lifecycle,
            thread: Some(thread),
        }
    }

    /// Flag the scene as destroyed; the render thread winds down on its own
    pub fn destroy(&self) {
        if !self.lifecycle.is_destroyed() {
            log::info!("destroying scene");
        }
        self.lifecycle.destroy();
    }

    pub fn is_destroyed(&self) -> bool {
        self.lifecycle.is_destroyed()
    }

    /// Whether the render thread has exited
    pub fn is_finished(&self) -> bool {
        self.thread.as_ref().is_none_or(JoinHandle::is_finished)
    }

    /// Destroy the scene and wait for the render thread to exit
    pub fn join(mut self) {
        self.destroy();
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                log::error!("render thread panicked");
            }
        }
    }
}

impl Drop for SceneHandle {
    fn drop(&mut self) {
        self.lifecycle.destroy();
    }
}
