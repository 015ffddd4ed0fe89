//! Bevy resource definitions
//!
//! This module contains all global resources used by Bevy systems.
//! Resources are singleton data that can be accessed by any system.

use bevy::prelude::*;
use std::time::Duration;

use crate::bevy::plugins::CapturedFrame;
use crate::config::SceneConfig;
use crate::geometry::SceneAssets;
use crate::tauri_bridge::shared_state::{
    SharedCanvasSize, SharedFrameBuffer, SharedLifecycle, SharedMouseInput, SharedPerfStats,
};

// =============================================================================
// Scene Construction
// =============================================================================

/// Settings of this scene instance
#[derive(Resource, Deref)]
pub struct SceneSettings(pub SceneConfig);

/// Extruded geometry waiting to be spawned; removed once the scene is built
#[derive(Resource)]
pub struct PendingSceneAssets(pub SceneAssets);

// =============================================================================
// Lifecycle
// =============================================================================

/// Teardown flag shared with the Tauri side
#[derive(Resource, Deref)]
pub struct LifecycleRes(pub SharedLifecycle);

// =============================================================================
// Camera Control
// =============================================================================

/// Whether pointer input may still steer the camera
#[derive(Resource, Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum CameraControls {
    #[default]
    Active,
    Disposed,
}

/// Resource to hold shared mouse input in Bevy
#[derive(Resource)]
pub struct MouseInputRes(pub SharedMouseInput);

/// Canvas size reported by the frontend
#[derive(Resource)]
pub struct CanvasSizeRes(pub SharedCanvasSize);

// =============================================================================
// Rendering
// =============================================================================

/// Handle to the offscreen render target texture
#[derive(Resource)]
pub struct RenderTargetHandle(pub Handle<Image>);

/// Shared frame buffer resource for Bevy
#[derive(Resource, Clone)]
pub struct FrameBufferRes(pub SharedFrameBuffer);

// =============================================================================
// Frame Management
// =============================================================================

/// Counter for total frames published
#[derive(Resource, Default)]
pub struct FrameCount(pub u32);

/// Number of pre-roll frames to skip before starting output
#[derive(Resource, Default)]
pub struct PreRollFrames(pub u32);

/// Frame rate limiter to control output FPS
#[derive(Resource)]
pub struct FrameRateLimiter {
    pub last_frame_time: std::time::Instant,
    pub min_frame_interval: Duration,
}

impl FrameRateLimiter {
    pub fn new(target_fps: f64) -> Self {
        Self {
            last_frame_time: std::time::Instant::now(),
            min_frame_interval: Duration::from_secs_f64(1.0 / target_fps),
        }
    }
}

// =============================================================================
// Performance Monitoring
// =============================================================================

/// Performance timing tracker for frame processing
#[derive(Resource, Default)]
pub struct FrameTimings {
    pub last_print_time: f64,
    pub frame_times: Vec<f64>,
}

/// Shared performance statistics resource
#[derive(Resource)]
pub struct PerfStatsRes(pub SharedPerfStats);

// =============================================================================
// Channel Communication (Main World <-> Render World)
// =============================================================================

use crossbeam_channel::{Receiver, Sender};

/// Receives captured frames from the render world
#[derive(Resource, Deref)]
pub struct MainWorldReceiver(pub Receiver<CapturedFrame>);

/// Sends captured frames to the main world
#[derive(Resource, Deref)]
pub struct RenderWorldSender(pub Sender<CapturedFrame>);
