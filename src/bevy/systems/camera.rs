//! Camera systems
//!
//! The per-frame drift of the scene camera plus pointer controls that let
//! the frontend swing the camera around its fixed target until the scene is
//! torn down.

use bevy::{
    prelude::*,
    time::{Real, Time},
};

use crate::bevy::components::SceneCamera;
use crate::bevy::resources::{CameraControls, LifecycleRes, MouseInputRes, PerfStatsRes};
use crate::config::camera::*;
use crate::controller::CameraDrift;

/// Advance the camera along its velocity and aim it at the target
///
/// The frame clock is Bevy's real (unscaled, unclamped) elapsed time in
/// milliseconds. The frame that triggers a reset is rendered at the drifted
/// position; the new random state shows from the next frame. After teardown
/// the in-flight frame still moves the camera, but no new drift is drawn.
pub fn drift_camera(
    time: Res<Time<Real>>,
    lifecycle: Res<LifecycleRes>,
    mut drift: ResMut<CameraDrift>,
    perf_stats: Option<Res<PerfStatsRes>>,
    mut camera_query: Query<&mut Transform, With<SceneCamera>>,
) {
    let timestamp_ms = time.elapsed_secs_f64() * 1000.0;
    let step = drift.step(timestamp_ms, !lifecycle.is_destroyed());

    if step.reset {
        log::debug!("camera drift reset at {timestamp_ms:.0}ms");
        if let Some(perf_res) = &perf_stats {
            if let Ok(mut stats) = perf_res.0 .0.lock() {
                stats.camera_resets += 1;
            }
        }
    }

    for mut camera in camera_query.iter_mut() {
        *camera = step.rendered;
    }
}

/// Apply accumulated pointer input from the frontend
/// - Left button drag: orbit around the target (yaw/pitch)
/// - Scroll wheel: dolly toward or away from the target
pub fn apply_camera_controls(
    mouse_input_res: Option<Res<MouseInputRes>>,
    controls: Res<CameraControls>,
    mut drift: ResMut<CameraDrift>,
) {
    if *controls == CameraControls::Disposed {
        return;
    }
    let Some(mouse_res) = mouse_input_res else {
        return;
    };

    // Read and clear accumulated input
    let input = {
        let Ok(mut guard) = mouse_res.0 .0.lock() else {
            return;
        };
        let input = guard.clone();
        guard.delta_x = 0.0;
        guard.delta_y = 0.0;
        guard.scroll_delta = 0.0;
        input
    };

    if input.left_button && (input.delta_x != 0.0 || input.delta_y != 0.0) {
        drift.orbit(
            -input.delta_x * ROTATION_SPEED,
            input.delta_y * ROTATION_SPEED,
        );
    }

    if input.scroll_delta != 0.0 {
        drift.dolly(input.scroll_delta * ZOOM_SPEED);
    }
}

/// Detach pointer controls once the scene is destroyed
pub fn dispose_camera_controls(
    lifecycle: Res<LifecycleRes>,
    mut controls: ResMut<CameraControls>,
    mouse_input_res: Option<Res<MouseInputRes>>,
) {
    if *controls == CameraControls::Disposed || !lifecycle.is_destroyed() {
        return;
    }

    *controls = CameraControls::Disposed;
    if let Some(mouse_res) = mouse_input_res {
        if let Ok(mut guard) = mouse_res.0 .0.lock() {
            *guard = Default::default();
        }
    }
    log::info!("camera controls disposed");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::{CameraState, DriftSettings};
    use crate::tauri_bridge::shared_state::{MouseInput, SharedLifecycle, SharedMouseInput};
    use rand::{rngs::StdRng, SeedableRng};
    use std::time::Duration;

    fn drift_app(lifecycle: SharedLifecycle) -> App {
        let mut drift = CameraDrift::new(
            DriftSettings::default(),
            Vec3::ZERO,
            StdRng::seed_from_u64(21),
            0.0,
        );
        drift.set_state(CameraState {
            position: Vec3::new(0.0, 400.0, 800.0),
            velocity: Vec3::X,
        });

        let mut app = App::new();
        app.insert_resource(Time::<Real>::default())
            .insert_resource(LifecycleRes(lifecycle))
            .insert_resource(drift)
            .add_systems(Update, drift_camera);
        app.world_mut()
            .spawn((Transform::default(), SceneCamera));
        app
    }

    fn advance(app: &mut App, millis: u64) {
        app.world_mut()
            .resource_mut::<Time<Real>>()
            .advance_by(Duration::from_millis(millis));
    }

    fn camera_translation(app: &mut App) -> Vec3 {
        let world = app.world_mut();
        let mut cameras = world.query_filtered::<&Transform, With<SceneCamera>>();
        cameras.single(world).unwrap().translation
    }

    #[test]
    fn frame_moves_camera_by_velocity() {
        let mut app = drift_app(SharedLifecycle::default());
        app.update();
        advance(&mut app, 100);
        app.update();

        let position = camera_translation(&mut app);
        assert!((position - Vec3::new(10.0, 400.0, 800.0)).length() < 1e-3);
    }

    #[test]
    fn interval_resets_while_active() {
        let mut app = drift_app(SharedLifecycle::default());
        advance(&mut app, 5001);
        app.update();

        let drift = app.world().resource::<CameraDrift>();
        assert!((drift.last_change_ms() - 5001.0).abs() < 1e-6);
        let position = drift.state().position;
        assert!((300.0..=500.0).contains(&position.y));
    }

    #[test]
    fn reset_frame_renders_drifted_position() {
        let mut app = drift_app(SharedLifecycle::default());
        advance(&mut app, 5001);
        app.update();

        assert!(app.world().resource::<CameraDrift>().last_change_ms() > 0.0);
        // 0.1 units per ms along x for 5001 ms
        let position = camera_translation(&mut app);
        assert!((position - Vec3::new(500.1, 400.0, 800.0)).length() < 1e-2);
    }

    #[test]
    fn long_stall_advances_by_full_real_delta() {
        let mut app = drift_app(SharedLifecycle::default());
        app.update();
        advance(&mut app, 1000);
        app.update();

        let position = camera_translation(&mut app);
        assert!((position - Vec3::new(100.0, 400.0, 800.0)).length() < 1e-2);
    }

    #[test]
    fn destroyed_scene_finishes_frame_without_reset() {
        let lifecycle = SharedLifecycle::default();
        let mut app = drift_app(lifecycle.clone());
        lifecycle.destroy();
        advance(&mut app, 6000);
        app.update();

        let drift = app.world().resource::<CameraDrift>();
        assert_eq!(drift.last_change_ms(), 0.0);
        // 1 unit/ms velocity on x at 0.1 speed for 6000ms
        assert!((drift.state().position.x - 600.0).abs() < 1e-2);
    }

    #[test]
    fn disposed_controls_ignore_input() {
        let lifecycle = SharedLifecycle::default();
        let mouse = SharedMouseInput::default();
        let mut app = drift_app(lifecycle.clone());
        app.insert_resource(MouseInputRes(mouse.clone()))
            .init_resource::<CameraControls>()
            .add_systems(
                PreUpdate,
                (dispose_camera_controls, apply_camera_controls).chain(),
            );

        lifecycle.destroy();
        *mouse.0.lock().unwrap() = MouseInput {
            scroll_delta: 5.0,
            ..Default::default()
        };
        app.update();

        assert_eq!(
            *app.world().resource::<CameraControls>(),
            CameraControls::Disposed
        );
        assert_eq!(mouse.0.lock().unwrap().scroll_delta, 0.0);
        let position = app.world().resource::<CameraDrift>().state().position;
        assert_eq!(position, Vec3::new(0.0, 400.0, 800.0));
    }

    #[test]
    fn scroll_dollies_toward_target() {
        let mouse = SharedMouseInput::default();
        let mut app = drift_app(SharedLifecycle::default());
        app.insert_resource(MouseInputRes(mouse.clone()))
            .init_resource::<CameraControls>()
            .add_systems(PreUpdate, apply_camera_controls);

        let before = app.world().resource::<CameraDrift>().state().position.length();
        mouse.0.lock().unwrap().scroll_delta = 1.0;
        app.update();

        let after = app.world().resource::<CameraDrift>().state().position.length();
        assert!((before - after - ZOOM_SPEED).abs() < 1e-2);
        assert_eq!(mouse.0.lock().unwrap().scroll_delta, 0.0);
    }
}
