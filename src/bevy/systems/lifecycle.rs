//! Teardown of the render loop
//!
//! The schedule runner loops until an [`AppExit`] message appears. Once the
//! scene is destroyed the frame in flight completes and this system asks the
//! loop to stop, so no further frame is scheduled.

use bevy::prelude::*;

use crate::bevy::resources::LifecycleRes;

pub fn stop_when_destroyed(
    lifecycle: Res<LifecycleRes>,
    mut app_exit_writer: MessageWriter<AppExit>,
    mut stopping: Local<bool>,
) {
    if *stopping || !lifecycle.is_destroyed() {
        return;
    }
    *stopping = true;
    log::info!("scene destroyed; stopping render loop");
    app_exit_writer.write(AppExit::Success);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tauri_bridge::shared_state::SharedLifecycle;

    #[test]
    fn destroy_requests_exit_after_current_frame() {
        let lifecycle = SharedLifecycle::default();
        let mut app = App::new();
        app.insert_resource(LifecycleRes(lifecycle.clone()))
            .add_systems(Last, stop_when_destroyed);

        app.update();
        assert!(app.should_exit().is_none());

        lifecycle.destroy();
        app.update();
        assert_eq!(app.should_exit(), Some(AppExit::Success));
    }
}
