//! Resize handling
//!
//! The frontend reports its canvas size whenever the window resizes. Once
//! per frame the reported size is folded into the [`Viewport`]; a real change
//! updates the camera aspect and swaps in a render target of the new size.

use bevy::{
    camera::RenderTarget,
    prelude::*,
    render::renderer::RenderDevice,
};

use crate::bevy::components::SceneCamera;
use crate::bevy::plugins::ImageCopier;
use crate::bevy::resources::{CanvasSizeRes, LifecycleRes, RenderTargetHandle};
use crate::bevy::systems::scene::create_render_target;
use crate::controller::Viewport;

/// Pick up the latest canvas size and recompute the camera aspect
///
/// A destroyed scene no longer listens for resizes.
pub fn apply_canvas_resize(
    canvas: Option<Res<CanvasSizeRes>>,
    lifecycle: Res<LifecycleRes>,
    mut viewport: ResMut<Viewport>,
    mut projections: Query<&mut Projection, With<SceneCamera>>,
) {
    if lifecycle.is_destroyed() {
        return;
    }
    let Some(size) = canvas.and_then(|c| c.0.get()) else {
        return;
    };

    // Only mark the viewport changed when the size actually differs
    if !viewport.bypass_change_detection().resize(size.width, size.height) {
        return;
    }
    viewport.set_changed();

    for mut projection in projections.iter_mut() {
        if let Projection::Perspective(perspective) = projection.as_mut() {
            perspective.aspect_ratio = viewport.aspect_ratio();
        }
    }

    log::info!(
        "viewport resized to {}x{} (aspect {:.3})",
        viewport.width(),
        viewport.height(),
        viewport.aspect_ratio()
    );
}

/// Reallocate the offscreen target when the viewport no longer matches it
pub fn resize_render_target(
    mut commands: Commands,
    viewport: Res<Viewport>,
    mut images: ResMut<Assets<Image>>,
    render_device: Res<RenderDevice>,
    target: Option<ResMut<RenderTargetHandle>>,
    copiers: Query<(Entity, &ImageCopier)>,
    mut cameras: Query<&mut Camera, With<SceneCamera>>,
) {
    let Some(mut target) = target else {
        return;
    };
    if !viewport.is_changed() {
        return;
    }
    let wanted = UVec2::new(viewport.width(), viewport.height());
    if images.get(&target.0).map(|image| image.size()) == Some(wanted) {
        return;
    }

    for (entity, copier) in copiers.iter() {
        copier.disable();
        commands.entity(entity).despawn();
    }

    let old = std::mem::replace(
        &mut target.0,
        create_render_target(&mut commands, &mut images, &render_device, *viewport),
    );
    for mut camera in cameras.iter_mut() {
        camera.target = RenderTarget::Image(target.0.clone().into());
    }
    images.remove(&old);

    log::debug!("render target reallocated at {}x{}", wanted.x, wanted.y);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tauri_bridge::shared_state::{SharedCanvasSize, SharedLifecycle};

    fn resize_app(canvas: SharedCanvasSize, lifecycle: SharedLifecycle) -> App {
        let mut app = App::new();
        app.insert_resource(CanvasSizeRes(canvas))
            .insert_resource(LifecycleRes(lifecycle))
            .insert_resource(Viewport::new(800, 600))
            .add_systems(Update, apply_canvas_resize);
        app.world_mut().spawn((
            Projection::from(PerspectiveProjection {
                aspect_ratio: 800.0 / 600.0,
                ..default()
            }),
            SceneCamera,
        ));
        app
    }

    fn aspect(app: &mut App) -> f32 {
        let world = app.world_mut();
        let mut cameras = world.query_filtered::<&Projection, With<SceneCamera>>();
        match cameras.single(world).unwrap() {
            Projection::Perspective(p) => p.aspect_ratio,
            _ => panic!("expected a perspective projection"),
        }
    }

    #[test]
    fn resize_updates_aspect_once() {
        let canvas = SharedCanvasSize::new(800, 600);
        let mut app = resize_app(canvas.clone(), SharedLifecycle::default());

        canvas.set(1600, 900);
        app.update();
        let once = aspect(&mut app);
        assert_eq!(once, 1600.0 / 900.0);

        app.update();
        assert_eq!(aspect(&mut app), once);
        assert_eq!(*app.world().resource::<Viewport>(), Viewport::new(1600, 900));
    }

    #[test]
    fn destroyed_scene_ignores_resize() {
        let canvas = SharedCanvasSize::new(800, 600);
        let lifecycle = SharedLifecycle::default();
        let mut app = resize_app(canvas.clone(), lifecycle.clone());

        lifecycle.destroy();
        canvas.set(300, 300);
        app.update();

        assert_eq!(aspect(&mut app), 800.0 / 600.0);
        assert_eq!(*app.world().resource::<Viewport>(), Viewport::new(800, 600));
    }
}
