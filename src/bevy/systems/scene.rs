//! Scene setup system
//!
//! Builds the offscreen render target and the static scene graph: lights,
//! the drifting camera, the extruded text and the grouped logo.

use bevy::{
    asset::Assets,
    camera::RenderTarget,
    core_pipeline::tonemapping::Tonemapping,
    image::Image,
    math::{Quat, Vec3},
    pbr::{MeshMaterial3d, StandardMaterial},
    prelude::*,
    render::{
        render_resource::{Extent3d, TextureFormat, TextureUsages},
        renderer::RenderDevice,
    },
};

use crate::bevy::components::{LogoGroup, SceneCamera, SceneLight, TextMesh};
use crate::bevy::plugins::ImageCopier;
use crate::bevy::resources::{PendingSceneAssets, RenderTargetHandle, SceneSettings};
use crate::config::{camera::*, SceneConfig};
use crate::controller::{CameraDrift, Viewport};
use crate::geometry::SceneAssets;

/// Logo group sits above the text baseline
const LOGO_OFFSET: Vec3 = Vec3::new(0.0, 140.0, 0.0);

/// Setup the render target and spawn the scene graph
pub fn setup_scene(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mut images: ResMut<Assets<Image>>,
    render_device: Res<RenderDevice>,
    viewport: Res<Viewport>,
    drift: Res<CameraDrift>,
    settings: Res<SceneSettings>,
    pending: Option<Res<PendingSceneAssets>>,
) {
    log::info!(
        "setting up scene at {}x{}",
        viewport.width(),
        viewport.height()
    );

    let target = create_render_target(&mut commands, &mut images, &render_device, *viewport);
    commands.insert_resource(RenderTargetHandle(target.clone()));

    let Some(pending) = pending else {
        log::warn!("scene assets already consumed; skipping scene graph");
        return;
    };

    spawn_scene_graph(
        &mut commands,
        &mut meshes,
        &mut materials,
        &pending.0,
        &settings,
        &drift,
        *viewport,
        RenderTarget::Image(target.into()),
    );
    commands.remove_resource::<PendingSceneAssets>();

    log::info!("scene setup complete");
}

/// Allocate a render target image of the viewport size plus its readback copier
pub fn create_render_target(
    commands: &mut Commands,
    images: &mut Assets<Image>,
    render_device: &RenderDevice,
    viewport: Viewport,
) -> Handle<Image> {
    let size = Extent3d {
        width: viewport.width(),
        height: viewport.height(),
        depth_or_array_layers: 1,
    };

    let mut render_target_image =
        Image::new_target_texture(size.width, size.height, TextureFormat::bevy_default());
    render_target_image.texture_descriptor.usage |= TextureUsages::COPY_SRC;
    let handle = images.add(render_target_image);

    commands.spawn(ImageCopier::new(handle.clone(), size, render_device));
    handle
}

/// Spawn lights, camera, text and logo in that order
#[allow(clippy::too_many_arguments)]
pub fn spawn_scene_graph(
    commands: &mut Commands,
    meshes: &mut Assets<Mesh>,
    materials: &mut Assets<StandardMaterial>,
    assets: &SceneAssets,
    config: &SceneConfig,
    drift: &CameraDrift,
    viewport: Viewport,
    target: RenderTarget,
) {
    // Key light
    commands.spawn((
        DirectionalLight {
            illuminance: 3000.0,
            shadows_enabled: true,
            ..default()
        },
        Transform::from_rotation(Quat::from_euler(bevy::math::EulerRot::XYZ, -0.6, 0.4, 0.0)),
        SceneLight,
    ));

    // Warm point light above the front of the text
    commands.spawn((
        PointLight {
            intensity: 2.0e9,
            range: 5000.0,
            color: Color::srgb(1.0, 0.95, 0.85),
            ..default()
        },
        Transform::from_xyz(0.0, 600.0, 900.0),
        SceneLight,
    ));

    // Cool fill from behind
    commands.spawn((
        PointLight {
            intensity: 8.0e8,
            range: 5000.0,
            color: Color::srgb(0.4, 0.6, 1.0),
            ..default()
        },
        Transform::from_xyz(-500.0, 300.0, -800.0),
        SceneLight,
    ));

    commands.spawn((
        Camera3d::default(),
        Camera {
            target,
            clear_color: ClearColorConfig::Custom(Color::srgb(0.02, 0.02, 0.05)),
            ..default()
        },
        Projection::from(PerspectiveProjection {
            fov: FOV_DEGREES.to_radians(),
            aspect_ratio: viewport.aspect_ratio(),
            near: NEAR,
            far: FAR,
            ..default()
        }),
        Tonemapping::None,
        drift.transform(),
        SceneCamera,
    ));

    commands.spawn((
        Mesh3d(meshes.add(Mesh::from(assets.text.clone()))),
        MeshMaterial3d(materials.add(StandardMaterial {
            base_color: Color::srgb(0.9, 0.9, 0.95),
            metallic: 0.3,
            perceptual_roughness: 0.4,
            ..default()
        })),
        Transform::IDENTITY,
        TextMesh,
    ));

    let logo_mesh = meshes.add(Mesh::from(assets.logo.clone()));
    let logo_material = materials.add(StandardMaterial {
        base_color: Color::srgb(0.9, 0.35, 0.1),
        metallic: 0.6,
        perceptual_roughness: 0.3,
        ..default()
    });
    commands
        .spawn((
            Transform::from_translation(LOGO_OFFSET).with_scale(Vec3::splat(config.logo_scale)),
            Visibility::default(),
            LogoGroup,
        ))
        .with_children(|group| {
            group.spawn((
                Mesh3d(logo_mesh),
                MeshMaterial3d(logo_material),
                Transform::IDENTITY,
            ));
        });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::DriftSettings;
    use crate::geometry::FontLibrary;
    use bevy::ecs::system::RunSystemOnce;
    use rand::{rngs::StdRng, SeedableRng};

    fn world_with_scene(width: u32, height: u32) -> World {
        let config = SceneConfig::default();
        let assets = SceneAssets::build(&config, &mut FontLibrary::new()).unwrap();

        let mut world = World::new();
        world.init_resource::<Assets<Mesh>>();
        world.init_resource::<Assets<StandardMaterial>>();
        world.insert_resource(CameraDrift::new(
            DriftSettings::default(),
            Vec3::ZERO,
            StdRng::seed_from_u64(11),
            0.0,
        ));

        world
            .run_system_once(
                move |mut commands: Commands,
                      mut meshes: ResMut<Assets<Mesh>>,
                      mut materials: ResMut<Assets<StandardMaterial>>,
                      drift: Res<CameraDrift>| {
                    spawn_scene_graph(
                        &mut commands,
                        &mut meshes,
                        &mut materials,
                        &assets,
                        &config,
                        &drift,
                        Viewport::new(width, height),
                        RenderTarget::default(),
                    );
                },
            )
            .unwrap();
        world
    }

    #[test]
    fn camera_aspect_matches_surface() {
        let mut world = world_with_scene(800, 600);
        let mut cameras = world.query_filtered::<&Projection, With<SceneCamera>>();
        let projection = cameras.single(&world).unwrap();
        let Projection::Perspective(perspective) = projection else {
            panic!("scene camera must be perspective");
        };
        assert_eq!(perspective.aspect_ratio, 800.0 / 600.0);
    }

    #[test]
    fn scene_graph_has_lights_text_and_logo_group() {
        let mut world = world_with_scene(800, 600);

        let lights = world
            .query_filtered::<(), With<SceneLight>>()
            .iter(&world)
            .count();
        assert_eq!(lights, 3);

        let texts = world
            .query_filtered::<(), (With<TextMesh>, With<Mesh3d>)>()
            .iter(&world)
            .count();
        assert_eq!(texts, 1);

        let mut groups = world.query_filtered::<&Children, With<LogoGroup>>();
        let children = groups.single(&world).unwrap();
        assert_eq!(children.len(), 1);
        assert!(world.get::<Mesh3d>(children[0]).is_some());

        assert_eq!(world.resource::<Assets<Mesh>>().len(), 2);
    }

    #[test]
    fn camera_starts_at_drift_position() {
        let mut world = world_with_scene(1024, 768);
        let expected = world.resource::<CameraDrift>().state().position;
        let mut cameras = world.query_filtered::<&Transform, With<SceneCamera>>();
        let transform = cameras.single(&world).unwrap();
        assert_eq!(transform.translation, expected);
    }
}
