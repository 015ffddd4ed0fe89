//! Bevy component definitions
//!
//! Markers used to find the entities of the scene graph from systems.

use bevy::prelude::*;

/// The drifting camera that renders into the offscreen target
#[derive(Component)]
pub struct SceneCamera;

/// Light sources of the scene
#[derive(Component)]
pub struct SceneLight;

/// The extruded text mesh
#[derive(Component)]
pub struct TextMesh;

/// Parent of the extruded logo meshes
#[derive(Component)]
pub struct LogoGroup;
