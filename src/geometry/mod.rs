//! Mesh generation for the extruded text and logo
//!
//! Outlines come from a typeface JSON font or SVG path data, get tessellated
//! by `lyon`, and are extruded into Bevy meshes.

pub mod assets;
pub mod extrude;
pub mod svg_path;
pub mod typeface;

pub use assets::{FontLibrary, SceneAssets};
pub use extrude::ExtrudedGeometry;
