//! Scene asset preparation
//!
//! Fonts and vector paths are parsed and extruded on the caller's thread so
//! that malformed assets fail scene construction before any render thread
//! exists.

use std::{
    collections::HashMap,
    path::Path,
    sync::Arc,
};

use super::{
    extrude::{extrude, ExtrudeOptions, ExtrudedGeometry},
    svg_path::parse_svg_path,
    typeface::Typeface,
};
use crate::config::SceneConfig;
use crate::error::Result;

/// Typeface bundled with the application
pub const BUILTIN_FONT: &str = include_str!("../../assets/fonts/block.typeface.json");

const BUILTIN_KEY: &str = "<builtin>";

/// Parsed typefaces, optionally memoized by source
#[derive(Default)]
pub struct FontLibrary {
    cache: HashMap<String, Arc<Typeface>>,
}

impl FontLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the typeface at `path`, or the bundled one when `path` is `None`
    ///
    /// With `use_cache` unset the font is parsed afresh and not retained.
    pub fn load(&mut self, path: Option<&Path>, use_cache: bool) -> Result<Arc<Typeface>> {
        let key = path.map_or_else(|| BUILTIN_KEY.to_string(), |p| p.display().to_string());

        if use_cache {
            if let Some(font) = self.cache.get(&key) {
                log::debug!("font cache hit: {key}");
                return Ok(Arc::clone(font));
            }
        }

        let font = Arc::new(match path {
            Some(path) => Typeface::from_json_str(&std::fs::read_to_string(path)?)?,
            None => Typeface::from_json_str(BUILTIN_FONT)?,
        });
        log::info!("loaded typeface {:?} from {key}", font.family_name);

        if use_cache {
            self.cache.insert(key, Arc::clone(&font));
        }
        Ok(font)
    }

    pub fn cached_fonts(&self) -> usize {
        self.cache.len()
    }
}

/// Extruded geometry for the two meshes of the scene
#[derive(Debug, Clone)]
pub struct SceneAssets {
    pub text: ExtrudedGeometry,
    pub logo: ExtrudedGeometry,
}

impl SceneAssets {
    pub fn build(config: &SceneConfig, fonts: &mut FontLibrary) -> Result<Self> {
        let font = fonts.load(config.font_path.as_deref(), config.cache_assets)?;

        let text_outline = font.text_path(&config.text, config.text_size)?;
        let mut text = extrude(
            &text_outline,
            &ExtrudeOptions {
                depth: config.text_depth,
                tolerance: config.tolerance,
            },
        )?;
        text.center_xy();

        let logo_outline = parse_svg_path(&config.logo_path)?;
        let mut logo = extrude(
            &logo_outline,
            &ExtrudeOptions {
                depth: config.logo_depth,
                tolerance: config.tolerance,
            },
        )?;
        logo.center_xy();

        log::info!(
            "scene assets ready: text {} triangles, logo {} triangles",
            text.triangle_count(),
            logo.triangle_count()
        );
        Ok(Self { text, logo })
    }
}
