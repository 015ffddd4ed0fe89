//! Typeface JSON fonts
//!
//! The serialized font description maps each character to an advance width
//! (`ha`) and an outline command string (`o`) in font units. Outline tokens
//! are `m x y`, `l x y`, `q x y cx cy`, `b x y c1x c1y c2x c2y` and `z`; curve
//! commands list their end point first.

use lyon::{
    math::{point, Point},
    path::Path,
};
use serde::Deserialize;
use std::{collections::HashMap, str::SplitWhitespace};

use crate::error::{Result, SceneError};

/// Glyph used when the requested character is missing
const FALLBACK_GLYPH: &str = "?";

#[derive(Debug, Clone, Deserialize)]
pub struct Glyph {
    /// Horizontal advance in font units
    pub ha: f32,
    /// Outline commands; absent for blank glyphs such as space
    #[serde(default)]
    pub o: Option<String>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoundingBox {
    pub x_min: f32,
    pub x_max: f32,
    pub y_min: f32,
    pub y_max: f32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Typeface {
    pub family_name: String,
    pub glyphs: HashMap<String, Glyph>,
    /// Font units per em
    pub resolution: f32,
    pub bounding_box: BoundingBox,
    #[serde(default)]
    pub underline_thickness: f32,
}

impl Typeface {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let typeface: Typeface =
            serde_json::from_str(json).map_err(|e| SceneError::Font(e.to_string()))?;
        if typeface.resolution <= 0.0 {
            return Err(SceneError::Font(format!(
                "{}: resolution must be positive",
                typeface.family_name
            )));
        }
        Ok(typeface)
    }

    /// Distance between baselines for a given font size
    pub fn line_height(&self, size: f32) -> f32 {
        let bb = &self.bounding_box;
        (bb.y_max - bb.y_min + self.underline_thickness) * size / self.resolution
    }

    fn glyph(&self, ch: char) -> Option<&Glyph> {
        let mut buf = [0u8; 4];
        self.glyphs
            .get(&*ch.encode_utf8(&mut buf))
            .or_else(|| self.glyphs.get(FALLBACK_GLYPH))
    }

    /// Lay out `text` left to right starting at the origin baseline
    ///
    /// Every glyph contour becomes a closed sub-path of the returned path.
    pub fn text_path(&self, text: &str, size: f32) -> Result<Path> {
        let scale = size / self.resolution;
        let line_height = self.line_height(size);
        let mut builder = OutlineBuilder::new();
        let (mut x, mut y) = (0.0, 0.0);

        for ch in text.chars() {
            if ch == '\n' {
                x = 0.0;
                y -= line_height;
                continue;
            }
            let Some(glyph) = self.glyph(ch) else {
                log::warn!(
                    "character {ch:?} does not exist in font family {}",
                    self.family_name
                );
                continue;
            };
            if let Some(outline) = &glyph.o {
                builder
                    .append_outline(outline, scale, x, y)
                    .map_err(|e| SceneError::Font(format!("glyph {ch:?}: {e}")))?;
            }
            x += glyph.ha * scale;
        }

        Ok(builder.build())
    }
}

fn read_point(
    tokens: &mut SplitWhitespace<'_>,
    scale: f32,
    dx: f32,
    dy: f32,
) -> std::result::Result<Point, String> {
    let mut coord = || -> std::result::Result<f32, String> {
        let token = tokens.next().ok_or("truncated outline")?;
        token
            .parse::<f32>()
            .map_err(|_| format!("invalid number {token:?}"))
    };
    let x = coord()?;
    let y = coord()?;
    Ok(point(x * scale + dx, y * scale + dy))
}

/// Wraps the lyon builder so contours are closed exactly once
struct OutlineBuilder {
    inner: lyon::path::path::Builder,
    open: bool,
}

impl OutlineBuilder {
    fn new() -> Self {
        Self {
            inner: Path::builder(),
            open: false,
        }
    }

    fn close(&mut self) {
        if self.open {
            self.inner.end(true);
            self.open = false;
        }
    }

    fn append_outline(
        &mut self,
        outline: &str,
        scale: f32,
        dx: f32,
        dy: f32,
    ) -> std::result::Result<(), String> {
        let mut tokens = outline.split_whitespace();
        let next = |tokens: &mut SplitWhitespace<'_>| read_point(tokens, scale, dx, dy);

        while let Some(cmd) = tokens.next() {
            match cmd {
                "m" => {
                    let at = next(&mut tokens)?;
                    self.close();
                    self.inner.begin(at);
                    self.open = true;
                }
                "l" => {
                    let to = next(&mut tokens)?;
                    self.require_open()?;
                    self.inner.line_to(to);
                }
                "q" => {
                    let to = next(&mut tokens)?;
                    let ctrl = next(&mut tokens)?;
                    self.require_open()?;
                    self.inner.quadratic_bezier_to(ctrl, to);
                }
                "b" => {
                    let to = next(&mut tokens)?;
                    let ctrl1 = next(&mut tokens)?;
                    let ctrl2 = next(&mut tokens)?;
                    self.require_open()?;
                    self.inner.cubic_bezier_to(ctrl1, ctrl2, to);
                }
                "z" => self.close(),
                other => return Err(format!("unknown outline command {other:?}")),
            }
        }

        // Glyph contours never continue into the next glyph
        self.close();
        Ok(())
    }

    fn require_open(&self) -> std::result::Result<(), String> {
        if self.open {
            Ok(())
        } else {
            Err("drawing command before move".into())
        }
    }

    fn build(mut self) -> Path {
        self.close();
        self.inner.build()
    }
}
