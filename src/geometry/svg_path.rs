//! SVG path data to lyon paths
//!
//! Arcs, shorthand curves and relative commands are normalized by
//! `svgtypes`; this module only maps the simplified segments and flips the
//! y axis so the outline reads upright in the scene.

use lyon::{math::point, path::Path};
use svgtypes::{SimplePathSegment, SimplifyingPathParser};

use crate::error::{Result, SceneError};

/// Parse SVG path data (`d` attribute) into a y-up path
pub fn parse_svg_path(data: &str) -> Result<Path> {
    let mut builder = Path::builder();
    let mut open = false;
    let mut current = point(0.0, 0.0);
    let mut start = current;

    for segment in SimplifyingPathParser::from(data) {
        let segment = segment.map_err(|e| SceneError::Path(e.to_string()))?;
        match segment {
            SimplePathSegment::MoveTo { x, y } => {
                if open {
                    builder.end(false);
                }
                current = flip(x, y);
                start = current;
                builder.begin(current);
                open = true;
                continue;
            }
            SimplePathSegment::ClosePath => {
                if open {
                    builder.end(true);
                    open = false;
                }
                current = start;
                continue;
            }
            _ => {}
        }

        // Drawing after a close continues from the closed sub-path's start
        if !open {
            builder.begin(current);
            start = current;
            open = true;
        }

        match segment {
            SimplePathSegment::LineTo { x, y } => {
                current = flip(x, y);
                builder.line_to(current);
            }
            SimplePathSegment::Quadratic { x1, y1, x, y } => {
                current = flip(x, y);
                builder.quadratic_bezier_to(flip(x1, y1), current);
            }
            SimplePathSegment::CurveTo { x1, y1, x2, y2, x, y } => {
                current = flip(x, y);
                builder.cubic_bezier_to(flip(x1, y1), flip(x2, y2), current);
            }
            SimplePathSegment::MoveTo { .. } | SimplePathSegment::ClosePath => {}
        }
    }

    if open {
        builder.end(false);
    }
    Ok(builder.build())
}

fn flip(x: f64, y: f64) -> lyon::math::Point {
    point(x as f32, -y as f32)
}
