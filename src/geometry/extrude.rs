//! Extrusion of 2D outlines into closed 3D meshes
//!
//! The outline is fill-tessellated once for the two caps; every contour is
//! flattened to a polyline for the side walls. Sides use per-quad vertices so
//! the walls stay flat-shaded against the caps.

use bevy::{
    asset::RenderAssetUsages,
    math::Vec3,
    mesh::{Indices, Mesh, PrimitiveTopology},
};
use lyon::{
    math::Point,
    path::{iterator::PathIterator, Path, PathEvent},
    tessellation::{
        BuffersBuilder, FillOptions, FillRule, FillTessellator, FillVertex, VertexBuffers,
    },
};

use crate::error::{Result, SceneError};

/// Extrusion parameters
#[derive(Debug, Clone, Copy)]
pub struct ExtrudeOptions {
    /// Extent along +Z; the back cap sits at z = 0
    pub depth: f32,
    /// Curve flattening tolerance
    pub tolerance: f32,
}

/// Triangle soup with per-vertex normals, ready to become a Bevy [`Mesh`]
#[derive(Debug, Clone, Default)]
pub struct ExtrudedGeometry {
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub indices: Vec<u32>,
}

impl ExtrudedGeometry {
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Axis-aligned bounds as (min, max)
    pub fn bounds(&self) -> Option<(Vec3, Vec3)> {
        let mut points = self.positions.iter().copied().map(Vec3::from);
        let first = points.next()?;
        Some(points.fold((first, first), |(lo, hi), p| (lo.min(p), hi.max(p))))
    }

    pub fn translate(&mut self, offset: Vec3) {
        for p in &mut self.positions {
            *p = (Vec3::from(*p) + offset).to_array();
        }
    }

    /// Shift so the bounding box is centered on the origin in x and y
    pub fn center_xy(&mut self) {
        if let Some((lo, hi)) = self.bounds() {
            let mid = (lo + hi) * 0.5;
            self.translate(Vec3::new(-mid.x, -mid.y, 0.0));
        }
    }

    fn push_vertex(&mut self, position: Vec3, normal: Vec3) -> u32 {
        let index = self.positions.len() as u32;
        self.positions.push(position.to_array());
        self.normals.push(normal.to_array());
        index
    }

    /// Push a triangle wound counter-clockwise when seen from `facing`
    fn push_triangle(&mut self, [a, b, c]: [u32; 3], facing: Vec3) {
        let p = |i: u32| Vec3::from(self.positions[i as usize]);
        let face = (p(b) - p(a)).cross(p(c) - p(a));
        if face.dot(facing) >= 0.0 {
            self.indices.extend([a, b, c]);
        } else {
            self.indices.extend([a, c, b]);
        }
    }
}

impl From<ExtrudedGeometry> for Mesh {
    fn from(geometry: ExtrudedGeometry) -> Self {
        Mesh::new(PrimitiveTopology::TriangleList, RenderAssetUsages::default())
            .with_inserted_attribute(Mesh::ATTRIBUTE_POSITION, geometry.positions)
            .with_inserted_attribute(Mesh::ATTRIBUTE_NORMAL, geometry.normals)
            .with_inserted_indices(Indices::U32(geometry.indices))
    }
}

/// Extrude a closed 2D outline along +Z
///
/// Holes are resolved with the non-zero fill rule, so inner contours must be
/// wound opposite to the outer ones (as font outlines and SVG cut-outs are).
pub fn extrude(path: &Path, options: &ExtrudeOptions) -> Result<ExtrudedGeometry> {
    let mut geometry = ExtrudedGeometry::default();

    let mut cap: VertexBuffers<Point, u32> = VertexBuffers::new();
    FillTessellator::new()
        .tessellate_path(
            path,
            &FillOptions::tolerance(options.tolerance).with_fill_rule(FillRule::NonZero),
            &mut BuffersBuilder::new(&mut cap, |vertex: FillVertex| vertex.position()),
        )
        .map_err(|e| SceneError::Tessellation(format!("{e:?}")))?;

    for (z, facing) in [(options.depth, Vec3::Z), (0.0, Vec3::NEG_Z)] {
        let base = geometry.positions.len() as u32;
        for v in &cap.vertices {
            geometry.push_vertex(Vec3::new(v.x, v.y, z), facing);
        }
        for tri in cap.indices.chunks_exact(3) {
            geometry.push_triangle([base + tri[0], base + tri[1], base + tri[2]], facing);
        }
    }

    let contours = flatten_contours(path, options.tolerance);
    // Outer contours dominate the total area, which fixes which side is "out"
    let orientation = if contours.iter().map(|c| signed_area(c)).sum::<f32>() >= 0.0 {
        1.0
    } else {
        -1.0
    };

    for contour in &contours {
        for (i, from) in contour.iter().enumerate() {
            let to = contour[(i + 1) % contour.len()];
            let dir = to - *from;
            let normal = Vec3::new(dir.y, -dir.x, 0.0).normalize_or_zero() * orientation;
            if normal == Vec3::ZERO {
                continue;
            }

            let quad = [
                geometry.push_vertex(Vec3::new(from.x, from.y, 0.0), normal),
                geometry.push_vertex(Vec3::new(to.x, to.y, 0.0), normal),
                geometry.push_vertex(Vec3::new(to.x, to.y, options.depth), normal),
                geometry.push_vertex(Vec3::new(from.x, from.y, options.depth), normal),
            ];
            geometry.push_triangle([quad[0], quad[1], quad[2]], normal);
            geometry.push_triangle([quad[0], quad[2], quad[3]], normal);
        }
    }

    Ok(geometry)
}

/// Flatten every sub-path into a closed polyline without a repeated end point
fn flatten_contours(path: &Path, tolerance: f32) -> Vec<Vec<Point>> {
    let mut contours = Vec::new();
    let mut current = Vec::new();

    for event in path.iter().flattened(tolerance) {
        match event {
            PathEvent::Begin { at } => {
                current.clear();
                current.push(at);
            }
            PathEvent::Line { to, .. } => current.push(to),
            PathEvent::End { .. } => {
                if current.len() > 1 && current.first() == current.last() {
                    current.pop();
                }
                if current.len() >= 3 {
                    contours.push(std::mem::take(&mut current));
                } else {
                    current.clear();
                }
            }
            _ => {}
        }
    }

    contours
}

fn signed_area(contour: &[Point]) -> f32 {
    let n = contour.len();
    (0..n)
        .map(|i| {
            let (a, b) = (contour[i], contour[(i + 1) % n]);
            a.x * b.y - b.x * a.y
        })
        .sum::<f32>()
        * 0.5
}
