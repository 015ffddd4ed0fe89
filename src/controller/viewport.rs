//! Canvas dimensions as seen by the scene

use bevy::prelude::Resource;

/// Current render size; both sides are at least one pixel
#[derive(Resource, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    width: u32,
    height: u32,
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width: width.max(1),
            height: height.max(1),
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.width as f32 / self.height as f32
    }

    /// Apply a canvas size; returns whether anything changed
    ///
    /// A hidden canvas reports zero sizes, which are clamped to one pixel.
    pub fn resize(&mut self, width: u32, height: u32) -> bool {
        let next = Self::new(width, height);
        let changed = next != *self;
        *self = next;
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aspect_follows_canvas() {
        let viewport = Viewport::new(800, 600);
        assert_eq!(viewport.aspect_ratio(), 800.0 / 600.0);
    }

    #[test]
    fn resize_is_idempotent() {
        let mut viewport = Viewport::new(800, 600);
        assert!(viewport.resize(1280, 720));
        let once = viewport.aspect_ratio();
        assert!(!viewport.resize(1280, 720));
        assert_eq!(viewport.aspect_ratio(), once);
        assert_eq!(once, 1280.0 / 720.0);
    }

    #[test]
    fn zero_sizes_are_clamped() {
        let mut viewport = Viewport::new(800, 600);
        viewport.resize(0, 0);
        assert_eq!((viewport.width(), viewport.height()), (1, 1));
        assert!(viewport.aspect_ratio().is_finite());
    }
}
