use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle in world units with a top-left origin.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct WorldRect {
    origin: Vec2,
    size: Vec2,
}

impl WorldRect {
    /// Creates a rectangle from its top-left corner and size.
    #[must_use]
    pub const fn new(origin: Vec2, size: Vec2) -> Self {
        Self { origin, size }
    }

    /// Creates a square of the given edge length centred on `center`.
    #[must_use]
    pub fn centered(center: Vec2, edge: f32) -> Self {
        let size = Vec2::splat(edge);
        Self::new(center - size * 0.5, size)
    }

    /// Top-left corner.
    #[must_use]
    pub const fn origin(&self) -> Vec2 {
        self.origin
    }

    /// Width and height.
    #[must_use]
    pub const fn size(&self) -> Vec2 {
        self.size
    }

    /// Left edge.
    #[must_use]
    pub fn left(&self) -> f32 {
        self.origin.x
    }

    /// Right edge.
    #[must_use]
    pub fn right(&self) -> f32 {
        self.origin.x + self.size.x
    }

    /// Top edge.
    #[must_use]
    pub fn top(&self) -> f32 {
        self.origin.y
    }

    /// Bottom edge.
    #[must_use]
    pub fn bottom(&self) -> f32 {
        self.origin.y + self.size.y
    }

    /// Geometric centre.
    #[must_use]
    pub fn center(&self) -> Vec2 {
        self.origin + self.size * 0.5
    }

    /// Reports whether the rectangles share interior area.
    ///
    /// Rectangles that only touch along an edge do not intersect.
    #[must_use]
    pub fn intersects(&self, other: &WorldRect) -> bool {
        self.left() < other.right()
            && other.left() < self.right()
            && self.top() < other.bottom()
            && other.top() < self.bottom()
    }
}
