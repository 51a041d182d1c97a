#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Axis-separated collision resolution of actor boxes against the tile grid.
//!
//! Each step moves a box along x first and then along y. On each axis the
//! resolver sweeps the box's leading edge from its current position to the
//! candidate position, visiting every tile column (or row) the edge crosses
//! in order of travel. Three sample points along the leading edge, inset by
//! [`SAMPLE_INSET`] from the corners, are tested against each visited tile.
//! The first blocking tile clamps the box flush against it and zeroes the
//! velocity on that axis.
//!
//! Only solid tiles and one-way platforms obstruct motion. Slope and half
//! shapes are treated like any other solid tile.

use tilestep_core::{TileGrid, Vec2, WorldRect};

/// Distance between the box corners and the outer sample points.
pub const SAMPLE_INSET: f32 = 1.0;

/// How far below a platform's top surface an actor's feet may start and
/// still land on it.
pub const PLATFORM_TOLERANCE: f32 = 5.0;

/// Moving axis-aligned box resolved against the grid.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Body {
    /// Top-left corner in world units.
    pub position: Vec2,
    /// Width and height in world units.
    pub size: Vec2,
    /// Velocity in world units per second.
    pub velocity: Vec2,
}

impl Body {
    /// Creates a resting body.
    #[must_use]
    pub const fn new(position: Vec2, size: Vec2) -> Self {
        Self {
            position,
            size,
            velocity: Vec2::ZERO,
        }
    }

    /// World-space bounds of the box.
    #[must_use]
    pub fn bounds(&self) -> WorldRect {
        WorldRect::new(self.position, self.size)
    }

    /// Centre of the box.
    #[must_use]
    pub fn center(&self) -> Vec2 {
        self.position + self.size * 0.5
    }
}

/// Surfaces the body was clamped against during a step.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Contacts {
    /// Downward motion was stopped by a floor or platform.
    pub grounded: bool,
    /// Upward motion was stopped by a ceiling.
    pub ceiling: bool,
    /// Leftward motion was stopped by a wall.
    pub wall_left: bool,
    /// Rightward motion was stopped by a wall.
    pub wall_right: bool,
}

impl Contacts {
    /// Reports whether horizontal motion was stopped.
    #[must_use]
    pub const fn hit_wall(&self) -> bool {
        self.wall_left || self.wall_right
    }

    fn merge(self, other: Self) -> Self {
        Self {
            grounded: self.grounded || other.grounded,
            ceiling: self.ceiling || other.ceiling,
            wall_left: self.wall_left || other.wall_left,
            wall_right: self.wall_right || other.wall_right,
        }
    }
}

/// Resolves box motion against a borrowed, read-only tile grid.
#[derive(Clone, Copy, Debug)]
pub struct MotionResolver<'a> {
    grid: &'a TileGrid,
}

impl<'a> MotionResolver<'a> {
    /// Creates a resolver over the provided grid.
    #[must_use]
    pub const fn new(grid: &'a TileGrid) -> Self {
        Self { grid }
    }

    /// Moves the body by `velocity * dt`, x axis first, then y.
    pub fn step(&self, body: &mut Body, dt: f32) -> Contacts {
        let horizontal = self.step_horizontal(body, dt);
        let vertical = self.step_vertical(body, dt);
        horizontal.merge(vertical)
    }

    /// Moves the body along x only.
    ///
    /// A body with zero horizontal velocity is left untouched.
    pub fn step_horizontal(&self, body: &mut Body, dt: f32) -> Contacts {
        let velocity = body.velocity.x;
        if velocity == 0.0 {
            return Contacts::default();
        }

        let size = self.grid.tile_size();
        let width = body.size.x;
        let candidate = body.position.x + velocity * dt;
        let rows = self.samples(body.position.y, body.size.y);

        if velocity > 0.0 {
            let first = self.grid.tile_index(body.position.x + width);
            let last = self.grid.tile_index(candidate + width);
            for column in first..=last {
                if rows.iter().any(|row| self.grid.is_solid(column, *row)) {
                    body.position.x = column as f32 * size - width;
                    body.velocity.x = 0.0;
                    return Contacts {
                        wall_right: true,
                        ..Contacts::default()
                    };
                }
            }
        } else {
            let first = (body.position.x / size).ceil() as i32 - 1;
            let last = self.grid.tile_index(candidate);
            for column in (last..=first).rev() {
                if rows.iter().any(|row| self.grid.is_solid(column, *row)) {
                    body.position.x = (column + 1) as f32 * size;
                    body.velocity.x = 0.0;
                    return Contacts {
                        wall_left: true,
                        ..Contacts::default()
                    };
                }
            }
        }

        body.position.x = candidate;
        Contacts::default()
    }

    /// Moves the body along y only.
    ///
    /// Moving down, a platform blocks only when the body's feet started at or
    /// above its top surface, within [`PLATFORM_TOLERANCE`]. Moving up,
    /// platforms never block. A body with zero vertical velocity is left
    /// untouched.
    pub fn step_vertical(&self, body: &mut Body, dt: f32) -> Contacts {
        let velocity = body.velocity.y;
        if velocity == 0.0 {
            return Contacts::default();
        }

        let size = self.grid.tile_size();
        let height = body.size.y;
        let candidate = body.position.y + velocity * dt;
        let columns = self.samples(body.position.x, body.size.x);

        if velocity > 0.0 {
            let feet = body.position.y + height;
            let first = self.grid.tile_index(feet);
            let last = self.grid.tile_index(candidate + height);
            for row in first..=last {
                let top = row as f32 * size;
                let lands_on_platform = feet <= top + PLATFORM_TOLERANCE;
                let blocked = columns.iter().any(|column| {
                    self.grid.is_solid(*column, row)
                        || (lands_on_platform && self.grid.is_platform(*column, row))
                });
                if blocked {
                    body.position.y = top - height;
                    body.velocity.y = 0.0;
                    return Contacts {
                        grounded: true,
                        ..Contacts::default()
                    };
                }
            }
        } else {
            let first = (body.position.y / size).ceil() as i32 - 1;
            let last = self.grid.tile_index(candidate);
            for row in (last..=first).rev() {
                if columns.iter().any(|column| self.grid.is_solid(*column, row)) {
                    body.position.y = (row + 1) as f32 * size;
                    body.velocity.y = 0.0;
                    return Contacts {
                        ceiling: true,
                        ..Contacts::default()
                    };
                }
            }
        }

        body.position.y = candidate;
        Contacts::default()
    }

    /// Reports whether a single world point lies inside a solid tile.
    #[must_use]
    pub fn point_is_solid(&self, point: Vec2) -> bool {
        self.grid
            .is_solid(self.grid.tile_index(point.x), self.grid.tile_index(point.y))
    }

    /// Reports whether a single world point lies on something an actor can
    /// stand on.
    #[must_use]
    pub fn point_is_supported(&self, point: Vec2) -> bool {
        let column = self.grid.tile_index(point.x);
        let row = self.grid.tile_index(point.y);
        self.grid.is_solid(column, row) || self.grid.is_platform(column, row)
    }

    fn samples(&self, start: f32, extent: f32) -> [i32; 3] {
        [
            self.grid.tile_index(start + SAMPLE_INSET),
            self.grid.tile_index(start + extent * 0.5),
            self.grid.tile_index(start + extent - SAMPLE_INSET),
        ]
    }
}
