//! Obstacle descriptors and the registry that owns them.

mod registry;

pub use registry::ObstacleRegistry;

use std::fmt;

use glam::{IVec2, UVec2};

/// Identifier handed out by [`ObstacleRegistry::insert`]. Never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObstacleId(u64);

impl ObstacleId {
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ObstacleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A disc obstacle. Its footprint is every cell whose center lies strictly
/// inside the disc (`dx² + dy² < radius²`), so radius 1 covers one cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Obstacle {
    pub id: ObstacleId,
    pub center: IVec2,
    pub radius: u32,
}

impl Obstacle {
    #[inline]
    pub fn contains(&self, pos: IVec2) -> bool {
        let dx = pos.x as i64 - self.center.x as i64;
        let dy = pos.y as i64 - self.center.y as i64;
        let r = self.radius as i64;
        dx * dx + dy * dy < r * r
    }

    /// Inclusive corners of the footprint's bounding box (unclipped).
    pub fn bounds(&self) -> (IVec2, IVec2) {
        let extent = self.radius.saturating_sub(1).min(i32::MAX as u32) as i32;
        (
            IVec2::new(
                self.center.x.saturating_sub(extent),
                self.center.y.saturating_sub(extent),
            ),
            IVec2::new(
                self.center.x.saturating_add(extent),
                self.center.y.saturating_add(extent),
            ),
        )
    }

    /// Footprint cells clipped to a `width x height` grid, in row-major order.
    pub fn footprint(&self, width: u32, height: u32) -> impl Iterator<Item = UVec2> + '_ {
        let (min, max) = self.bounds();
        let x0 = min.x.max(0);
        let y0 = min.y.max(0);
        let x1 = max.x.min(width as i32 - 1);
        let y1 = max.y.min(height as i32 - 1);
        (y0..=y1)
            .flat_map(move |y| (x0..=x1).map(move |x| IVec2::new(x, y)))
            .filter(|p| self.contains(*p))
            .map(|p| p.as_uvec2())
    }
}
