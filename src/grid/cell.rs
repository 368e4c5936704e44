use glam::UVec2;

use crate::types::UNREACHED;

/// One grid cell of the clearance field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cell {
    /// Inside at least one obstacle footprint.
    pub occupied: bool,
    /// Distance from this cell's center to `source`, or [`UNREACHED`].
    pub distance: f32,
    /// Obstacle cell the distance was derived from.
    pub source: Option<UVec2>,
    /// Propagation layer in which the cell last changed.
    pub generation: u32,
}

impl Cell {
    pub const EMPTY: Cell = Cell {
        occupied: false,
        distance: UNREACHED,
        source: None,
        generation: 0,
    };

    /// A zero-distance source cell.
    pub fn obstacle(pos: UVec2, generation: u32) -> Self {
        Self {
            occupied: true,
            distance: 0.0,
            source: Some(pos),
            generation,
        }
    }

    pub fn is_reached(&self) -> bool {
        self.source.is_some()
    }
}

impl Default for Cell {
    fn default() -> Self {
        Self::EMPTY
    }
}

/// Euclidean distance between two cell centers.
#[inline]
pub fn euclidean(a: UVec2, b: UVec2) -> f32 {
    let d = a.as_ivec2() - b.as_ivec2();
    ((d.x as i64 * d.x as i64 + d.y as i64 * d.y as i64) as f32).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unreached_cell_is_infinitely_far() {
        let cell = Cell::default();
        assert!(!cell.occupied);
        assert!(cell.distance.is_infinite());
        assert!(!cell.is_reached());
    }

    #[test]
    fn obstacle_cell_is_its_own_source() {
        let cell = Cell::obstacle(UVec2::new(3, 4), 2);
        assert!(cell.occupied);
        assert_eq!(cell.distance, 0.0);
        assert_eq!(cell.source, Some(UVec2::new(3, 4)));
    }

    #[test]
    fn euclidean_is_exact_for_pythagorean_triples() {
        assert_eq!(euclidean(UVec2::new(0, 0), UVec2::new(3, 4)), 5.0);
        assert_eq!(euclidean(UVec2::new(9, 1), UVec2::new(4, 13)), 13.0);
        assert_eq!(euclidean(UVec2::new(2, 2), UVec2::new(2, 2)), 0.0);
    }
}
