//! Placement queries over a [`DistanceTransform`].

use glam::{IVec2, UVec2};

use crate::field::DistanceTransform;
use crate::grid::euclidean;

/// Can an object of `radius` be centred on `pos`?
///
/// Reads the field as it currently is. Unreached cells count as free, so
/// a partially propagated field never rejects a valid placement. When the
/// requested radius exceeds the inflation radius the field cannot tell an
/// unreached cell from a far one, so occupied cells within `radius` are
/// checked directly.
pub fn can_place(field: &DistanceTransform, pos: UVec2, radius: f32) -> bool {
    let Some(distance) = field.distance_at(pos) else {
        return false;
    };
    if distance < radius {
        return false;
    }
    if distance.is_infinite() && radius > field.inflation_radius() {
        return !occupied_within(field, pos, radius);
    }
    true
}

/// Any occupied cell strictly closer than `radius` to `pos`.
fn occupied_within(field: &DistanceTransform, pos: UVec2, radius: f32) -> bool {
    let cells = field.cells();
    let reach = radius.ceil().min(i32::MAX as f32) as i64;
    let x0 = (pos.x as i64 - reach).max(0) as u32;
    let y0 = (pos.y as i64 - reach).max(0) as u32;
    let x1 = (pos.x as i64 + reach).min(cells.width() as i64 - 1) as u32;
    let y1 = (pos.y as i64 + reach).min(cells.height() as i64 - 1) as u32;

    (y0..=y1).any(|y| {
        (x0..=x1).any(|x| {
            let p = UVec2::new(x, y);
            cells.get(p).is_some_and(|c| c.occupied) && euclidean(pos, p) < radius
        })
    })
}

/// Offsets of a disc in ring order: by distance from the centre, then
/// row-major (dy, then dx). Built once per map.
#[derive(Debug, Clone)]
pub struct SearchPattern {
    max_radius: u32,
    offsets: Vec<IVec2>,
}

impl SearchPattern {
    pub fn new(max_radius: u32) -> Self {
        let r = max_radius.min(i32::MAX as u32 / 2) as i32;
        let r_sq = r as i64 * r as i64;
        let mut offsets = Vec::new();
        for dy in -r..=r {
            for dx in -r..=r {
                if (dx as i64 * dx as i64 + dy as i64 * dy as i64) <= r_sq {
                    offsets.push(IVec2::new(dx, dy));
                }
            }
        }
        // Row-major scan order is already (dy, dx); a stable sort keeps it
        // as the tie-break.
        offsets.sort_by_key(|o| o.x as i64 * o.x as i64 + o.y as i64 * o.y as i64);
        Self {
            max_radius,
            offsets,
        }
    }

    pub fn max_radius(&self) -> u32 {
        self.max_radius
    }

    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }

    /// In-grid cells around `origin`, nearest first.
    pub fn cells_around(
        &self,
        origin: UVec2,
        width: u32,
        height: u32,
    ) -> impl Iterator<Item = UVec2> + '_ {
        let origin = origin.as_ivec2();
        self.offsets.iter().filter_map(move |&offset| {
            let p = origin + offset;
            (p.x >= 0 && p.y >= 0 && (p.x as u32) < width && (p.y as u32) < height)
                .then(|| p.as_uvec2())
        })
    }

    /// First cell in ring order satisfying `accept`.
    pub fn find(
        &self,
        origin: UVec2,
        width: u32,
        height: u32,
        mut accept: impl FnMut(UVec2) -> bool,
    ) -> Option<UVec2> {
        self.cells_around(origin, width, height).find(|&p| accept(p))
    }
}

/// Nearest cell to `origin` (within the pattern's ceiling) where an object of
/// `radius` fits.
pub fn find_closest(
    field: &DistanceTransform,
    pattern: &SearchPattern,
    origin: UVec2,
    radius: f32,
) -> Option<UVec2> {
    pattern.find(origin, field.width(), field.height(), |p| {
        can_place(field, p, radius)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::obstacles::{Obstacle, ObstacleId};
    use crate::types::FieldConfig;

    fn field_with(
        width: u32,
        height: u32,
        inflation: f32,
        obstacles: &[(i32, i32, u32)],
    ) -> DistanceTransform {
        let mut field = DistanceTransform::new(&FieldConfig::new(width, height, inflation, 0.0));
        for (i, &(x, y, r)) in obstacles.iter().enumerate() {
            field.seed_obstacle(&Obstacle {
                id: ObstacleId::new(i as u64),
                center: IVec2::new(x, y),
                radius: r,
            });
        }
        field.settle();
        field
    }

    #[test]
    fn pattern_is_sorted_by_distance_then_row_major() {
        let pattern = SearchPattern::new(2);
        let first: Vec<IVec2> = pattern.offsets.iter().take(5).copied().collect();
        assert_eq!(
            first,
            vec![
                IVec2::new(0, 0),
                IVec2::new(0, -1),
                IVec2::new(-1, 0),
                IVec2::new(1, 0),
                IVec2::new(0, 1),
            ]
        );
        assert_eq!(pattern.offsets[5], IVec2::new(-1, -1));
        // Disc of radius 2: 13 offsets.
        assert_eq!(pattern.len(), 13);
    }

    #[test]
    fn cells_around_skips_outside_grid() {
        let pattern = SearchPattern::new(1);
        let cells: Vec<UVec2> = pattern.cells_around(UVec2::ZERO, 4, 4).collect();
        assert_eq!(
            cells,
            vec![UVec2::new(0, 0), UVec2::new(1, 0), UVec2::new(0, 1)]
        );
    }

    #[test]
    fn can_place_compares_distance_with_radius() {
        let field = field_with(10, 10, 50.0, &[(5, 5, 1)]);
        assert!(!can_place(&field, UVec2::new(5, 5), 1.0));
        assert!(can_place(&field, UVec2::new(5, 5), 0.0));
        assert!(can_place(&field, UVec2::new(6, 5), 1.0));
        assert!(!can_place(&field, UVec2::new(6, 5), 1.5));
        assert!(!can_place(&field, UVec2::new(10, 0), 0.0));
    }

    #[test]
    fn large_radius_beyond_inflation_checks_occupancy() {
        // Inflation 2 leaves (9, 0) unreached although the obstacle is 9 away.
        let field = field_with(12, 1, 2.0, &[(0, 0, 1)]);
        assert!(field.distance_at(UVec2::new(9, 0)).unwrap().is_infinite());
        assert!(!can_place(&field, UVec2::new(9, 0), 10.0));
        assert!(can_place(&field, UVec2::new(9, 0), 9.0));
        assert!(can_place(&field, UVec2::new(9, 0), 1.5));
    }

    #[test]
    fn find_closest_uses_ring_order() {
        let field = field_with(10, 10, 50.0, &[(5, 5, 1)]);
        let pattern = SearchPattern::new(8);
        assert_eq!(
            find_closest(&field, &pattern, UVec2::new(5, 5), 1.0),
            Some(UVec2::new(5, 4))
        );
        assert_eq!(
            find_closest(&field, &pattern, UVec2::new(0, 0), 1.0),
            Some(UVec2::new(0, 0))
        );
    }

    #[test]
    fn find_closest_respects_ceiling() {
        // 3x3 block; from its centre the first cell at distance >= 2 is two rings out.
        let field = field_with(20, 20, 50.0, &[(10, 10, 2)]);
        assert_eq!(
            find_closest(&field, &SearchPattern::new(2), UVec2::new(10, 10), 2.0),
            None
        );
        let found = find_closest(&field, &SearchPattern::new(4), UVec2::new(10, 10), 2.0)
            .expect("position within ceiling");
        assert!(field.distance_at(found).unwrap() >= 2.0);
        assert_eq!(found, UVec2::new(10, 7));
    }
}
