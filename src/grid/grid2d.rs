use glam::{IVec2, UVec2};

use crate::types::FieldError;

/// Fixed-size row-major 2D store. Index of `(x, y)` is `y * width + x`.
#[derive(Debug, Clone)]
pub struct Grid2d<T> {
    width: u32,
    height: u32,
    data: Vec<T>,
}

impl<T> Grid2d<T> {
    pub fn new(width: u32, height: u32, data: Vec<T>) -> Result<Self, FieldError> {
        let expected_len = (width as usize) * (height as usize);
        if data.len() != expected_len {
            return Err(FieldError::InvalidConfig(format!(
                "data length {} does not match grid size {}",
                data.len(),
                expected_len
            )));
        }

        Ok(Self {
            width,
            height,
            data,
        })
    }

    pub fn filled(width: u32, height: u32, value: T) -> Self
    where
        T: Clone,
    {
        Self {
            width,
            height,
            data: vec![value; (width as usize) * (height as usize)],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[inline]
    pub fn contains(&self, pos: IVec2) -> bool {
        pos.x >= 0 && pos.y >= 0 && (pos.x as u32) < self.width && (pos.y as u32) < self.height
    }

    /// Convert signed coordinates to a cell, failing with `OutOfBounds`.
    pub fn locate(&self, pos: IVec2) -> Result<UVec2, FieldError> {
        if !self.contains(pos) {
            return Err(FieldError::OutOfBounds(format!(
                "cell ({}, {}) out of bounds for grid {}x{}",
                pos.x, pos.y, self.width, self.height
            )));
        }
        Ok(pos.as_uvec2())
    }

    pub fn get(&self, pos: UVec2) -> Option<&T> {
        if pos.x >= self.width || pos.y >= self.height {
            return None;
        }
        Some(&self.data[self.index(pos)])
    }

    pub fn get_mut(&mut self, pos: UVec2) -> Option<&mut T> {
        if pos.x >= self.width || pos.y >= self.height {
            return None;
        }
        let idx = self.index(pos);
        Some(&mut self.data[idx])
    }

    pub fn set(&mut self, pos: UVec2, value: T) -> Result<(), FieldError> {
        match self.get_mut(pos) {
            Some(cell) => {
                *cell = value;
                Ok(())
            }
            None => Err(FieldError::OutOfBounds(format!(
                "cell ({}, {}) out of bounds for grid {}x{}",
                pos.x, pos.y, self.width, self.height
            ))),
        }
    }

    /// Row-major index of an in-bounds cell.
    #[inline]
    pub fn index(&self, pos: UVec2) -> usize {
        (pos.y as usize) * (self.width as usize) + (pos.x as usize)
    }

    #[inline]
    pub fn position(&self, index: usize) -> UVec2 {
        let w = self.width as usize;
        UVec2::new((index % w) as u32, (index / w) as u32)
    }

    /// The cell at `pos + offset`, if it is inside the grid.
    #[inline]
    pub fn neighbour(&self, pos: UVec2, offset: IVec2) -> Option<UVec2> {
        let n = pos.as_ivec2() + offset;
        self.contains(n).then(|| n.as_uvec2())
    }

    #[inline]
    pub fn at(&self, index: usize) -> &T {
        &self.data[index]
    }

    #[inline]
    pub fn at_mut(&mut self, index: usize) -> &mut T {
        &mut self.data[index]
    }

    /// Overwrite every cell.
    pub fn fill(&mut self, value: T)
    where
        T: Clone,
    {
        self.data.fill(value);
    }

    pub fn data(&self) -> &[T] {
        &self.data
    }

    pub fn iter_cells(&self) -> impl Iterator<Item = (UVec2, &T)> + '_ {
        self.data
            .iter()
            .enumerate()
            .map(move |(i, cell)| (self.position(i), cell))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_rejects_mismatched_data() {
        assert!(Grid2d::new(3, 2, vec![0u8; 6]).is_ok());
        assert!(matches!(
            Grid2d::new(3, 2, vec![0u8; 5]),
            Err(FieldError::InvalidConfig(_))
        ));
    }

    #[test]
    fn set_out_of_bounds_is_rejected_not_clamped() {
        let mut grid = Grid2d::filled(4, 4, 0u8);
        assert!(matches!(
            grid.set(UVec2::new(4, 0), 1),
            Err(FieldError::OutOfBounds(_))
        ));
        assert!(grid.data().iter().all(|&v| v == 0));

        grid.set(UVec2::new(3, 3), 7).unwrap();
        assert_eq!(grid.get(UVec2::new(3, 3)), Some(&7));
        assert_eq!(grid.get(UVec2::new(0, 4)), None);
    }

    #[test]
    fn locate_rejects_negative_and_large_coordinates() {
        let grid = Grid2d::filled(5, 3, 0u8);
        assert_eq!(grid.locate(IVec2::new(4, 2)).unwrap(), UVec2::new(4, 2));
        assert!(matches!(
            grid.locate(IVec2::new(-1, 0)),
            Err(FieldError::OutOfBounds(_))
        ));
        assert!(matches!(
            grid.locate(IVec2::new(0, 3)),
            Err(FieldError::OutOfBounds(_))
        ));
    }

    #[test]
    fn index_and_position_are_inverse() {
        let grid = Grid2d::filled(7, 5, 0u8);
        for i in 0..grid.len() {
            assert_eq!(grid.index(grid.position(i)), i);
        }
        assert_eq!(grid.index(UVec2::new(2, 3)), 3 * 7 + 2);
    }

    #[test]
    fn neighbour_stays_inside_grid() {
        let grid = Grid2d::filled(3, 3, 0u8);
        let corner = UVec2::new(0, 0);
        assert_eq!(grid.neighbour(corner, IVec2::new(-1, 0)), None);
        assert_eq!(
            grid.neighbour(corner, IVec2::new(1, 1)),
            Some(UVec2::new(1, 1))
        );
        assert_eq!(grid.neighbour(UVec2::new(2, 2), IVec2::new(0, 1)), None);
    }

    #[test]
    fn fill_resets_every_cell() {
        let mut grid = Grid2d::filled(2, 2, 1u8);
        grid.set(UVec2::new(1, 0), 9).unwrap();
        grid.fill(0);
        assert!(grid.iter_cells().all(|(_, v)| *v == 0));
    }
}
