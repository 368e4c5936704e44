use std::path::Path;

use image::{GrayImage, Luma};

use crate::grid::{Cell, Grid2d};
use crate::types::FieldError;

/// Render a distance field as a grayscale image.
///
/// - Occupied cells are black.
/// - Free cells brighten linearly with distance, saturating to white at
///   `max_distance`.
/// - Unreached cells are white.
///
/// Row `y = 0` is the top of the image.
pub fn distance_field_to_image(cells: &Grid2d<Cell>, max_distance: f32) -> GrayImage {
    let mut img = GrayImage::new(cells.width(), cells.height());
    for (pos, cell) in cells.iter_cells() {
        img.put_pixel(pos.x, pos.y, Luma([distance_to_gray(cell, max_distance)]));
    }
    img
}

pub fn save_distance_field(
    cells: &Grid2d<Cell>,
    max_distance: f32,
    path: impl AsRef<Path>,
) -> Result<(), FieldError> {
    distance_field_to_image(cells, max_distance).save(path.as_ref())?;
    Ok(())
}

fn distance_to_gray(cell: &Cell, max_distance: f32) -> u8 {
    if cell.occupied {
        return 0;
    }
    if !cell.distance.is_finite() || max_distance <= 0.0 {
        return 255;
    }
    let t = (cell.distance / max_distance).clamp(0.0, 1.0);
    (t * 255.0).round() as u8
}
