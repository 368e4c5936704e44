pub mod cell;
pub mod grid2d;

pub use cell::{Cell, euclidean};
pub use grid2d::Grid2d;
