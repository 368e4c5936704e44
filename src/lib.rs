pub mod field;
pub mod grid;
pub mod map;
pub mod obstacles;
pub mod query;
pub mod scheduler;
pub mod types;
pub mod visualization;

pub use field::{DistanceTransform, LayerStats};
pub use grid::{Cell, Grid2d};
pub use map::{ClearanceMap, PendingInflation};
pub use obstacles::{Obstacle, ObstacleId, ObstacleRegistry};
pub use query::SearchPattern;
pub use scheduler::{Budget, BudgetedScheduler, DrainReport, DrainStatus, Drainable};
pub use types::{Connectivity, FieldConfig, FieldError, ObstacleSpec};
