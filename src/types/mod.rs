pub mod config;
pub mod constants;
pub mod error;

pub use config::{Connectivity, FieldConfig, ObstacleSpec};
pub use constants::*;
pub use error::FieldError;
