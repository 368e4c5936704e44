use thiserror::Error;

use crate::obstacles::ObstacleId;

#[derive(Debug, Error)]
pub enum FieldError {
    #[error("out of bounds: {0}")]
    OutOfBounds(String),
    #[error("invalid radius: {0}")]
    InvalidRadius(String),
    #[error("obstacle {0} not found")]
    NotFound(ObstacleId),
    #[error("clearance map has been disposed")]
    Disposed,
    #[error("invalid config: {0}")]
    InvalidConfig(String),
    #[error("field lock poisoned by a panicking thread")]
    Poisoned,
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("yaml error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
}
