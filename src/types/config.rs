//! Field configuration.
//!
//! Everything here is fixed when a [`ClearanceMap`](crate::ClearanceMap) is
//! created. Configs can be built in code or loaded from YAML:
//!
//! ```yaml
//! width: 128
//! height: 96
//! inflation_radius: 12.0
//! frame_budget_ms: 2.0
//! connectivity: 8
//! obstacles:
//!   - { x: 10, y: 12, radius: 3 }
//! ```

use std::path::Path;
use std::time::Duration;

use glam::IVec2;
use serde::{Deserialize, Serialize};

use crate::types::{DEFAULT_MAX_SEARCH_RADIUS, DEFAULT_PARALLEL_THRESHOLD, FieldError};

/// Grid adjacency used when expanding the frontier.
///
/// Relaxation always inspects all eight neighbours; this only controls which
/// neighbours of a layer become candidates for the next one.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Connectivity {
    Four,
    #[default]
    Eight,
}

impl TryFrom<u8> for Connectivity {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            4 => Ok(Self::Four),
            8 => Ok(Self::Eight),
            other => Err(format!("connectivity must be 4 or 8, got {other}")),
        }
    }
}

impl From<Connectivity> for u8 {
    fn from(value: Connectivity) -> Self {
        match value {
            Connectivity::Four => 4,
            Connectivity::Eight => 8,
        }
    }
}

/// An obstacle listed in a config file, added when the map is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObstacleSpec {
    pub x: i32,
    pub y: i32,
    pub radius: i32,
}

impl ObstacleSpec {
    pub fn center(&self) -> IVec2 {
        IVec2::new(self.x, self.y)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldConfig {
    pub width: u32,
    pub height: u32,
    /// Distance (in cells) beyond obstacle footprints that the field is
    /// propagated. Farther cells report an infinite distance.
    pub inflation_radius: f32,
    /// Time budget for a single [`drain`](crate::ClearanceMap::drain) call.
    #[serde(default)]
    pub frame_budget_ms: f32,
    #[serde(default)]
    pub connectivity: Connectivity,
    /// Ceiling for the nearest-free-cell ring search, in cells.
    #[serde(default = "default_max_search_radius")]
    pub max_search_radius: u32,
    #[serde(default = "default_parallel_threshold")]
    pub parallel_threshold: usize,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub obstacles: Vec<ObstacleSpec>,
}

fn default_max_search_radius() -> u32 {
    DEFAULT_MAX_SEARCH_RADIUS
}

fn default_parallel_threshold() -> usize {
    DEFAULT_PARALLEL_THRESHOLD
}

impl FieldConfig {
    pub fn new(width: u32, height: u32, inflation_radius: f32, frame_budget_ms: f32) -> Self {
        Self {
            width,
            height,
            inflation_radius,
            frame_budget_ms,
            connectivity: Connectivity::default(),
            max_search_radius: DEFAULT_MAX_SEARCH_RADIUS,
            parallel_threshold: DEFAULT_PARALLEL_THRESHOLD,
            obstacles: Vec::new(),
        }
    }

    /// Builder: set the frontier adjacency.
    pub fn with_connectivity(mut self, connectivity: Connectivity) -> Self {
        self.connectivity = connectivity;
        self
    }

    /// Builder: set the ring search ceiling.
    pub fn with_max_search_radius(mut self, max_search_radius: u32) -> Self {
        self.max_search_radius = max_search_radius;
        self
    }

    /// Builder: set the minimum layer size relaxed on the rayon pool.
    pub fn with_parallel_threshold(mut self, parallel_threshold: usize) -> Self {
        self.parallel_threshold = parallel_threshold;
        self
    }

    pub fn cell_count(&self) -> usize {
        (self.width as usize) * (self.height as usize)
    }

    /// The per-drain budget. Budgets too large for a [`Duration`] saturate.
    pub fn frame_budget(&self) -> Duration {
        Duration::try_from_secs_f64(f64::from(self.frame_budget_ms.max(0.0)) / 1000.0)
            .unwrap_or(Duration::MAX)
    }

    pub fn validate(&self) -> Result<(), FieldError> {
        if self.width == 0 || self.height == 0 {
            return Err(FieldError::InvalidConfig(format!(
                "grid dimensions must be positive, got {}x{}",
                self.width, self.height
            )));
        }
        if self.width > i32::MAX as u32 || self.height > i32::MAX as u32 {
            return Err(FieldError::InvalidConfig(format!(
                "grid dimensions must fit signed cell coordinates, got {}x{}",
                self.width, self.height
            )));
        }
        if self.cell_count() > u32::MAX as usize {
            return Err(FieldError::InvalidConfig(format!(
                "grid {}x{} exceeds the addressable cell count",
                self.width, self.height
            )));
        }
        if !(self.inflation_radius.is_finite() && self.inflation_radius > 0.0) {
            return Err(FieldError::InvalidConfig(format!(
                "inflation radius must be positive and finite, got {}",
                self.inflation_radius
            )));
        }
        if !(self.frame_budget_ms.is_finite() && self.frame_budget_ms >= 0.0) {
            return Err(FieldError::InvalidConfig(format!(
                "frame budget must be non-negative and finite, got {}",
                self.frame_budget_ms
            )));
        }
        Ok(())
    }

    /// Parse and validate a YAML config.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, FieldError> {
        let config: FieldConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a YAML config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, FieldError> {
        let yaml = std::fs::read_to_string(path.as_ref())?;
        Self::from_yaml_str(&yaml)
    }
}
