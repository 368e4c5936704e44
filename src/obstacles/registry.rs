use std::collections::BTreeMap;

use glam::IVec2;

use super::{Obstacle, ObstacleId};
use crate::types::FieldError;

/// Active obstacles of one grid, keyed by id.
#[derive(Debug)]
pub struct ObstacleRegistry {
    width: u32,
    height: u32,
    obstacles: BTreeMap<ObstacleId, Obstacle>,
    next_id: u64,
}

impl ObstacleRegistry {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            obstacles: BTreeMap::new(),
            next_id: 1,
        }
    }

    /// Register a disc obstacle and assign it a fresh id.
    ///
    /// Fails with `InvalidRadius` if `radius <= 0` or no footprint cell lies
    /// inside the grid.
    pub fn insert(&mut self, center: IVec2, radius: i32) -> Result<Obstacle, FieldError> {
        if radius <= 0 {
            return Err(FieldError::InvalidRadius(format!(
                "obstacle radius must be positive, got {radius}"
            )));
        }
        let obstacle = Obstacle {
            id: ObstacleId::new(self.next_id),
            center,
            radius: radius as u32,
        };
        if obstacle.footprint(self.width, self.height).next().is_none() {
            return Err(FieldError::InvalidRadius(format!(
                "obstacle at ({}, {}) with radius {} lies entirely outside the {}x{} grid",
                center.x, center.y, radius, self.width, self.height
            )));
        }

        self.next_id += 1;
        self.obstacles.insert(obstacle.id, obstacle);
        Ok(obstacle)
    }

    pub fn remove(&mut self, id: ObstacleId) -> Result<Obstacle, FieldError> {
        self.obstacles.remove(&id).ok_or(FieldError::NotFound(id))
    }

    pub fn get(&self, id: ObstacleId) -> Option<&Obstacle> {
        self.obstacles.get(&id)
    }

    pub fn len(&self) -> usize {
        self.obstacles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.obstacles.is_empty()
    }

    /// Obstacles in ascending id order.
    pub fn iter(&self) -> impl Iterator<Item = &Obstacle> {
        self.obstacles.values()
    }

    pub fn clear(&mut self) {
        self.obstacles.clear();
    }
}
