//! [`ClearanceMap`]: the facade that owns one field and everything around it.
//!
//! The grid, the propagation state and the obstacle registry live behind one
//! `RwLock`. A drain step holds the write lock for exactly one layer, so an
//! obstacle mutation, which also takes the write lock, always lands on a
//! layer boundary and is visible to the next query. Queries take the read
//! lock and can run on other threads while a drain is in progress.

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::RwLock;

use glam::{IVec2, UVec2};
use image::GrayImage;

use crate::field::{DistanceTransform, LayerStats};
use crate::obstacles::{Obstacle, ObstacleId, ObstacleRegistry};
use crate::query::{self, SearchPattern};
use crate::scheduler::{Budget, BudgetedScheduler, DrainReport, Drainable};
use crate::types::{FieldConfig, FieldError};
use crate::visualization;

/// Returned by [`ClearanceMap::add_obstacle`]. Poll it with
/// [`ClearanceMap::is_inflated`] to learn when the field around the new
/// obstacle has fully settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingInflation {
    id: ObstacleId,
    ticket: u64,
}

impl PendingInflation {
    pub fn id(&self) -> ObstacleId {
        self.id
    }
}

#[derive(Debug)]
struct FieldState {
    transform: DistanceTransform,
    registry: ObstacleRegistry,
    /// Ticket of the last mutation applied to the grid.
    applied: u64,
    /// Value of `applied` the last time the frontier was seen empty.
    settled: u64,
}

impl FieldState {
    fn next_ticket(&mut self) -> u64 {
        self.applied += 1;
        self.mark_if_settled();
        self.applied
    }

    fn mark_if_settled(&mut self) {
        if self.transform.is_settled() {
            self.settled = self.applied;
        }
    }
}

/// The locked field. Only the scheduler drives it.
#[derive(Debug)]
struct SharedField(RwLock<Option<FieldState>>);

impl SharedField {
    fn read<R>(&self, f: impl FnOnce(&FieldState) -> Result<R, FieldError>) -> Result<R, FieldError> {
        let guard = self.0.read().map_err(|_| FieldError::Poisoned)?;
        f(guard.as_ref().ok_or(FieldError::Disposed)?)
    }

    fn write<R>(
        &self,
        f: impl FnOnce(&mut FieldState) -> Result<R, FieldError>,
    ) -> Result<R, FieldError> {
        let mut guard = self.0.write().map_err(|_| FieldError::Poisoned)?;
        f(guard.as_mut().ok_or(FieldError::Disposed)?)
    }

    fn release(&self) -> Result<Option<FieldState>, FieldError> {
        Ok(self.0.write().map_err(|_| FieldError::Poisoned)?.take())
    }
}

impl Drainable for SharedField {
    fn drain_step(&self) -> Result<Option<LayerStats>, FieldError> {
        self.write(|state| {
            if state.transform.is_settled() {
                state.mark_if_settled();
                return Ok(None);
            }
            let stats = state.transform.step_layer();
            state.mark_if_settled();
            Ok(Some(stats))
        })
    }

    fn is_drained(&self) -> Result<bool, FieldError> {
        self.read(|state| Ok(state.transform.is_settled()))
    }
}

#[derive(Debug)]
pub struct ClearanceMap {
    config: FieldConfig,
    pattern: SearchPattern,
    scheduler: BudgetedScheduler,
    field: SharedField,
    disposed: AtomicBool,
}

impl ClearanceMap {
    /// Allocate the grid and add any obstacles listed in the config.
    pub fn new(config: FieldConfig) -> Result<Self, FieldError> {
        config.validate()?;

        let map = Self {
            pattern: SearchPattern::new(config.max_search_radius),
            scheduler: BudgetedScheduler::new(config.frame_budget()),
            field: SharedField(RwLock::new(Some(FieldState {
                transform: DistanceTransform::new(&config),
                registry: ObstacleRegistry::new(config.width, config.height),
                applied: 0,
                settled: 0,
            }))),
            disposed: AtomicBool::new(false),
            config,
        };

        for spec in &map.config.obstacles {
            map.add_obstacle(spec.center(), spec.radius)?;
        }

        log::info!(
            "clearance map {}x{} created (inflation radius {}, budget {:?})",
            map.config.width,
            map.config.height,
            map.config.inflation_radius,
            map.scheduler.budget()
        );
        Ok(map)
    }

    pub fn create(
        width: u32,
        height: u32,
        inflation_radius: f32,
        frame_budget_ms: f32,
    ) -> Result<Self, FieldError> {
        Self::new(FieldConfig::new(
            width,
            height,
            inflation_radius,
            frame_budget_ms,
        ))
    }

    /// Load a YAML config and create the map from it.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, FieldError> {
        Self::new(FieldConfig::load(path)?)
    }

    pub fn config(&self) -> &FieldConfig {
        &self.config
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::Acquire)
    }

    /// Register an obstacle and mark its footprint occupied. Distances
    /// around it settle as the field is drained.
    pub fn add_obstacle(&self, center: IVec2, radius: i32) -> Result<PendingInflation, FieldError> {
        self.field.write(|state| {
            let obstacle = state.registry.insert(center, radius)?;
            let seeded = state.transform.seed_obstacle(&obstacle);
            let ticket = state.next_ticket();
            log::debug!(
                "obstacle {} added at ({}, {}) radius {}, {} cells seeded",
                obstacle.id,
                center.x,
                center.y,
                radius,
                seeded
            );
            Ok(PendingInflation {
                id: obstacle.id,
                ticket,
            })
        })
    }

    /// Unregister an obstacle. Cells that took their distance from it are
    /// reset to unreached right away and refilled as the field is drained.
    pub fn remove_obstacle(&self, id: ObstacleId) -> Result<(), FieldError> {
        self.field.write(|state| {
            let obstacle = state.registry.remove(id)?;
            let invalidated = state.transform.clear_obstacle(&obstacle);
            state.next_ticket();
            log::debug!("obstacle {} removed, {} cells invalidated", id, invalidated);
            Ok(())
        })
    }

    /// Reset the field and reseed it from every registered obstacle.
    pub fn rebuild(&self) -> Result<(), FieldError> {
        self.field.write(|state| {
            state.transform.reset();
            for obstacle in state.registry.iter() {
                state.transform.seed_obstacle(obstacle);
            }
            state.next_ticket();
            log::debug!("field rebuilt from {} obstacles", state.registry.len());
            Ok(())
        })
    }

    pub fn obstacle(&self, id: ObstacleId) -> Result<Option<Obstacle>, FieldError> {
        self.field.read(|state| Ok(state.registry.get(id).copied()))
    }

    pub fn obstacle_count(&self) -> Result<usize, FieldError> {
        self.field.read(|state| Ok(state.registry.len()))
    }

    /// True once the field has drained to completion after the obstacle
    /// behind `pending` was added.
    pub fn is_inflated(&self, pending: &PendingInflation) -> Result<bool, FieldError> {
        self.field.read(|state| Ok(state.settled >= pending.ticket))
    }

    /// No propagation work left.
    pub fn is_settled(&self) -> Result<bool, FieldError> {
        self.field.is_drained()
    }

    /// Run propagation for at most the configured frame budget.
    pub fn drain(&self) -> Result<DrainReport, FieldError> {
        self.ensure_live()?;
        let report = self.scheduler.drain(&self.field)?;
        self.log_report(&report);
        Ok(report)
    }

    /// Run propagation with a caller-supplied budget.
    pub fn drain_within(&self, budget: Budget) -> Result<DrainReport, FieldError> {
        self.ensure_live()?;
        let report = self.scheduler.drain_within(&self.field, budget)?;
        self.log_report(&report);
        Ok(report)
    }

    /// Block until the field is settled.
    pub fn complete_inflation_now(&self) -> Result<DrainReport, FieldError> {
        self.ensure_live()?;
        let report = self.scheduler.drain_to_completion(&self.field)?;
        self.log_report(&report);
        Ok(report)
    }

    /// Current distance of the cell at `pos` to the nearest obstacle cell.
    pub fn distance_at(&self, pos: IVec2) -> Result<f32, FieldError> {
        self.field.read(|state| {
            let cells = state.transform.cells();
            let cell = cells.locate(pos)?;
            Ok(cells.get(cell).map_or(f32::INFINITY, |c| c.distance))
        })
    }

    /// Whether an object of `radius` centred on `pos` keeps clear of every
    /// obstacle, according to the field as currently propagated.
    pub fn can_place_object(&self, pos: IVec2, radius: f32) -> Result<bool, FieldError> {
        check_query_radius(radius)?;
        self.field.read(|state| {
            let cell = state.transform.cells().locate(pos)?;
            Ok(query::can_place(&state.transform, cell, radius))
        })
    }

    /// Nearest cell to `pos` where [`can_place_object`](Self::can_place_object)
    /// holds, searching up to the configured ceiling.
    pub fn find_closest_available_position(
        &self,
        pos: IVec2,
        radius: f32,
    ) -> Result<Option<UVec2>, FieldError> {
        check_query_radius(radius)?;
        self.field.read(|state| {
            let origin = state.transform.cells().locate(pos)?;
            Ok(query::find_closest(
                &state.transform,
                &self.pattern,
                origin,
                radius,
            ))
        })
    }

    /// Grayscale rendering of the current field.
    pub fn preview(&self, max_distance: f32) -> Result<GrayImage, FieldError> {
        self.field.read(|state| {
            Ok(visualization::distance_field_to_image(
                state.transform.cells(),
                max_distance,
            ))
        })
    }

    pub fn save_preview(&self, path: impl AsRef<Path>, max_distance: f32) -> Result<(), FieldError> {
        self.field.read(|state| {
            visualization::save_distance_field(state.transform.cells(), max_distance, path)
        })
    }

    /// Release the grid, frontier and registry. Every later call fails with
    /// [`FieldError::Disposed`].
    pub fn dispose(&self) -> Result<(), FieldError> {
        if self.disposed.swap(true, Ordering::AcqRel) {
            return Err(FieldError::Disposed);
        }
        drop(self.field.release()?);
        log::info!("clearance map disposed");
        Ok(())
    }

    fn ensure_live(&self) -> Result<(), FieldError> {
        if self.is_disposed() {
            return Err(FieldError::Disposed);
        }
        Ok(())
    }

    fn log_report(&self, report: &DrainReport) {
        if report.is_settled() && report.layers > 0 {
            log::debug!(
                "field settled: {} layers, {} cells updated in {:?}",
                report.layers,
                report.cells_updated,
                report.elapsed
            );
        }
    }
}

fn check_query_radius(radius: f32) -> Result<(), FieldError> {
    if !(radius.is_finite() && radius >= 0.0) {
        return Err(FieldError::InvalidRadius(format!(
            "query radius must be non-negative and finite, got {radius}"
        )));
    }
    Ok(())
}
