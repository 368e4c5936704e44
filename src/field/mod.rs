//! Incremental Euclidean distance transform.
//!
//! Obstacle cells are zero-distance sources. Every reached cell remembers the
//! source it was derived from, and layers are relaxed ring by ring: a
//! candidate cell looks at the sources carried by its eight neighbours and
//! keeps the closest one by true Euclidean distance. Cells re-enter the
//! frontier whenever they improve, so a better source can overtake an earlier
//! one across rings.
//!
//! Work is only ever done in whole layers. After any [`DistanceTransform::step_layer`]
//! every finite distance is the exact distance to some obstacle cell (never
//! smaller than the true clearance) and unreached cells report infinity.

mod frontier;
#[cfg(feature = "rayon")]
mod parallel;

use glam::{IVec2, UVec2};

use crate::grid::{Cell, Grid2d, euclidean};
use crate::obstacles::Obstacle;
use crate::types::{Connectivity, FieldConfig};

use frontier::Frontier;

const CARDINAL: [IVec2; 4] = [
    IVec2::new(0, -1),
    IVec2::new(-1, 0),
    IVec2::new(1, 0),
    IVec2::new(0, 1),
];

const DIAGONAL: [IVec2; 4] = [
    IVec2::new(-1, -1),
    IVec2::new(1, -1),
    IVec2::new(-1, 1),
    IVec2::new(1, 1),
];

const NEIGHBOURS: [IVec2; 8] = [
    IVec2::new(-1, -1),
    IVec2::new(0, -1),
    IVec2::new(1, -1),
    IVec2::new(-1, 0),
    IVec2::new(1, 0),
    IVec2::new(-1, 1),
    IVec2::new(0, 1),
    IVec2::new(1, 1),
];

/// Counters for one processed layer.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LayerStats {
    pub generation: u32,
    /// Frontier cells the layer expanded from.
    pub processed: usize,
    /// Distinct neighbours that were relaxed.
    pub candidates: usize,
    /// Cells whose distance improved; they form the next layer.
    pub updated: usize,
}

/// Result of relaxing one candidate: written back only to that candidate.
#[derive(Debug, Clone, Copy)]
struct Relaxation {
    index: u32,
    distance: f32,
    source: UVec2,
}

/// The distance field together with its propagation state.
#[derive(Debug)]
pub struct DistanceTransform {
    cells: Grid2d<Cell>,
    /// Number of obstacle footprints covering each cell.
    coverage: Vec<u32>,
    frontier: Frontier,
    connectivity: Connectivity,
    inflation_radius: f32,
    #[cfg_attr(not(feature = "rayon"), allow(dead_code))]
    parallel_threshold: usize,
    generation: u32,
}

impl DistanceTransform {
    pub fn new(config: &FieldConfig) -> Self {
        let cell_count = config.cell_count();
        Self {
            cells: Grid2d::filled(config.width, config.height, Cell::EMPTY),
            coverage: vec![0; cell_count],
            frontier: Frontier::new(cell_count),
            connectivity: config.connectivity,
            inflation_radius: config.inflation_radius,
            parallel_threshold: config.parallel_threshold,
            generation: 0,
        }
    }

    pub fn cells(&self) -> &Grid2d<Cell> {
        &self.cells
    }

    pub fn width(&self) -> u32 {
        self.cells.width()
    }

    pub fn height(&self) -> u32 {
        self.cells.height()
    }

    pub fn inflation_radius(&self) -> f32 {
        self.inflation_radius
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }

    pub fn distance_at(&self, pos: UVec2) -> Option<f32> {
        self.cells.get(pos).map(|cell| cell.distance)
    }

    /// True when no propagation work is pending.
    pub fn is_settled(&self) -> bool {
        self.frontier.is_empty()
    }

    /// Cells waiting in the current layer.
    pub fn frontier_len(&self) -> usize {
        self.frontier.len()
    }

    /// Mark the obstacle footprint occupied and queue new sources.
    ///
    /// Returns the number of cells that became occupied.
    pub fn seed_obstacle(&mut self, obstacle: &Obstacle) -> usize {
        let mut seeded = 0;
        for pos in obstacle.footprint(self.width(), self.height()) {
            let i = self.cells.index(pos);
            self.coverage[i] += 1;
            let cell = self.cells.at_mut(i);
            if !cell.occupied {
                *cell = Cell::obstacle(pos, self.generation);
                self.frontier.push(i as u32);
                seeded += 1;
            }
        }
        seeded
    }

    /// Remove the obstacle footprint and invalidate every cell whose source
    /// is no longer occupied.
    ///
    /// Only the footprint's bounding box grown by the inflation radius is
    /// scanned: no cell farther than that can carry a source from it. Reached
    /// neighbours of the invalidated region are pushed back onto the frontier
    /// so surviving sources flow back in. Returns the number of invalidated
    /// cells.
    pub fn clear_obstacle(&mut self, obstacle: &Obstacle) -> usize {
        let width = self.width();
        let height = self.height();
        for pos in obstacle.footprint(width, height) {
            let i = self.cells.index(pos);
            self.coverage[i] = self.coverage[i].saturating_sub(1);
            if self.coverage[i] == 0 {
                self.cells.at_mut(i).occupied = false;
            }
        }

        let (min, max) = obstacle.bounds();
        let reach = self.inflation_radius.ceil() as i64 + 1;
        let x0 = (min.x as i64 - reach).clamp(0, width as i64 - 1) as u32;
        let y0 = (min.y as i64 - reach).clamp(0, height as i64 - 1) as u32;
        let x1 = (max.x as i64 + reach).clamp(0, width as i64 - 1) as u32;
        let y1 = (max.y as i64 + reach).clamp(0, height as i64 - 1) as u32;

        let mut invalidated = Vec::new();
        for y in y0..=y1 {
            for x in x0..=x1 {
                let i = self.cells.index(UVec2::new(x, y));
                if let Some(source) = self.cells.at(i).source {
                    if self.coverage[self.cells.index(source)] == 0 {
                        invalidated.push(i);
                    }
                }
            }
        }

        for &i in &invalidated {
            *self.cells.at_mut(i) = Cell {
                generation: self.generation,
                ..Cell::EMPTY
            };
        }

        let pass = self.frontier.begin_pass();
        for &i in &invalidated {
            let pos = self.cells.position(i);
            for &offset in &NEIGHBOURS {
                let Some(n) = self.cells.neighbour(pos, offset) else {
                    continue;
                };
                let ni = self.cells.index(n);
                if self.cells.at(ni).is_reached() && self.frontier.mark(ni as u32, pass) {
                    self.frontier.push(ni as u32);
                }
            }
        }

        invalidated.len()
    }

    /// Forget every obstacle and distance. Used before a full rebuild.
    pub fn reset(&mut self) {
        self.cells.fill(Cell::EMPTY);
        self.coverage.fill(0);
        self.frontier.clear();
    }

    /// Relax one ring of the frontier.
    pub fn step_layer(&mut self) -> LayerStats {
        self.generation = self.generation.wrapping_add(1);
        let processed = self.frontier.len();

        let mut candidates = self.gather_candidates();
        self.frontier.dedup(&mut candidates);
        let relaxations = self.relax_all(&candidates);

        let next = self.frontier.next_mut();
        for r in &relaxations {
            let cell = self.cells.at_mut(r.index as usize);
            cell.distance = r.distance;
            cell.source = Some(r.source);
            cell.generation = self.generation;
            next.push(r.index);
        }
        self.frontier.advance();

        let stats = LayerStats {
            generation: self.generation,
            processed,
            candidates: candidates.len(),
            updated: relaxations.len(),
        };
        log::trace!(
            "layer {}: {} frontier cells, {} candidates, {} updated",
            stats.generation,
            stats.processed,
            stats.candidates,
            stats.updated
        );
        stats
    }

    /// Step until the frontier is empty. Returns the number of layers run.
    pub fn settle(&mut self) -> usize {
        let mut layers = 0;
        while !self.is_settled() {
            self.step_layer();
            layers += 1;
        }
        layers
    }

    /// Unoccupied neighbours of a frontier cell that must be relaxed next.
    ///
    /// Cardinal neighbours always are. Diagonal neighbours are too under
    /// 8-connectivity; under 4-connectivity only already reached diagonals
    /// are, so the wavefront grows four ways while source improvements still
    /// reach every cell that depends on them.
    fn push_candidates(&self, index: u32, out: &mut Vec<u32>) {
        let pos = self.cells.position(index as usize);
        for &offset in &CARDINAL {
            if let Some(n) = self.cells.neighbour(pos, offset) {
                let ni = self.cells.index(n);
                if !self.cells.at(ni).occupied {
                    out.push(ni as u32);
                }
            }
        }
        let reached_only = self.connectivity == Connectivity::Four;
        for &offset in &DIAGONAL {
            if let Some(n) = self.cells.neighbour(pos, offset) {
                let ni = self.cells.index(n);
                let cell = self.cells.at(ni);
                if !cell.occupied && (!reached_only || cell.is_reached()) {
                    out.push(ni as u32);
                }
            }
        }
    }

    fn gather_serial(&self) -> Vec<u32> {
        let layer = self.frontier.current();
        let mut candidates = Vec::with_capacity(layer.len() * 2);
        for &i in layer {
            self.push_candidates(i, &mut candidates);
        }
        candidates
    }

    fn relax(&self, index: u32) -> Option<Relaxation> {
        let pos = self.cells.position(index as usize);
        let mut best = self.cells.at(index as usize).distance;
        let mut best_source = None;
        for &offset in &NEIGHBOURS {
            let Some(n) = self.cells.neighbour(pos, offset) else {
                continue;
            };
            let Some(source) = self.cells.at(self.cells.index(n)).source else {
                continue;
            };
            let d = euclidean(pos, source);
            if d < best && d <= self.inflation_radius {
                best = d;
                best_source = Some(source);
            }
        }
        best_source.map(|source| Relaxation {
            index,
            distance: best,
            source,
        })
    }

    fn relax_serial(&self, candidates: &[u32]) -> Vec<Relaxation> {
        candidates.iter().filter_map(|&i| self.relax(i)).collect()
    }

    #[cfg(not(feature = "rayon"))]
    fn gather_candidates(&self) -> Vec<u32> {
        self.gather_serial()
    }

    #[cfg(not(feature = "rayon"))]
    fn relax_all(&self, candidates: &[u32]) -> Vec<Relaxation> {
        self.relax_serial(candidates)
    }
}
