//! Rayon-backed layer processing.
//!
//! Candidate gathering folds into per-worker lists that are concatenated once
//! the layer's frontier has been walked; relaxation reads the shared field and
//! produces one result per candidate, so workers never write to the grid.

use rayon::prelude::*;

use super::{DistanceTransform, Relaxation};

impl DistanceTransform {
    pub(super) fn gather_candidates(&self) -> Vec<u32> {
        let layer = self.frontier.current();
        if layer.len() < self.parallel_threshold {
            return self.gather_serial();
        }
        layer
            .par_iter()
            .fold(Vec::new, |mut acc, &i| {
                self.push_candidates(i, &mut acc);
                acc
            })
            .reduce(Vec::new, |mut a, mut b| {
                a.append(&mut b);
                a
            })
    }

    pub(super) fn relax_all(&self, candidates: &[u32]) -> Vec<Relaxation> {
        if candidates.len() < self.parallel_threshold {
            return self.relax_serial(candidates);
        }
        candidates
            .par_iter()
            .filter_map(|&i| self.relax(i))
            .collect()
    }
}
