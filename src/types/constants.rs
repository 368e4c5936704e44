/// Ring search ceiling used by `find_closest_available_position` when the
/// config does not set one.
pub const DEFAULT_MAX_SEARCH_RADIUS: u32 = 64;

/// Candidate count below which a layer is relaxed on the calling thread.
pub const DEFAULT_PARALLEL_THRESHOLD: usize = 4096;

/// Distance reported for cells the field has not reached.
pub const UNREACHED: f32 = f32::INFINITY;
