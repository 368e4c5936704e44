//! Time-budgeted draining of layered work.
//!
//! The embedding application calls [`BudgetedScheduler::drain`] from its own
//! loop (once per frame, say). Each call runs whole layers until the work is
//! settled or the budget is spent, then returns; there is no background task,
//! so stopping is simply not calling `drain` again.

use std::sync::{Mutex, TryLockError};
use std::time::{Duration, Instant};

use crate::field::LayerStats;
use crate::types::FieldError;

/// Work that can be advanced one layer at a time.
pub trait Drainable {
    /// Run one layer. `Ok(None)` means there is nothing left to do.
    fn drain_step(&self) -> Result<Option<LayerStats>, FieldError>;

    /// True when the next [`drain_step`](Drainable::drain_step) would have
    /// nothing to do.
    fn is_drained(&self) -> Result<bool, FieldError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Budget {
    Limited(Duration),
    Unbounded,
}

impl Budget {
    /// Negative and NaN budgets clamp to zero; budgets too large for a
    /// [`Duration`] are unbounded.
    pub fn from_millis_f32(ms: f32) -> Self {
        Duration::try_from_secs_f64(f64::from(ms.max(0.0)) / 1000.0)
            .map_or(Budget::Unbounded, Budget::Limited)
    }

    /// `None` when unbounded or when the deadline is past what `Instant` can
    /// represent.
    fn deadline(self, start: Instant) -> Option<Instant> {
        match self {
            Budget::Limited(budget) => start.checked_add(budget),
            Budget::Unbounded => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrainStatus {
    /// The frontier is empty and no mutation is pending.
    Settled,
    /// The budget ran out with work remaining.
    Yielded,
    /// Another drain was already running; nothing was done.
    Busy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrainReport {
    pub status: DrainStatus,
    pub layers: usize,
    pub cells_updated: usize,
    pub elapsed: Duration,
}

impl DrainReport {
    fn busy() -> Self {
        Self {
            status: DrainStatus::Busy,
            layers: 0,
            cells_updated: 0,
            elapsed: Duration::ZERO,
        }
    }

    pub fn is_settled(&self) -> bool {
        self.status == DrainStatus::Settled
    }
}

/// Drains a [`Drainable`] within a per-call budget, one drain at a time.
#[derive(Debug)]
pub struct BudgetedScheduler {
    budget: Duration,
    gate: Mutex<()>,
}

impl BudgetedScheduler {
    pub fn new(budget: Duration) -> Self {
        Self {
            budget,
            gate: Mutex::new(()),
        }
    }

    pub fn budget(&self) -> Duration {
        self.budget
    }

    /// Drain with the configured budget.
    pub fn drain<D: Drainable + ?Sized>(&self, target: &D) -> Result<DrainReport, FieldError> {
        self.drain_within(target, Budget::Limited(self.budget))
    }

    /// Drain with an explicit budget. Returns a `Busy` report instead of
    /// waiting when another drain holds the scheduler.
    pub fn drain_within<D: Drainable + ?Sized>(
        &self,
        target: &D,
        budget: Budget,
    ) -> Result<DrainReport, FieldError> {
        let _guard = match self.gate.try_lock() {
            Ok(guard) => guard,
            Err(TryLockError::WouldBlock) => return Ok(DrainReport::busy()),
            Err(TryLockError::Poisoned(_)) => return Err(FieldError::Poisoned),
        };
        run(target, budget)
    }

    /// Wait for any in-flight drain, then drain until settled.
    pub fn drain_to_completion<D: Drainable + ?Sized>(
        &self,
        target: &D,
    ) -> Result<DrainReport, FieldError> {
        let _guard = self.gate.lock().map_err(|_| FieldError::Poisoned)?;
        run(target, Budget::Unbounded)
    }
}

/// At least one layer runs per call; the deadline is checked between layers,
/// so the overrun is bounded by the cost of a single layer.
fn run<D: Drainable + ?Sized>(target: &D, budget: Budget) -> Result<DrainReport, FieldError> {
    let start = Instant::now();
    let deadline = budget.deadline(start);
    let mut layers = 0;
    let mut cells_updated = 0;

    let status = loop {
        match target.drain_step()? {
            None => break DrainStatus::Settled,
            Some(stats) => {
                layers += 1;
                cells_updated += stats.updated;
            }
        }
        if deadline.is_some_and(|d| Instant::now() >= d) {
            if target.is_drained()? {
                break DrainStatus::Settled;
            }
            break DrainStatus::Yielded;
        }
    };

    Ok(DrainReport {
        status,
        layers,
        cells_updated,
        elapsed: start.elapsed(),
    })
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;

    use super::*;

    /// Counts down a fixed number of layers, sleeping in each.
    struct Countdown {
        remaining: AtomicUsize,
        layer_time: Duration,
    }

    impl Countdown {
        fn new(layers: usize, layer_time: Duration) -> Self {
            Self {
                remaining: AtomicUsize::new(layers),
                layer_time,
            }
        }
    }

    impl Drainable for Countdown {
        fn drain_step(&self) -> Result<Option<LayerStats>, FieldError> {
            let left = self.remaining.load(Ordering::SeqCst);
            if left == 0 {
                return Ok(None);
            }
            thread::sleep(self.layer_time);
            self.remaining.store(left - 1, Ordering::SeqCst);
            Ok(Some(LayerStats {
                updated: 2,
                ..Default::default()
            }))
        }

        fn is_drained(&self) -> Result<bool, FieldError> {
            Ok(self.remaining.load(Ordering::SeqCst) == 0)
        }
    }

    #[test]
    fn unbounded_drain_runs_every_layer() {
        let work = Countdown::new(5, Duration::ZERO);
        let scheduler = BudgetedScheduler::new(Duration::ZERO);
        let report = scheduler.drain_to_completion(&work).unwrap();
        assert_eq!(report.status, DrainStatus::Settled);
        assert_eq!(report.layers, 5);
        assert_eq!(report.cells_updated, 10);
    }

    #[test]
    fn zero_budget_still_makes_progress() {
        let work = Countdown::new(3, Duration::ZERO);
        let scheduler = BudgetedScheduler::new(Duration::ZERO);

        let report = scheduler.drain(&work).unwrap();
        assert_eq!(report.status, DrainStatus::Yielded);
        assert_eq!(report.layers, 1);
        assert_eq!(work.remaining.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn last_layer_past_the_deadline_reports_settled() {
        let work = Countdown::new(1, Duration::from_millis(2));
        let scheduler = BudgetedScheduler::new(Duration::ZERO);

        let report = scheduler.drain(&work).unwrap();
        assert_eq!(report.status, DrainStatus::Settled);
        assert_eq!(report.layers, 1);
    }

    #[test]
    fn limited_budget_yields_between_layers() {
        let work = Countdown::new(1000, Duration::from_millis(2));
        let scheduler = BudgetedScheduler::new(Duration::from_millis(10));

        let report = scheduler.drain(&work).unwrap();
        assert_eq!(report.status, DrainStatus::Yielded);
        assert!(report.layers >= 1);
        assert!(report.layers < 1000);
        assert!(report.elapsed >= Duration::from_millis(10));
    }

    #[test]
    fn idle_work_settles_immediately() {
        let work = Countdown::new(0, Duration::ZERO);
        let scheduler = BudgetedScheduler::new(Duration::from_millis(1));
        let report = scheduler.drain(&work).unwrap();
        assert!(report.is_settled());
        assert_eq!(report.layers, 0);
    }

    #[test]
    fn concurrent_drain_reports_busy() {
        let work = Countdown::new(20, Duration::from_millis(5));
        let scheduler = BudgetedScheduler::new(Duration::from_secs(5));

        thread::scope(|s| {
            let _guard = scheduler.gate.lock().unwrap();
            let handle = s.spawn(|| scheduler.drain(&work).unwrap());
            let report = handle.join().unwrap();
            assert_eq!(report.status, DrainStatus::Busy);
        });
        assert_eq!(work.remaining.load(Ordering::SeqCst), 20);
    }

    #[test]
    fn budget_from_millis_clamps_negative() {
        assert_eq!(
            Budget::from_millis_f32(-3.0),
            Budget::Limited(Duration::ZERO)
        );
        assert_eq!(
            Budget::from_millis_f32(1.5),
            Budget::Limited(Duration::from_micros(1500))
        );
        assert_eq!(
            Budget::from_millis_f32(f32::NAN),
            Budget::Limited(Duration::ZERO)
        );
    }

    #[test]
    fn huge_budgets_do_not_overflow() {
        assert_eq!(Budget::from_millis_f32(1e25), Budget::Unbounded);
        assert_eq!(Budget::from_millis_f32(f32::MAX), Budget::Unbounded);
        assert_eq!(Budget::Limited(Duration::MAX).deadline(Instant::now()), None);

        let work = Countdown::new(4, Duration::ZERO);
        let scheduler = BudgetedScheduler::new(Duration::MAX);
        let report = scheduler.drain(&work).unwrap();
        assert!(report.is_settled());
        assert_eq!(report.layers, 4);
    }
}
