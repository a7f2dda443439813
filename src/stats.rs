use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

/// Point-in-time view of sweep activity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepStats {
    /// Completed sweep cycles, background and manual.
    pub cycles: u64,
    /// Slots cleared by sweeping.
    pub evicted: u64,
    /// Set once the background sweeper has died on a predicate panic.
    pub faulted: bool,
}

#[derive(Debug, Default)]
pub(crate) struct SweepCounters {
    cycles: AtomicU64,
    evicted: AtomicU64,
    faulted: AtomicBool,
}

impl SweepCounters {
    pub(crate) fn record_evictions(&self, count: usize) {
        self.evicted.fetch_add(count as u64, Ordering::Relaxed);
    }

    pub(crate) fn record_cycle(&self) {
        self.cycles.fetch_add(1, Ordering::Release);
    }

    pub(crate) fn mark_faulted(&self) {
        self.faulted.store(true, Ordering::Release);
    }

    pub(crate) fn snapshot(&self) -> SweepStats {
        SweepStats {
            cycles: self.cycles.load(Ordering::Acquire),
            evicted: self.evicted.load(Ordering::Relaxed),
            faulted: self.faulted.load(Ordering::Acquire),
        }
    }
}
