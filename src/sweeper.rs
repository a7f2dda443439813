//! Background eviction.
//!
//! One thread per cache walks every shard, holding a shard's write lock for
//! the whole table scan and asking the eviction predicate about each
//! occupied slot. Pauses between cycles and between shards go through a
//! [`Pacer`] so the cadence can be tuned, or skipped entirely in tests.

use std::any::Any;
use std::io;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::{debug, error, trace};

use crate::cache::Shared;
use crate::lifecycle::Lifecycle;

/// Decides how the sweeper waits between units of work.
pub trait Pacer: Send + 'static {
    /// Pause for `duration`. Returns false once `lifecycle` has stopped,
    /// which ends the sweeper.
    fn pause(&mut self, duration: Duration, lifecycle: &Lifecycle) -> bool;
}

/// Sleeps on the cache's stop signal, so `stop()` cuts a pause short.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadPacer;

impl Pacer for ThreadPacer {
    fn pause(&mut self, duration: Duration, lifecycle: &Lifecycle) -> bool {
        if duration.is_zero() {
            return lifecycle.is_running();
        }
        lifecycle.wait_timeout(duration)
    }
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct Schedule {
    pub(crate) sweep_interval: Duration,
    pub(crate) shard_pause: Duration,
}

pub(crate) fn spawn<P, F>(
    name: String,
    shared: Arc<Shared>,
    schedule: Schedule,
    pacer: P,
    evict: F,
) -> io::Result<JoinHandle<()>>
where
    P: Pacer,
    F: FnMut(&[u8]) -> bool + Send + 'static,
{
    thread::Builder::new()
        .name(name)
        .spawn(move || run(shared, schedule, pacer, evict))
}

fn run<P, F>(shared: Arc<Shared>, schedule: Schedule, mut pacer: P, mut evict: F)
where
    P: Pacer,
    F: FnMut(&[u8]) -> bool,
{
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
        sweep_loop(&shared, schedule, &mut pacer, &mut evict)
    }));

    match outcome {
        Ok(()) => debug!("sweeper exited"),
        Err(payload) => {
            shared.stats.mark_faulted();
            error!(
                reason = %panic_message(payload.as_ref()),
                "eviction predicate panicked; sweeper stopped"
            );
        }
    }
}

fn sweep_loop<P, F>(shared: &Shared, schedule: Schedule, pacer: &mut P, evict: &mut F)
where
    P: Pacer,
    F: FnMut(&[u8]) -> bool,
{
    let lifecycle = &shared.lifecycle;
    while lifecycle.is_running() {
        if !pacer.pause(schedule.sweep_interval, lifecycle) {
            return;
        }

        let mut cycle_evicted = 0;
        for (index, shard) in shared.shards.iter().enumerate() {
            if !lifecycle.is_running() || !pacer.pause(schedule.shard_pause, lifecycle) {
                return;
            }
            let evicted = shard.sweep(&mut *evict);
            shared.stats.record_evictions(evicted);
            if evicted > 0 {
                trace!(shard = index, evicted, "swept shard");
            }
            cycle_evicted += evicted;
        }

        shared.stats.record_cycle();
        trace!(evicted = cycle_evicted, "sweep cycle complete");
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&str>() {
        *s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "non-string panic payload"
    }
}
