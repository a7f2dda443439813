use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};

/// Running state of a cache. The only transition is `Running -> Stopped`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Running,
    Stopped,
}

/// Stop flag shared between a cache and its sweeper.
///
/// Waiters on [`Lifecycle::wait_timeout`] are woken as soon as the flag flips,
/// so a paused sweeper does not sit out its full pause after a stop.
#[derive(Debug)]
pub struct Lifecycle {
    state: Mutex<LifecycleState>,
    changed: Condvar,
}

impl Lifecycle {
    pub(crate) fn new() -> Self {
        Self {
            state: Mutex::new(LifecycleState::Running),
            changed: Condvar::new(),
        }
    }

    pub fn state(&self) -> LifecycleState {
        *self.state.lock()
    }

    pub fn is_running(&self) -> bool {
        self.state() == LifecycleState::Running
    }

    /// Moves to `Stopped`. Returns true only for the call that made the
    /// transition.
    pub(crate) fn stop(&self) -> bool {
        let mut state = self.state.lock();
        if *state == LifecycleState::Stopped {
            return false;
        }
        *state = LifecycleState::Stopped;
        self.changed.notify_all();
        true
    }

    /// Blocks for up to `timeout` or until stopped. Returns true while the
    /// lifecycle is still running.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        let deadline = Instant::now().checked_add(timeout);
        let mut state = self.state.lock();
        while *state == LifecycleState::Running {
            match deadline {
                Some(deadline) => {
                    if self.changed.wait_until(&mut state, deadline).timed_out() {
                        break;
                    }
                }
                // timeout too large to represent: wait for the stop itself
                None => self.changed.wait(&mut state),
            }
        }
        *state == LifecycleState::Running
    }
}
