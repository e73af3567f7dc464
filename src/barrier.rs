//! Start barrier and shutdown signal shared by every occupant task.

use crate::error::Interrupted;
use parking_lot::{Condvar, Mutex};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

#[derive(Debug, Default)]
struct GateState {
    released: bool,
    halted: bool,
    waiting: usize,
}

/// One-shot rendezvous with a single releaser and any number of joiners.
///
/// Joiners block in [`StartBarrier::wait`] until the driver calls
/// [`StartBarrier::release`]. Anyone arriving afterwards passes straight
/// through. [`StartBarrier::halt`] wakes every waiter and every sleeper with
/// [`Interrupted`].
#[derive(Debug, Default)]
pub struct StartBarrier {
    state: Mutex<GateState>,
    cond: Condvar,
    /// Mirror of `GateState::halted`, readable while cell locks are held
    halted: AtomicBool,
}

impl StartBarrier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Block until released
    pub fn wait(&self) -> Result<(), Interrupted> {
        let mut state = self.state.lock();
        state.waiting += 1;
        while !state.released && !state.halted {
            self.cond.wait(&mut state);
        }
        state.waiting -= 1;
        if state.halted {
            Err(Interrupted)
        } else {
            Ok(())
        }
    }

    /// Let every joiner go. Only the first call has an effect.
    pub fn release(&self) {
        let mut state = self.state.lock();
        if !state.released {
            state.released = true;
            log::debug!("Start barrier released ({} waiting)", state.waiting);
            self.cond.notify_all();
        }
    }

    /// Request shutdown: waiters and sleepers return `Interrupted`
    pub fn halt(&self) {
        let mut state = self.state.lock();
        state.halted = true;
        self.halted.store(true, Ordering::Release);
        self.cond.notify_all();
    }

    /// Sleep for `duration` unless halted first
    pub fn sleep(&self, duration: Duration) -> Result<(), Interrupted> {
        let deadline = Instant::now() + duration;
        let mut state = self.state.lock();
        while !state.halted {
            if self.cond.wait_until(&mut state, deadline).timed_out() {
                break;
            }
        }
        if state.halted {
            Err(Interrupted)
        } else {
            Ok(())
        }
    }

    pub fn is_released(&self) -> bool {
        self.state.lock().released
    }

    /// Lock-free; safe to call from inside a cell transaction
    pub fn is_halted(&self) -> bool {
        self.halted.load(Ordering::Acquire)
    }

    /// Number of joiners currently blocked in [`StartBarrier::wait`]
    pub fn waiting(&self) -> usize {
        self.state.lock().waiting
    }
}
