//! Cooperative turn scheduler
//!
//! Work deferred with [`TurnScheduler::defer`] runs on the next call to
//! [`AnimationScheduler::run_turn`], never inside the caller's stack frame.
//! Tasks deferred while a turn is running are queued for the following turn.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// A unit of deferred work
pub type DeferredTask = Box<dyn FnOnce() + Send>;

/// Anything that can run work on a later scheduling turn
pub trait TurnScheduler: Send + Sync {
    /// Queue `task` for the next turn
    fn defer(&self, task: DeferredTask);
}

#[derive(Default)]
struct SchedulerState {
    deferred: VecDeque<DeferredTask>,
    turn: u64,
}

/// The scheduler driving deferred visual passes
#[derive(Default)]
pub struct AnimationScheduler {
    state: Mutex<SchedulerState>,
}

impl AnimationScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, SchedulerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Convenience wrapper around [`TurnScheduler::defer`]
    pub fn defer_fn<F: FnOnce() + Send + 'static>(&self, f: F) {
        self.defer(Box::new(f));
    }

    /// Run every task queued before this call. Returns how many ran.
    pub fn run_turn(&self) -> usize {
        let tasks = {
            let mut state = self.lock();
            state.turn += 1;
            std::mem::take(&mut state.deferred)
        };

        let count = tasks.len();
        for task in tasks {
            task();
        }

        if count > 0 {
            tracing::trace!("turn {} ran {} deferred tasks", self.turn(), count);
        }
        count
    }

    /// Run turns until the queue drains or `max_turns` is reached.
    /// Returns the total number of tasks run.
    pub fn run_until_idle(&self, max_turns: usize) -> usize {
        let mut total = 0;
        for _ in 0..max_turns {
            if self.pending_tasks() == 0 {
                break;
            }
            total += self.run_turn();
        }
        total
    }

    pub fn pending_tasks(&self) -> usize {
        self.lock().deferred.len()
    }

    /// Number of turns run so far
    pub fn turn(&self) -> u64 {
        self.lock().turn
    }
}

impl TurnScheduler for AnimationScheduler {
    fn defer(&self, task: DeferredTask) {
        self.lock().deferred.push_back(task);
    }
}
