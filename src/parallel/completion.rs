//! Completion state shared by the shards of one run.
//!
//! Starts at N outstanding shards. Each shard calls `complete_one` exactly once
//! when it stops; the call that brings the counter to zero fires the done
//! callback, unless the run was aborted first.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tracing::debug;

type DoneCallback = Box<dyn FnOnce() + Send + 'static>;

pub struct CompletionState {
    outstanding: AtomicUsize,
    aborted: AtomicBool,
    on_done: Mutex<Option<DoneCallback>>,
}

impl CompletionState {
    pub fn new<F>(outstanding: usize, on_done: F) -> Arc<Self>
    where
        F: FnOnce() + Send + 'static,
    {
        Arc::new(Self {
            outstanding: AtomicUsize::new(outstanding),
            aborted: AtomicBool::new(false),
            on_done: Mutex::new(Some(Box::new(on_done))),
        })
    }

    pub fn outstanding(&self) -> usize {
        self.outstanding.load(Ordering::Acquire)
    }

    pub fn is_aborted(&self) -> bool {
        self.aborted.load(Ordering::Acquire)
    }

    /// Mark the run as failed; the done callback will not fire
    pub fn abort(&self) {
        self.aborted.store(true, Ordering::Release);
    }

    /// Record one finished shard. Returns true if this call fired the callback.
    pub fn complete_one(&self) -> bool {
        let previous = self
            .outstanding
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| n.checked_sub(1));

        match previous {
            Ok(1) => {
                if self.is_aborted() {
                    debug!("Last shard finished after abort, done callback suppressed");
                    return false;
                }
                self.fire()
            }
            Ok(remaining) => {
                debug!("Shard finished, {} still running", remaining - 1);
                false
            }
            // already at zero
            Err(_) => false,
        }
    }

    fn fire(&self) -> bool {
        let callback = self
            .on_done
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .take();
        match callback {
            Some(callback) => {
                callback();
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counter() -> (Arc<AtomicUsize>, impl FnOnce() + Send + 'static) {
        let fired = Arc::new(AtomicUsize::new(0));
        let clone = fired.clone();
        (fired, move || {
            clone.fetch_add(1, Ordering::SeqCst);
        })
    }

    #[test]
    fn test_fires_once_on_last_completion() {
        let (fired, on_done) = counter();
        let state = CompletionState::new(3, on_done);

        assert!(!state.complete_one());
        assert!(!state.complete_one());
        assert_eq!(fired.load(Ordering::SeqCst), 0);
        assert!(state.complete_one());
        assert_eq!(fired.load(Ordering::SeqCst), 1);

        // extra calls never underflow nor refire
        assert!(!state.complete_one());
        assert_eq!(state.outstanding(), 0);
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_abort_suppresses_callback() {
        let (fired, on_done) = counter();
        let state = CompletionState::new(2, on_done);

        state.complete_one();
        state.abort();
        assert!(!state.complete_one());
        assert_eq!(fired.load(Ordering::SeqCst), 0);
        assert!(state.is_aborted());
    }

    #[test]
    fn test_concurrent_completions_fire_once() {
        let (fired, on_done) = counter();
        let state = CompletionState::new(16, on_done);

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let state = state.clone();
                std::thread::spawn(move || state.complete_one())
            })
            .collect();
        let fired_by: usize = handles
            .into_iter()
            .map(|h| h.join().unwrap() as usize)
            .sum();

        assert_eq!(fired_by, 1);
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }
}
