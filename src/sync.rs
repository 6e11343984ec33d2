// coin-glue/src/sync.rs
//
//! The library-wide reentrant lock and its diagnostics.

use crate::debug;

use std::marker::PhantomData;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Condvar, Mutex, MutexGuard};
use std::thread::{self, ThreadId};
use std::time::{Duration, Instant};

static LIVE_LOCKS: AtomicUsize = AtomicUsize::new(0);

/// The number of `ReentrantLock`s currently alive in the process.
pub fn live_lock_count() -> usize {
    LIVE_LOCKS.load(Ordering::SeqCst)
}

/// Hold-time diagnostic settings. Off by default.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LockTiming {
    pub enabled: bool,
    pub max_hold_time: Duration,
}

impl Default for LockTiming {
    fn default() -> LockTiming {
        LockTiming { enabled: false, max_hold_time: Duration::from_millis(100) }
    }
}

struct LockState {
    owner: Option<ThreadId>,
    count: usize,
}

/// A mutex the owning thread may lock again without deadlocking.
pub struct ReentrantLock {
    name: &'static str,
    state: Mutex<LockState>,
    available: Condvar,
    timing: LockTiming,
}

/// Releases one level of a `ReentrantLock` when dropped.
///
/// The guard must be dropped on the thread that took the lock, so it is not `Send`:
///
/// ```compile_fail
/// use coin_glue::sync::{LockTiming, ReentrantLock};
///
/// let lock = ReentrantLock::new("guarded", LockTiming::default());
/// let guard = lock.lock();
/// std::thread::scope(|scope| {
///     scope.spawn(move || drop(guard));
/// });
/// ```
#[must_use]
pub struct ReentrantLockGuard<'a> {
    lock: &'a ReentrantLock,
    acquired_at: Option<Instant>,
    not_send: PhantomData<*const ()>,
}

impl ReentrantLock {
    pub fn new(name: &'static str, timing: LockTiming) -> ReentrantLock {
        LIVE_LOCKS.fetch_add(1, Ordering::SeqCst);
        ReentrantLock {
            name,
            state: Mutex::new(LockState { owner: None, count: 0 }),
            available: Condvar::new(),
            timing,
        }
    }

    fn state(&self) -> MutexGuard<LockState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn lock(&self) -> ReentrantLockGuard {
        let current = thread::current().id();
        let mut state = self.state();
        while state.owner.is_some() && state.owner != Some(current) {
            state = self.available
                        .wait(state)
                        .unwrap_or_else(|poisoned| poisoned.into_inner());
        }
        state.owner = Some(current);
        state.count += 1;
        let outermost = state.count == 1;
        drop(state);

        let acquired_at = if self.timing.enabled && outermost { Some(Instant::now()) } else { None };
        ReentrantLockGuard { lock: self, acquired_at, not_send: PhantomData }
    }

    /// Returns true if the calling thread holds this lock.
    pub fn is_held_by_current_thread(&self) -> bool {
        self.state().owner == Some(thread::current().id())
    }

    fn unlock(&self) {
        let mut state = self.state();
        debug_assert_eq!(state.owner, Some(thread::current().id()));
        state.count -= 1;
        if state.count == 0 {
            state.owner = None;
            drop(state);
            self.available.notify_one();
        }
    }
}

impl Drop for ReentrantLock {
    fn drop(&mut self) {
        LIVE_LOCKS.fetch_sub(1, Ordering::SeqCst);
    }
}

impl<'a> Drop for ReentrantLockGuard<'a> {
    fn drop(&mut self) {
        if let Some(acquired_at) = self.acquired_at {
            let held = acquired_at.elapsed();
            if held > self.lock.timing.max_hold_time {
                debug::post_warning("ReentrantLock::unlock",
                                    format!("lock '{}' was held for {:?} (limit {:?})",
                                            self.lock.name,
                                            held,
                                            self.lock.timing.max_hold_time));
            }
        }
        self.lock.unlock();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::debug::capture::CapturedMessages;
    use serial_test::serial;
    use std::sync::Arc;

    #[test]
    fn test_relock_on_same_thread() {
        let lock = ReentrantLock::new("test", LockTiming::default());
        let outer = lock.lock();
        let inner = lock.lock();
        assert!(lock.is_held_by_current_thread());
        drop(inner);
        assert!(lock.is_held_by_current_thread());
        drop(outer);
        assert!(!lock.is_held_by_current_thread());
    }

    #[test]
    fn test_excludes_other_threads() {
        let lock = Arc::new(ReentrantLock::new("test", LockTiming::default()));
        let counter = Arc::new(Mutex::new(0));
        let threads: Vec<_> = (0..4).map(|_| {
            let (lock, counter) = (lock.clone(), counter.clone());
            thread::spawn(move || {
                for _ in 0..100 {
                    let _outer = lock.lock();
                    let _inner = lock.lock();
                    let value = *counter.lock().unwrap();
                    thread::yield_now();
                    *counter.lock().unwrap() = value + 1;
                }
            })
        }).collect();
        for thread in threads {
            thread.join().unwrap();
        }
        assert_eq!(*counter.lock().unwrap(), 400);
    }

    #[test]
    #[serial]
    fn test_hold_time_warning() {
        let captured = CapturedMessages::install();
        let timing = LockTiming { enabled: true, max_hold_time: Duration::from_millis(1) };
        let lock = ReentrantLock::new("slow", timing);
        {
            let _guard = lock.lock();
            thread::sleep(Duration::from_millis(20));
        }
        assert!(captured.messages().iter().any(|m| m.message.contains("'slow'")));
    }
}
