// coin-glue/src/atexit.rs
//
//! Ordered process teardown.
//!
//! Subsystems register cleanup callbacks with a priority. At teardown the callbacks run from the
//! highest priority to the lowest; among equal priorities, the most recently registered runs
//! first. Explicit dependencies between named callbacks take precedence over priorities.

use crate::debug;

use std::cmp::Ordering as CmpOrdering;
use std::collections::BinaryHeap;
use std::fmt::{self, Display, Formatter};
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};

/// A teardown priority. Higher priorities run earlier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Priority(pub i32);

impl Priority {
    /// Client and external code. Runs before anything in this library.
    pub const CLIENT: Priority = Priority(i32::MAX);
    pub const NORMAL: Priority = Priority(0);
    pub const NORMAL_LOW_PRIORITY: Priority = Priority(-1);
    pub const STATIC_DATA: Priority = Priority(-20);
    pub const BASE_OBJECT_SYSTEM: Priority = Priority(-30);
    pub const TYPE_SYSTEM: Priority = Priority(-40);
    pub const FONT_SUBSYSTEM_HIGH_PRIORITY: Priority = Priority(-99);
    pub const FONT_SUBSYSTEM: Priority = Priority(-100);
    pub const FONT_SUBSYSTEM_LOW_PRIORITY: Priority = Priority(-101);
    pub const MESSAGE_SUBSYSTEM: Priority = Priority(-200);
    pub const BASE_SUBSYSTEM: Priority = Priority(-300);
    pub const THREAD_SUBSYSTEM_HIGH_PRIORITY: Priority = Priority(-490);
    pub const THREAD_SUBSYSTEM: Priority = Priority(-500);
    pub const THREAD_SUBSYSTEM_LOW_PRIORITY: Priority = Priority(-510);
    pub const THREAD_SUBSYSTEM_VERY_LOW_PRIORITY: Priority = Priority(-520);
    /// Unloading dynamically loaded libraries.
    pub const DYNLIBS: Priority = Priority(i32::MIN + 1);
    /// Restoring the process environment. Runs last.
    pub const ENVIRONMENT: Priority = Priority(i32::MIN);
}

impl Display for Priority {
    fn fmt(&self, formatter: &mut Formatter) -> fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

/// A teardown callback.
pub type AtexitCallback = Box<dyn FnOnce() + Send>;

struct AtexitEntry {
    name: String,
    priority: Priority,
    insertion: u64,
    callback: AtexitCallback,
}

#[derive(Default)]
struct State {
    entries: Vec<AtexitEntry>,
    dependencies: Vec<(String, String)>,
    next_insertion: u64,
}

/// A registry of teardown callbacks.
pub struct AtexitRegistry {
    state: Mutex<State>,
    // Only written with `state` locked.
    exiting: AtomicBool,
    trace: AtomicBool,
}

impl Default for AtexitRegistry {
    fn default() -> AtexitRegistry {
        AtexitRegistry::new()
    }
}

impl AtexitRegistry {
    pub fn new() -> AtexitRegistry {
        AtexitRegistry {
            state: Mutex::new(State::default()),
            exiting: AtomicBool::new(false),
            trace: AtomicBool::new(false),
        }
    }

    /// Reports each callback through the debug channel as it runs.
    pub fn set_trace(&self, trace: bool) {
        self.trace.store(trace, Ordering::SeqCst);
    }

    /// Registers `callback` under `name`.
    ///
    /// # Panics
    ///
    /// Panics if teardown has already begun.
    pub fn register<F>(&self, name: &str, priority: Priority, callback: F)
                       where F: FnOnce() + Send + 'static {
        let mut state = self.lock_unless_exiting("tried to attach an atexit function while exiting");
        let insertion = state.next_insertion;
        state.next_insertion += 1;
        state.entries.push(AtexitEntry {
            name: name.to_owned(),
            priority,
            insertion,
            callback: Box::new(callback),
        });
    }

    /// Declares that every callback named `first` must run before every callback named `then`,
    /// whatever their priorities.
    pub fn add_dependency(&self, first: &str, then: &str) {
        let mut state = self.lock_unless_exiting("tried to add an atexit dependency while exiting");
        state.dependencies.push((first.to_owned(), then.to_owned()));
    }

    fn lock_state(&self) -> MutexGuard<State> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn lock_unless_exiting(&self, message: &'static str) -> MutexGuard<State> {
        let state = self.lock_state();
        if self.is_exiting() {
            drop(state);
            panic!("{}", message);
        }
        state
    }

    /// Returns true once teardown has begun.
    #[inline]
    pub fn is_exiting(&self) -> bool {
        self.exiting.load(Ordering::SeqCst)
    }

    /// The number of registered callbacks.
    pub fn len(&self) -> usize {
        self.lock_state().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Runs every registered callback, in teardown order, and empties the registry.
    ///
    /// A callback that panics is reported through the debug channel and the remaining callbacks
    /// still run.
    ///
    /// # Panics
    ///
    /// Panics if called twice.
    pub fn run_teardown(&self) {
        let State { entries, dependencies, .. } = {
            let mut state = self.lock_state();
            if self.exiting.swap(true, Ordering::SeqCst) {
                drop(state);
                panic!("atexit teardown has already run");
            }
            std::mem::take(&mut *state)
        };
        let keys: Vec<_> = entries.iter()
                                  .map(|entry| (&entry.name[..], entry.priority, entry.insertion))
                                  .collect();
        let order = teardown_order(&keys, &dependencies);

        let mut slots: Vec<Option<AtexitEntry>> = entries.into_iter().map(Some).collect();
        let trace = self.trace.load(Ordering::SeqCst);
        for index in order {
            let entry = match slots[index].take() {
                Some(entry) => entry,
                None => continue,
            };
            if trace {
                debug::post_info("AtexitRegistry::run_teardown",
                                 format!("running '{}' (priority {})", entry.name, entry.priority));
            }
            let AtexitEntry { name, callback, .. } = entry;
            if panic::catch_unwind(AssertUnwindSafe(callback)).is_err() {
                debug::post_error("AtexitRegistry::run_teardown",
                                  format!("atexit function '{}' panicked", name));
            }
        }
    }
}

#[derive(PartialEq, Eq)]
struct Ready {
    priority: Priority,
    insertion: u64,
    index: usize,
}

impl Ord for Ready {
    fn cmp(&self, other: &Ready) -> CmpOrdering {
        (self.priority, self.insertion).cmp(&(other.priority, other.insertion))
    }
}

impl PartialOrd for Ready {
    fn partial_cmp(&self, other: &Ready) -> Option<CmpOrdering> {
        Some(self.cmp(other))
    }
}

/// Computes the order in which `entries`, given as `(name, priority, insertion)`, are torn down.
///
/// Returns indices into `entries`. Among entries whose dependencies have all run, the one with
/// the highest `(priority, insertion)` goes next. Entries caught in a dependency cycle are
/// reported and run last, in plain priority order.
fn teardown_order(entries: &[(&str, Priority, u64)], dependencies: &[(String, String)])
                  -> Vec<usize> {
    let count = entries.len();
    let mut successors: Vec<Vec<usize>> = vec![vec![]; count];
    let mut pending_predecessors = vec![0usize; count];
    for (first, then) in dependencies {
        for (from, &(from_name, _, _)) in entries.iter().enumerate() {
            if from_name != first.as_str() {
                continue;
            }
            for (to, &(to_name, _, _)) in entries.iter().enumerate() {
                if to_name == then.as_str() && to != from {
                    successors[from].push(to);
                    pending_predecessors[to] += 1;
                }
            }
        }
    }

    let ready_entry = |index: usize| {
        let (_, priority, insertion) = entries[index];
        Ready { priority, insertion, index }
    };
    let mut ready: BinaryHeap<Ready> = (0..count).filter(|&index| pending_predecessors[index] == 0)
                                                 .map(ready_entry)
                                                 .collect();
    let mut order = Vec::with_capacity(count);
    while let Some(Ready { index, .. }) = ready.pop() {
        order.push(index);
        for &successor in &successors[index] {
            pending_predecessors[successor] -= 1;
            if pending_predecessors[successor] == 0 {
                ready.push(ready_entry(successor));
            }
        }
    }

    if order.len() < count {
        let mut scheduled = vec![false; count];
        for &index in &order {
            scheduled[index] = true;
        }
        let mut remaining: Vec<Ready> =
            (0..count).filter(|&index| !scheduled[index]).map(ready_entry).collect();
        remaining.sort_by(|a, b| b.cmp(a));
        let names: Vec<&str> = remaining.iter().map(|entry| entries[entry.index].0).collect();
        debug::post_error("AtexitRegistry::run_teardown",
                          format!("dependency cycle among {:?}; running them by priority", names));
        order.extend(remaining.into_iter().map(|entry| entry.index));
    }
    order
}
