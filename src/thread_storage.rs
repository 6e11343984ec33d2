// coin-glue/src/thread_storage.rs
//
//! Per-thread storage with destructors that run when the thread exits.
//!
//! A `ThreadStorage<T>` lazily creates one `T` for every thread that touches it. When such a
//! thread exits, a thread-local cleanup trigger asks every `StorageRegistry` the thread used to
//! destroy that thread's slots. When the storage itself is dropped, the slots of threads that are
//! still alive are destroyed instead.

use fnv::FnvHashMap;
use std::cell::RefCell;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, RwLock, Weak};
use std::thread::{self, ThreadId};

trait StorageCleanup: Send + Sync {
    fn cleanup_thread(&self, thread: ThreadId);
}

/// The set of live storages whose slots must be destroyed at thread exit.
pub struct StorageRegistry {
    storages: RwLock<Vec<(usize, Weak<dyn StorageCleanup>)>>,
    next_key: AtomicUsize,
}

lazy_static! {
    static ref GLOBAL_REGISTRY: Arc<StorageRegistry> = Arc::new(StorageRegistry::new());
}

impl StorageRegistry {
    pub fn new() -> StorageRegistry {
        StorageRegistry { storages: RwLock::new(vec![]), next_key: AtomicUsize::new(0) }
    }

    /// The registry used by `ThreadStorage::new()`.
    pub fn global() -> &'static Arc<StorageRegistry> {
        &*GLOBAL_REGISTRY
    }

    fn register(&self, storage: Weak<dyn StorageCleanup>) -> usize {
        let key = self.next_key.fetch_add(1, Ordering::SeqCst);
        self.storages.write().unwrap_or_else(|poisoned| poisoned.into_inner()).push((key, storage));
        key
    }

    fn unregister(&self, key: usize) {
        let mut storages = self.storages.write().unwrap_or_else(|poisoned| poisoned.into_inner());
        storages.retain(|&(other, _)| other != key);
    }

    /// Destroys the slots `thread` owns in every registered storage.
    ///
    /// This normally runs from the thread's cleanup trigger; calling it for a live thread that
    /// keeps using the storages just recreates its slots on next access.
    ///
    /// Destructors run without the registry locked, so they may create or drop storages.
    pub fn cleanup(&self, thread: ThreadId) {
        let storages: Vec<Arc<dyn StorageCleanup>> = {
            let storages = self.storages.read().unwrap_or_else(|poisoned| poisoned.into_inner());
            storages.iter().filter_map(|(_, storage)| storage.upgrade()).collect()
        };
        for storage in storages {
            storage.cleanup_thread(thread);
        }
    }

    /// The number of live storages.
    pub fn len(&self) -> usize {
        self.storages.read().unwrap_or_else(|poisoned| poisoned.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for StorageRegistry {
    fn default() -> StorageRegistry {
        StorageRegistry::new()
    }
}

// Runs once per thread, when its thread-locals are destroyed.
struct ThreadCleanup {
    thread: ThreadId,
    registries: Vec<Weak<StorageRegistry>>,
}

impl Drop for ThreadCleanup {
    fn drop(&mut self) {
        for registry in self.registries.drain(..) {
            if let Some(registry) = registry.upgrade() {
                registry.cleanup(self.thread);
            }
        }
    }
}

thread_local! {
    static THREAD_CLEANUP: RefCell<Option<ThreadCleanup>> = const { RefCell::new(None) };
}

fn watch_current_thread(registry: &Arc<StorageRegistry>) {
    // Fails only while this thread's locals are being destroyed. The slot is then reclaimed when
    // the storage is dropped.
    let _ = THREAD_CLEANUP.try_with(|cleanup| {
        let mut cleanup = cleanup.borrow_mut();
        let cleanup = cleanup.get_or_insert_with(|| {
            ThreadCleanup { thread: thread::current().id(), registries: vec![] }
        });
        cleanup.registries.retain(|registry| registry.strong_count() > 0);
        let registry_ptr = Arc::as_ptr(registry);
        if !cleanup.registries.iter().any(|known| known.as_ptr() == registry_ptr) {
            cleanup.registries.push(Arc::downgrade(registry));
        }
    });
}

struct Slots<T> {
    slots: Mutex<FnvHashMap<ThreadId, T>>,
    constructor: Box<dyn Fn() -> T + Send + Sync>,
    destructor: Box<dyn Fn(T) + Send + Sync>,
}

impl<T> Slots<T> {
    fn lock(&self) -> MutexGuard<FnvHashMap<ThreadId, T>> {
        self.slots.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn destroy(&self, thread: ThreadId, value: T) {
        let result = panic::catch_unwind(AssertUnwindSafe(|| (self.destructor)(value)));
        if result.is_err() {
            warn!("thread storage destructor panicked for thread {:?}", thread);
        }
    }
}

impl<T> StorageCleanup for Slots<T> where T: Send + 'static {
    fn cleanup_thread(&self, thread: ThreadId) {
        let value = self.lock().remove(&thread);
        if let Some(value) = value {
            self.destroy(thread, value);
        }
    }
}

/// One lazily created `T` per thread.
pub struct ThreadStorage<T> where T: Send + 'static {
    slots: Arc<Slots<T>>,
    registry: Arc<StorageRegistry>,
    key: usize,
}

impl<T> ThreadStorage<T> where T: Send + 'static {
    /// Creates a storage in the global registry.
    ///
    /// `constructor` builds a thread's slot on first access. `destructor` receives each slot
    /// exactly once, at thread exit or when the storage is dropped, whichever comes first.
    pub fn new<C, D>(constructor: C, destructor: D) -> ThreadStorage<T>
                     where C: Fn() -> T + Send + Sync + 'static,
                           D: Fn(T) + Send + Sync + 'static {
        ThreadStorage::with_registry(StorageRegistry::global(), constructor, destructor)
    }

    pub fn with_registry<C, D>(registry: &Arc<StorageRegistry>, constructor: C, destructor: D)
                               -> ThreadStorage<T>
                               where C: Fn() -> T + Send + Sync + 'static,
                                     D: Fn(T) + Send + Sync + 'static {
        let slots = Arc::new(Slots {
            slots: Mutex::new(FnvHashMap::default()),
            constructor: Box::new(constructor),
            destructor: Box::new(destructor),
        });
        let weak: Weak<Slots<T>> = Arc::downgrade(&slots);
        let key = registry.register(weak);
        ThreadStorage { slots, registry: registry.clone(), key }
    }

    /// Calls `function` with this thread's slot, creating it first if necessary.
    ///
    /// The storage is locked while `function` runs, so it must not access this storage again.
    pub fn with<F, R>(&self, function: F) -> R where F: FnOnce(&mut T) -> R {
        watch_current_thread(&self.registry);
        let mut slots = self.slots.lock();
        let slot = slots.entry(thread::current().id()).or_insert_with(|| (self.slots.constructor)());
        function(slot)
    }

    /// Returns a copy of this thread's slot, creating it first if necessary.
    pub fn get_or_init(&self) -> T where T: Clone {
        self.with(|slot| slot.clone())
    }

    /// Calls `function` on every thread's slot.
    pub fn apply_to_all<F>(&self, mut function: F) where F: FnMut(ThreadId, &mut T) {
        for (&thread, slot) in self.slots.lock().iter_mut() {
            function(thread, slot);
        }
    }

    /// The number of threads that currently own a slot.
    pub fn thread_count(&self) -> usize {
        self.slots.lock().len()
    }
}

impl<T> Drop for ThreadStorage<T> where T: Send + 'static {
    fn drop(&mut self) {
        // Exiting threads can no longer reach the slots once this returns.
        self.registry.unregister(self.key);
        let remaining: Vec<(ThreadId, T)> = self.slots.lock().drain().collect();
        for (thread, value) in remaining {
            self.slots.destroy(thread, value);
        }
    }
}
