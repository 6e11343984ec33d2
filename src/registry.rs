// coin-glue/src/registry.rs
//
//! The process-wide cache of capability records, keyed by context ID.

use crate::context::ContextID;
use crate::debug;
use crate::driver_db::DriverDatabase;
use crate::error::Error;
use crate::glue::GlueContext;
use crate::loader::ProcAddressLoader;
use crate::sync::ReentrantLock;

use fnv::{FnvHashMap, FnvHashSet};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

#[derive(Default)]
struct Records {
    live: FnvHashMap<ContextID, Arc<GlueContext>>,
    destroyed: FnvHashSet<ContextID>,
}

/// Builds each context's capability record on first request and hands out the same record
/// afterwards.
pub struct GlueRegistry {
    loader: Arc<ProcAddressLoader>,
    driver_db: Arc<DriverDatabase>,
    build_lock: Arc<ReentrantLock>,
    records: RwLock<Records>,
    trace: bool,
}

impl GlueRegistry {
    /// `build_lock` serializes first builds. `trace` reports builds and cache hits through the
    /// debug channel.
    pub fn new(loader: Arc<ProcAddressLoader>,
               driver_db: Arc<DriverDatabase>,
               build_lock: Arc<ReentrantLock>,
               trace: bool)
               -> GlueRegistry {
        GlueRegistry { loader, driver_db, build_lock, records: RwLock::new(Records::default()), trace }
    }

    #[inline]
    pub fn loader(&self) -> &Arc<ProcAddressLoader> {
        &self.loader
    }

    #[inline]
    pub fn driver_db(&self) -> &Arc<DriverDatabase> {
        &self.driver_db
    }

    fn read(&self) -> RwLockReadGuard<Records> {
        self.records.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<Records> {
        self.records.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn lookup(&self, id: ContextID) -> Option<Result<Arc<GlueContext>, Error>> {
        let records = self.read();
        if let Some(record) = records.live.get(&id) {
            return Some(Ok(record.clone()));
        }
        if records.destroyed.contains(&id) {
            return Some(Err(Error::ContextDestroyed));
        }
        None
    }

    /// Returns the capability record for `id`, building it from the context current on this
    /// thread if this is the first request.
    ///
    /// Records of destructed contexts are never rebuilt.
    pub fn instance(&self, id: ContextID) -> Result<Arc<GlueContext>, Error> {
        if let Some(result) = self.lookup(id) {
            if self.trace && result.is_ok() {
                debug::post_info("GlueRegistry::instance", format!("cache hit for context {}", id));
            }
            return result;
        }

        let _guard = self.build_lock.lock();
        // Another thread may have built it while we waited.
        if let Some(result) = self.lookup(id) {
            return result;
        }

        if self.trace {
            debug::post_info("GlueRegistry::instance", format!("building context {}", id));
        }
        let record = Arc::new(GlueContext::build(id, self.loader.clone(), self.driver_db.clone()));
        self.write().live.insert(id, record.clone());
        Ok(record)
    }

    /// Returns true if a live record exists for `id`.
    pub fn contains(&self, id: ContextID) -> bool {
        self.read().live.contains_key(&id)
    }

    /// Drops the record for `id`. Returns false if there was none.
    ///
    /// Outstanding `Arc`s stay valid, but `instance(id)` will fail from now on.
    pub fn destruct(&self, id: ContextID) -> bool {
        let mut records = self.write();
        records.destroyed.insert(id);
        let removed = records.live.remove(&id).is_some();
        if self.trace {
            debug::post_info("GlueRegistry::destruct", format!("destructed context {}", id));
        }
        removed
    }

    /// Drops every record. Used at teardown.
    pub fn clear(&self) {
        let mut records = self.write();
        let count = records.live.len();
        records.live.clear();
        debug!("cleared {} capability records", count);
    }

    /// The number of live records.
    pub fn len(&self) -> usize {
        self.read().live.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
