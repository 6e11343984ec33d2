// coin-glue/src/context.rs
//
//! GL context identifiers.

use std::fmt::{self, Display, Formatter};
use std::sync::Mutex;

/// An opaque identifier for a GL context.
///
/// Capability records are keyed by this ID. Applications that render into their own contexts
/// should take IDs from `ContextID::next()` so they never collide with the IDs assigned to
/// offscreen contexts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContextID(pub u32);

lazy_static! {
    pub(crate) static ref CREATE_CONTEXT_MUTEX: Mutex<ContextID> = Mutex::new(ContextID(1));
}

impl ContextID {
    /// Allocates a process-unique context ID.
    pub fn next() -> ContextID {
        let mut next_context_id =
            CREATE_CONTEXT_MUTEX.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let id = *next_context_id;
        next_context_id.0 = next_context_id.0.wrapping_add(1).max(1);
        id
    }
}

impl Display for ContextID {
    fn fmt(&self, formatter: &mut Formatter) -> fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::ContextID;

    #[test]
    fn test_next_is_unique() {
        let a = ContextID::next();
        let b = ContextID::next();
        assert_ne!(a, b);
        assert_ne!(a.0, 0);
    }
}
