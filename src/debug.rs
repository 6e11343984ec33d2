// coin-glue/src/debug.rs
//
//! The debug-error channel.
//!
//! Invalid input and unexpected driver behavior are reported here instead of unwinding. By
//! default messages are forwarded to the `log` crate; embedding applications can redirect them
//! with `set_handler()`.

use std::fmt::{self, Display, Formatter};
use std::sync::{Arc, RwLock};

/// How serious a posted message is.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

/// A message posted to the debug-error channel.
#[derive(Clone, Debug, PartialEq)]
pub struct DebugMessage {
    pub severity: Severity,
    /// The function or subsystem that posted the message, e.g. `"GlueContext::build"`.
    pub source: String,
    pub message: String,
}

impl Display for DebugMessage {
    fn fmt(&self, formatter: &mut Formatter) -> fmt::Result {
        write!(formatter, "{}: {}", self.source, self.message)
    }
}

/// A callback receiving every posted message.
pub type DebugHandler = Arc<dyn Fn(&DebugMessage) + Send + Sync>;

lazy_static! {
    static ref HANDLER: RwLock<Option<DebugHandler>> = RwLock::new(None);
}

/// Redirects the debug-error channel. Passing `None` restores the default `log` forwarding.
///
/// Returns the previously installed handler, if any.
pub fn set_handler(handler: Option<DebugHandler>) -> Option<DebugHandler> {
    let mut slot = HANDLER.write().unwrap_or_else(|poisoned| poisoned.into_inner());
    std::mem::replace(&mut *slot, handler)
}

fn post(severity: Severity, source: &str, message: String) {
    let message = DebugMessage { severity, source: source.to_owned(), message };
    let handler = HANDLER.read().unwrap_or_else(|poisoned| poisoned.into_inner()).clone();
    match handler {
        Some(handler) => handler(&message),
        None => match severity {
            Severity::Info => info!("{}", message),
            Severity::Warning => warn!("{}", message),
            Severity::Error => error!("{}", message),
        },
    }
}

pub fn post_error(source: &str, message: impl Into<String>) {
    post(Severity::Error, source, message.into())
}

pub fn post_warning(source: &str, message: impl Into<String>) {
    post(Severity::Warning, source, message.into())
}

pub fn post_info(source: &str, message: impl Into<String>) {
    post(Severity::Info, source, message.into())
}

#[cfg(test)]
pub(crate) mod capture {
    use super::{set_handler, DebugMessage};
    use std::sync::{Arc, Mutex};
    use std::thread;

    /// Installs a handler that records the messages posted from this thread; dropping it
    /// restores the default. Tests installing one must be `#[serial]`.
    pub(crate) struct CapturedMessages {
        messages: Arc<Mutex<Vec<DebugMessage>>>,
    }

    impl CapturedMessages {
        pub(crate) fn install() -> CapturedMessages {
            let messages = Arc::new(Mutex::new(vec![]));
            let sink = messages.clone();
            let owner = thread::current().id();
            set_handler(Some(Arc::new(move |message| {
                if thread::current().id() == owner {
                    sink.lock().unwrap().push(message.clone());
                }
            })));
            CapturedMessages { messages }
        }

        pub(crate) fn messages(&self) -> Vec<DebugMessage> {
            self.messages.lock().unwrap().clone()
        }
    }

    impl Drop for CapturedMessages {
        fn drop(&mut self) {
            set_handler(None);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::capture::CapturedMessages;
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_redirected_handler_receives_all_severities() {
        let captured = CapturedMessages::install();
        post_info("a", "one");
        post_warning("b", "two");
        post_error("c", format!("{}", 3));

        let ours = captured.messages();
        let severities: Vec<_> = ours.iter().map(|m| m.severity).collect();
        assert_eq!(severities, [Severity::Info, Severity::Warning, Severity::Error]);
        assert_eq!(ours[2].to_string(), "c: 3");
    }

    #[test]
    #[serial]
    fn test_messages_from_other_threads_are_not_captured() {
        let captured = CapturedMessages::install();
        std::thread::spawn(|| post_warning("elsewhere", "ignored")).join().unwrap();
        post_warning("here", "kept");
        assert_eq!(captured.messages().len(), 1);
        assert_eq!(captured.messages()[0].source, "here");
    }

    #[test]
    #[serial]
    fn test_handler_may_replace_itself() {
        let seen = Arc::new(std::sync::Mutex::new(vec![]));
        let sink = seen.clone();
        let owner = std::thread::current().id();
        set_handler(Some(Arc::new(move |message: &DebugMessage| {
            if std::thread::current().id() != owner {
                return;
            }
            sink.lock().unwrap().push(message.message.clone());
            set_handler(None);
        })));
        post_warning("once", "first");
        post_warning("once", "second");
        assert_eq!(*seen.lock().unwrap(), ["first"]);
        assert!(HANDLER.read().unwrap().is_none());
    }
}
