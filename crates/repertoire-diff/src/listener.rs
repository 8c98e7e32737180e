//! Synchronous dispatch of reference-change events.

use crate::event::ReferenceChangeRecord;
use repertoire_core::Result;
use std::fmt;
use tracing::{debug, warn};

/// Reacts to a version whose references moved.
///
/// Typical listeners schedule a metadata re-dump, notify maintainers or write
/// an audit record.
pub trait ReferenceChangeListener: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &str;

    /// Handle one event.
    ///
    /// # Errors
    /// An error stops dispatch and is returned to the caller.
    fn on_reference_changed(&self, record: &ReferenceChangeRecord) -> Result<()>;
}

impl<F> ReferenceChangeListener for (&'static str, F)
where
    F: Fn(&ReferenceChangeRecord) -> Result<()> + Send + Sync,
{
    fn name(&self) -> &str {
        self.0
    }

    fn on_reference_changed(&self, record: &ReferenceChangeRecord) -> Result<()> {
        (self.1)(record)
    }
}

/// Ordered set of listeners invoked for every event.
#[derive(Default)]
pub struct ReferenceChangeDispatcher {
    listeners: Vec<Box<dyn ReferenceChangeListener>>,
}

impl ReferenceChangeDispatcher {
    /// Dispatcher with no listeners.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener; listeners run in registration order.
    pub fn subscribe(&mut self, listener: impl ReferenceChangeListener + 'static) {
        debug!(listener = listener.name(), "listener subscribed");
        self.listeners.push(Box::new(listener));
    }

    /// Builder-style [`subscribe`](Self::subscribe).
    #[must_use]
    pub fn with(mut self, listener: impl ReferenceChangeListener + 'static) -> Self {
        self.subscribe(listener);
        self
    }

    /// Number of registered listeners.
    #[must_use]
    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    /// Check if no listener is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    /// Deliver an event to every listener.
    ///
    /// # Errors
    /// Returns the first listener error; later listeners are not invoked.
    pub fn dispatch(&self, record: &ReferenceChangeRecord) -> Result<()> {
        for listener in &self.listeners {
            if let Err(e) = listener.on_reference_changed(record) {
                warn!(
                    listener = listener.name(),
                    version = %record.version(),
                    error = %e,
                    "reference change listener failed"
                );
                return Err(e);
            }
        }
        Ok(())
    }
}

impl fmt::Debug for ReferenceChangeDispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReferenceChangeDispatcher")
            .field(
                "listeners",
                &self.listeners.iter().map(|l| l.name()).collect::<Vec<_>>(),
            )
            .finish()
    }
}
