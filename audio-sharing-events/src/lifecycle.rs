//! Callback registration lifecycle
//!
//! Registrations are bound to an explicit start/stop pair driven by the
//! host (view shown/hidden, service started/stopped). After `on_stop`
//! returns no source holds the sink anymore, so no callback can reach a
//! torn-down host.

use std::fmt;
use std::sync::Arc;

use crate::error::Result;
use crate::queue::EventSink;

/// Handle returned by a source for one registration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RegistrationId(pub u64);

impl fmt::Display for RegistrationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A collaborator that can deliver callbacks into an `EventSink`
///
/// Implemented by the broadcast and broadcast-assistant proxies and by the
/// platform connection-state event stream.
pub trait CallbackSource: Send + Sync {
    /// Short name used in logs and errors
    fn name(&self) -> &'static str;

    fn register_callback(&self, sink: EventSink) -> Result<RegistrationId>;

    fn unregister_callback(&self, id: RegistrationId) -> Result<()>;
}

/// One registration set, started and stopped as a unit
pub struct CallbackRegistration {
    sink: EventSink,
    sources: Vec<Arc<dyn CallbackSource>>,
    active: Vec<(Arc<dyn CallbackSource>, RegistrationId)>,
    registered: bool,
}

impl CallbackRegistration {
    pub fn new(sink: EventSink) -> Self {
        Self {
            sink,
            sources: Vec::new(),
            active: Vec::new(),
            registered: false,
        }
    }

    /// Add a source to the set; takes effect on the next `on_start`
    pub fn with_source(mut self, source: Arc<dyn CallbackSource>) -> Self {
        self.sources.push(source);
        self
    }

    pub fn add_source(&mut self, source: Arc<dyn CallbackSource>) {
        self.sources.push(source);
    }

    pub fn is_registered(&self) -> bool {
        self.registered
    }

    /// Register the sink with every source
    ///
    /// A second call while registered does nothing. If any source fails,
    /// the ones already registered are rolled back and the error returned.
    pub fn on_start(&mut self) -> Result<()> {
        if self.registered {
            tracing::debug!("Callbacks already registered, skipping");
            return Ok(());
        }

        let mut failure = None;
        for source in &self.sources {
            match source.register_callback(self.sink.clone()) {
                Ok(id) => {
                    tracing::debug!("Registered callback {} with {}", id, source.name());
                    self.active.push((Arc::clone(source), id));
                }
                Err(e) => {
                    tracing::warn!("Failed to register callback with {}: {}", source.name(), e);
                    failure = Some(e);
                    break;
                }
            }
        }

        if let Some(e) = failure {
            self.unregister_all();
            return Err(e);
        }

        self.registered = true;
        Ok(())
    }

    /// Unregister from every source
    ///
    /// Without a prior `on_start` this is a no-op. Unregistration errors are
    /// logged and do not stop the remaining sources from being released.
    pub fn on_stop(&mut self) {
        if !self.registered {
            tracing::debug!("Callbacks not registered, nothing to stop");
            return;
        }
        self.unregister_all();
        self.registered = false;
    }

    fn unregister_all(&mut self) {
        for (source, id) in self.active.drain(..) {
            if let Err(e) = source.unregister_callback(id) {
                tracing::error!("Fail to unregister {} callback due to {}", source.name(), e);
            }
        }
    }
}

impl fmt::Debug for CallbackRegistration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallbackRegistration")
            .field("sources", &self.sources.len())
            .field("active", &self.active.len())
            .field("registered", &self.registered)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EventError;
    use crate::queue::channel;
    use parking_lot::Mutex;
    use std::collections::HashMap;

    #[derive(Default)]
    struct TestSource {
        name: &'static str,
        fail_register: bool,
        fail_unregister: bool,
        next_id: Mutex<u64>,
        sinks: Mutex<HashMap<RegistrationId, EventSink>>,
        unregister_calls: Mutex<usize>,
    }

    impl TestSource {
        fn named(name: &'static str) -> Arc<Self> {
            Arc::new(Self {
                name,
                ..Default::default()
            })
        }

        fn registrations(&self) -> usize {
            self.sinks.lock().len()
        }
    }

    impl CallbackSource for TestSource {
        fn name(&self) -> &'static str {
            self.name
        }

        fn register_callback(&self, sink: EventSink) -> Result<RegistrationId> {
            if self.fail_register {
                return Err(EventError::RegistrationFailed {
                    source_name: self.name,
                    reason: "proxy not bound".to_string(),
                });
            }
            let mut next = self.next_id.lock();
            *next += 1;
            let id = RegistrationId(*next);
            self.sinks.lock().insert(id, sink);
            Ok(id)
        }

        fn unregister_callback(&self, id: RegistrationId) -> Result<()> {
            *self.unregister_calls.lock() += 1;
            if self.fail_unregister {
                return Err(EventError::UnregistrationFailed {
                    source_name: self.name,
                    reason: "proxy died".to_string(),
                });
            }
            self.sinks.lock().remove(&id);
            Ok(())
        }
    }

    #[test]
    fn test_start_registers_every_source_once() {
        let (sink, _queue) = channel();
        let broadcast = TestSource::named("broadcast");
        let assistant = TestSource::named("assistant");
        let mut registration = CallbackRegistration::new(sink)
            .with_source(broadcast.clone())
            .with_source(assistant.clone());

        registration.on_start().unwrap();
        registration.on_start().unwrap();

        assert!(registration.is_registered());
        assert_eq!(broadcast.registrations(), 1);
        assert_eq!(assistant.registrations(), 1);
    }

    #[test]
    fn test_stop_unregisters_everything() {
        let (sink, _queue) = channel();
        let broadcast = TestSource::named("broadcast");
        let mut registration = CallbackRegistration::new(sink).with_source(broadcast.clone());

        registration.on_start().unwrap();
        registration.on_stop();

        assert!(!registration.is_registered());
        assert_eq!(broadcast.registrations(), 0);

        // Can be started again after a stop
        registration.on_start().unwrap();
        assert_eq!(broadcast.registrations(), 1);
    }

    #[test]
    fn test_stop_without_start_is_noop() {
        let (sink, _queue) = channel();
        let broadcast = TestSource::named("broadcast");
        let mut registration = CallbackRegistration::new(sink).with_source(broadcast.clone());

        registration.on_stop();
        assert_eq!(*broadcast.unregister_calls.lock(), 0);
    }

    #[test]
    fn test_failed_start_rolls_back() {
        let (sink, _queue) = channel();
        let broadcast = TestSource::named("broadcast");
        let assistant = Arc::new(TestSource {
            name: "assistant",
            fail_register: true,
            ..Default::default()
        });
        let mut registration = CallbackRegistration::new(sink)
            .with_source(broadcast.clone())
            .with_source(assistant);

        let result = registration.on_start();
        assert!(matches!(
            result,
            Err(EventError::RegistrationFailed {
                source_name: "assistant",
                ..
            })
        ));
        assert!(!registration.is_registered());
        assert_eq!(broadcast.registrations(), 0);
    }

    #[test]
    fn test_stop_releases_remaining_sources_after_failure() {
        let (sink, _queue) = channel();
        let broken = Arc::new(TestSource {
            name: "broadcast",
            fail_unregister: true,
            ..Default::default()
        });
        let assistant = TestSource::named("assistant");
        let mut registration = CallbackRegistration::new(sink)
            .with_source(broken.clone())
            .with_source(assistant.clone());

        registration.on_start().unwrap();
        registration.on_stop();

        assert!(!registration.is_registered());
        assert_eq!(*broken.unregister_calls.lock(), 1);
        assert_eq!(assistant.registrations(), 0);
    }
}
