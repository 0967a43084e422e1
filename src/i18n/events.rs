//! Language change notifications.
//!
//! A `LanguageEventBus` is shared by every page module in the process. Events
//! are delivered synchronously, in registration order, to the listeners that
//! were registered when `publish` was called.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, Weak};
use tracing::debug;

/// Name under which language changes are broadcast
pub const GLOBAL_LANGUAGE_CHANGED: &str = "globalLanguageChanged";

/// Payload of a language change notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageChanged {
    /// The newly selected language code
    pub language: String,
}

impl LanguageChanged {
    pub fn new(language: impl Into<String>) -> Self {
        Self {
            language: language.into(),
        }
    }

    /// Event name, for logging and diagnostics.
    pub fn name(&self) -> &'static str {
        GLOBAL_LANGUAGE_CHANGED
    }
}

type Listener = Arc<dyn Fn(&LanguageChanged) + Send + Sync>;

#[derive(Default)]
struct BusInner {
    next_id: AtomicU64,
    listeners: Mutex<Vec<(u64, Listener)>>,
}

impl BusInner {
    fn listeners(&self) -> MutexGuard<'_, Vec<(u64, Listener)>> {
        // A panicking listener runs outside the lock, so a poisoned list is
        // still consistent.
        self.listeners.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Publish/subscribe hub for `LanguageChanged` events.
///
/// Cloning yields another handle to the same bus.
#[derive(Clone, Default)]
pub struct LanguageEventBus {
    inner: Arc<BusInner>,
}

impl std::fmt::Debug for LanguageEventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LanguageEventBus")
            .field("listeners", &self.listener_count())
            .finish()
    }
}

impl LanguageEventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `listener` for all future events.
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&LanguageChanged) + Send + Sync + 'static,
    {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        self.inner.listeners().push((id, Arc::new(listener)));
        debug!("Listener {} subscribed to {}", id, GLOBAL_LANGUAGE_CHANGED);

        Subscription {
            id,
            bus: Arc::downgrade(&self.inner),
        }
    }

    /// Deliver `event` to every listener registered right now.
    ///
    /// Returns the number of listeners the event was delivered to.
    pub fn publish(&self, event: &LanguageChanged) -> usize {
        let snapshot: Vec<Listener> = self
            .inner
            .listeners()
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect();

        debug!(
            "Publishing {} ({}) to {} listeners",
            event.name(),
            event.language,
            snapshot.len()
        );

        for listener in &snapshot {
            listener(event);
        }
        snapshot.len()
    }

    pub fn listener_count(&self) -> usize {
        self.inner.listeners().len()
    }
}

/// Handle to a registered listener.
///
/// Dropping the handle leaves the listener registered; call `unsubscribe` to
/// remove it.
#[derive(Debug)]
pub struct Subscription {
    id: u64,
    bus: Weak<BusInner>,
}

impl Subscription {
    /// Remove the listener. Returns `false` if it was already gone.
    pub fn unsubscribe(self) -> bool {
        let Some(bus) = self.bus.upgrade() else {
            return false;
        };
        let mut listeners = bus.listeners();
        let before = listeners.len();
        listeners.retain(|(id, _)| *id != self.id);
        let removed = listeners.len() != before;
        if removed {
            debug!("Listener {} unsubscribed", self.id);
        }
        removed
    }

    pub fn id(&self) -> u64 {
        self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    fn recorder() -> (Arc<Mutex<Vec<String>>>, impl Fn(&LanguageChanged) + Send + Sync) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        (seen, move |event: &LanguageChanged| {
            sink.lock().unwrap().push(event.language.clone())
        })
    }

    #[test]
    fn test_event_name() {
        assert_eq!(LanguageChanged::new("fr").name(), "globalLanguageChanged");
    }

    #[test]
    fn test_publish_without_listeners() {
        let bus = LanguageEventBus::new();
        assert_eq!(bus.publish(&LanguageChanged::new("fr")), 0);
    }

    #[test]
    fn test_publish_delivers_payload() {
        let bus = LanguageEventBus::new();
        let (seen, listener) = recorder();
        let _sub = bus.subscribe(listener);

        assert_eq!(bus.publish(&LanguageChanged::new("fr")), 1);
        assert_eq!(*seen.lock().unwrap(), vec!["fr".to_string()]);
    }

    #[test]
    fn test_publish_in_registration_order() {
        let bus = LanguageEventBus::new();
        let order = Arc::new(Mutex::new(Vec::new()));

        for name in ["first", "second", "third"] {
            let order = Arc::clone(&order);
            let _ = bus.subscribe(move |_| order.lock().unwrap().push(name));
        }

        bus.publish(&LanguageChanged::new("de"));
        assert_eq!(*order.lock().unwrap(), vec!["first", "second", "third"]);
    }

    #[test]
    fn test_late_listener_misses_earlier_events() {
        let bus = LanguageEventBus::new();
        bus.publish(&LanguageChanged::new("fr"));

        let (seen, listener) = recorder();
        let _sub = bus.subscribe(listener);
        assert!(seen.lock().unwrap().is_empty());

        bus.publish(&LanguageChanged::new("es"));
        assert_eq!(*seen.lock().unwrap(), vec!["es".to_string()]);
    }

    #[test]
    fn test_unsubscribe_stops_delivery() {
        let bus = LanguageEventBus::new();
        let (seen, listener) = recorder();
        let sub = bus.subscribe(listener);

        bus.publish(&LanguageChanged::new("fr"));
        assert!(sub.unsubscribe());
        bus.publish(&LanguageChanged::new("es"));

        assert_eq!(*seen.lock().unwrap(), vec!["fr".to_string()]);
        assert_eq!(bus.listener_count(), 0);
    }

    #[test]
    fn test_drop_keeps_listener() {
        let bus = LanguageEventBus::new();
        let (seen, listener) = recorder();
        drop(bus.subscribe(listener));

        bus.publish(&LanguageChanged::new("it"));
        assert_eq!(*seen.lock().unwrap(), vec!["it".to_string()]);
    }

    #[test]
    fn test_unsubscribe_after_bus_dropped() {
        let bus = LanguageEventBus::new();
        let sub = bus.subscribe(|_| {});
        drop(bus);
        assert!(!sub.unsubscribe());
    }

    #[test]
    fn test_listener_subscribing_during_publish_is_not_called() {
        let bus = LanguageEventBus::new();
        let late_calls = Arc::new(Mutex::new(0));

        let inner_bus = bus.clone();
        let counter = Arc::clone(&late_calls);
        let _sub = bus.subscribe(move |_| {
            let counter = Arc::clone(&counter);
            let _ = inner_bus.subscribe(move |_| *counter.lock().unwrap() += 1);
        });

        bus.publish(&LanguageChanged::new("fr"));
        assert_eq!(*late_calls.lock().unwrap(), 0);
        assert_eq!(bus.listener_count(), 2);
    }

    #[test]
    fn test_clones_share_listeners() {
        let bus = LanguageEventBus::new();
        let other = bus.clone();
        let (seen, listener) = recorder();
        let _sub = other.subscribe(listener);

        bus.publish(&LanguageChanged::new("nl"));
        assert_eq!(*seen.lock().unwrap(), vec!["nl".to_string()]);
    }
}
