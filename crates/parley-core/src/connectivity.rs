//! Network availability tracking.
//!
//! The monitor only owns its own boolean. Sessions never read it implicitly;
//! they are registered as observers and receive each transition through
//! [`ConnectivityObserver::on_connectivity_change`].

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Receives connectivity transitions.
pub trait ConnectivityObserver: Send + Sync {
    /// Called with the new status, once per transition.
    fn on_connectivity_change(&self, online: bool);
}

struct MonitorInner {
    online: bool,
    observers: Vec<Arc<dyn ConnectivityObserver>>,
}

/// Tracks whether the platform currently reports network access.
///
/// Transitions are driven by external boundary events through
/// [`set_online`](Self::set_online). Every registered observer is called
/// synchronously, in registration order, before `set_online` returns, so two
/// quick transitions are both delivered. A repeated identical signal is
/// ignored. Clones share the same underlying state.
///
/// Observers are called with the monitor locked and must not call back into
/// it.
#[derive(Clone)]
pub struct ConnectivityMonitor {
    inner: Arc<Mutex<MonitorInner>>,
}

impl ConnectivityMonitor {
    /// Creates a monitor seeded with the platform-reported status.
    pub fn new(initially_online: bool) -> Self {
        Self {
            inner: Arc::new(Mutex::new(MonitorInner {
                online: initially_online,
                observers: Vec::new(),
            })),
        }
    }

    /// Current status.
    pub fn is_online(&self) -> bool {
        self.lock().online
    }

    /// Applies a boundary event.
    ///
    /// # Returns
    ///
    /// `true` if this was a transition and observers were notified.
    pub fn set_online(&self, online: bool) -> bool {
        let mut inner = self.lock();
        if inner.online == online {
            return false;
        }
        inner.online = online;

        tracing::info!(online, observers = inner.observers.len(), "Connectivity changed");
        for observer in &inner.observers {
            observer.on_connectivity_change(online);
        }
        true
    }

    /// Registers an observer for every later transition.
    ///
    /// The observer is not called with the current status; read
    /// [`is_online`](Self::is_online) to seed it.
    pub fn register(&self, observer: Arc<dyn ConnectivityObserver>) {
        self.lock().observers.push(observer);
    }

    fn lock(&self) -> MutexGuard<'_, MonitorInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for ConnectivityMonitor {
    fn default() -> Self {
        Self::new(true)
    }
}

impl fmt::Debug for ConnectivityMonitor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.lock();
        f.debug_struct("ConnectivityMonitor")
            .field("online", &inner.online)
            .field("observers", &inner.observers.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct RecordingObserver {
        seen: Mutex<Vec<bool>>,
    }

    impl RecordingObserver {
        fn seen(&self) -> Vec<bool> {
            self.seen.lock().unwrap().clone()
        }
    }

    impl ConnectivityObserver for RecordingObserver {
        fn on_connectivity_change(&self, online: bool) {
            self.seen.lock().unwrap().push(online);
        }
    }

    #[test]
    fn test_initial_state() {
        assert!(ConnectivityMonitor::new(true).is_online());
        assert!(!ConnectivityMonitor::new(false).is_online());
    }

    #[test]
    fn test_only_transitions_notify() {
        let monitor = ConnectivityMonitor::new(true);
        let observer = Arc::new(RecordingObserver::default());
        monitor.register(observer.clone());

        assert!(!monitor.set_online(true));
        assert!(observer.seen().is_empty());

        assert!(monitor.set_online(false));
        assert_eq!(observer.seen(), vec![false]);
        assert!(!monitor.is_online());
    }

    #[test]
    fn test_quick_transitions_are_all_delivered() {
        let monitor = ConnectivityMonitor::new(true);
        let observer = Arc::new(RecordingObserver::default());
        monitor.register(observer.clone());

        monitor.set_online(false);
        monitor.set_online(true);

        assert_eq!(observer.seen(), vec![false, true]);
    }

    #[test]
    fn test_every_observer_is_notified_through_clones() {
        let monitor = ConnectivityMonitor::new(true);
        let first = Arc::new(RecordingObserver::default());
        let second = Arc::new(RecordingObserver::default());
        monitor.register(first.clone());
        monitor.clone().register(second.clone());

        monitor.clone().set_online(false);

        assert_eq!(first.seen(), vec![false]);
        assert_eq!(second.seen(), vec![false]);
    }
}
