//! Keyed event dispatcher backing the button event slots.
//!
//! Each [`EventRegistry`] is owned by exactly one button event slot and holds
//! the registered listeners in insertion order. Registration is add-if-absent:
//! a key that already exists is rejected rather than overwritten, so user code
//! can probe for name collisions with the boolean return.
//!
//! The registry guards itself with a single non-reentrant mutex so that a
//! background context registering a listener cannot race the poller firing
//! the slot. A listener that calls [`EventRegistry::add`] or
//! [`EventRegistry::remove`] on the registry it was fired from will deadlock;
//! mutating a registry from inside its own callback is unsupported.

use std::sync::Mutex;

type Listener = Box<dyn FnMut() + Send>;

struct Listeners {
    keys: Vec<String>,
    callbacks: Vec<Listener>,
}

/// Thread-safe keyed collection of zero-argument callbacks.
pub struct EventRegistry {
    inner: Mutex<Listeners>,
}

impl EventRegistry {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Listeners { keys: Vec::new(), callbacks: Vec::new() }),
        }
    }

    /// Registers `callback` under `key`. Returns `false` without mutating
    /// anything if the key is already present.
    pub fn add(&self, key: impl Into<String>, callback: impl FnMut() + Send + 'static) -> bool {
        let key = key.into();
        let mut inner = self.inner.lock().unwrap();
        if inner.keys.contains(&key) {
            return false;
        }
        inner.keys.push(key);
        inner.callbacks.push(Box::new(callback));
        true
    }

    /// Removes the listener registered under `key`, reporting whether one
    /// existed.
    pub fn remove(&self, key: &str) -> bool {
        let mut inner = self.inner.lock().unwrap();
        match inner.keys.iter().position(|k| k == key) {
            Some(idx) => {
                inner.keys.remove(idx);
                inner.callbacks.remove(idx);
                true
            }
            None => false,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().unwrap().keys.is_empty()
    }

    /// Invokes every listener in registration order. Panics from listeners
    /// propagate to the caller.
    pub fn fire(&self) {
        let mut inner = self.inner.lock().unwrap();
        for callback in inner.callbacks.iter_mut() {
            callback();
        }
    }
}

impl Default for EventRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    #[test]
    fn add_rejects_duplicate_keys() {
        let registry = EventRegistry::new();
        assert!(registry.add("handler", || {}));
        assert!(!registry.add("handler", || {}));
        assert!(registry.add("other", || {}));
    }

    #[test]
    fn remove_reports_presence() {
        let registry = EventRegistry::new();
        registry.add("handler", || {});
        assert!(registry.remove("handler"));
        assert!(!registry.remove("handler"));
        assert!(registry.is_empty());
    }

    #[test]
    fn fire_runs_listeners_in_insertion_order() {
        let registry = EventRegistry::new();
        let log = Arc::new(Mutex::new(Vec::new()));

        for name in ["first", "second", "third"] {
            let log = Arc::clone(&log);
            registry.add(name, move || log.lock().unwrap().push(name));
        }
        registry.remove("second");
        registry.fire();

        assert_eq!(*log.lock().unwrap(), vec!["first", "third"]);
    }

    #[test]
    fn fire_invokes_every_listener_each_time() {
        let registry = EventRegistry::new();
        let count = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&count);
        registry.add("counter", move || {
            c.fetch_add(1, Ordering::SeqCst);
        });

        registry.fire();
        registry.fire();
        assert_eq!(count.load(Ordering::SeqCst), 2);
    }
}
