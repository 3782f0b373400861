//! Publish/subscribe primitives
//!
//! Every live value in the pipeline (sensor readings, the combined sample,
//! training state, engine flags, predictions) is observable. Observers are
//! plain callbacks invoked synchronously on the notifying thread, in
//! registration order, and run to completion before `notify` returns.
//!
//! ## Lifecycle
//!
//! `subscribe` hands back a [`Subscription`]. Dropping it, or calling
//! [`Subscription::unsubscribe`], removes the callback; both are idempotent
//! and safe after the publisher itself is gone. Internal wiring
//! (synchronizer to sources, engine to settings, classifier to selection)
//! keeps its subscriptions as fields so teardown is automatic and repeated
//! start/stop cycles never accumulate listeners.
//!
//! ```rust
//! use std::sync::Arc;
//! use std::sync::atomic::{AtomicUsize, Ordering};
//! use gestura_core::observe::Store;
//!
//! let flag = Store::new(false);
//! let seen = Arc::new(AtomicUsize::new(0));
//!
//! let counter = seen.clone();
//! let subscription = flag.subscribe(move |_| {
//!     counter.fetch_add(1, Ordering::SeqCst);
//! });
//!
//! flag.set(true);
//! flag.set(true); // unchanged, no notification
//! drop(subscription);
//! flag.set(false);
//!
//! assert_eq!(seen.load(Ordering::SeqCst), 1);
//! ```

use parking_lot::Mutex;
use std::sync::{Arc, Weak};

type Callback<T> = Arc<dyn Fn(&T) + Send + Sync>;

struct Registry<T> {
    next_id: u64,
    entries: Vec<(u64, Callback<T>)>,
}

/// Set of registered callbacks for values of type `T`
pub struct Subscribers<T> {
    registry: Arc<Mutex<Registry<T>>>,
}

impl<T: 'static> Subscribers<T> {
    /// Empty set of callbacks
    pub fn new() -> Self {
        Self {
            registry: Arc::new(Mutex::new(Registry {
                next_id: 0,
                entries: Vec::new(),
            })),
        }
    }

    /// Register a callback; it stays registered until the subscription is disposed
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        let id = {
            let mut registry = self.registry.lock();
            let id = registry.next_id;
            registry.next_id += 1;
            registry.entries.push((id, Arc::new(callback)));
            id
        };

        let registry: Weak<Mutex<Registry<T>>> = Arc::downgrade(&self.registry);
        Subscription::new(move || {
            if let Some(registry) = registry.upgrade() {
                registry.lock().entries.retain(|(entry, _)| *entry != id);
            }
        })
    }

    /// Invoke every registered callback with `value`
    ///
    /// The callback list is snapshotted first, so callbacks may subscribe or
    /// unsubscribe without deadlocking.
    pub fn notify(&self, value: &T) {
        let callbacks: Vec<Callback<T>> = self
            .registry
            .lock()
            .entries
            .iter()
            .map(|(_, callback)| callback.clone())
            .collect();

        for callback in callbacks {
            callback(value);
        }
    }

    /// Number of live subscriptions
    pub fn len(&self) -> usize {
        self.registry.lock().entries.len()
    }

    /// Whether no subscription is live
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T: 'static> Default for Subscribers<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Disposer returned by every `subscribe` call
///
/// Unsubscribes on drop. Hold it for as long as the callback should fire.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    dispose: Option<Box<dyn FnOnce() + Send + Sync>>,
}

impl Subscription {
    fn new<F>(dispose: F) -> Self
    where
        F: FnOnce() + Send + Sync + 'static,
    {
        Self {
            dispose: Some(Box::new(dispose)),
        }
    }

    /// Remove the callback. Calling this more than once is a no-op.
    pub fn unsubscribe(&mut self) {
        if let Some(dispose) = self.dispose.take() {
            dispose();
        }
    }

    /// Whether the callback is still registered
    pub fn is_active(&self) -> bool {
        self.dispose.is_some()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}

impl core::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.is_active())
            .finish()
    }
}

/// Writable observable value
///
/// Cloning a `Store` yields another handle to the same value. Subscribers
/// are notified after the lock is released, and only when the value
/// actually changed.
pub struct Store<T> {
    value: Arc<Mutex<T>>,
    subscribers: Arc<Subscribers<T>>,
}

impl<T> Clone for Store<T> {
    fn clone(&self) -> Self {
        Self {
            value: self.value.clone(),
            subscribers: self.subscribers.clone(),
        }
    }
}

impl<T: Clone + PartialEq + Send + 'static> Store<T> {
    /// Store holding `initial`
    pub fn new(initial: T) -> Self {
        Self {
            value: Arc::new(Mutex::new(initial)),
            subscribers: Arc::new(Subscribers::new()),
        }
    }

    /// Snapshot of the current value
    pub fn get(&self) -> T {
        self.value.lock().clone()
    }

    /// Replace the value; returns whether it changed
    pub fn set(&self, value: T) -> bool {
        let changed = {
            let mut current = self.value.lock();
            if *current == value {
                false
            } else {
                *current = value.clone();
                true
            }
        };

        if changed {
            self.subscribers.notify(&value);
        }
        changed
    }

    /// Modify the value in place; returns whether it changed
    ///
    /// `modify` runs under the value lock, so concurrent updates never
    /// lose each other's writes. It must not touch this store.
    pub fn update<F>(&self, modify: F) -> bool
    where
        F: FnOnce(&mut T),
    {
        let changed = {
            let mut current = self.value.lock();
            let before = current.clone();
            modify(&mut *current);
            (*current != before).then(|| current.clone())
        };

        match changed {
            Some(value) => {
                self.subscribers.notify(&value);
                true
            }
            None => false,
        }
    }

    /// Observe future changes
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        self.subscribers.subscribe(callback)
    }

    /// Number of live subscriptions
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }
}

impl<T: Clone + PartialEq + Send + Default + 'static> Default for Store<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}
