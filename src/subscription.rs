//! Publish/subscribe registry
//!
//! Used by the price cache and the opportunity detector to fan events out to
//! observers. Each publish iterates a snapshot of the handler set taken with
//! the lock released, so handlers may subscribe, unsubscribe or read back
//! into the publisher while being notified.

use parking_lot::Mutex;
use std::sync::{Arc, Weak};

type Handler<T> = Arc<dyn Fn(&T) + Send + Sync>;

struct Handlers<T> {
    next_id: u64,
    entries: Vec<(u64, Handler<T>)>,
}

/// Registry of event handlers for events of type `T`
pub struct Registry<T> {
    handlers: Arc<Mutex<Handlers<T>>>,
}

impl<T: 'static> Registry<T> {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            handlers: Arc::new(Mutex::new(Handlers {
                next_id: 0,
                entries: Vec::new(),
            })),
        }
    }

    /// Register a handler, returning the handle that removes it
    pub fn subscribe<F>(&self, handler: F) -> Subscription
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        let id = {
            let mut handlers = self.handlers.lock();
            let id = handlers.next_id;
            handlers.next_id += 1;
            handlers.entries.push((id, Arc::new(handler)));
            id
        };

        let weak: Weak<Mutex<Handlers<T>>> = Arc::downgrade(&self.handlers);
        Subscription {
            id,
            detach: Box::new(move |id| {
                if let Some(handlers) = weak.upgrade() {
                    handlers.lock().entries.retain(|(entry_id, _)| *entry_id != id);
                }
            }),
        }
    }

    /// Deliver an event to every handler registered at the time of the call
    pub fn publish(&self, event: &T) {
        let snapshot: Vec<Handler<T>> = self
            .handlers
            .lock()
            .entries
            .iter()
            .map(|(_, handler)| Arc::clone(handler))
            .collect();

        for handler in snapshot {
            handler(event);
        }
    }

    /// Number of registered handlers
    pub fn len(&self) -> usize {
        self.handlers.lock().entries.len()
    }

    /// True if no handlers are registered
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T: 'static> Default for Registry<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Handle returned by [`Registry::subscribe`]
///
/// Dropping the handle leaves the handler registered; call
/// [`Subscription::unsubscribe`] to remove it.
pub struct Subscription {
    id: u64,
    detach: Box<dyn FnOnce(u64) + Send + Sync>,
}

impl Subscription {
    /// Remove the handler from its registry
    pub fn unsubscribe(self) {
        (self.detach)(self.id);
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_publish_reaches_all_handlers() {
        let registry: Registry<u32> = Registry::new();
        let total = Arc::new(AtomicUsize::new(0));

        for _ in 0..3 {
            let total = Arc::clone(&total);
            let _ = registry.subscribe(move |v| {
                total.fetch_add(*v as usize, Ordering::SeqCst);
            });
        }

        registry.publish(&2);
        assert_eq!(total.load(Ordering::SeqCst), 6);
        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn test_unsubscribe_removes_handler() {
        let registry: Registry<u32> = Registry::new();
        let calls = Arc::new(AtomicUsize::new(0));

        let counter = Arc::clone(&calls);
        let sub = registry.subscribe(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        registry.publish(&1);
        sub.unsubscribe();
        registry.publish(&1);

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(registry.is_empty());
    }

    #[test]
    fn test_unsubscribe_self_during_publish() {
        let registry: Arc<Registry<u32>> = Arc::new(Registry::new());
        let slot: Arc<Mutex<Option<Subscription>>> = Arc::new(Mutex::new(None));
        let first_calls = Arc::new(AtomicUsize::new(0));
        let second_calls = Arc::new(AtomicUsize::new(0));

        let first_slot = Arc::clone(&slot);
        let first = Arc::clone(&first_calls);
        let sub = registry.subscribe(move |_| {
            first.fetch_add(1, Ordering::SeqCst);
            if let Some(sub) = first_slot.lock().take() {
                sub.unsubscribe();
            }
        });
        *slot.lock() = Some(sub);

        let second = Arc::clone(&second_calls);
        let _ = registry.subscribe(move |_| {
            second.fetch_add(1, Ordering::SeqCst);
        });

        registry.publish(&1);
        registry.publish(&1);

        // The self-removing handler ran once, its neighbour was never skipped
        assert_eq!(first_calls.load(Ordering::SeqCst), 1);
        assert_eq!(second_calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_subscribe_during_publish_not_invoked_until_next_event() {
        let registry: Arc<Registry<u32>> = Arc::new(Registry::new());
        let late_calls = Arc::new(AtomicUsize::new(0));

        let inner_registry = Arc::downgrade(&registry);
        let late = Arc::clone(&late_calls);
        let _ = registry.subscribe(move |v| {
            if *v == 0 {
                if let Some(registry) = inner_registry.upgrade() {
                    let late = Arc::clone(&late);
                    let _ = registry.subscribe(move |_| {
                        late.fetch_add(1, Ordering::SeqCst);
                    });
                }
            }
        });

        registry.publish(&0);
        assert_eq!(late_calls.load(Ordering::SeqCst), 0);

        registry.publish(&1);
        assert_eq!(late_calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_unsubscribe_after_registry_dropped() {
        let registry: Registry<u32> = Registry::new();
        let sub = registry.subscribe(|_| {});
        drop(registry);
        sub.unsubscribe();
    }
}
