//! Change notification channel.
//!
//! Observers only learn that stored state changed; they re-read the store
//! themselves. Delivery iterates over a snapshot of the registry, so a
//! callback may subscribe or unsubscribe while it is being notified.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

type Callback = Arc<dyn Fn() + Send + Sync>;

#[derive(Default)]
struct Registry {
    next_token: AtomicU64,
    listeners: Mutex<Vec<(u64, Callback)>>,
}

/// Fan-out of payload-free "state changed" signals.
#[derive(Clone, Default)]
pub struct Notifier {
    inner: Arc<Registry>,
}

impl Notifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `callback`; it runs once per `notify` until unsubscribed.
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn() + Send + Sync + 'static,
    {
        let token = self.inner.next_token.fetch_add(1, Ordering::Relaxed);
        self.inner
            .listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((token, Arc::new(callback)));

        Subscription {
            token,
            registry: Arc::downgrade(&self.inner),
        }
    }

    /// Signal every current subscriber.
    pub fn notify(&self) {
        let snapshot: Vec<Callback> = self
            .inner
            .listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(_, callback)| Arc::clone(callback))
            .collect();

        for callback in snapshot {
            callback();
        }
    }

    /// Number of live subscriptions
    pub fn subscriber_count(&self) -> usize {
        self.inner
            .listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

impl std::fmt::Debug for Notifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Notifier")
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}

/// Handle returned by [`Notifier::subscribe`].
///
/// Dropping the handle does not unsubscribe.
#[derive(Debug, Clone)]
pub struct Subscription {
    token: u64,
    registry: std::sync::Weak<Registry>,
}

impl Subscription {
    /// Stop future deliveries to this callback. Safe to call repeatedly.
    pub fn unsubscribe(&self) {
        let Some(registry) = self.registry.upgrade() else {
            return;
        };
        registry
            .listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .retain(|(token, _)| *token != self.token);
    }
}
