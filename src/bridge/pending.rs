use std::collections::{HashMap, HashSet};
use std::fmt::Debug;
use std::hash::Hash;
use parking_lot::Mutex;
use tokio::sync::oneshot;

/// What happened to a completion delivered to a [`PendingMap`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Delivery {
    /// A waiter received it.
    Delivered,
    /// The waiter gave up before it arrived.
    Abandoned,
    /// Nothing was waiting for this key.
    Unknown,
}

/// Waiters for completions keyed by handle or call ID.
#[derive(Debug)]
pub(crate) struct PendingMap<K, V> {
    waiters: Mutex<HashMap<K, oneshot::Sender<V>>>,
    abandoned: Mutex<HashSet<K>>,
}

impl<K, V> Default for PendingMap<K, V> {
    fn default() -> Self {
        Self {
            waiters: Mutex::new(HashMap::new()),
            abandoned: Mutex::new(HashSet::new()),
        }
    }
}

impl<K, V> PendingMap<K, V>
where
    K: Eq + Hash + Copy + Debug,
{
    /// Issues a call and registers a waiter for the key it returns. The waiter map stays locked
    /// while `start` runs so a completion sent from another thread cannot arrive unclaimed.
    pub(crate) fn issue<F>(&self, start: F) -> Option<(K, oneshot::Receiver<V>)>
    where
        F: FnOnce() -> Option<K>,
    {
        let mut waiters = self.waiters.lock();
        let key = start()?;
        let (sender, receiver) = oneshot::channel();

        if waiters.insert(key, sender).is_some() {
            log::warn!("Backend issued {key:?} while a wait for it was still registered");
        }

        Some((key, receiver))
    }

    /// Registers a waiter for a key that was already issued.
    pub(crate) fn register(&self, key: K) -> oneshot::Receiver<V> {
        let (sender, receiver) = oneshot::channel();

        self.waiters.lock().insert(key, sender);
        receiver
    }

    /// Delivers a completion.
    pub(crate) fn complete(&self, key: &K, value: V) -> Delivery {
        let waiter = self.waiters.lock().remove(key);

        if let Some(sender) = waiter {
            // The receiver is gone if the awaiting future was dropped.
            return match sender.send(value) {
                Ok(()) => Delivery::Delivered,
                Err(_) => Delivery::Abandoned,
            };
        }

        if self.abandoned.lock().remove(key) {
            Delivery::Abandoned
        } else {
            Delivery::Unknown
        }
    }

    /// Removes a waiter that no longer needs a notification.
    pub(crate) fn cancel(&self, key: &K) {
        self.waiters.lock().remove(key);
    }

    /// Removes a waiter that gave up. A later completion for it is reported as
    /// [`Delivery::Abandoned`].
    pub(crate) fn abandon(&self, key: K) {
        self.waiters.lock().remove(&key);
        self.abandoned.lock().insert(key);
    }

    /// The number of registered waiters.
    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.waiters.lock().len()
    }
}
