//! Push-based fan-out streams.
//!
//! A [`Subject`] delivers every published value to each live
//! [`Subscription`], in publish order. Values published before a subscription
//! was created are not replayed to it.

use std::sync::{mpsc, Mutex, PoisonError};
use std::time::Duration;

pub struct Subject<T> {
    subscribers: Mutex<Vec<mpsc::Sender<T>>>,
}

impl<T: Clone> Subject<T> {
    pub fn new() -> Self {
        Self {
            subscribers: Mutex::new(Vec::new()),
        }
    }

    pub fn subscribe(&self) -> Subscription<T> {
        let (tx, rx) = mpsc::channel();
        self.subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(tx);
        Subscription { rx }
    }

    /// Delivers `value` to every live subscriber; returns how many received it.
    /// Dropped subscriptions are pruned.
    pub fn publish(&self, value: T) -> usize {
        let mut subscribers = self
            .subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        subscribers.retain(|tx| tx.send(value.clone()).is_ok());
        subscribers.len()
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

impl<T: Clone> Default for Subject<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Receiving end of a [`Subject`]. Dropping it unsubscribes.
pub struct Subscription<T> {
    rx: mpsc::Receiver<T>,
}

impl<T> Subscription<T> {
    pub fn try_next(&self) -> Option<T> {
        self.rx.try_recv().ok()
    }

    pub fn next_timeout(&self, timeout: Duration) -> Option<T> {
        self.rx.recv_timeout(timeout).ok()
    }

    /// Everything delivered so far, oldest first.
    pub fn drain(&self) -> Vec<T> {
        self.rx.try_iter().collect()
    }
}
