use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::Mutex;

use tokio::sync::watch;
use tracing::debug;

type Calls<T> = Mutex<HashMap<String, watch::Receiver<Option<T>>>>;

/// Deduplicates concurrent calls that share a key.
///
/// The tracking map lock is held only while a call is registered or removed,
/// never while the work itself runs, so distinct keys proceed in parallel.
/// A call is unregistered the moment it completes: a caller arriving after
/// that starts a fresh execution instead of reusing the old result.
pub struct CallGroup<T> {
    calls: Calls<T>,
}

enum Role<T> {
    Leader(watch::Sender<Option<T>>),
    Follower(watch::Receiver<Option<T>>),
}

/// Registration of the call currently executing for one key.
///
/// Dropping it before [`Flight::complete`] (for example when the leading
/// future is cancelled) unregisters the key and closes the channel, which
/// sends followers back to retry.
struct Flight<'a, T> {
    calls: &'a Calls<T>,
    key: &'a str,
    tx: watch::Sender<Option<T>>,
    registered: bool,
}

impl<T> Flight<'_, T> {
    fn complete(mut self, value: T) {
        self.unregister();
        self.tx.send_replace(Some(value));
    }

    fn unregister(&mut self) {
        if self.registered {
            self.calls
                .lock()
                .expect("call group lock poisoned")
                .remove(self.key);
            self.registered = false;
        }
    }
}

impl<T> Drop for Flight<'_, T> {
    fn drop(&mut self) {
        self.unregister();
    }
}

impl<T: Clone> CallGroup<T> {
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(HashMap::new()),
        }
    }

    /// Run `work` for `key` unless a call for `key` is already in flight, in
    /// which case wait for that call and return a clone of its result.
    ///
    /// For any key at most one `work` executes at a time.
    pub async fn run<F, Fut>(&self, key: &str, work: F) -> T
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        let tx = loop {
            let mut rx = match self.join_or_lead(key) {
                Role::Leader(tx) => break tx,
                Role::Follower(rx) => rx,
            };
            let shared = rx
                .wait_for(Option::is_some)
                .await
                .ok()
                .and_then(|value| (*value).clone());
            if let Some(value) = shared {
                return value;
            }
            debug!(key, "in-flight call abandoned, retrying");
        };

        let flight = Flight {
            calls: &self.calls,
            key,
            tx,
            registered: true,
        };
        let value = work().await;
        flight.complete(value.clone());
        value
    }

    /// Number of keys with a call currently executing.
    pub fn in_flight(&self) -> usize {
        self.calls.lock().expect("call group lock poisoned").len()
    }

    fn join_or_lead(&self, key: &str) -> Role<T> {
        let mut calls = self.calls.lock().expect("call group lock poisoned");
        if let Some(rx) = calls.get(key) {
            return Role::Follower(rx.clone());
        }
        let (tx, rx) = watch::channel(None);
        calls.insert(key.to_string(), rx);
        Role::Leader(tx)
    }
}

impl<T: Clone> Default for CallGroup<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for CallGroup<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let in_flight = self.calls.lock().map(|calls| calls.len()).unwrap_or(0);
        f.debug_struct("CallGroup")
            .field("in_flight", &in_flight)
            .finish()
    }
}
