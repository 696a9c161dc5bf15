//! Connectivity state: point-in-time query plus transition subscription.
//!
//! The platform integration that actually detects network changes is out of
//! scope; it feeds a [`ConnectivityHandle`] which the engine observes.

use tokio::sync::watch;

/// Point-in-time connectivity query plus a subscription for transitions.
pub trait ConnectivityProbe: Send + Sync {
    fn is_connected(&self) -> bool;

    /// Receiver that yields on every connectivity transition. The current
    /// value is available immediately via `borrow()`.
    fn subscribe(&self) -> watch::Receiver<bool>;
}

/// Watch-channel-backed probe. The embedding application calls
/// [`set_connected`](ConnectivityHandle::set_connected) from whatever
/// platform hook reports network state.
#[derive(Debug)]
pub struct ConnectivityHandle {
    tx: watch::Sender<bool>,
}

impl ConnectivityHandle {
    pub fn new(initially_connected: bool) -> Self {
        let (tx, _rx) = watch::channel(initially_connected);
        ConnectivityHandle { tx }
    }

    /// Update the connectivity state. Subscribers are only woken when the
    /// value actually changes.
    pub fn set_connected(&self, connected: bool) {
        self.tx.send_if_modified(|state| {
            if *state != connected {
                *state = connected;
                true
            } else {
                false
            }
        });
    }
}

impl ConnectivityProbe for ConnectivityHandle {
    fn is_connected(&self) -> bool {
        *self.tx.borrow()
    }

    fn subscribe(&self) -> watch::Receiver<bool> {
        self.tx.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_transition_wakes_subscriber() {
        let handle = ConnectivityHandle::new(false);
        let mut rx = handle.subscribe();
        assert!(!handle.is_connected());

        handle.set_connected(true);
        rx.changed().await.expect("Failed to observe transition");
        assert!(*rx.borrow());
    }

    #[tokio::test]
    async fn test_redundant_set_does_not_wake() {
        let handle = ConnectivityHandle::new(true);
        let mut rx = handle.subscribe();
        handle.set_connected(true);
        assert!(!rx.has_changed().expect("channel closed"));
    }
}
