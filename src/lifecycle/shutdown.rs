//! Shutdown coordination.

use tokio::sync::broadcast;

/// Broadcasts a single "stop" event to every subscribed task.
///
/// The HTTP server subscribes before it starts serving; the signal task (or a
/// test) calls [`Shutdown::trigger`].
#[derive(Debug)]
pub struct Shutdown {
    tx: broadcast::Sender<()>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.tx.subscribe()
    }

    /// Fire the event. A trigger with no subscribers left is not an error.
    pub fn trigger(&self) {
        let _ = self.tx.send(());
    }

    /// Tasks still listening.
    pub fn receiver_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}
