use std::fmt::Debug;
use tokio::sync::{broadcast, mpsc, Mutex, RwLock};

// Notifier lets session tasks know that the server is shutting down.
#[derive(Debug)]
pub struct Notifier {
    shutdown_tx: RwLock<Option<broadcast::Sender<()>>>,
    shutdown_complete_tx: RwLock<Option<mpsc::Sender<()>>>,
    shutdown_complete_rx: Mutex<mpsc::Receiver<()>>,
}

impl Notifier {
    pub fn new() -> Notifier {
        let (shutdown_tx, _) = broadcast::channel(1);
        let (shutdown_complete_tx, shutdown_complete_rx) = mpsc::channel(1);
        Notifier {
            shutdown_tx: RwLock::new(Some(shutdown_tx)),
            shutdown_complete_tx: RwLock::new(Some(shutdown_complete_tx)),
            shutdown_complete_rx: Mutex::new(shutdown_complete_rx),
        }
    }

    // Tells all subscribed listeners that shutdown is commencing. A listener
    // signals that it is done by simply going out of scope.
    pub async fn notify(&self) {
        // Dropping the broadcast sender wakes every subscribed receiver.
        drop(self.shutdown_tx.write().await.take());
        // Dropping our mpsc sender leaves only the clones held by session
        // tasks; linger() completes when the last of those drops.
        drop(self.shutdown_complete_tx.write().await.take());
    }

    // Waits until all tasks holding a Listener have finished.
    pub async fn linger(&self) {
        let _ = self.shutdown_complete_rx.lock().await.recv().await;
    }

    pub async fn subscribe(&self) -> Listener {
        let sender_opt = self.shutdown_tx.read().await;
        let complete_sender_opt = self.shutdown_complete_tx.read().await;
        Listener {
            shutdown: sender_opt.is_none(),
            shutdown_rx: sender_opt.as_ref().map(|tx| tx.subscribe()),
            _shutdown_complete_tx: complete_sender_opt.clone(),
        }
    }
}

impl Default for Notifier {
    fn default() -> Self {
        Notifier::new()
    }
}

// Listener is held by a session task for its whole lifetime; the embedded
// completion sender is what linger() waits on.
#[derive(Debug)]
pub struct Listener {
    shutdown: bool,
    shutdown_rx: Option<broadcast::Receiver<()>>,
    // Held (never read) so linger() keeps waiting until this drops.
    _shutdown_complete_tx: Option<mpsc::Sender<()>>,
}

impl Listener {
    /// Receives the shutdown notice, waiting if necessary.
    pub async fn listen(&mut self) {
        if self.shutdown {
            return;
        }
        if let Some(rx) = self.shutdown_rx.as_mut() {
            // Only one value is ever "sent" (by dropping the sender), so a
            // lag error cannot occur.
            let _ = rx.recv().await;
        }
        self.shutdown = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn notify_wakes_subscribers_and_linger_waits_for_them() {
        let notifier = std::sync::Arc::new(Notifier::new());
        let mut listener = notifier.subscribe().await;

        let task = tokio::spawn(async move {
            listener.listen().await;
            // simulate winding-down work
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
            drop(listener);
        });

        notifier.notify().await;
        notifier.linger().await;
        task.await.unwrap();
    }

    #[tokio::test]
    async fn subscribing_after_notify_returns_immediately() {
        let notifier = Notifier::new();
        notifier.notify().await;
        let mut listener = notifier.subscribe().await;
        // must not hang
        listener.listen().await;
    }
}
