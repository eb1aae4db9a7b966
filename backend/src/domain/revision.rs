use std::sync::Arc;
use tokio::sync::watch;

/// Change counter a store bumps after every state mutation
///
/// Presentation code subscribes and re-reads derived views when the value
/// changes; nothing is recomputed behind its back.
#[derive(Clone)]
pub struct Revision {
    sender: Arc<watch::Sender<u64>>,
}

impl Revision {
    pub fn new() -> Self {
        let (sender, _) = watch::channel(0);
        Self {
            sender: Arc::new(sender),
        }
    }

    pub fn bump(&self) {
        self.sender.send_modify(|revision| *revision += 1);
    }

    pub fn current(&self) -> u64 {
        *self.sender.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.sender.subscribe()
    }
}

impl Default for Revision {
    fn default() -> Self {
        Self::new()
    }
}
