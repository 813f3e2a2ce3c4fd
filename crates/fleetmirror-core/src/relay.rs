// ── Frame relay ──
//
// Screen frames bypass the registry: they are display-only and arrive far
// more often than state changes. Fan-out is a `broadcast` channel, so slow
// subscribers lose frames instead of applying backpressure to the session.

use std::sync::Arc;

use tokio::sync::broadcast;
use tracing::{trace, warn};

use crate::model::Frame;

/// Default per-subscriber frame buffer.
pub const DEFAULT_FRAME_BUFFER: usize = 16;

/// Publisher side of the frame fan-out. Cheap to clone.
#[derive(Clone)]
pub struct FrameRelay {
    tx: broadcast::Sender<Arc<Frame>>,
}

impl FrameRelay {
    pub fn new(buffer: usize) -> Self {
        let (tx, _) = broadcast::channel(buffer.max(1));
        Self { tx }
    }

    /// Forward a frame to every current subscriber. With no subscribers
    /// the frame is dropped.
    pub fn publish(&self, frame: Frame) {
        if self.tx.receiver_count() == 0 {
            trace!(device_id = %frame.device_id, "no frame subscribers, dropping");
            return;
        }
        // A send error only means every receiver went away meanwhile.
        let _ = self.tx.send(Arc::new(frame));
    }

    pub fn subscribe(&self) -> FrameSubscription {
        FrameSubscription {
            rx: self.tx.subscribe(),
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for FrameRelay {
    fn default() -> Self {
        Self::new(DEFAULT_FRAME_BUFFER)
    }
}

/// One consumer's view of the frame fan-out.
///
/// Sees only frames published after it subscribed.
pub struct FrameSubscription {
    rx: broadcast::Receiver<Arc<Frame>>,
}

impl FrameSubscription {
    /// Next frame in arrival order. Frames overwritten while this consumer
    /// lagged are skipped. Returns `None` once the relay is gone.
    pub async fn recv(&mut self) -> Option<Arc<Frame>> {
        loop {
            match self.rx.recv().await {
                Ok(frame) => return Some(frame),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(skipped, "frame subscriber lagging, frames dropped");
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    /// Non-blocking variant of [`recv`](Self::recv).
    pub fn try_recv(&mut self) -> Option<Arc<Frame>> {
        loop {
            match self.rx.try_recv() {
                Ok(frame) => return Some(frame),
                Err(broadcast::error::TryRecvError::Lagged(skipped)) => {
                    warn!(skipped, "frame subscriber lagging, frames dropped");
                }
                Err(_) => return None,
            }
        }
    }
}
