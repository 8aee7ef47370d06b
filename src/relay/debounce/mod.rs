use crate::bus::OutboundMessage;
use crate::channels::SmsSender;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

struct PendingReply {
    reply: String,
    generation: u64,
    timer: JoinHandle<()>,
}

type PendingMap = Arc<Mutex<HashMap<String, PendingReply>>>;

/// Holds the latest reply per sender and delivers it once the sender has been
/// quiet for the configured period.
///
/// Scheduling again for the same sender overwrites the pending reply and
/// replaces its timer. A timer only delivers if its generation is still the
/// current one, and it removes the pending entry under the same lock, so a
/// reply is delivered at most once.
pub struct ReplyDebouncer {
    quiet_period: Duration,
    sms: Arc<dyn SmsSender>,
    pending: PendingMap,
    next_generation: AtomicU64,
}

impl ReplyDebouncer {
    pub fn new(quiet_period: Duration, sms: Arc<dyn SmsSender>) -> Self {
        Self {
            quiet_period,
            sms,
            pending: Arc::new(Mutex::new(HashMap::new())),
            next_generation: AtomicU64::new(1),
        }
    }

    /// Make `reply` the sender's pending reply and restart the quiet period.
    pub fn schedule(&self, sender: &str, reply: String) {
        let generation = self.next_generation.fetch_add(1, Ordering::Relaxed);
        let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);

        let timer = tokio::spawn(fire_after(
            self.quiet_period,
            sender.to_string(),
            generation,
            self.pending.clone(),
            self.sms.clone(),
        ));

        if let Some(previous) = pending.insert(
            sender.to_string(),
            PendingReply {
                reply,
                generation,
                timer,
            },
        ) {
            previous.timer.abort();
            debug!(
                "debounce: superseded pending reply for {} (generation {})",
                sender, previous.generation
            );
        }
    }

    /// Number of senders with an undelivered reply.
    pub fn pending_count(&self) -> usize {
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Drop every pending reply and abort its timer. Returns how many were dropped.
    pub fn cancel_all(&self) -> usize {
        let drained: Vec<(String, PendingReply)> = self
            .pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .drain()
            .collect();
        let count = drained.len();
        for (sender, slot) in drained {
            slot.timer.abort();
            debug!("debounce: cancelled pending reply for {}", sender);
        }
        if count > 0 {
            info!("Cancelled {} pending replies", count);
        }
        count
    }
}

impl Drop for ReplyDebouncer {
    fn drop(&mut self) {
        let pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        for slot in pending.values() {
            slot.timer.abort();
        }
    }
}

async fn fire_after(
    quiet_period: Duration,
    sender: String,
    generation: u64,
    pending: PendingMap,
    sms: Arc<dyn SmsSender>,
) {
    tokio::time::sleep(quiet_period).await;

    let reply = {
        let mut map = pending.lock().unwrap_or_else(PoisonError::into_inner);
        match map.get(&sender) {
            Some(slot) if slot.generation == generation => map.remove(&sender).map(|s| s.reply),
            _ => None,
        }
    };
    let Some(reply) = reply else {
        debug!("debounce: nothing pending for {} at fire time", sender);
        return;
    };

    let msg = OutboundMessage::new(sender, reply);
    if let Err(e) = sms.send(&msg).await {
        error!(
            "Failed to deliver reply to {} via {}: {}",
            msg.to_number,
            sms.name(),
            e
        );
    }
}
