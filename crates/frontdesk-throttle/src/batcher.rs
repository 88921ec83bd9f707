// SPDX-FileCopyrightText: 2026 Frontdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Debounced batching of rapid customer messages.
//!
//! Customers often split one thought over several texts. Messages for the
//! same (customer, conversation) key are held until `window` passes with no new
//! arrival; every append restarts the timer. Only the caller that submitted
//! the last message receives the batch. Earlier callers are told they were
//! superseded and must do nothing further.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use frontdesk_core::{ConversationId, CustomerId, InboundMessage};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

/// Batching key: at most one pending batch per customer conversation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BatchKey {
    pub customer_id: CustomerId,
    pub conversation_id: ConversationId,
}

impl BatchKey {
    pub fn new(customer_id: CustomerId, conversation_id: ConversationId) -> Self {
        Self {
            customer_id,
            conversation_id,
        }
    }
}

/// Messages released together.
#[derive(Debug, Clone)]
pub struct Batch {
    /// Arrival order.
    pub messages: Vec<InboundMessage>,
    /// True when more than one message was combined.
    pub should_batch: bool,
}

impl Batch {
    fn single(message: InboundMessage) -> Self {
        Self {
            messages: vec![message],
            should_batch: false,
        }
    }

    /// Message texts joined with newlines, in arrival order.
    pub fn combined_text(&self) -> String {
        self.messages
            .iter()
            .map(|m| m.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[derive(Debug)]
pub enum BatchOutcome {
    /// This caller owns the batch and should process it.
    Ready(Batch),
    /// A later message joined the batch; this caller must stop.
    Superseded,
}

struct PendingBatch {
    messages: Vec<InboundMessage>,
    subscriber: oneshot::Sender<BatchOutcome>,
    timer: JoinHandle<()>,
    generation: u64,
}

type PendingMap = Arc<Mutex<HashMap<BatchKey, PendingBatch>>>;

fn lock(pending: &PendingMap) -> MutexGuard<'_, HashMap<BatchKey, PendingBatch>> {
    pending.lock().unwrap_or_else(|e| e.into_inner())
}

/// Per-key debouncer. Must be used from within a tokio runtime.
pub struct MessageBatcher {
    window: Duration,
    enabled: bool,
    pending: PendingMap,
}

impl MessageBatcher {
    pub fn new(window: Duration, enabled: bool) -> Self {
        Self {
            window,
            enabled,
            pending: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Add a message to its key's batch and return where the outcome for
    /// this caller will be delivered.
    pub fn submit(
        &self,
        key: BatchKey,
        message: InboundMessage,
    ) -> oneshot::Receiver<BatchOutcome> {
        let (tx, rx) = oneshot::channel();
        if !self.enabled {
            let _ = tx.send(BatchOutcome::Ready(Batch::single(message)));
            return rx;
        }

        let mut pending = lock(&self.pending);
        match pending.get_mut(&key) {
            Some(batch) => {
                batch.timer.abort();
                batch.generation += 1;
                batch.messages.push(message);
                let previous = std::mem::replace(&mut batch.subscriber, tx);
                let _ = previous.send(BatchOutcome::Superseded);
                batch.timer = self.spawn_timer(key.clone(), batch.generation);
                tracing::debug!(
                    conversation_id = %key.conversation_id,
                    queued = batch.messages.len(),
                    "message joined pending batch"
                );
            }
            None => {
                let timer = self.spawn_timer(key.clone(), 0);
                pending.insert(
                    key,
                    PendingBatch {
                        messages: vec![message],
                        subscriber: tx,
                        timer,
                        generation: 0,
                    },
                );
            }
        }
        rx
    }

    /// Submit and wait for this caller's outcome.
    pub async fn batch(&self, key: BatchKey, message: InboundMessage) -> BatchOutcome {
        self.submit(key, message)
            .await
            .unwrap_or(BatchOutcome::Superseded)
    }

    /// Flush the key's pending batch to its subscriber as unbatched. Returns
    /// `false` when nothing was pending.
    pub fn cancel(&self, key: &BatchKey) -> bool {
        let Some(batch) = lock(&self.pending).remove(key) else {
            return false;
        };
        batch.timer.abort();
        let _ = batch.subscriber.send(BatchOutcome::Ready(Batch {
            messages: batch.messages,
            should_batch: false,
        }));
        true
    }

    pub fn is_pending(&self, key: &BatchKey) -> bool {
        lock(&self.pending).contains_key(key)
    }

    pub fn pending_count(&self) -> usize {
        lock(&self.pending).len()
    }

    fn spawn_timer(&self, key: BatchKey, generation: u64) -> JoinHandle<()> {
        let pending = Arc::clone(&self.pending);
        let window = self.window;
        tokio::spawn(async move {
            tokio::time::sleep(window).await;
            let released = {
                let mut map = lock(&pending);
                match map.get(&key) {
                    Some(batch) if batch.generation == generation => map.remove(&key),
                    _ => None,
                }
            };
            if let Some(batch) = released {
                let should_batch = batch.messages.len() >= 2;
                let _ = batch.subscriber.send(BatchOutcome::Ready(Batch {
                    messages: batch.messages,
                    should_batch,
                }));
            }
        })
    }
}

impl Drop for MessageBatcher {
    fn drop(&mut self) {
        for (_, batch) in lock(&self.pending).drain() {
            batch.timer.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use tokio::time::Instant;

    const WINDOW: Duration = Duration::from_secs(5);

    fn key(conversation: &str) -> BatchKey {
        BatchKey::new(CustomerId("cust-1".into()), ConversationId(conversation.into()))
    }

    fn msg(text: &str) -> InboundMessage {
        InboundMessage {
            channel: "sms".into(),
            from: "07700 900123".into(),
            text: text.into(),
            received_at: Utc::now(),
        }
    }

    fn assert_elapsed(start: Instant, expected: Duration) {
        let elapsed = start.elapsed();
        assert!(
            elapsed >= expected && elapsed < expected + Duration::from_millis(5),
            "elapsed {elapsed:?}, expected {expected:?}"
        );
    }

    fn ready(outcome: BatchOutcome) -> Batch {
        match outcome {
            BatchOutcome::Ready(batch) => batch,
            BatchOutcome::Superseded => panic!("expected a ready batch"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn single_message_is_released_after_window() {
        let batcher = MessageBatcher::new(WINDOW, true);
        let start = Instant::now();
        let batch = ready(batcher.batch(key("conv-1"), msg("hi")).await);
        assert_elapsed(start, WINDOW);
        assert!(!batch.should_batch);
        assert_eq!(batch.combined_text(), "hi");
        assert_eq!(batcher.pending_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn rapid_messages_debounce_to_last_caller() {
        let batcher = MessageBatcher::new(WINDOW, true);
        let start = Instant::now();

        let first = batcher.submit(key("conv-1"), msg("my screen"));
        tokio::time::sleep(Duration::from_secs(2)).await;
        let second = batcher.submit(key("conv-1"), msg("is cracked"));
        assert!(matches!(first.await.unwrap(), BatchOutcome::Superseded));

        tokio::time::sleep(Duration::from_secs(2)).await;
        let third = batcher.submit(key("conv-1"), msg("how much?"));
        assert!(matches!(second.await.unwrap(), BatchOutcome::Superseded));

        let batch = ready(third.await.unwrap());
        assert_elapsed(start, Duration::from_secs(9));
        assert!(batch.should_batch);
        assert_eq!(batch.combined_text(), "my screen\nis cracked\nhow much?");
    }

    #[tokio::test(start_paused = true)]
    async fn keys_batch_independently() {
        let batcher = MessageBatcher::new(WINDOW, true);
        let a = batcher.submit(key("conv-1"), msg("a"));
        let b = batcher.submit(key("conv-2"), msg("b"));
        assert_eq!(batcher.pending_count(), 2);
        assert_eq!(ready(a.await.unwrap()).combined_text(), "a");
        assert_eq!(ready(b.await.unwrap()).combined_text(), "b");
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_flushes_unbatched() {
        let batcher = MessageBatcher::new(WINDOW, true);
        let k = key("conv-1");
        let first = batcher.submit(k.clone(), msg("one"));
        let second = batcher.submit(k.clone(), msg("two"));
        assert!(batcher.cancel(&k));
        assert!(!batcher.is_pending(&k));
        assert!(!batcher.cancel(&k));

        assert!(matches!(first.await.unwrap(), BatchOutcome::Superseded));
        let batch = ready(second.await.unwrap());
        assert!(!batch.should_batch);
        assert_eq!(batch.messages.len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn disabled_batcher_releases_immediately() {
        let batcher = MessageBatcher::new(WINDOW, false);
        let start = Instant::now();
        let batch = ready(batcher.batch(key("conv-1"), msg("hi")).await);
        assert_elapsed(start, Duration::ZERO);
        assert!(!batch.should_batch);
        assert!(!batcher.is_pending(&key("conv-1")));
    }
}
