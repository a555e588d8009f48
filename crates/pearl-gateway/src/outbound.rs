//! Outbound queue and sender
//!
//! Producers (handlers, the heartbeat loop) append payloads without blocking;
//! one sender task drains them in order under a rate limiter.

use crate::error::GatewayError;
use crate::protocol::{Codec, Payload};
use crate::session::{Session, SessionStatus};
use crate::transport::FrameSink;
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::num::NonZeroU32;
use std::sync::Arc;
use tokio::sync::{watch, Notify};

/// Unbounded FIFO of payloads awaiting send
#[derive(Debug, Default)]
pub struct OutboundQueue {
    items: Mutex<VecDeque<Payload>>,
    notify: Notify,
}

impl OutboundQueue {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append to the tail and wake the sender
    pub fn enqueue(&self, payload: Payload) {
        tracing::trace!(payload = %payload, "Payload queued");
        self.items.lock().push_back(payload);
        self.notify.notify_one();
    }

    /// Take the head, if any
    pub fn pop(&self) -> Option<Payload> {
        self.items.lock().pop_front()
    }

    /// Put a popped payload back at the head
    pub(crate) fn requeue(&self, payload: Payload) {
        self.items.lock().push_front(payload);
    }

    /// Drop everything still queued
    pub fn clear(&self) {
        let dropped = {
            let mut items = self.items.lock();
            let n = items.len();
            items.clear();
            n
        };
        if dropped > 0 {
            tracing::debug!(dropped, "Outbound queue cleared");
        }
    }

    pub fn len(&self) -> usize {
        self.items.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.lock().is_empty()
    }

    /// Wait for the next payload
    ///
    /// Cancel safe: a payload is only removed in the poll that returns it.
    pub async fn next(&self) -> Payload {
        loop {
            let notified = self.notify.notified();
            if let Some(payload) = self.pop() {
                return payload;
            }
            notified.await;
        }
    }
}

/// Build the send rate limiter
///
/// `per_minute` and `burst` of zero are raised to one.
#[must_use]
pub fn rate_limiter(per_minute: u32, burst: u32) -> DefaultDirectRateLimiter {
    let per_minute = NonZeroU32::new(per_minute).unwrap_or(NonZeroU32::MIN);
    let burst = NonZeroU32::new(burst).unwrap_or(NonZeroU32::MIN);
    RateLimiter::direct(Quota::per_minute(per_minute).allow_burst(burst))
}

/// Drain the queue into `sink` until the session stops allowing sends
///
/// Returns the sink so the caller can close it once the heartbeat loop is done.
/// A payload taken after sends stopped goes back to the head of the queue
/// unsent. A transport failure is returned; the status is left to the caller.
pub async fn run_sender<S: FrameSink>(
    queue: Arc<OutboundQueue>,
    session: Arc<Session>,
    codec: Arc<Codec>,
    limiter: Arc<DefaultDirectRateLimiter>,
    mut sink: S,
) -> Result<S, GatewayError> {
    let mut status = session.subscribe();

    loop {
        if !status.borrow_and_update().allows_send() {
            break;
        }

        let payload = tokio::select! {
            biased;
            changed = status.changed() => {
                if changed.is_err() {
                    break;
                }
                continue;
            }
            payload = queue.next() => payload,
        };

        if !session.status().allows_send() {
            queue.requeue(payload);
            break;
        }

        let text = match codec.encode(&payload, &session.snapshot()) {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(error = %e, payload = %payload, "Dropping unencodable payload");
                continue;
            }
        };

        if let Err(e) = sink.send_text(text).await {
            tracing::warn!(error = %e, "Outbound send failed");
            return Err(e.into());
        }
        tracing::debug!(op = %payload.op, "Payload sent");

        if !wait_for_permit(&limiter, &mut status).await {
            break;
        }
    }

    tracing::debug!(remaining = queue.len(), "Outbound sender stopped");
    Ok(sink)
}

/// Wait for the limiter; `false` if sends stop first
async fn wait_for_permit(
    limiter: &DefaultDirectRateLimiter,
    status: &mut watch::Receiver<SessionStatus>,
) -> bool {
    let ready = limiter.until_ready();
    tokio::pin!(ready);

    loop {
        tokio::select! {
            biased;
            changed = status.changed() => {
                if changed.is_err() || !status.borrow_and_update().allows_send() {
                    return false;
                }
            }
            () = &mut ready => return true,
        }
    }
}
