//! Heartbeat monitor
//!
//! Beats at the interval announced by HELLO and requires an ACK before the next
//! beat. A beat attempted while the previous one is still unacknowledged means
//! the connection is dead: the session is marked out of sync and the loop
//! returns [`HeartbeatExit::MissedAck`] so the connection owner can tear down.

use crate::outbound::OutboundQueue;
use crate::protocol::Payload;
use crate::session::Session;
use parking_lot::Mutex;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::{sleep_until, Instant};

/// Interval and unacknowledged beat count
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HeartbeatState {
    pub interval_ms: u64,
    pub outstanding: u32,
}

/// A beat was due while another was still unacknowledged
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("Heartbeat not acknowledged ({outstanding} outstanding)")]
pub struct MissedAck {
    pub outstanding: u32,
}

/// Why the heartbeat loop returned
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeartbeatExit {
    /// The session left FRESH/ACTIVE
    Stopped,
    /// No ACK arrived within an interval
    MissedAck,
}

/// Heartbeat state shared between the heartbeat loop and the dispatcher
#[derive(Debug)]
pub struct HeartbeatMonitor {
    state: Mutex<HeartbeatState>,
    interval: watch::Sender<Option<Duration>>,
}

impl HeartbeatMonitor {
    #[must_use]
    pub fn new() -> Self {
        let (interval, _) = watch::channel(None);
        Self {
            state: Mutex::new(HeartbeatState::default()),
            interval,
        }
    }

    /// Set the interval from HELLO and let the loop begin beating
    pub fn start(&self, interval_ms: u64) {
        self.state.lock().interval_ms = interval_ms;
        self.interval.send_replace(Some(Duration::from_millis(interval_ms)));
        tracing::debug!(interval_ms, "Heartbeat interval set");
    }

    /// Forget the interval and outstanding count ahead of a new connection
    pub fn reset(&self) {
        *self.state.lock() = HeartbeatState::default();
        self.interval.send_replace(None);
    }

    /// Claim the right to send a beat
    ///
    /// Fails if a previous beat has not been acknowledged.
    pub fn begin_beat(&self) -> Result<(), MissedAck> {
        let mut state = self.state.lock();
        if state.outstanding != 0 {
            return Err(MissedAck {
                outstanding: state.outstanding,
            });
        }
        state.outstanding += 1;
        Ok(())
    }

    /// Record a HEARTBEAT_ACK
    pub fn ack(&self) {
        let mut state = self.state.lock();
        if state.outstanding == 0 {
            tracing::debug!("Heartbeat ACK with nothing outstanding");
            return;
        }
        state.outstanding -= 1;
    }

    pub fn state(&self) -> HeartbeatState {
        *self.state.lock()
    }

    /// Answer a server HEARTBEAT request right away
    ///
    /// Skipped (returns `false`) while a beat is outstanding, so the regular
    /// loop still sees the unacknowledged beat.
    pub fn request_beat(&self, session: &Session, outbound: &OutboundQueue) -> bool {
        match self.begin_beat() {
            Ok(()) => {
                outbound.enqueue(Payload::heartbeat(session.last_sequence()));
                true
            }
            Err(missed) => {
                tracing::debug!(outstanding = missed.outstanding, "Heartbeat request skipped");
                false
            }
        }
    }

    /// Beat until the session leaves FRESH/ACTIVE or an ACK is missed
    pub async fn run(&self, session: &Session, outbound: &OutboundQueue) -> HeartbeatExit {
        let mut status = session.subscribe();
        let mut interval_rx = self.interval.subscribe();

        // Wait for HELLO
        let mut interval = loop {
            if !status.borrow_and_update().allows_heartbeat() {
                return HeartbeatExit::Stopped;
            }
            if let Some(interval) = *interval_rx.borrow_and_update() {
                break interval;
            }
            tokio::select! {
                changed = status.changed() => if changed.is_err() { return HeartbeatExit::Stopped },
                changed = interval_rx.changed() => if changed.is_err() { return HeartbeatExit::Stopped },
            }
        };

        loop {
            if let Some(latest) = *interval_rx.borrow_and_update() {
                interval = latest;
            }
            let next = Instant::now() + interval;

            if let Err(missed) = self.begin_beat() {
                tracing::warn!(
                    outstanding = missed.outstanding,
                    interval_ms = interval.as_millis() as u64,
                    "Heartbeat not acknowledged, connection is dead"
                );
                session.set_in_sync(false);
                return HeartbeatExit::MissedAck;
            }
            outbound.enqueue(Payload::heartbeat(session.last_sequence()));
            tracing::trace!("Heartbeat queued");

            loop {
                tokio::select! {
                    () = sleep_until(next) => break,
                    changed = status.changed() => {
                        if changed.is_err() || !status.borrow_and_update().allows_heartbeat() {
                            return HeartbeatExit::Stopped;
                        }
                    }
                }
            }
        }
    }
}

impl Default for HeartbeatMonitor {
    fn default() -> Self {
        Self::new()
    }
}
