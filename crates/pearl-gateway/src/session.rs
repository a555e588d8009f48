//! Session state machine
//!
//! Owns the connection status and the session identity (session id, last
//! sequence, in-sync flag). Status lives in a `watch` channel so every loop can
//! park on it and wake when it changes.

use parking_lot::Mutex;
use pearl_core::Snowflake;
use std::fmt;
use tokio::sync::watch;

/// Connection status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionStatus {
    /// Transport open, no READY yet
    Fresh,
    /// READY received
    Active,
    /// Connection lost; the reconnect loop takes over
    Disconnected,
    /// Shutdown requested; terminal
    Terminating,
}

impl SessionStatus {
    /// Statuses under which the outbound sender may write
    #[must_use]
    pub const fn allows_send(self) -> bool {
        matches!(self, Self::Fresh | Self::Active)
    }

    /// Statuses under which the heartbeat loop keeps beating
    ///
    /// HELLO arrives before READY, so beating starts while still fresh.
    #[must_use]
    pub const fn allows_heartbeat(self) -> bool {
        matches!(self, Self::Fresh | Self::Active)
    }

    #[must_use]
    pub const fn is_terminating(self) -> bool {
        matches!(self, Self::Terminating)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Fresh => "fresh",
            Self::Active => "active",
            Self::Disconnected => "disconnected",
            Self::Terminating => "terminating",
        }
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Default)]
struct SessionState {
    session_id: Option<String>,
    last_sequence: u64,
    in_sync: bool,
    guild_id: Option<Snowflake>,
    activations: u64,
}

/// Point-in-time copy of the session, used to build outbound bodies
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub status: SessionStatus,
    pub session_id: Option<String>,
    pub last_sequence: u64,
    pub in_sync: bool,
    pub guild_id: Option<Snowflake>,
}

/// The single authoritative session of a gateway client
pub struct Session {
    state: Mutex<SessionState>,
    status: watch::Sender<SessionStatus>,
}

impl Session {
    #[must_use]
    pub fn new() -> Self {
        let (status, _) = watch::channel(SessionStatus::Fresh);
        Self {
            state: Mutex::new(SessionState::default()),
            status,
        }
    }

    /// Current status
    pub fn status(&self) -> SessionStatus {
        *self.status.borrow()
    }

    /// Watch status changes
    pub fn subscribe(&self) -> watch::Receiver<SessionStatus> {
        self.status.subscribe()
    }

    /// Move to a new status
    ///
    /// Returns `false` if the status was already `next`, or if the session is
    /// terminating (nothing leaves TERMINATING).
    pub fn transition_to(&self, next: SessionStatus) -> bool {
        let mut previous = None;
        let changed = self.status.send_if_modified(|current| {
            if *current == next || current.is_terminating() {
                return false;
            }
            previous = Some(*current);
            *current = next;
            true
        });

        if let Some(from) = previous {
            if next == SessionStatus::Active {
                self.state.lock().activations += 1;
            }
            tracing::info!(from = %from, to = %next, "Session status changed");
        }
        changed
    }

    /// Count one received dispatch and return the new sequence number
    pub fn record_dispatch(&self) -> u64 {
        let mut state = self.state.lock();
        state.last_sequence = state.last_sequence.saturating_add(1);
        state.last_sequence
    }

    pub fn last_sequence(&self) -> u64 {
        self.state.lock().last_sequence
    }

    pub fn set_session_id(&self, session_id: impl Into<String>) {
        let session_id = session_id.into();
        self.state.lock().session_id = (!session_id.is_empty()).then_some(session_id);
    }

    pub fn session_id(&self) -> Option<String> {
        self.state.lock().session_id.clone()
    }

    pub fn set_in_sync(&self, in_sync: bool) {
        self.state.lock().in_sync = in_sync;
    }

    pub fn in_sync(&self) -> bool {
        self.state.lock().in_sync
    }

    pub fn set_guild_id(&self, guild_id: Snowflake) {
        self.state.lock().guild_id = Some(guild_id);
    }

    pub fn guild_id(&self) -> Option<Snowflake> {
        self.state.lock().guild_id
    }

    /// Whether the next HELLO should be answered with RESUME
    pub fn can_resume(&self) -> bool {
        let state = self.state.lock();
        state.in_sync && state.session_id.is_some()
    }

    /// Forget the previous session ahead of an IDENTIFY
    ///
    /// Sequence numbering restarts with the new session.
    pub fn begin_fresh_session(&self) {
        let mut state = self.state.lock();
        state.session_id = None;
        state.last_sequence = 0;
        state.in_sync = false;
    }

    /// Number of times the session has become ACTIVE
    pub fn activations(&self) -> u64 {
        self.state.lock().activations
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let status = self.status();
        let state = self.state.lock();
        SessionSnapshot {
            status,
            session_id: state.session_id.clone(),
            last_sequence: state.last_sequence,
            in_sync: state.in_sync,
            guild_id: state.guild_id,
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.lock();
        f.debug_struct("Session")
            .field("status", &self.status())
            .field("session_id", &state.session_id)
            .field("last_sequence", &state.last_sequence)
            .field("in_sync", &state.in_sync)
            .finish()
    }
}
