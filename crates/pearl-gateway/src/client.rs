//! Gateway client
//!
//! Owns the session and drives the reconnect loop. Each connection runs three
//! activities: the receive loop (here, feeding the dispatcher), the heartbeat
//! loop and the outbound sender. All of them stop when the session leaves
//! FRESH/ACTIVE; the heartbeat loop is joined before the transport is closed.

use crate::backoff::Backoff;
use crate::cache::GuildCache;
use crate::commands::CommandSender;
use crate::dispatcher::{DispatchContext, EventDispatcher};
use crate::error::GatewayError;
use crate::heartbeat::{HeartbeatExit, HeartbeatMonitor};
use crate::outbound::{rate_limiter, run_sender, OutboundQueue};
use crate::protocol::{is_fatal_close, Codec, OpCode, Payload, NORMAL_CLOSE, RESUMABLE_CLOSE};
use crate::rest::RestApi;
use crate::session::{Session, SessionStatus};
use crate::transport::{Connector, Frame, FrameSink, FrameStream};
use governor::DefaultDirectRateLimiter;
use pearl_common::{BotConfig, GatewayConfig};
use pearl_core::Guild;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{sleep_until, timeout, Instant};

/// Why a connection ended without an error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disconnect {
    /// Shutdown was requested
    Shutdown,
    /// A heartbeat went unacknowledged
    MissedAck,
    /// The server closed the connection with a reconnectable code
    Closed(Option<u16>),
    /// The stream ended without a close frame
    StreamEnded,
    /// No HELLO arrived in time
    HelloTimeout,
    /// The server sent RECONNECT
    ReconnectRequested,
    /// The server sent INVALID_SESSION
    InvalidSession,
    /// The session left FRESH/ACTIVE for another reason
    Interrupted,
}

impl Disconnect {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Shutdown => "shutdown",
            Self::MissedAck => "missed_ack",
            Self::Closed(_) => "closed",
            Self::StreamEnded => "stream_ended",
            Self::HelloTimeout => "hello_timeout",
            Self::ReconnectRequested => "reconnect_requested",
            Self::InvalidSession => "invalid_session",
            Self::Interrupted => "interrupted",
        }
    }
}

impl fmt::Display for Disconnect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Closed(Some(code)) => write!(f, "closed ({code})"),
            other => f.write_str(other.as_str()),
        }
    }
}

/// Requests a graceful stop of a running client
#[derive(Debug, Clone)]
pub struct ShutdownHandle {
    session: Arc<Session>,
}

impl ShutdownHandle {
    /// Move the session to TERMINATING
    ///
    /// The client closes the transport with a normal close once its heartbeat
    /// loop has exited, then `run` returns.
    pub fn shutdown(&self) {
        if self.session.transition_to(SessionStatus::Terminating) {
            tracing::info!("Gateway shutdown requested");
        }
    }

    pub fn is_shutdown(&self) -> bool {
        self.session.status().is_terminating()
    }
}

/// A gateway client for one bot token
pub struct GatewayClient<C, R> {
    config: GatewayConfig,
    bot: BotConfig,
    connector: C,
    rest: Arc<R>,
    session: Arc<Session>,
    heartbeat: Arc<HeartbeatMonitor>,
    outbound: Arc<OutboundQueue>,
    guild: GuildCache,
    commands: CommandSender,
    dispatcher: EventDispatcher,
    codec: Arc<Codec>,
    limiter: Arc<DefaultDirectRateLimiter>,
}

impl<C: Connector, R: RestApi> GatewayClient<C, R> {
    /// Create a client; commands recognised in chat are pushed to `commands`
    pub fn new(config: GatewayConfig, bot: BotConfig, connector: C, rest: Arc<R>, commands: CommandSender) -> Self {
        let codec = Arc::new(Codec::from_config(&config));
        let limiter = Arc::new(rate_limiter(config.send_rate_per_minute, config.send_burst));

        Self {
            config,
            bot,
            connector,
            rest,
            session: Arc::new(Session::new()),
            heartbeat: Arc::new(HeartbeatMonitor::new()),
            outbound: Arc::new(OutboundQueue::new()),
            guild: GuildCache::new(),
            commands,
            dispatcher: EventDispatcher::new(),
            codec,
            limiter,
        }
    }

    /// Replace the event dispatcher
    #[must_use]
    pub fn with_dispatcher(mut self, dispatcher: EventDispatcher) -> Self {
        self.dispatcher = dispatcher;
        self
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    /// Copy of the tracked guild
    pub fn guild(&self) -> Option<Guild> {
        self.guild.snapshot()
    }

    pub fn shutdown_handle(&self) -> ShutdownHandle {
        ShutdownHandle {
            session: Arc::clone(&self.session),
        }
    }

    /// Connect and keep reconnecting until shutdown
    ///
    /// Returns `Ok(())` after a requested shutdown and an error only for close
    /// codes that rule out reconnecting.
    pub async fn run(&self) -> Result<(), GatewayError> {
        let mut backoff = Backoff::new(self.config.backoff_base_ms, self.config.backoff_max_ms);
        let mut gateway_url: Option<String> = None;
        let mut failures: u32 = 0;

        loop {
            if self.session.status().is_terminating() {
                tracing::info!("Gateway client stopped");
                return Ok(());
            }

            let refresh = failures > 0
                && self.config.url_refresh_after > 0
                && failures % self.config.url_refresh_after == 0;
            if gateway_url.is_none() || refresh {
                match self.resolve_url().await {
                    Ok(url) => gateway_url = Some(url),
                    Err(e) => tracing::warn!(error = %e, "Failed to fetch gateway URL"),
                }
            }

            if let Some(url) = gateway_url.as_deref() {
                let activations = self.session.activations();
                let outcome = self.run_connection(url).await;

                if self.session.activations() > activations {
                    backoff.reset();
                    failures = 0;
                } else {
                    failures = failures.saturating_add(1);
                }

                match outcome {
                    Ok(Disconnect::Shutdown) => continue,
                    Ok(reason) => tracing::info!(reason = %reason, "Gateway connection ended"),
                    Err(e) if e.is_fatal() => {
                        tracing::error!(error = %e, "Gateway connection cannot be recovered");
                        self.session.transition_to(SessionStatus::Terminating);
                        return Err(e);
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, code = e.code(), "Gateway connection failed");
                        if matches!(e, GatewayError::Internal(_)) {
                            self.session.set_in_sync(false);
                        }
                    }
                }
            } else {
                failures = failures.saturating_add(1);
            }

            if self.session.status().is_terminating() {
                continue;
            }
            let delay = backoff.next_delay();
            tracing::info!(
                delay_ms = delay.as_millis() as u64,
                failures,
                resumable = self.session.can_resume(),
                "Reconnecting"
            );
            self.sleep_or_shutdown(delay).await;
        }
    }

    /// Run a single connection until it ends
    pub async fn run_connection(&self, url: &str) -> Result<Disconnect, GatewayError> {
        self.session.transition_to(SessionStatus::Fresh);
        if self.session.status().is_terminating() {
            return Ok(Disconnect::Shutdown);
        }
        self.outbound.clear();
        self.heartbeat.reset();

        tracing::info!(url, "Connecting to gateway");
        let connect_timeout = Duration::from_millis(self.config.connect_timeout_ms);
        let (sink, mut stream) = timeout(connect_timeout, self.connector.connect(url))
            .await
            .map_err(|_| GatewayError::Timeout("connect"))??;
        tracing::debug!("Transport open, waiting for HELLO");

        let mut heartbeat_task = {
            let heartbeat = Arc::clone(&self.heartbeat);
            let session = Arc::clone(&self.session);
            let outbound = Arc::clone(&self.outbound);
            tokio::spawn(async move { heartbeat.run(&session, &outbound).await })
        };
        let mut sender_task = tokio::spawn(run_sender(
            Arc::clone(&self.outbound),
            Arc::clone(&self.session),
            Arc::clone(&self.codec),
            Arc::clone(&self.limiter),
            sink,
        ));

        // Either loop ending on its own means the connection is gone
        let mut heartbeat_done = None;
        let mut sender_done = None;
        let mut outcome = tokio::select! {
            outcome = self.receive(&mut stream) => outcome,
            exit = &mut heartbeat_task => {
                heartbeat_done = Some(exit);
                Ok(self.stopped())
            }
            result = &mut sender_task => {
                sender_done = Some(result);
                Ok(self.stopped())
            }
        };

        // Stop the loops; TERMINATING already stops them
        if !self.session.status().is_terminating() {
            self.session.transition_to(SessionStatus::Disconnected);
        }

        let heartbeat_exit = match heartbeat_done {
            Some(exit) => exit,
            None => heartbeat_task.await,
        };
        match heartbeat_exit {
            Ok(HeartbeatExit::MissedAck) => {
                if matches!(outcome, Ok(Disconnect::Interrupted)) {
                    outcome = Ok(Disconnect::MissedAck);
                }
            }
            Ok(HeartbeatExit::Stopped) => {}
            Err(e) => outcome = Err(GatewayError::Internal(format!("heartbeat task: {e}"))),
        }

        let sender_result = match sender_done {
            Some(result) => result,
            None => sender_task.await,
        };
        let sink = match sender_result {
            Ok(Ok(sink)) => Some(sink),
            Ok(Err(e)) => {
                if outcome.is_ok() {
                    outcome = Err(e);
                }
                None
            }
            Err(e) => {
                outcome = Err(GatewayError::Internal(format!("sender task: {e}")));
                None
            }
        };

        if let Some(mut sink) = sink {
            let code = if self.session.status().is_terminating() {
                NORMAL_CLOSE
            } else {
                RESUMABLE_CLOSE
            };
            if let Err(e) = sink.close(code).await {
                tracing::debug!(error = %e, code, "Close frame not sent");
            }
        }

        outcome
    }

    /// Feed inbound frames to the dispatcher until the connection ends
    async fn receive<S: FrameStream>(&self, stream: &mut S) -> Result<Disconnect, GatewayError> {
        let ctx = DispatchContext {
            session: &self.session,
            heartbeat: &self.heartbeat,
            outbound: &self.outbound,
            guild: &self.guild,
            commands: &self.commands,
            bot: &self.bot,
        };
        let mut status = self.session.subscribe();
        let hello_deadline = Instant::now() + Duration::from_millis(self.config.hello_timeout_ms);
        let mut hello_seen = false;

        loop {
            if !status.borrow_and_update().allows_send() {
                return Ok(self.stopped());
            }

            let frame = tokio::select! {
                frame = stream.next_frame() => frame?,
                changed = status.changed() => {
                    if changed.is_err() {
                        return Ok(Disconnect::Interrupted);
                    }
                    continue;
                }
                () = sleep_until(hello_deadline), if !hello_seen => {
                    tracing::warn!(timeout_ms = self.config.hello_timeout_ms, "No HELLO from gateway");
                    return Ok(Disconnect::HelloTimeout);
                }
            };

            let text = match frame {
                Some(Frame::Text(text)) => text,
                Some(Frame::Close(Some(code))) if is_fatal_close(code) => {
                    return Err(GatewayError::FatalClose(code));
                }
                Some(Frame::Close(code)) => return Ok(Disconnect::Closed(code)),
                None => return Ok(Disconnect::StreamEnded),
            };

            let payload = match Payload::decode(&text) {
                Ok(payload) => payload,
                Err(e) => {
                    tracing::warn!(error = %e, "Dropping malformed payload");
                    continue;
                }
            };
            tracing::trace!(payload = %payload, "Payload received");

            let result = self.dispatcher.dispatch(&ctx, &payload);
            match &result {
                Ok(()) if payload.op == OpCode::Hello => hello_seen = true,
                Ok(()) => {}
                Err(e) => tracing::warn!(
                    error = %e,
                    code = e.code(),
                    op = %payload.op,
                    event = payload.event_name().unwrap_or_default(),
                    "Handler failed"
                ),
            }

            if !self.session.status().allows_send() {
                return Ok(match payload.op {
                    OpCode::Reconnect => Disconnect::ReconnectRequested,
                    OpCode::InvalidSession => Disconnect::InvalidSession,
                    _ => self.stopped(),
                });
            }
        }
    }

    fn stopped(&self) -> Disconnect {
        if self.session.status().is_terminating() {
            Disconnect::Shutdown
        } else {
            Disconnect::Interrupted
        }
    }

    async fn resolve_url(&self) -> Result<String, GatewayError> {
        let base = self.rest.fetch_gateway_url().await?;
        let url = self.config.decorate_url(&base);
        tracing::info!(url = %url, "Gateway URL resolved");
        Ok(url)
    }

    async fn sleep_or_shutdown(&self, delay: Duration) {
        let mut status = self.session.subscribe();
        let deadline = Instant::now() + delay;

        loop {
            if status.borrow_and_update().is_terminating() {
                return;
            }
            tokio::select! {
                () = sleep_until(deadline) => return,
                changed = status.changed() => if changed.is_err() { return },
            }
        }
    }
}

impl<C, R> fmt::Debug for GatewayClient<C, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GatewayClient")
            .field("config", &self.config)
            .field("session", &self.session)
            .field("dispatcher", &self.dispatcher)
            .finish_non_exhaustive()
    }
}
