//! Test helpers for integration tests
//!
//! `MockGateway` accepts WebSocket connections on an ephemeral port and hands
//! each one to the test as a `GatewayConn`, which scripts server payloads and
//! reads what the client sent. `TestClient` runs a real `GatewayClient` with
//! the tungstenite connector against it.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, bail, Result};
use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use parking_lot::Mutex;
use pearl_common::{BotConfig, GatewayConfig};
use pearl_core::{Guild, Snowflake};
use pearl_gateway::{
    command_channel, CommandReceiver, GatewayClient, GatewayError, RestApi, RestError, SessionStatus, WsConnector,
};
use serde_json::{json, Value};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{accept_async, WebSocketStream};

use crate::fixtures::bot_config;

/// Upper bound for any single wait in a test
pub const WAIT: Duration = Duration::from_secs(5);

/// Install a test subscriber once; later calls are no-ops
pub fn init_tracing() {
    let _ = pearl_common::try_init_tracing();
}

/// Localhost WebSocket server standing in for the gateway
pub struct MockGateway {
    addr: SocketAddr,
    connections: mpsc::UnboundedReceiver<GatewayConn>,
    _handle: JoinHandle<()>,
}

impl MockGateway {
    /// Bind an ephemeral port and start accepting
    pub async fn start() -> Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let (tx, rx) = mpsc::unbounded_channel();

        let handle = tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                match accept_async(stream).await {
                    Ok(ws) => {
                        if tx.send(GatewayConn { ws }).is_err() {
                            break;
                        }
                    }
                    Err(e) => eprintln!("mock gateway handshake failed: {e}"),
                }
            }
        });

        Ok(Self {
            addr,
            connections: rx,
            _handle: handle,
        })
    }

    /// Base URL, as the REST layer would return it
    pub fn url(&self) -> String {
        format!("ws://{}", self.addr)
    }

    /// Wait for the client's next connection
    pub async fn accept(&mut self) -> Result<GatewayConn> {
        timeout(WAIT, self.connections.recv())
            .await
            .map_err(|_| anyhow!("no connection within {WAIT:?}"))?
            .ok_or_else(|| anyhow!("mock gateway stopped"))
    }

    /// Whether a connection is waiting to be accepted
    pub fn has_pending(&mut self) -> bool {
        match self.connections.try_recv() {
            Ok(_) => true,
            Err(_) => false,
        }
    }
}

/// What the client sent
#[derive(Debug, Clone, PartialEq)]
pub enum Received {
    Json(Value),
    Close(Option<u16>),
}

/// Server end of one client connection
pub struct GatewayConn {
    ws: WebSocketStream<TcpStream>,
}

impl GatewayConn {
    pub async fn send_json(&mut self, value: Value) -> Result<()> {
        self.ws.send(Message::Text(value.to_string())).await?;
        Ok(())
    }

    pub async fn hello(&mut self, heartbeat_interval: u64) -> Result<()> {
        self.send_json(json!({"op": 10, "d": {"heartbeat_interval": heartbeat_interval}}))
            .await
    }

    pub async fn dispatch(&mut self, event: &str, seq: u64, d: Value) -> Result<()> {
        self.send_json(json!({"op": 0, "t": event, "s": seq, "d": d})).await
    }

    pub async fn ack(&mut self) -> Result<()> {
        self.send_json(json!({"op": 11})).await
    }

    /// Close from the server side
    pub async fn close(&mut self, code: u16) -> Result<()> {
        let frame = CloseFrame {
            code: code.into(),
            reason: "".into(),
        };
        self.ws.send(Message::Close(Some(frame))).await?;
        Ok(())
    }

    /// Next text or close frame from the client
    pub async fn recv(&mut self) -> Result<Received> {
        loop {
            let next = timeout(WAIT, self.ws.next())
                .await
                .map_err(|_| anyhow!("client sent nothing within {WAIT:?}"))?;
            match next {
                Some(Ok(Message::Text(text))) => return Ok(Received::Json(serde_json::from_str(&text)?)),
                Some(Ok(Message::Close(frame))) => return Ok(Received::Close(frame.map(|f| u16::from(f.code)))),
                Some(Ok(_)) => {}
                Some(Err(e)) => return Err(e.into()),
                None => return Ok(Received::Close(None)),
            }
        }
    }

    /// Next payload with op code `op`, skipping everything else
    pub async fn recv_op(&mut self, op: u64) -> Result<Value> {
        loop {
            match self.recv().await? {
                Received::Json(value) if value["op"] == op => return Ok(value),
                Received::Json(_) => {}
                Received::Close(code) => bail!("connection closed ({code:?}) while waiting for op {op}"),
            }
        }
    }

    /// Next payload that is not a heartbeat
    pub async fn recv_control(&mut self) -> Result<Value> {
        loop {
            match self.recv().await? {
                Received::Json(value) if value["op"] == 1 => {}
                Received::Json(value) => return Ok(value),
                Received::Close(code) => bail!("connection closed ({code:?})"),
            }
        }
    }

    /// Wait for the client to close, skipping text frames
    pub async fn recv_close(&mut self) -> Result<Option<u16>> {
        loop {
            if let Received::Close(code) = self.recv().await? {
                return Ok(code);
            }
        }
    }
}

/// REST stand-in: a fixed gateway URL and a log of posted messages
pub struct StaticRest {
    url: String,
    posted: Mutex<Vec<(Snowflake, String)>>,
}

impl StaticRest {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            posted: Mutex::new(Vec::new()),
        }
    }

    pub fn posted(&self) -> Vec<(Snowflake, String)> {
        self.posted.lock().clone()
    }
}

#[async_trait]
impl RestApi for StaticRest {
    async fn fetch_gateway_url(&self) -> Result<String, RestError> {
        Ok(self.url.clone())
    }

    async fn create_message(&self, channel_id: Snowflake, content: &str) -> Result<(), RestError> {
        self.posted.lock().push((channel_id, content.to_string()));
        Ok(())
    }
}

/// Gateway settings tuned for tests: no rate limiting, short timeouts
pub fn test_gateway_config() -> GatewayConfig {
    let mut config = GatewayConfig::with_token("integration-token");
    config.send_rate_per_minute = 60_000;
    config.send_burst = 100;
    config.connect_timeout_ms = 2000;
    config.hello_timeout_ms = 2000;
    config.backoff_base_ms = 10;
    config.backoff_max_ms = 50;
    config
}

/// A running gateway client
pub struct TestClient {
    pub client: Arc<GatewayClient<WsConnector, StaticRest>>,
    pub rest: Arc<StaticRest>,
    pub commands: CommandReceiver,
    task: JoinHandle<Result<(), GatewayError>>,
}

impl TestClient {
    /// Start a client against `gateway` with the default test settings
    pub fn spawn(gateway: &MockGateway) -> Self {
        Self::spawn_with(gateway, test_gateway_config(), bot_config())
    }

    pub fn spawn_with(gateway: &MockGateway, config: GatewayConfig, bot: BotConfig) -> Self {
        init_tracing();
        let rest = Arc::new(StaticRest::new(gateway.url()));
        let (sender, commands) = command_channel();
        let client = Arc::new(GatewayClient::new(config, bot, WsConnector, Arc::clone(&rest), sender));

        let task = {
            let client = Arc::clone(&client);
            tokio::spawn(async move { client.run().await })
        };

        Self {
            client,
            rest,
            commands,
            task,
        }
    }

    pub fn status(&self) -> SessionStatus {
        self.client.session().status()
    }

    pub async fn wait_for_status(&self, status: SessionStatus) -> Result<()> {
        let mut rx = self.client.session().subscribe();
        timeout(WAIT, rx.wait_for(|s| *s == status))
            .await
            .map_err(|_| anyhow!("session never reached {status}"))??;
        Ok(())
    }

    /// Wait until `check` holds for the tracked guild
    pub async fn wait_for_guild(&self, check: impl Fn(&Guild) -> bool) -> Result<Guild> {
        let deadline = tokio::time::Instant::now() + WAIT;
        loop {
            if let Some(guild) = self.client.guild().filter(|g| check(g)) {
                return Ok(guild);
            }
            if tokio::time::Instant::now() >= deadline {
                bail!("guild condition not met within {WAIT:?}");
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    }

    /// Request shutdown and wait for `run` to return
    pub async fn shutdown(self) -> Result<Result<(), GatewayError>> {
        self.client.shutdown_handle().shutdown();
        self.join().await
    }

    /// Wait for `run` to return on its own
    pub async fn join(self) -> Result<Result<(), GatewayError>> {
        Ok(timeout(WAIT, self.task).await??)
    }
}
