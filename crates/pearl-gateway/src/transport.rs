//! Transport boundary
//!
//! The session engine only needs to open a duplex connection, write text
//! frames, read frames, and close with a code. `WsConnector` provides that over
//! tokio-tungstenite; tests substitute in-memory channels.

use async_trait::async_trait;
use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::{self, Message};
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

/// Inbound frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    Text(String),
    /// Close frame with its code, if the peer sent one
    Close(Option<u16>),
}

/// Transport errors
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("WebSocket error: {0}")]
    WebSocket(Box<tungstenite::Error>),

    #[error("Connection closed")]
    Closed,
}

impl From<tungstenite::Error> for TransportError {
    fn from(err: tungstenite::Error) -> Self {
        Self::WebSocket(Box::new(err))
    }
}

/// Write half of a connection
#[async_trait]
pub trait FrameSink: Send + 'static {
    async fn send_text(&mut self, text: String) -> Result<(), TransportError>;

    async fn close(&mut self, code: u16) -> Result<(), TransportError>;
}

/// Read half of a connection
///
/// `next_frame` must be cancel safe; the receive loop selects on it.
#[async_trait]
pub trait FrameStream: Send + 'static {
    /// Next frame, or `None` once the stream has ended
    async fn next_frame(&mut self) -> Result<Option<Frame>, TransportError>;
}

/// Opens connections to a gateway URL
#[async_trait]
pub trait Connector: Send + Sync + 'static {
    type Sink: FrameSink;
    type Stream: FrameStream;

    async fn connect(&self, url: &str) -> Result<(Self::Sink, Self::Stream), TransportError>;
}

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// WebSocket connector backed by tokio-tungstenite
#[derive(Debug, Clone, Copy, Default)]
pub struct WsConnector;

/// Write half of a tungstenite connection
pub struct WsSink(SplitSink<WsStream, Message>);

/// Read half of a tungstenite connection
pub struct WsFrames(SplitStream<WsStream>);

#[async_trait]
impl Connector for WsConnector {
    type Sink = WsSink;
    type Stream = WsFrames;

    async fn connect(&self, url: &str) -> Result<(WsSink, WsFrames), TransportError> {
        let (ws, _response) = connect_async(url).await?;
        let (writer, reader) = ws.split();
        Ok((WsSink(writer), WsFrames(reader)))
    }
}

#[async_trait]
impl FrameSink for WsSink {
    async fn send_text(&mut self, text: String) -> Result<(), TransportError> {
        self.0.send(Message::Text(text)).await?;
        Ok(())
    }

    async fn close(&mut self, code: u16) -> Result<(), TransportError> {
        let frame = CloseFrame {
            code: code.into(),
            reason: "".into(),
        };
        match self.0.send(Message::Close(Some(frame))).await {
            Ok(()) | Err(tungstenite::Error::ConnectionClosed | tungstenite::Error::AlreadyClosed) => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[async_trait]
impl FrameStream for WsFrames {
    async fn next_frame(&mut self) -> Result<Option<Frame>, TransportError> {
        loop {
            match self.0.next().await {
                Some(Ok(Message::Text(text))) => return Ok(Some(Frame::Text(text))),
                Some(Ok(Message::Close(frame))) => {
                    return Ok(Some(Frame::Close(frame.map(|f| u16::from(f.code)))));
                }
                Some(Ok(Message::Binary(bytes))) => {
                    tracing::debug!(len = bytes.len(), "Ignoring binary frame");
                }
                // Ping/pong are answered by tungstenite
                Some(Ok(_)) => {}
                Some(Err(e)) => return Err(e.into()),
                None => return Ok(None),
            }
        }
    }
}
