//! # pearl-gateway
//!
//! Client side of the v6 gateway protocol: a single session that identifies,
//! heartbeats, mirrors one guild, turns chat messages into commands and
//! resumes across dropped connections.
//!
//! [`GatewayClient::run`] is the entry point. The transport and REST layers are
//! traits ([`Connector`], [`RestApi`]) so the engine can run against in-memory
//! peers in tests.

pub mod backoff;
pub mod cache;
pub mod client;
pub mod commands;
pub mod dispatcher;
pub mod error;
pub mod events;
pub mod handlers;
pub mod heartbeat;
pub mod outbound;
pub mod protocol;
pub mod rest;
pub mod session;
pub mod transport;

pub use client::{Disconnect, GatewayClient, ShutdownHandle};
pub use commands::{command_channel, Command, CommandAction, CommandReceiver, CommandSender};
pub use dispatcher::{DispatchContext, EventDispatcher};
pub use error::GatewayError;
pub use rest::{RestApi, RestError};
pub use session::{Session, SessionStatus};
pub use transport::{Connector, WsConnector};
