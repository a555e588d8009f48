//! # pearl-bot
//!
//! Wires a [`pearl_gateway::GatewayClient`] to a reqwest REST client and
//! answers the commands it produces.

pub mod bot;
pub mod interpreter;
pub mod rest;

pub use bot::{consume_commands, run};
pub use interpreter::interpret;
pub use rest::RestClient;
