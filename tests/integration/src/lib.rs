//! Integration test utilities for the gateway client
//!
//! This crate provides an in-process mock gateway (a real WebSocket server on
//! localhost) and payload fixtures for end-to-end tests of the session engine.

pub mod fixtures;
pub mod helpers;

pub use fixtures::*;
pub use helpers::*;
