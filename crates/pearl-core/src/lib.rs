//! # pearl-core
//!
//! Domain layer containing the snowflake value object and the guild entities the
//! gateway client mirrors locally. This crate has no I/O dependencies.

pub mod entities;
pub mod error;
pub mod value_objects;

// Re-export commonly used types at crate root
pub use entities::{Channel, ChannelType, Guild, Member, Role, User};
pub use error::CoreError;
pub use value_objects::{Snowflake, SnowflakeParseError};
