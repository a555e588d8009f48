//! Gateway protocol definitions
//!
//! Op codes, the payload envelope, control payload bodies, close codes, and the
//! codec that turns queued payloads into wire frames.

mod close_codes;
mod codec;
mod message;
mod opcodes;
mod payloads;

pub use close_codes::{is_fatal_close, CloseCode, NORMAL_CLOSE, RESUMABLE_CLOSE};
pub use codec::{Codec, CodecError};
pub use message::Payload;
pub use opcodes::OpCode;
pub use payloads::{
    HelloPayload, IdentifyPayload, IdentifyProperties, RequestGuildMembersPayload, ResumePayload,
};
