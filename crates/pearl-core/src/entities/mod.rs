//! Domain entities - guild objects mirrored from gateway events
//!
//! The gateway sends `null` for many absent fields. Entities map those to
//! zero, empty, or false rather than failing the whole event.

mod channel;
mod guild;
mod member;
mod role;
mod user;

pub use channel::{Channel, ChannelType};
pub use guild::Guild;
pub use member::Member;
pub use role::Role;
pub use user::User;

use serde::{Deserialize, Deserializer};

/// Deserialize a field that may be `null`, falling back to `T::default()`
pub fn nullable<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Deserialize an integer sent either as a JSON number or a decimal string
pub fn lenient_u64<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumberOrString {
        Number(u64),
        Text(String),
    }

    match Option::<NumberOrString>::deserialize(deserializer)? {
        None => Ok(0),
        Some(NumberOrString::Number(n)) => Ok(n),
        Some(NumberOrString::Text(s)) => s.parse().map_err(serde::de::Error::custom),
    }
}
