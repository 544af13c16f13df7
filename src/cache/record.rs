//! On-disk shape of a cached participant token.

use aws_sdk_ivsrealtime::types::ParticipantTokenCapability;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Permission granted to the participant the token admits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[value(rename_all = "UPPER")]
pub enum Capability {
    Publish,
    Subscribe,
}

impl Capability {
    pub fn to_sdk(self) -> ParticipantTokenCapability {
        match self {
            Capability::Publish => ParticipantTokenCapability::Publish,
            Capability::Subscribe => ParticipantTokenCapability::Subscribe,
        }
    }

    /// Unrecognized service-side capabilities are dropped rather than
    /// invented, so the cache only ever holds values it can re-serialize.
    pub fn from_sdk(cap: &ParticipantTokenCapability) -> Option<Self> {
        match cap {
            ParticipantTokenCapability::Publish => Some(Capability::Publish),
            ParticipantTokenCapability::Subscribe => Some(Capability::Subscribe),
            _ => None,
        }
    }
}

/// A cached token exactly as persisted in the token file.
///
/// Only `token` and `expirationTime` are required when decoding; every
/// other key falls back to its empty value so older files stay readable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenRecord {
    #[serde(default)]
    pub stage_arn: String,
    pub token: String,
    #[serde(default)]
    pub participant_id: String,
    pub expiration_time: String,
    #[serde(default)]
    pub duration: Option<i32>,
    #[serde(default)]
    pub capabilities: Vec<Capability>,
    #[serde(default)]
    pub user_id: Option<String>,
}
