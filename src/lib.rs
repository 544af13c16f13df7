//! # Stage Token Refresh Library
//!
//! Keeps a locally cached Amazon IVS Real-Time participant token usable:
//! evaluates the cached record against a safety margin, mints a replacement
//! through the IVS Real-Time service only when needed, and preserves the
//! previous file contents as a timestamped backup before overwriting.
//!
//! Modules:
//! - `cache`: on-disk token record, load/backup/persist, validity check
//! - `sources`: IVS Real-Time issuance and STS identity lookup
//! - `refresh`: the load, check, issue, back up, persist flow
//! - `arn`: stage-ARN account extraction
//! - `report`: best-effort event forwarding to a monitoring webhook

pub mod arn;
pub mod cache;
pub mod error;
pub mod refresh;
pub mod report;
pub mod sources;
pub mod tests;
pub mod utils;

pub use crate::cache::record::{Capability, TokenRecord};
pub use crate::error::AppError;
pub use crate::refresh::{RefreshOutcome, RefreshParams};
