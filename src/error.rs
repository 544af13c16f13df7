use std::path::PathBuf;

use aws_sdk_ivsrealtime::error::SdkError;
use aws_sdk_ivsrealtime::operation::create_participant_token::CreateParticipantTokenError;
use thiserror::Error;

/// Exit code for errors the caller can fix: bad ARN, bad duration, unusable
/// token path. Distinct from issuance failures so schedulers can tell a bad
/// invocation from a remote-service problem.
pub const EXIT_INVALID_INVOCATION: u8 = 1;
/// Exit code for a failed `CreateParticipantToken` call after input
/// validation already passed.
pub const EXIT_ISSUANCE_FAILED: u8 = 2;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("token-file points to a directory, not a file: {}", .0.display())]
    TokenFileIsDirectory(PathBuf),

    #[error("token-file directory does not exist and could not be created: {}: {source}", .path.display())]
    TokenDirectoryCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("token-file parent is not a directory: {}", .0.display())]
    TokenDirectoryNotDirectory(PathBuf),

    #[error("stage-arn does not look like a valid ARN with a 12-digit account id, got: {0}")]
    InvalidStageArn(String),

    #[error("duration-minutes must be between {min} and {max}, got {got}")]
    InvalidDuration { got: i64, min: i64, max: i64 },

    #[error("failed to create participant token: {0}")]
    Issuance(#[from] SdkError<CreateParticipantTokenError>),

    /// The call itself succeeded but the payload lacked a field the cache
    /// record cannot do without.
    #[error("participant token response was missing `{missing}`")]
    IssuerResponseIncomplete { missing: &'static str },

    /// Both backup strategies (rename, raw rewrite) failed; refusing to
    /// overwrite the only copy of the previous token.
    #[error("failed to back up previous token file to {}: {source}", .path.display())]
    Backup {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write token file {}: {source}", .path.display())]
    Persist {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl AppError {
    pub fn exit_code(&self) -> u8 {
        match self {
            AppError::Issuance(_) | AppError::IssuerResponseIncomplete { .. } => {
                EXIT_ISSUANCE_FAILED
            }
            _ => EXIT_INVALID_INVOCATION,
        }
    }

    /// Stable label used to tag forwarded monitoring events.
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::Issuance(_) | AppError::IssuerResponseIncomplete { .. } => {
                "issuance-failure"
            }
            AppError::Backup { .. } | AppError::Persist { .. } => "cache-write-failure",
            _ => "invalid-invocation",
        }
    }
}
