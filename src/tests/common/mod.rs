// tests/common/mod.rs
pub use httpmock::prelude::*;
pub use serde_json::json;

use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use chrono::{Duration, Utc};

use crate::cache::record::{Capability, TokenRecord};
use crate::error::AppError;
use crate::refresh::RefreshParams;
use crate::sources::{CallerIdentity, IssueToken, LookupIdentity};

pub const STAGE_ARN: &str = "arn:aws:ivs:us-east-1:123456789012:stage/Ab1Cd2Ef3GhI";
pub const STAGE_ACCOUNT: &str = "123456789012";
pub const OTHER_ACCOUNT: &str = "210987654321";

pub fn refresh_params(token_file: PathBuf) -> RefreshParams {
    RefreshParams {
        stage_arn: STAGE_ARN.to_string(),
        token_file,
        duration_minutes: 240,
        region: Some("us-east-1".into()),
        user_id: None,
        capabilities: vec![],
        safety_margin_seconds: 300,
    }
}

pub fn record_expiring_in(seconds: i64) -> TokenRecord {
    TokenRecord {
        stage_arn: STAGE_ARN.into(),
        token: "cached-tok".into(),
        participant_id: "cached-pid".into(),
        expiration_time: (Utc::now() + Duration::seconds(seconds)).to_rfc3339(),
        duration: Some(240),
        capabilities: vec![Capability::Publish, Capability::Subscribe],
        user_id: None,
    }
}

/// Issuer double that either echoes a canned record or fails, and counts
/// how often it was asked.
#[derive(Clone)]
pub struct ScriptedIssuer {
    record: Option<TokenRecord>,
    calls: Arc<AtomicUsize>,
}

impl ScriptedIssuer {
    pub fn succeeding(record: TokenRecord) -> Self {
        Self {
            record: Some(record),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn failing() -> Self {
        Self {
            record: None,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl IssueToken for ScriptedIssuer {
    async fn issue(
        &self,
        params: &RefreshParams,
        capabilities: &[Capability],
    ) -> Result<TokenRecord, AppError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.record {
            Some(record) => {
                let mut issued = record.clone();
                issued.stage_arn = params.stage_arn.clone();
                issued.capabilities = capabilities.to_vec();
                Ok(issued)
            }
            None => Err(AppError::Issuance(
                aws_sdk_ivsrealtime::error::SdkError::construction_failure(
                    std::io::Error::other("scripted issuance failure"),
                ),
            )),
        }
    }
}

/// Identity double returning a canned caller, with a call counter.
#[derive(Clone)]
pub struct ScriptedIdentity {
    identity: Option<CallerIdentity>,
    calls: Arc<AtomicUsize>,
}

impl ScriptedIdentity {
    pub fn resolving(account: &str) -> Self {
        Self {
            identity: Some(CallerIdentity {
                account: account.to_string(),
                arn: format!("arn:aws:iam::{account}:user/ops"),
                user_id: Some("AIDACKCEVSQ6C2EXAMPLE".into()),
            }),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn unavailable() -> Self {
        Self {
            identity: None,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl LookupIdentity for ScriptedIdentity {
    async fn lookup(&self) -> Option<CallerIdentity> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.identity.clone()
    }
}

/// Service client pointed at a local mock endpoint, with static credentials
/// so no ambient AWS configuration is ever consulted.
pub fn ivs_client(server: &MockServer) -> aws_sdk_ivsrealtime::Client {
    let config = aws_sdk_ivsrealtime::config::Builder::new()
        .behavior_version(aws_sdk_ivsrealtime::config::BehaviorVersion::latest())
        .region(aws_sdk_ivsrealtime::config::Region::new("us-east-1"))
        .credentials_provider(aws_sdk_ivsrealtime::config::Credentials::new(
            "AKIDEXAMPLE",
            "secret",
            None,
            None,
            "static",
        ))
        .endpoint_url(server.base_url())
        .build();
    aws_sdk_ivsrealtime::Client::from_conf(config)
}

pub fn sts_client(server: &MockServer) -> aws_sdk_sts::Client {
    let config = aws_sdk_sts::config::Builder::new()
        .behavior_version(aws_sdk_sts::config::BehaviorVersion::latest())
        .region(aws_sdk_sts::config::Region::new("us-east-1"))
        .credentials_provider(aws_sdk_sts::config::Credentials::new(
            "AKIDEXAMPLE",
            "secret",
            None,
            None,
            "static",
        ))
        .endpoint_url(server.base_url())
        .build();
    aws_sdk_sts::Client::from_conf(config)
}

pub fn sts_identity_body(account: &str) -> String {
    format!(
        r#"<GetCallerIdentityResponse xmlns="https://sts.amazonaws.com/doc/2011-06-15/">
  <GetCallerIdentityResult>
    <Arn>arn:aws:iam::{account}:user/ops</Arn>
    <UserId>AIDACKCEVSQ6C2EXAMPLE</UserId>
    <Account>{account}</Account>
  </GetCallerIdentityResult>
  <ResponseMetadata>
    <RequestId>01234567-89ab-cdef-0123-456789abcdef</RequestId>
  </ResponseMetadata>
</GetCallerIdentityResponse>"#
    )
}
