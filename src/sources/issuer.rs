//! Participant-token issuance against the stage service.

use aws_config::meta::region::RegionProviderChain;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_ivsrealtime::Client;
use chrono::{DateTime, Utc};
use tracing::debug;

use crate::cache::record::{Capability, TokenRecord};
use crate::error::AppError;
use crate::refresh::RefreshParams;

/// Issues participant tokens.
///
/// The seam exists so the refresh flow can run against an in-process double
/// instead of a live endpoint.
pub trait IssueToken {
    fn issue(
        &self,
        params: &RefreshParams,
        capabilities: &[Capability],
    ) -> impl std::future::Future<Output = Result<TokenRecord, AppError>> + Send;
}

/// Issuer backed by the real service client.
#[derive(Debug, Clone)]
pub struct StageTokenIssuer {
    client: Client,
}

impl StageTokenIssuer {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Builds a client from the ambient credential chain. An explicit region
    /// takes precedence over whatever the environment resolves to.
    pub async fn from_env(region: Option<String>) -> Self {
        let region_provider =
            RegionProviderChain::first_try(region.map(Region::new)).or_default_provider();
        let config = aws_config::defaults(BehaviorVersion::latest())
            .region(region_provider)
            .load()
            .await;
        Self::new(Client::new(&config))
    }
}

impl IssueToken for StageTokenIssuer {
    async fn issue(
        &self,
        params: &RefreshParams,
        capabilities: &[Capability],
    ) -> Result<TokenRecord, AppError> {
        let response = self
            .client
            .create_participant_token()
            .stage_arn(&params.stage_arn)
            .duration(params.duration_minutes as i32)
            .set_user_id(params.user_id.clone())
            .set_capabilities(Some(capabilities.iter().map(|cap| cap.to_sdk()).collect()))
            .send()
            .await?;

        let issued = response
            .participant_token
            .ok_or(AppError::IssuerResponseIncomplete { missing: "participantToken" })?;

        let token = issued
            .token
            .ok_or(AppError::IssuerResponseIncomplete { missing: "token" })?;
        let expiration = issued
            .expiration_time
            .and_then(|stamp| DateTime::<Utc>::from_timestamp(stamp.secs(), stamp.subsec_nanos()))
            .ok_or(AppError::IssuerResponseIncomplete { missing: "expirationTime" })?;

        let record = TokenRecord {
            stage_arn: params.stage_arn.clone(),
            token,
            participant_id: issued.participant_id.unwrap_or_default(),
            expiration_time: expiration.to_rfc3339(),
            duration: issued.duration,
            capabilities: issued
                .capabilities
                .unwrap_or_default()
                .iter()
                .filter_map(Capability::from_sdk)
                .collect(),
            user_id: issued.user_id,
        };
        debug!(participant = %record.participant_id, "participant token issued");
        Ok(record)
    }
}
