//! Best-effort lookup of the active caller identity.
//!
//! Used only to enrich the error output when issuance fails. Nothing here
//! is allowed to abort the refresh.

use aws_config::meta::region::RegionProviderChain;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_sts::Client;
use tracing::debug;

/// Who the active credentials belong to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallerIdentity {
    pub account: String,
    pub arn: String,
    pub user_id: Option<String>,
}

/// Diagnostic-only identity lookup. Implementations swallow every failure.
pub trait LookupIdentity {
    fn lookup(&self) -> impl std::future::Future<Output = Option<CallerIdentity>> + Send;
}

#[derive(Debug, Clone)]
pub struct CallerIdentitySource {
    client: Client,
}

impl CallerIdentitySource {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

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

impl LookupIdentity for CallerIdentitySource {
    async fn lookup(&self) -> Option<CallerIdentity> {
        let output = match self.client.get_caller_identity().send().await {
            Ok(output) => output,
            Err(err) => {
                debug!(error = %err, "unable to fetch caller identity");
                return None;
            }
        };

        let identity = CallerIdentity {
            account: output.account?,
            arn: output.arn.unwrap_or_default(),
            user_id: output.user_id,
        };
        println!(
            "AWS caller identity: Account={} Arn={} UserId={}",
            identity.account,
            identity.arn,
            identity.user_id.as_deref().unwrap_or("unknown"),
        );
        Some(identity)
    }
}
