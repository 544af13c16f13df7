//! The refresh flow: validate, read the cache, issue, back up, persist.

use std::future::Future;
use std::path::PathBuf;

use aws_sdk_ivsrealtime::error::DisplayErrorContext;
use tracing::{debug, info};

use crate::arn;
use crate::cache::record::{Capability, TokenRecord};
use crate::cache::store::{self, CacheLoad};
use crate::cache::validity;
use crate::error::AppError;
use crate::sources::{IssueToken, LookupIdentity};

pub const MIN_DURATION_MINUTES: i64 = 1;
/// 20160 minutes is the issuing service's 14 day ceiling.
pub const MAX_DURATION_MINUTES: i64 = 20160;

/// Inputs of a single run, already parsed from the command line.
#[derive(Debug, Clone)]
pub struct RefreshParams {
    pub stage_arn: String,
    pub token_file: PathBuf,
    pub duration_minutes: i64,
    pub region: Option<String>,
    pub user_id: Option<String>,
    pub capabilities: Vec<Capability>,
    pub safety_margin_seconds: i64,
}

/// How a successful run ended.
#[derive(Debug)]
pub enum RefreshOutcome {
    /// The cached token was still inside its lifetime, margin included.
    CacheHit(TokenRecord),
    /// A new token was issued and written; the previous file, if there was
    /// one, now lives at `backup`.
    Refreshed {
        record: TokenRecord,
        backup: Option<PathBuf>,
    },
}

/// Drives one end-to-end refresh.
///
/// `issuer` and `identity` arrive as unpolled futures and are awaited only
/// on the paths that need them, so a cache hit builds no client and touches
/// the network not at all. `identity` is consulted purely to enrich the
/// error output when issuance fails.
pub async fn run_refresh<I, L>(
    params: &RefreshParams,
    issuer: impl Future<Output = I>,
    identity: impl Future<Output = L>,
) -> Result<RefreshOutcome, AppError>
where
    I: IssueToken,
    L: LookupIdentity,
{
    let stage_account = validate_invocation(params).await?;

    let previous_raw = match store::load(&params.token_file).await {
        CacheLoad::Valid { record, raw } => {
            if validity::is_token_valid(&record.expiration_time, params.safety_margin_seconds) {
                info!("cached token still valid, skipping refresh");
                return Ok(RefreshOutcome::CacheHit(record));
            }
            Some(raw)
        }
        CacheLoad::Malformed(raw) => Some(raw),
        CacheLoad::Missing => None,
    };

    println!("Existing token missing/invalid/expired; creating a new one...");

    let capabilities = if params.capabilities.is_empty() {
        vec![Capability::Publish, Capability::Subscribe]
    } else {
        params.capabilities.clone()
    };

    let record = match issuer.await.issue(params, &capabilities).await {
        Ok(record) => record,
        Err(err) => {
            report_issuance_failure(&err, &stage_account, identity.await).await;
            return Err(err);
        }
    };

    let backup = store::backup(&params.token_file, previous_raw.as_deref()).await?;
    store::persist(&params.token_file, &record).await?;

    Ok(RefreshOutcome::Refreshed { record, backup })
}

/// Up-front input checks, in the order a caller would want to hear about
/// them: unusable target path, unusable parent directory, malformed stage
/// ARN, out-of-range duration. Returns the account id embedded in the ARN.
pub(crate) async fn validate_invocation(params: &RefreshParams) -> Result<String, AppError> {
    if let Ok(meta) = tokio::fs::metadata(&params.token_file).await {
        if meta.is_dir() {
            return Err(AppError::TokenFileIsDirectory(params.token_file.clone()));
        }
    }

    let parent = params
        .token_file
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty());
    if let Some(parent) = parent {
        match tokio::fs::metadata(parent).await {
            Ok(meta) if meta.is_dir() => {}
            Ok(_) => return Err(AppError::TokenDirectoryNotDirectory(parent.to_path_buf())),
            Err(_) => {
                tokio::fs::create_dir_all(parent).await.map_err(|source| {
                    AppError::TokenDirectoryCreate {
                        path: parent.to_path_buf(),
                        source,
                    }
                })?;
                info!(path = %parent.display(), "created missing token directory");
            }
        }
    }

    let stage_account = arn::extract_account_id(&params.stage_arn)?;

    if !(MIN_DURATION_MINUTES..=MAX_DURATION_MINUTES).contains(&params.duration_minutes) {
        return Err(AppError::InvalidDuration {
            got: params.duration_minutes,
            min: MIN_DURATION_MINUTES,
            max: MAX_DURATION_MINUTES,
        });
    }

    Ok(stage_account)
}

/// Failure-site diagnostics: the full error chain, the account the stage
/// ARN names, and, when the active credentials resolve to a different
/// account, a hint naming both.
async fn report_issuance_failure<L: LookupIdentity>(err: &AppError, stage_account: &str, identity: L) {
    match err {
        AppError::Issuance(sdk_err) => {
            eprintln!(
                "ERROR: Failed to create participant token: {}",
                DisplayErrorContext(sdk_err)
            );
        }
        other => eprintln!("ERROR: {other}"),
    }
    eprintln!("(debug) Stage account from ARN: {stage_account}");
    debug!(stage_account, "issuance failed, looking up caller identity");

    if let Some(caller) = identity.lookup().await {
        if let Some(hint) = mismatch_hint(&caller.account, stage_account) {
            eprintln!("{hint}");
        }
    }
}

fn mismatch_hint(caller_account: &str, stage_account: &str) -> Option<String> {
    if caller_account.is_empty() || caller_account == stage_account {
        return None;
    }
    Some(format!(
        "(hint) Your active AWS credentials are for a different account than the stage ARN.\n\
         \x20      credentials account: {caller_account}\n\
         \x20      stage ARN account:   {stage_account}"
    ))
}
