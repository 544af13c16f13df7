use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use stage_token_refresh::cache::record::Capability;
use stage_token_refresh::cache::validity::DEFAULT_SAFETY_MARGIN_SECONDS;
use stage_token_refresh::error::EXIT_ISSUANCE_FAILED;
use stage_token_refresh::refresh::{self, RefreshOutcome, RefreshParams};
use stage_token_refresh::report::{self, EventLevel};
use stage_token_refresh::sources::{CallerIdentitySource, StageTokenIssuer};
use stage_token_refresh::utils::logging::{self, LogLevel};

/// Refresh an IVS Real-Time participant token file if expired.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// ARN of the IVS Real-Time stage (arn:aws:ivs:region:acct:stage/...).
    #[arg(long)]
    stage_arn: String,

    /// Path to the JSON file holding the token and its metadata.
    #[arg(long)]
    token_file: PathBuf,

    /// Token duration in minutes (1 to 20160, the service maximum).
    #[arg(long)]
    duration_minutes: i64,

    /// AWS region for IVS (otherwise uses the usual AWS defaults).
    #[arg(long)]
    region: Option<String>,

    /// Optional userId label to embed in the token.
    #[arg(long)]
    user_id: Option<String>,

    /// Capability to grant; repeat the flag to grant several. Both are
    /// granted when omitted.
    #[arg(long = "capability", value_enum)]
    capability: Vec<Capability>,

    /// Skip the 5-minute safety margin when checking expiry.
    #[arg(long)]
    no_safety_margin: bool,

    /// Log verbosity for diagnostics on stderr.
    #[arg(long, value_enum, env = "LOG_LEVEL")]
    log_level: Option<LogLevel>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    logging::init(args.log_level);

    let params = RefreshParams {
        stage_arn: args.stage_arn,
        token_file: args.token_file,
        duration_minutes: args.duration_minutes,
        region: args.region,
        user_id: args.user_id,
        capabilities: args.capability,
        safety_margin_seconds: if args.no_safety_margin {
            0
        } else {
            DEFAULT_SAFETY_MARGIN_SECONDS
        },
    };

    let outcome = refresh::run_refresh(
        &params,
        StageTokenIssuer::from_env(params.region.clone()),
        CallerIdentitySource::from_env(params.region.clone()),
    )
    .await;

    match outcome {
        Ok(RefreshOutcome::CacheHit(record)) => {
            println!("Existing token is still valid; no refresh needed.");
            println!("Token: {}", record.token);
            ExitCode::SUCCESS
        }
        Ok(RefreshOutcome::Refreshed { record, .. }) => {
            println!("New token written to {}", params.token_file.display());
            println!("Token: {}", record.token);
            ExitCode::SUCCESS
        }
        Err(err) => {
            let code = err.exit_code();
            // Issuance failures already printed their diagnostics at the
            // failure site.
            if code != EXIT_ISSUANCE_FAILED {
                eprintln!("ERROR: {err}");
            }
            report::emit(
                EventLevel::Fatal,
                "participant token refresh failed",
                &[("error-kind", err.kind()), ("exit-code", &code.to_string())],
                &[("error", &err.to_string())],
            )
            .await;
            ExitCode::from(code)
        }
    }
}
