//! Fire-and-forget event reporting to a monitoring webhook.
//!
//! Configured entirely through the environment so schedulers can turn it on
//! without touching the command line. Nothing in here may fail the run: an
//! unconfigured or unreachable webhook degrades to a debug log line.

use std::collections::BTreeMap;
use std::env;
use std::time::Duration;

use anyhow::bail;
use chrono::Utc;
use serde::Serialize;
use tracing::debug;

/// Webhook endpoint. Reporting is a silent no-op when unset.
pub const WEBHOOK_URL_ENV: &str = "EVENT_WEBHOOK_URL";
pub const ENVIRONMENT_ENV: &str = "EVENT_ENVIRONMENT";
pub const RELEASE_ENV: &str = "EVENT_RELEASE";
pub const SERVER_NAME_ENV: &str = "EVENT_SERVER_NAME";

const SEND_TIMEOUT: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventLevel {
    Fatal,
    Error,
    Warning,
    Info,
}

impl EventLevel {
    fn as_str(self) -> &'static str {
        match self {
            EventLevel::Fatal => "fatal",
            EventLevel::Error => "error",
            EventLevel::Warning => "warning",
            EventLevel::Info => "info",
        }
    }
}

#[derive(Debug, Serialize)]
struct EventEnvelope<'a> {
    level: &'static str,
    message: &'a str,
    logger: &'static str,
    timestamp: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    environment: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    release: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    server_name: Option<String>,
    tags: BTreeMap<String, String>,
    extra: BTreeMap<String, String>,
}

/// Posts one event envelope and returns. Tag and extra values are scrubbed
/// before leaving the process; callers should still avoid passing secrets.
pub async fn emit(level: EventLevel, message: &str, tags: &[(&str, &str)], extras: &[(&str, &str)]) {
    let url = match env::var(WEBHOOK_URL_ENV) {
        Ok(url) if !url.is_empty() => url,
        _ => return,
    };

    let mut tag_map: BTreeMap<String, String> = BTreeMap::new();
    tag_map.insert("component".into(), env!("CARGO_PKG_NAME").into());
    for (key, value) in tags {
        tag_map.insert((*key).into(), scrub(value));
    }
    let extra: BTreeMap<String, String> = extras
        .iter()
        .map(|(key, value)| ((*key).to_string(), scrub(value)))
        .collect();

    let envelope = EventEnvelope {
        level: level.as_str(),
        message,
        logger: env!("CARGO_PKG_NAME"),
        timestamp: Utc::now().to_rfc3339(),
        environment: env::var(ENVIRONMENT_ENV).ok(),
        release: env::var(RELEASE_ENV).ok(),
        server_name: env::var(SERVER_NAME_ENV).ok(),
        tags: tag_map,
        extra,
    };

    match deliver(&url, &envelope).await {
        Ok(()) => debug!(level = envelope.level, "monitoring event delivered"),
        Err(err) => debug!(error = %err, "monitoring event not delivered"),
    }
}

async fn deliver(url: &str, envelope: &EventEnvelope<'_>) -> anyhow::Result<()> {
    let client = reqwest::Client::builder().timeout(SEND_TIMEOUT).build()?;
    let response = client.post(url).json(envelope).send().await?;
    if !response.status().is_success() {
        bail!("webhook returned {}", response.status());
    }
    Ok(())
}

fn scrub(value: &str) -> String {
    let lowered = value.to_lowercase();
    if lowered.contains("token") || lowered.contains("authorization") || lowered.contains("secret")
    {
        "[redacted]".into()
    } else {
        value.into()
    }
}
