//! Expiry checks for cached tokens.

use chrono::{DateTime, Duration, NaiveDateTime, Utc};
use tracing::debug;

/// Seconds a cached token must still have left before it is reused.
pub const DEFAULT_SAFETY_MARGIN_SECONDS: i64 = 300;

/// Parses an `expirationTime` value from the cache or the issuing service.
///
/// Accepts RFC 3339 with any offset, plus offset-less timestamps which are
/// taken as UTC.
pub fn parse_expiration(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

/// Returns whether a token expiring at `raw` can still be handed out.
///
/// Valid means `now + margin` lies strictly before the expiry instant.
/// An unparseable timestamp counts as already expired.
pub fn is_token_valid(raw: &str, safety_margin_seconds: i64) -> bool {
    is_token_valid_at(raw, safety_margin_seconds, Utc::now())
}

pub(crate) fn is_token_valid_at(raw: &str, safety_margin_seconds: i64, now: DateTime<Utc>) -> bool {
    let Some(expiration) = parse_expiration(raw) else {
        debug!(expiration = raw, "unparseable expiration, treating token as expired");
        return false;
    };
    now + Duration::seconds(safety_margin_seconds) < expiration
}
