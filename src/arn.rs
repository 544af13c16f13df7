use std::sync::OnceLock;

use regex::Regex;

use crate::error::AppError;

// arn:partition:service:region:account-id:resource. The account is the 5th
// colon-delimited segment and must be exactly 12 digits. Region may be empty
// (IAM-style ARNs), the other segments may not.
static ACCOUNT_RE: OnceLock<Regex> = OnceLock::new();

fn account_re() -> &'static Regex {
    ACCOUNT_RE.get_or_init(|| {
        Regex::new(r"^arn:[^:]+:[^:]+:[^:]*:(\d{12}):.+$").expect("account regex is valid")
    })
}

/// Extract the 12-digit owning-account id from a stage ARN.
pub fn extract_account_id(arn: &str) -> Result<String, AppError> {
    account_re()
        .captures(arn)
        .map(|caps| caps[1].to_string())
        .ok_or_else(|| AppError::InvalidStageArn(arn.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_account_from_stage_arn() {
        let arn = "arn:aws:ivs:us-west-2:123456789012:stage/AbCdEf123456";
        assert_eq!(extract_account_id(arn).unwrap(), "123456789012");
    }

    #[test]
    fn accepts_empty_region_segment() {
        let arn = "arn:aws:iam::210987654321:user/stream-box";
        assert_eq!(extract_account_id(arn).unwrap(), "210987654321");
    }

    #[test]
    fn rejects_non_arn_strings() {
        for bad in [
            "",
            "not-an-arn",
            "arn:aws:ivs:us-west-2::stage/x",
            "arn:aws:ivs:us-west-2:12345678901:stage/x",
            "arn:aws:ivs:us-west-2:1234567890123:stage/x",
            "arn:aws:ivs:us-west-2:12345678901a:stage/x",
            "arn:aws:ivs:us-west-2:123456789012:",
            "arn:aws:ivs:us-west-2:123456789012",
        ] {
            let err = extract_account_id(bad).unwrap_err();
            assert!(
                matches!(err, AppError::InvalidStageArn(ref s) if s == bad),
                "expected InvalidStageArn for {bad:?}"
            );
        }
    }
}
