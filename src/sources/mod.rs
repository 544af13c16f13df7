pub mod identity;
pub mod issuer;

pub use identity::{CallerIdentity, CallerIdentitySource, LookupIdentity};
pub use issuer::{IssueToken, StageTokenIssuer};
