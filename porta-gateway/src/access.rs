//! Shared-secret access guard.
//!
//! Every request carries its token in the `X-PORTA-TOKEN` header. When no
//! token is configured the guard is disabled and everything passes. Paths
//! under a public prefix (static assets) always pass.

use secrecy::{ExposeSecret, SecretString};
use sha2::{Digest, Sha256};

/// Header carrying the caller's token. Header names are case-insensitive.
pub const TOKEN_HEADER: &str = "x-porta-token";

// ============================================================================
// TOKEN (TYPE-SAFE)
// ============================================================================

/// Expected access token. Never printed by `Debug`.
#[derive(Clone)]
pub struct AccessToken(SecretString);

impl AccessToken {
    /// Wrap a configured token. Blank values mean "no token configured".
    pub fn new(token: impl Into<String>) -> Option<Self> {
        let token = token.into();
        if token.trim().is_empty() {
            return None;
        }
        Some(Self(SecretString::new(token.into())))
    }

    fn digest(&self) -> [u8; 32] {
        sha256(self.0.expose_secret())
    }
}

impl std::fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "AccessToken([REDACTED])")
    }
}

fn sha256(value: &str) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(value.as_bytes());
    let result = hasher.finalize();
    let mut digest = [0u8; 32];
    digest.copy_from_slice(&result);
    digest
}

/// Compare two digests without short-circuiting on the first mismatch.
fn digests_match(a: &[u8; 32], b: &[u8; 32]) -> bool {
    a.iter().zip(b.iter()).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

// ============================================================================
// DECISIONS
// ============================================================================

/// Why a request was turned away.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RejectReason {
    /// No token header, or an empty one.
    Missing,
    /// A token was presented but does not match.
    Invalid,
}

impl RejectReason {
    /// Metric label.
    pub fn as_str(&self) -> &'static str {
        match self {
            RejectReason::Missing => "missing",
            RejectReason::Invalid => "invalid",
        }
    }

    /// Message returned to the caller.
    pub fn message(&self) -> &'static str {
        match self {
            RejectReason::Missing => "Missing X-PORTA-TOKEN header",
            RejectReason::Invalid => "Invalid token",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessDecision {
    Allow,
    Reject(RejectReason),
}

// ============================================================================
// GUARD
// ============================================================================

#[derive(Clone)]
pub struct AccessGuard {
    expected: Option<[u8; 32]>,
    public_prefixes: Vec<String>,
}

impl std::fmt::Debug for AccessGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessGuard")
            .field("enabled", &self.is_enabled())
            .field("public_prefixes", &self.public_prefixes)
            .finish()
    }
}

impl AccessGuard {
    pub fn new(expected: Option<&AccessToken>, public_prefixes: Vec<String>) -> Self {
        let public_prefixes = public_prefixes
            .into_iter()
            .map(|p| p.trim_end_matches('/').to_string())
            .filter(|p| !p.is_empty())
            .collect();
        Self {
            expected: expected.map(AccessToken::digest),
            public_prefixes,
        }
    }

    /// A guard that lets everything through.
    pub fn disabled() -> Self {
        Self::new(None, Vec::new())
    }

    pub fn is_enabled(&self) -> bool {
        self.expected.is_some()
    }

    /// True for `prefix` itself and anything below `prefix/`.
    pub fn is_public(&self, path: &str) -> bool {
        self.public_prefixes.iter().any(|prefix| {
            path == prefix
                || path
                    .strip_prefix(prefix.as_str())
                    .is_some_and(|rest| rest.starts_with('/'))
        })
    }

    /// Decide on a request for `path` presenting `token` (the raw header
    /// value, if any).
    pub fn authorize(&self, path: &str, token: Option<&str>) -> AccessDecision {
        let Some(expected) = &self.expected else {
            return AccessDecision::Allow;
        };
        if self.is_public(path) {
            return AccessDecision::Allow;
        }
        match token {
            None | Some("") => AccessDecision::Reject(RejectReason::Missing),
            Some(presented) if digests_match(expected, &sha256(presented)) => AccessDecision::Allow,
            Some(_) => AccessDecision::Reject(RejectReason::Invalid),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn guard(token: &str) -> AccessGuard {
        let token = AccessToken::new(token);
        AccessGuard::new(token.as_ref(), vec!["/static".to_string()])
    }

    #[test]
    fn test_blank_token_disables_guard() {
        assert!(AccessToken::new("").is_none());
        assert!(AccessToken::new("   ").is_none());
        let guard = AccessGuard::new(None, vec![]);
        assert!(!guard.is_enabled());
        assert_eq!(guard.authorize("/run_bash", None), AccessDecision::Allow);
    }

    #[test]
    fn test_missing_and_invalid_are_distinct() {
        let guard = guard("s3cret");
        assert_eq!(
            guard.authorize("/meta", None),
            AccessDecision::Reject(RejectReason::Missing)
        );
        assert_eq!(
            guard.authorize("/meta", Some("")),
            AccessDecision::Reject(RejectReason::Missing)
        );
        assert_eq!(
            guard.authorize("/meta", Some("wrong")),
            AccessDecision::Reject(RejectReason::Invalid)
        );
        assert_eq!(guard.authorize("/meta", Some("s3cret")), AccessDecision::Allow);
    }

    #[test]
    fn test_token_match_is_exact() {
        let guard = guard("s3cret");
        for near_miss in ["s3cret ", " s3cret", "S3CRET", "s3cre", "s3cret\n"] {
            assert_eq!(
                guard.authorize("/meta", Some(near_miss)),
                AccessDecision::Reject(RejectReason::Invalid),
                "{near_miss:?} must not match"
            );
        }
    }

    #[test]
    fn test_public_prefix_bypasses_token() {
        let guard = guard("s3cret");
        assert_eq!(guard.authorize("/static", None), AccessDecision::Allow);
        assert_eq!(guard.authorize("/static/app.js", None), AccessDecision::Allow);
        assert_eq!(
            guard.authorize("/staticky", None),
            AccessDecision::Reject(RejectReason::Missing)
        );
    }

    #[test]
    fn test_debug_never_shows_token() {
        let token = AccessToken::new("hunter2").unwrap();
        assert!(!format!("{token:?}").contains("hunter2"));
        let guard = AccessGuard::new(Some(&token), vec![]);
        assert!(!format!("{guard:?}").contains("hunter2"));
    }

    #[test]
    fn test_reject_messages() {
        assert_eq!(RejectReason::Missing.message(), "Missing X-PORTA-TOKEN header");
        assert_eq!(RejectReason::Invalid.message(), "Invalid token");
    }

    proptest! {
        #[test]
        fn prop_only_exact_token_allows(
            expected in "[A-Za-z0-9]{8,32}",
            presented in "[A-Za-z0-9]{1,32}",
        ) {
            let guard = guard(&expected);
            let decision = guard.authorize("/run_bash", Some(&presented));
            if presented == expected {
                prop_assert_eq!(decision, AccessDecision::Allow);
            } else {
                prop_assert_eq!(decision, AccessDecision::Reject(RejectReason::Invalid));
            }
        }
    }
}
