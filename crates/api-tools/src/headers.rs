//! Credential headers for authenticated Dao3 endpoints.

use std::fmt;

pub const AUTHORIZATION: &str = "Authorization";
pub const USER_AGENT: &str = "user-agent";
pub const X_DAO_UA: &str = "x-dao-ua";

/// Headers derived from a caller's `token` + `userAgent`.
///
/// No validation is applied; empty strings are sent as-is.
#[derive(Clone, PartialEq, Eq)]
pub struct AuthHeaders {
    authorization: String,
    user_agent: String,
}

impl AuthHeaders {
    #[must_use]
    pub fn new(token: impl Into<String>, user_agent: impl Into<String>) -> Self {
        Self {
            authorization: token.into(),
            user_agent: user_agent.into(),
        }
    }

    #[must_use]
    pub fn authorization(&self) -> &str {
        &self.authorization
    }

    #[must_use]
    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    /// `(name, value)` pairs in wire order. `user-agent` and `x-dao-ua` always carry the same value.
    #[must_use]
    pub fn pairs(&self) -> [(&'static str, &str); 3] {
        [
            (AUTHORIZATION, self.authorization.as_str()),
            (USER_AGENT, self.user_agent.as_str()),
            (X_DAO_UA, self.user_agent.as_str()),
        ]
    }
}

impl fmt::Debug for AuthHeaders {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthHeaders")
            .field("authorization", &"<redacted>")
            .field("user_agent", &self.user_agent)
            .finish()
    }
}
