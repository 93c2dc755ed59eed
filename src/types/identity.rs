use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::Error;

/// Canonical form of a user id: UUIDs become lowercase hyphenated, anything
/// else is only trimmed.
#[must_use]
pub fn normalize_user_id(raw: &str) -> String {
    let raw = raw.trim();
    Uuid::parse_str(raw).map_or_else(|_| raw.to_string(), |uid| uid.to_string())
}

/// The caller an operation is evaluated as.
///
/// The store trusts the identifier it is handed; verifying it is the job of
/// the identity provider in front of the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "role", content = "uid", rename_all = "snake_case")]
pub enum Identity {
    /// Privileged backend credential. Exempt from every row-level policy.
    Service,
    /// An end user authenticated by the identity provider.
    User(String),
    /// No credential at all.
    Anonymous,
}

impl Identity {
    pub fn user(uid: impl AsRef<str>) -> Self {
        Self::User(normalize_user_id(uid.as_ref()))
    }

    /// Same identity with its uid in canonical form, for values built
    /// directly from the `User` variant.
    #[must_use]
    pub fn normalized(&self) -> Self {
        match self {
            Self::User(uid) => Self::user(uid),
            other => other.clone(),
        }
    }

    /// The requesting identity as policies see it (`auth.uid()`).
    /// `None` for callers without a user id, so owner checks never match.
    #[must_use]
    pub fn uid(&self) -> Option<&str> {
        match self {
            Self::User(uid) => Some(uid),
            Self::Service | Self::Anonymous => None,
        }
    }

    #[must_use]
    pub const fn bypasses_policies(&self) -> bool {
        matches!(self, Self::Service)
    }

    #[must_use]
    pub const fn role(&self) -> &'static str {
        match self {
            Self::Service => "service_role",
            Self::User(_) => "authenticated",
            Self::Anonymous => "anon",
        }
    }
}

impl FromStr for Identity {
    type Err = Error;

    /// Accepts `service`, `anon`, or a user UUID.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "service" | "service_role" => Ok(Self::Service),
            "anon" | "anonymous" => Ok(Self::Anonymous),
            other => Uuid::parse_str(other)
                .map(|uid| Self::User(uid.to_string()))
                .map_err(|_| {
                    Error::InvalidIdentity(format!(
                        "'{other}' is not 'service', 'anon', or a user UUID"
                    ))
                }),
        }
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Service => write!(f, "service"),
            Self::User(uid) => write!(f, "{uid}"),
            Self::Anonymous => write!(f, "anon"),
        }
    }
}
