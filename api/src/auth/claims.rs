use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::AuthError;

/// Verified claim set of an access token.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Claims {
    /// Subject (user ID)
    #[serde(default)]
    pub sub: Option<String>,

    /// Issuer
    pub iss: String,

    /// Audience (string or array)
    pub aud: Audience,

    /// Expiration time (Unix timestamp)
    pub exp: u64,

    /// Issued at time (Unix timestamp)
    #[serde(default)]
    pub iat: Option<u64>,

    /// Granted permission strings, e.g. `post:movies`.
    ///
    /// `None` when the provider did not include the claim at all, which is
    /// distinct from an empty grant.
    #[serde(default)]
    pub permissions: Option<BTreeSet<String>>,

    /// Every other claim, passed through untouched
    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}

impl Claims {
    /// Checks that `permission` was granted to this token.
    pub fn require(&self, permission: &str) -> Result<(), AuthError> {
        let permissions = self
            .permissions
            .as_ref()
            .ok_or(AuthError::InvalidClaims("Permissions not included in JWT."))?;

        if permissions.contains(permission) {
            Ok(())
        } else {
            Err(AuthError::PermissionDenied {
                required: permission.to_owned(),
            })
        }
    }
}

/// Audience claim (can be string or array)
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum Audience {
    Single(String),
    Multiple(Vec<String>),
}

impl Audience {
    pub fn contains(&self, aud: &str) -> bool {
        match self {
            Audience::Single(s) => s == aud,
            Audience::Multiple(v) => v.iter().any(|a| a == aud),
        }
    }
}
