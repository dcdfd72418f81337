/// Why a request failed authentication or authorization.
///
/// The `Display` text is what the client sees; details meant for operators
/// are carried in fields and logged, never rendered.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Authorization Header is required.")]
    HeaderMissing,

    #[error("{0}")]
    HeaderMalformed(&'static str),

    #[error("Unable to parse authentication token.")]
    TokenMalformed { reason: String },

    #[error("Unable to find the appropriate key.")]
    KeyNotFound { kid: String },

    #[error("Unable to parse authentication token.")]
    InvalidSignature,

    #[error("Token expired.")]
    TokenExpired,

    #[error("{0}")]
    InvalidClaims(&'static str),

    #[error("Permission not found.")]
    PermissionDenied { required: String },

    /// The provider's key set could not be fetched or used.
    #[error("signing keys unavailable: {0}")]
    KeySetUnavailable(String),
}

impl AuthError {
    pub(crate) fn malformed(reason: impl Into<String>) -> Self {
        Self::TokenMalformed {
            reason: reason.into(),
        }
    }

    /// Short machine-readable code, used as a log field.
    pub fn code(&self) -> &'static str {
        match self {
            AuthError::HeaderMissing => "authorization_header_missing",
            AuthError::HeaderMalformed(_) | AuthError::TokenMalformed { .. } => "invalid_header",
            AuthError::KeyNotFound { .. } => "unknown_key",
            AuthError::InvalidSignature => "invalid_signature",
            AuthError::TokenExpired => "token_expired",
            AuthError::InvalidClaims(_) => "invalid_claims",
            AuthError::PermissionDenied { .. } => "unauthorized",
            AuthError::KeySetUnavailable(_) => "key_set_unavailable",
        }
    }

    /// Whether the failure lies with the server rather than the caller.
    pub fn is_internal(&self) -> bool {
        matches!(self, AuthError::KeySetUnavailable(_))
    }
}

impl From<jsonwebtoken::errors::Error> for AuthError {
    fn from(e: jsonwebtoken::errors::Error) -> Self {
        use jsonwebtoken::errors::ErrorKind;

        match e.kind() {
            ErrorKind::ExpiredSignature => AuthError::TokenExpired,
            ErrorKind::InvalidIssuer
            | ErrorKind::InvalidAudience
            | ErrorKind::ImmatureSignature
            | ErrorKind::MissingRequiredClaim(_) => {
                AuthError::InvalidClaims("Incorrect claims. Please, check the audience and issuer.")
            }
            ErrorKind::InvalidSignature => AuthError::InvalidSignature,
            _ => AuthError::malformed(e.to_string()),
        }
    }
}
