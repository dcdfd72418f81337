use std::sync::Arc;

use axum::http::{HeaderMap, header::AUTHORIZATION};
use jsonwebtoken::{Validation, decode, decode_header};
use tracing::debug;

use super::{AuthError, Claims, KeyStore};
use crate::config::AuthSettings;

/// Extracts the token from an `Authorization: Bearer <token>` header.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let value = headers
        .get(AUTHORIZATION)
        .ok_or(AuthError::HeaderMissing)?
        .to_str()
        .map_err(|_| AuthError::HeaderMalformed("Authorization header must be bearer token."))?;

    let mut parts = value.split_whitespace();
    if parts.next() != Some("Bearer") {
        return Err(AuthError::HeaderMalformed(
            "Authorization header must start with \"Bearer\".",
        ));
    }
    let token = parts
        .next()
        .ok_or(AuthError::HeaderMalformed("Token not found."))?;
    if parts.next().is_some() {
        return Err(AuthError::HeaderMalformed(
            "Authorization header must be bearer token.",
        ));
    }

    Ok(token)
}

/// Verifies access tokens issued by the configured identity provider.
pub struct TokenVerifier {
    keys: Arc<dyn KeyStore>,
    validation: Validation,
}

impl TokenVerifier {
    pub fn new(settings: &AuthSettings, keys: Arc<dyn KeyStore>) -> Self {
        let mut validation = Validation::default();
        validation.algorithms = settings.algorithms.clone();
        validation.set_issuer(&[&settings.issuer]);
        validation.set_audience(&[&settings.audience]);
        validation.set_required_spec_claims(&["exp", "iss", "aud"]);
        validation.validate_exp = true;

        Self { keys, validation }
    }

    /// Checks signature, expiry, issuer and audience, and returns the claims.
    pub async fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        let header = decode_header(token)?;
        let kid = header
            .kid
            .ok_or_else(|| AuthError::malformed("token header has no kid"))?;
        if !self.validation.algorithms.contains(&header.alg) {
            return Err(AuthError::malformed(format!(
                "algorithm {:?} is not accepted",
                header.alg
            )));
        }

        // the key family must match every listed algorithm, so check only the one in use
        let mut validation = self.validation.clone();
        validation.algorithms = vec![header.alg];

        let key = self.keys.decoding_key(&kid).await?;
        let data = decode::<Claims>(token, &key, &validation)?;

        debug!(kid = %kid, sub = ?data.claims.sub, "Verified access token");

        Ok(data.claims)
    }

    /// Reads the bearer token from request headers and verifies it.
    pub async fn verify_headers(&self, headers: &HeaderMap) -> Result<Claims, AuthError> {
        self.verify(bearer_token(headers)?).await
    }
}
