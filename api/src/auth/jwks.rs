//! Signing keys published by the identity provider.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use jsonwebtoken::DecodingKey;
use serde::Deserialize;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use super::AuthError;

/// Lower bound between two fetches triggered by an unknown `kid`.
const MIN_REFRESH_INTERVAL: Duration = Duration::from_secs(60);

const FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Supplies the public key a token names in its `kid` header.
#[async_trait]
pub trait KeyStore: Send + Sync {
    async fn decoding_key(&self, kid: &str) -> Result<DecodingKey, AuthError>;
}

/// A JSON Web Key
#[derive(Debug, Clone, Deserialize)]
pub struct Jwk {
    /// Key type (e.g., "RSA", "EC")
    pub kty: String,

    /// Key ID
    #[serde(default)]
    pub kid: Option<String>,

    /// Algorithm (e.g., "RS256", "ES256")
    #[serde(default)]
    pub alg: Option<String>,

    /// Public key use (e.g., "sig")
    #[serde(default, rename = "use")]
    pub use_: Option<String>,

    /// RSA modulus (base64url)
    #[serde(default)]
    pub n: Option<String>,

    /// RSA public exponent (base64url)
    #[serde(default)]
    pub e: Option<String>,

    /// EC curve name (e.g., "P-256")
    #[serde(default)]
    pub crv: Option<String>,

    /// EC x coordinate (base64url)
    #[serde(default)]
    pub x: Option<String>,

    /// EC y coordinate (base64url)
    #[serde(default)]
    pub y: Option<String>,
}

impl Jwk {
    pub fn is_signing_key(&self) -> bool {
        self.use_.as_deref() != Some("enc")
    }

    /// Converts the key, or returns `None` for key types that cannot verify
    /// a token.
    fn to_decoding_key(&self) -> Result<Option<DecodingKey>, AuthError> {
        match (self.kty.as_str(), self) {
            (
                "RSA",
                Jwk {
                    n: Some(n),
                    e: Some(e),
                    ..
                },
            ) => DecodingKey::from_rsa_components(n, e)
                .map(Some)
                .map_err(|e| AuthError::KeySetUnavailable(format!("invalid RSA key: {e}"))),
            (
                "EC",
                Jwk {
                    crv: Some(crv),
                    x: Some(x),
                    y: Some(y),
                    ..
                },
            ) => match crv.as_str() {
                "P-256" | "P-384" => DecodingKey::from_ec_components(x, y)
                    .map(Some)
                    .map_err(|e| AuthError::KeySetUnavailable(format!("invalid EC key: {e}"))),
                _ => {
                    warn!(crv = %crv, "Unsupported EC curve");
                    Ok(None)
                }
            },
            (kty, _) => {
                warn!(kty = %kty, kid = ?self.kid, "Unsupported or incomplete key");
                Ok(None)
            }
        }
    }
}

/// JSON Web Key Set
#[derive(Debug, Clone, Deserialize)]
pub struct JwkSet {
    pub keys: Vec<Jwk>,
}

impl JwkSet {
    /// Usable signing keys indexed by `kid`. Keys without a `kid` cannot be
    /// selected by a token header and are skipped.
    fn decoding_keys(&self) -> Result<HashMap<String, DecodingKey>, AuthError> {
        let mut keys = HashMap::new();
        for jwk in self.keys.iter().filter(|k| k.is_signing_key()) {
            let Some(kid) = &jwk.kid else {
                continue;
            };
            if let Some(key) = jwk.to_decoding_key()? {
                keys.insert(kid.clone(), key);
            }
        }
        Ok(keys)
    }
}

/// A fixed key set, for tests and for deployments that pin their keys.
#[derive(Clone)]
pub struct StaticKeys {
    keys: HashMap<String, DecodingKey>,
}

impl StaticKeys {
    pub fn new(set: &JwkSet) -> Result<Self, AuthError> {
        Ok(Self {
            keys: set.decoding_keys()?,
        })
    }

    pub fn from_jwks_json(json: &str) -> Result<Self, AuthError> {
        let set: JwkSet = serde_json::from_str(json)
            .map_err(|e| AuthError::KeySetUnavailable(format!("invalid JWKS: {e}")))?;
        Self::new(&set)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

#[async_trait]
impl KeyStore for StaticKeys {
    async fn decoding_key(&self, kid: &str) -> Result<DecodingKey, AuthError> {
        self.keys
            .get(kid)
            .cloned()
            .ok_or_else(|| AuthError::KeyNotFound {
                kid: kid.to_owned(),
            })
    }
}

struct CachedKeys {
    keys: HashMap<String, DecodingKey>,
    fetched_at: Instant,
}

#[derive(Default)]
struct CacheState {
    cached: Option<CachedKeys>,
    last_failure: Option<Instant>,
}

impl CacheState {
    fn fresh_key(&self, kid: &str, refresh_interval: Duration) -> Option<DecodingKey> {
        self.cached
            .as_ref()
            .filter(|c| c.fetched_at.elapsed() < refresh_interval)
            .and_then(|c| c.keys.get(kid))
            .cloned()
    }

    fn needs_refresh(&self, kid: &str, refresh_interval: Duration) -> bool {
        if self
            .last_failure
            .is_some_and(|at| at.elapsed() < MIN_REFRESH_INTERVAL)
        {
            return false;
        }
        match &self.cached {
            None => true,
            Some(c) if c.fetched_at.elapsed() >= refresh_interval => true,
            Some(c) => !c.keys.contains_key(kid) && c.fetched_at.elapsed() >= MIN_REFRESH_INTERVAL,
        }
    }
}

/// Key set fetched from the provider's JWKS endpoint and refreshed on expiry.
///
/// A token naming a `kid` the cache has never seen triggers an early fetch,
/// which picks up rotated keys. If a fetch fails while older keys are cached,
/// those keys keep serving, and no new fetch is tried for a minute.
/// Only one request fetches at a time.
pub struct JwksCache {
    url: String,
    refresh_interval: Duration,
    client: reqwest::Client,
    state: RwLock<CacheState>,
}

impl JwksCache {
    pub fn new(url: impl Into<String>, refresh_interval: Duration) -> Result<Self, AuthError> {
        let client = reqwest::Client::builder()
            .timeout(FETCH_TIMEOUT)
            .build()
            .map_err(|e| AuthError::KeySetUnavailable(format!("http client: {e}")))?;

        Ok(Self::with_client(url, refresh_interval, client))
    }

    pub fn with_client(
        url: impl Into<String>,
        refresh_interval: Duration,
        client: reqwest::Client,
    ) -> Self {
        Self {
            url: url.into(),
            refresh_interval,
            client,
            state: RwLock::new(CacheState::default()),
        }
    }

    /// Fetches the key set now, replacing whatever is cached.
    pub async fn refresh(&self) -> Result<usize, AuthError> {
        let mut state = self.state.write().await;
        self.refresh_locked(&mut state).await
    }

    async fn refresh_locked(&self, state: &mut CacheState) -> Result<usize, AuthError> {
        match self.fetch().await {
            Ok(keys) => {
                let count = keys.len();
                info!(jwks_url = %self.url, key_count = count, "JWKS fetched");
                state.cached = Some(CachedKeys {
                    keys,
                    fetched_at: Instant::now(),
                });
                state.last_failure = None;
                Ok(count)
            }
            Err(e) => {
                state.last_failure = Some(Instant::now());
                Err(e)
            }
        }
    }

    async fn fetch(&self) -> Result<HashMap<String, DecodingKey>, AuthError> {
        debug!(jwks_url = %self.url, "Fetching JWKS");

        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| AuthError::KeySetUnavailable(format!("{}: {e}", self.url)))?;
        let set: JwkSet = response
            .json()
            .await
            .map_err(|e| AuthError::KeySetUnavailable(format!("{}: invalid JWKS: {e}", self.url)))?;

        set.decoding_keys()
    }
}

#[async_trait]
impl KeyStore for JwksCache {
    async fn decoding_key(&self, kid: &str) -> Result<DecodingKey, AuthError> {
        if let Some(key) = self.state.read().await.fresh_key(kid, self.refresh_interval) {
            return Ok(key);
        }

        let mut state = self.state.write().await;
        // another request may have refreshed while this one waited for the lock
        if let Some(key) = state.fresh_key(kid, self.refresh_interval) {
            return Ok(key);
        }

        if state.needs_refresh(kid, self.refresh_interval) {
            if let Err(e) = self.refresh_locked(&mut state).await {
                if state.cached.is_none() {
                    return Err(e);
                }
                warn!(jwks_url = %self.url, error = %e, "JWKS fetch failed, using cached keys");
            }
        } else if state.cached.is_none() {
            return Err(AuthError::KeySetUnavailable(format!(
                "{}: last fetch failed, retrying later",
                self.url
            )));
        }

        state
            .cached
            .as_ref()
            .and_then(|c| c.keys.get(kid))
            .cloned()
            .ok_or_else(|| AuthError::KeyNotFound {
                kid: kid.to_owned(),
            })
    }
}
