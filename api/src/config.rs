//! Process configuration.
//!
//! Values come from the environment; `dotenvy` loads an optional `.env` file
//! first so local runs can keep their settings next to the binary.
//!
//! | Variable            | Default                                  |
//! |---------------------|------------------------------------------|
//! | `DATABASE_URL`      | required                                 |
//! | `HOST` / `PORT`     | `0.0.0.0` / `8080`                       |
//! | `AUTH0_DOMAIN`      | derives issuer and JWKS url              |
//! | `AUTH_ISSUER`       | `https://<AUTH0_DOMAIN>/`                |
//! | `JWKS_URL`          | `<issuer>.well-known/jwks.json`          |
//! | `API_AUDIENCE`      | required                                 |
//! | `JWT_ALGORITHMS`    | `RS256`                                  |
//! | `JWKS_REFRESH_SECS` | `3600`                                   |

use std::str::FromStr;
use std::time::Duration;

use jsonwebtoken::Algorithm;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_JWKS_REFRESH_SECS: u64 = 3600;

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ConfigError {
    #[error("{0} is not set")]
    Missing(&'static str),

    #[error("{var} is invalid: {reason}")]
    Invalid { var: &'static str, reason: String },
}

/// Everything the Token Verifier needs to accept a token.
#[derive(Clone, Debug, PartialEq)]
pub struct AuthSettings {
    /// Expected `iss` claim
    pub issuer: String,
    /// Expected `aud` claim
    pub audience: String,
    /// Where the identity provider publishes its signing keys
    pub jwks_url: String,
    /// Accepted header `alg` values
    pub algorithms: Vec<Algorithm>,
    /// How long a fetched key set is trusted before it is fetched again
    pub jwks_refresh: Duration,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub auth: AuthSettings,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Builds the configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let database_url = var("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?;
        let host = var("HOST").unwrap_or_else(|| DEFAULT_HOST.to_owned());
        let port = match var("PORT") {
            Some(port) => port.parse().map_err(|e| ConfigError::Invalid {
                var: "PORT",
                reason: format!("{e}"),
            })?,
            None => DEFAULT_PORT,
        };

        let issuer = match (var("AUTH_ISSUER"), var("AUTH0_DOMAIN")) {
            (Some(issuer), _) => issuer,
            (None, Some(domain)) => format!("https://{}/", domain.trim_end_matches('/')),
            (None, None) => return Err(ConfigError::Missing("AUTH0_DOMAIN")),
        };
        let jwks_url = var("JWKS_URL").unwrap_or_else(|| {
            format!("{}/.well-known/jwks.json", issuer.trim_end_matches('/'))
        });
        let audience = var("API_AUDIENCE").ok_or(ConfigError::Missing("API_AUDIENCE"))?;

        let algorithms = match var("JWT_ALGORITHMS") {
            Some(list) => parse_algorithms(&list)?,
            None => vec![Algorithm::RS256],
        };
        let jwks_refresh = match var("JWKS_REFRESH_SECS") {
            Some(secs) => Duration::from_secs(secs.parse().map_err(|e| ConfigError::Invalid {
                var: "JWKS_REFRESH_SECS",
                reason: format!("{e}"),
            })?),
            None => Duration::from_secs(DEFAULT_JWKS_REFRESH_SECS),
        };

        Ok(Self {
            database_url,
            host,
            port,
            auth: AuthSettings {
                issuer,
                audience,
                jwks_url,
                algorithms,
                jwks_refresh,
            },
        })
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_algorithms(list: &str) -> Result<Vec<Algorithm>, ConfigError> {
    let algorithms = list
        .split(',')
        .map(str::trim)
        .filter(|alg| !alg.is_empty())
        .map(|alg| {
            Algorithm::from_str(alg).map_err(|_| ConfigError::Invalid {
                var: "JWT_ALGORITHMS",
                reason: format!("unknown algorithm {alg}"),
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    if algorithms.is_empty() {
        return Err(ConfigError::Invalid {
            var: "JWT_ALGORITHMS",
            reason: "no algorithm listed".to_owned(),
        });
    }
    if algorithms
        .iter()
        .any(|alg| matches!(alg, Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512))
    {
        return Err(ConfigError::Invalid {
            var: "JWT_ALGORITHMS",
            reason: "only public-key algorithms can be verified against a key set".to_owned(),
        });
    }

    Ok(algorithms)
}
