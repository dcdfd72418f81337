//! Bearer-token authentication and permission checks.
//!
//! Tokens are minted by an external identity provider; this module only
//! verifies them against the provider's published key set and checks the
//! `permissions` claim against what each route requires.

mod claims;
mod error;
mod gate;
mod jwks;
mod verifier;

pub use claims::{Audience, Claims};
pub use error::AuthError;
pub use gate::{PermissionGate, permissions, require_permission};
pub use jwks::{Jwk, JwkSet, JwksCache, KeyStore, StaticKeys};
pub use verifier::{TokenVerifier, bearer_token};
