//! HS256 JWT implementation of the `IdentityResolver` port.

use async_trait::async_trait;
use domains::{AppError, CallerId, IdentityResolver, Result};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Claims embedded in every access token. `sub` carries the caller id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    /// Expiration time (UTC Unix timestamp).
    pub exp: i64,
    /// Issued-at time (UTC Unix timestamp).
    pub iat: i64,
}

/// Resolves `Bearer` credentials signed with a shared HS256 secret.
pub struct JwtIdentityResolver {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl JwtIdentityResolver {
    pub fn new(secret: &[u8]) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation: Validation::default(), // HS256, validates exp
        }
    }

    /// Mints a token for `caller` valid for `ttl`. Token issuance proper is
    /// an external concern; this helper backs the seed tool and tests.
    pub fn mint(&self, caller: CallerId, ttl: chrono::Duration) -> Result<String> {
        let now = chrono::Utc::now().timestamp();
        let claims = Claims {
            sub: caller,
            exp: now + ttl.num_seconds(),
            iat: now,
        };
        encode(&Header::default(), &claims, &self.encoding)
            .map_err(|e| AppError::Internal(format!("token encoding failed: {e}")))
    }
}

#[async_trait]
impl IdentityResolver for JwtIdentityResolver {
    async fn resolve(&self, credential: &str) -> Result<CallerId> {
        let data = decode::<Claims>(credential, &self.decoding, &self.validation)
            .map_err(|_| AppError::Unauthorized("invalid or expired token".into()))?;
        Ok(data.claims.sub)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn mint_then_resolve_round_trip() {
        let resolver = JwtIdentityResolver::new(b"test-secret-that-is-long-enough");
        let caller = Uuid::now_v7();
        let token = resolver.mint(caller, chrono::Duration::minutes(15)).unwrap();
        assert_eq!(resolver.resolve(&token).await.unwrap(), caller);
    }

    #[tokio::test]
    async fn expired_token_is_unauthorized() {
        let resolver = JwtIdentityResolver::new(b"test-secret-that-is-long-enough");
        // Expired well past the default 60-second leeway.
        let token = resolver
            .mint(Uuid::now_v7(), chrono::Duration::minutes(-10))
            .unwrap();
        let err = resolver.resolve(&token).await.unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(_)));
    }

    #[tokio::test]
    async fn wrong_secret_is_unauthorized() {
        let minting = JwtIdentityResolver::new(b"secret-alpha");
        let verifying = JwtIdentityResolver::new(b"secret-bravo");
        let token = minting
            .mint(Uuid::now_v7(), chrono::Duration::minutes(15))
            .unwrap();
        assert!(verifying.resolve(&token).await.is_err());
    }

    #[tokio::test]
    async fn garbage_credential_is_unauthorized() {
        let resolver = JwtIdentityResolver::new(b"test-secret-that-is-long-enough");
        assert!(resolver.resolve("not-a-jwt").await.is_err());
    }
}
