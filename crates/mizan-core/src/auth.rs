use anyhow::{Context, Result};
use async_trait::async_trait;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::error::{AssessError, AssessResult};
use crate::types::{CallerIdentity, Role};

/// Resolves the caller behind an `Authorization` header.
#[async_trait]
pub trait Authenticator: Send + Sync {
    async fn authenticate(&self, authorization: Option<&str>) -> AssessResult<CallerIdentity>;
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: i64,
    #[serde(default)]
    pub role: Role,
}

/// Verifies HS256 tokens minted by the auth backend with a shared secret.
pub struct JwtAuthenticator {
    key: DecodingKey,
    validation: Validation,
}

impl JwtAuthenticator {
    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_required_spec_claims(&["exp", "sub"]);
        Self {
            key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    pub fn verify(&self, token: &str) -> AssessResult<CallerIdentity> {
        let data = decode::<Claims>(token, &self.key, &self.validation).map_err(|e| {
            tracing::debug!("rejected bearer token: {e}");
            AssessError::Authentication
        })?;
        if data.claims.sub.trim().is_empty() {
            return Err(AssessError::Authentication);
        }
        Ok(CallerIdentity {
            user_id: data.claims.sub,
            role: data.claims.role,
        })
    }
}

#[async_trait]
impl Authenticator for JwtAuthenticator {
    async fn authenticate(&self, authorization: Option<&str>) -> AssessResult<CallerIdentity> {
        let token = bearer_token(authorization).ok_or(AssessError::Authentication)?;
        self.verify(token)
    }
}

/// Extract the token from `Bearer <token>`. Scheme match is case-insensitive.
pub fn bearer_token(header: Option<&str>) -> Option<&str> {
    let (scheme, token) = header?.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

/// Mint a token. Used by tests and local tooling; production tokens come
/// from the managed auth backend.
pub fn issue_token(secret: &str, user_id: &str, role: Role, ttl_secs: i64) -> Result<String> {
    let claims = Claims {
        sub: user_id.to_string(),
        exp: chrono::Utc::now().timestamp() + ttl_secs,
        role,
    };
    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .context("failed to encode token")
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret";

    #[tokio::test]
    async fn valid_token_resolves_identity() {
        let auth = JwtAuthenticator::new(SECRET);
        let token = issue_token(SECRET, "user-42", Role::Admin, 3600).unwrap();
        let header = format!("Bearer {token}");
        let caller = auth.authenticate(Some(&header)).await.unwrap();
        assert_eq!(caller.user_id, "user-42");
        assert!(caller.is_admin());
    }

    #[tokio::test]
    async fn missing_role_defaults_to_user() {
        #[derive(Serialize)]
        struct Bare {
            sub: String,
            exp: i64,
        }
        let token = encode(
            &Header::new(Algorithm::HS256),
            &Bare {
                sub: "u".into(),
                exp: chrono::Utc::now().timestamp() + 60,
            },
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();
        let caller = JwtAuthenticator::new(SECRET).verify(&token).unwrap();
        assert_eq!(caller.role, Role::User);
    }

    #[tokio::test]
    async fn rejects_wrong_secret() {
        let token = issue_token("other", "user-42", Role::User, 3600).unwrap();
        let header = format!("Bearer {token}");
        let err = JwtAuthenticator::new(SECRET)
            .authenticate(Some(&header))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Authentication required");
    }

    #[tokio::test]
    async fn rejects_expired_token() {
        let token = issue_token(SECRET, "user-42", Role::User, -3600).unwrap();
        let header = format!("Bearer {token}");
        assert!(matches!(
            JwtAuthenticator::new(SECRET).authenticate(Some(&header)).await,
            Err(AssessError::Authentication)
        ));
    }

    #[tokio::test]
    async fn rejects_missing_header_and_other_schemes() {
        let auth = JwtAuthenticator::new(SECRET);
        assert!(auth.authenticate(None).await.is_err());
        assert!(auth.authenticate(Some("Basic dXNlcjpwYXNz")).await.is_err());
        assert!(auth.authenticate(Some("Bearer ")).await.is_err());
    }

    #[test]
    fn bearer_scheme_is_case_insensitive() {
        assert_eq!(bearer_token(Some("bearer abc")), Some("abc"));
        assert_eq!(bearer_token(Some("BEARER  abc ")), Some("abc"));
        assert_eq!(bearer_token(Some("abc")), None);
    }
}
