//! Authentication service.
//!
//! Issues and verifies short-lived access tokens (JWT) and opaque
//! long-lived refresh tokens. The phone number is the login key,
//! normalized before every comparison.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation};
use koinonia_common::config::AuthConfig;
use koinonia_common::{AppError, AppResult, IdGenerator, normalize_phone};
use koinonia_db::{
    entities::{refresh_token, user},
    repositories::{RefreshTokenRepository, UserRepository},
};
use once_cell::sync::Lazy;
use regex::Regex;
use sea_orm::Set;
use serde::{Deserialize, Serialize};

/// Exact shape of a refresh token; anything else is rejected before any
/// database lookup.
#[allow(clippy::expect_used)]
static REFRESH_TOKEN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new("^[0-9a-fA-F]{64}$").expect("literal regex is valid"));

/// Access-token claims.
///
/// `role` is the legacy single-role label carried for older clients;
/// authorization decisions go through the authority resolution service,
/// never through this field.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User id.
    pub sub: String,
    /// Legacy role label.
    #[serde(default)]
    pub role: String,
    /// Issued-at (seconds since epoch).
    pub iat: i64,
    /// Expiry (seconds since epoch).
    pub exp: i64,
}

/// Issued credential pair.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// Authentication service.
#[derive(Clone)]
pub struct AuthService {
    user_repo: UserRepository,
    refresh_repo: RefreshTokenRepository,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    access_token_ttl: Duration,
    refresh_token_ttl: Duration,
    id_gen: IdGenerator,
}

impl AuthService {
    /// Create a new authentication service.
    #[must_use]
    pub fn new(
        user_repo: UserRepository,
        refresh_repo: RefreshTokenRepository,
        config: &AuthConfig,
    ) -> Self {
        Self {
            user_repo,
            refresh_repo,
            encoding_key: EncodingKey::from_secret(config.jwt_secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            access_token_ttl: Duration::seconds(config.access_token_ttl_secs),
            refresh_token_ttl: Duration::days(config.refresh_token_ttl_days),
            id_gen: IdGenerator::new(),
        }
    }

    /// Authenticate by phone and password, issuing a credential pair.
    pub async fn login(&self, phone: &str, password: &str) -> AppResult<(user::Model, TokenPair)> {
        let normalized = normalize_phone(phone);
        let user = self
            .user_repo
            .find_by_phone(&normalized)
            .await?
            .ok_or(AppError::Unauthorized)?;

        if !verify_password(password, &user.password)? {
            return Err(AppError::Unauthorized);
        }

        let pair = self.issue_pair(&user).await?;
        Ok((user, pair))
    }

    /// Exchange a refresh token for a fresh credential pair (rotation).
    pub async fn refresh(&self, token: &str) -> AppResult<(user::Model, TokenPair)> {
        if !REFRESH_TOKEN_RE.is_match(token) {
            return Err(AppError::Unauthorized);
        }

        let stored = self
            .refresh_repo
            .find_valid(token)
            .await?
            .ok_or(AppError::Unauthorized)?;

        let user = self.user_repo.get_by_id(&stored.user_id).await?;

        // Rotate: the presented token dies with this exchange
        self.refresh_repo.delete(token).await?;
        let pair = self.issue_pair(&user).await?;
        Ok((user, pair))
    }

    /// Invalidate a refresh token.
    pub async fn logout(&self, token: &str) -> AppResult<()> {
        if !REFRESH_TOKEN_RE.is_match(token) {
            return Err(AppError::Unauthorized);
        }
        self.refresh_repo.delete(token).await
    }

    /// Invalidate every refresh token a user holds.
    pub async fn logout_everywhere(&self, user_id: &str) -> AppResult<u64> {
        self.refresh_repo.delete_all_for_user(user_id).await
    }

    /// Verify an access token, returning its claims.
    ///
    /// Expired, malformed, and badly-signed tokens all map to
    /// [`AppError::Unauthorized`].
    pub fn verify_access_token(&self, token: &str) -> AppResult<Claims> {
        jsonwebtoken::decode::<Claims>(token, &self.decoding_key, &Validation::default())
            .map(|data| data.claims)
            .map_err(|_| AppError::Unauthorized)
    }

    /// Issue an access token for a user.
    pub fn issue_access_token(&self, user: &user::Model) -> AppResult<String> {
        let now = Utc::now();
        let claims = Claims {
            sub: user.id.clone(),
            role: user.authority.clone().unwrap_or_default(),
            iat: now.timestamp(),
            exp: (now + self.access_token_ttl).timestamp(),
        };

        jsonwebtoken::encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AppError::Internal(format!("Failed to sign token: {e}")))
    }

    async fn issue_pair(&self, user: &user::Model) -> AppResult<TokenPair> {
        let access_token = self.issue_access_token(user)?;
        let refresh = self.id_gen.generate_refresh_token();

        let model = refresh_token::ActiveModel {
            token: Set(refresh.clone()),
            user_id: Set(user.id.clone()),
            expires_at: Set((Utc::now() + self.refresh_token_ttl).into()),
            created_at: Set(Utc::now().into()),
        };
        self.refresh_repo.create(model).await?;

        Ok(TokenPair {
            access_token,
            refresh_token: refresh,
        })
    }
}

/// Hash a password with argon2.
pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {e}")))
}

/// Verify a password against its stored hash.
pub fn verify_password(password: &str, hash: &str) -> AppResult<bool> {
    let parsed =
        PasswordHash::new(hash).map_err(|e| AppError::Internal(format!("Invalid hash: {e}")))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::sync::Arc;

    fn test_service() -> AuthService {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres).into_connection(),
        );
        AuthService::new(
            UserRepository::new(Arc::clone(&db)),
            RefreshTokenRepository::new(db),
            &AuthConfig {
                jwt_secret: "test-secret-for-unit-tests-only".to_string(),
                access_token_ttl_secs: 3600,
                refresh_token_ttl_days: 30,
            },
        )
    }

    fn test_user() -> user::Model {
        user::Model {
            id: "usr1".to_string(),
            phone: "01012345678".to_string(),
            password: "$argon2id$stub".to_string(),
            name: "김하늘".to_string(),
            email: None,
            birthday: None,
            gender: None,
            school: None,
            grade: None,
            branch_id: None,
            region_id: None,
            group_id: None,
            push_token: None,
            authority: Some("리더".to_string()),
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    #[test]
    fn test_password_hash_roundtrip() {
        let hash = hash_password("correct horse").unwrap();
        assert!(verify_password("correct horse", &hash).unwrap());
        assert!(!verify_password("wrong", &hash).unwrap());
    }

    #[test]
    fn test_access_token_roundtrip() {
        let service = test_service();
        let token = service.issue_access_token(&test_user()).unwrap();

        let claims = service.verify_access_token(&token).unwrap();
        assert_eq!(claims.sub, "usr1");
        assert_eq!(claims.role, "리더");
    }

    #[test]
    fn test_garbage_access_token_is_unauthorized() {
        let service = test_service();
        let result = service.verify_access_token("not.a.jwt");
        assert!(matches!(result, Err(AppError::Unauthorized)));
    }

    #[tokio::test]
    async fn test_refresh_rejects_malformed_shape_before_lookup() {
        // Mock DB has no prepared results; a lookup would error, so an
        // Unauthorized here proves the shape gate ran first.
        let service = test_service();

        for bad in ["", "abc", &"g".repeat(64), &"a".repeat(63)] {
            let result = service.refresh(bad).await;
            assert!(matches!(result, Err(AppError::Unauthorized)));
        }
    }

    #[test]
    fn test_refresh_token_shape_accepts_64_hex() {
        assert!(REFRESH_TOKEN_RE.is_match(&"a1".repeat(32)));
        assert!(REFRESH_TOKEN_RE.is_match(&"F0".repeat(32)));
    }
}
