//! Credential collaborator: registration, login, token refresh, and the
//! claims verification the extractor runs on every authenticated route.
//! Access and refresh tokens are HMAC-signed JWTs carrying `{userId, role}`;
//! the refresh token is persisted on the user and mirrored in a cookie.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use log::warn;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::db::UserStore;
use crate::error::ApiError;
use crate::models::{RegisterBody, Role, User};

/// Cookie carrying the refresh token.
pub const REFRESH_COOKIE: &str = "refreshToken";

const REFRESH_TTL_DAYS: i64 = 7;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    #[serde(rename = "userId")]
    pub user_id: Uuid,
    pub role: Role,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserStore>,
    jwt_secret: String,
    refresh_secret: String,
    access_ttl_secs: i64,
}

impl AuthService {
    pub fn new(
        users: Arc<dyn UserStore>,
        jwt_secret: String,
        refresh_secret: Option<String>,
        access_ttl_secs: i64,
    ) -> Self {
        let refresh_secret = refresh_secret.unwrap_or_else(|| jwt_secret.clone());
        Self {
            users,
            jwt_secret,
            refresh_secret,
            access_ttl_secs,
        }
    }

    pub async fn register(&self, body: RegisterBody) -> Result<User, ApiError> {
        let name = body.name.trim().to_string();
        if name.is_empty() {
            return Err(ApiError::Validation("Name is required".to_string()));
        }
        let email = body.email.trim().to_lowercase();
        if email.is_empty() || !email.contains('@') {
            return Err(ApiError::Validation(
                "Please enter a valid email address".to_string(),
            ));
        }
        if body.password.len() < 6 {
            return Err(ApiError::Validation(
                "Password must be at least 6 characters long".to_string(),
            ));
        }
        let role = match body.role.as_deref() {
            None => Role::User,
            Some(raw) => Role::parse(raw).ok_or_else(|| {
                ApiError::Validation("Invalid role. Use \"user\" or \"admin\"".to_string())
            })?,
        };

        if self.users.find_by_email(&email).await?.is_some() {
            return Err(ApiError::Validation("Email already exists".to_string()));
        }

        let user = User {
            id: Uuid::new_v4(),
            name,
            email,
            password_hash: hash_password(&body.password)?,
            role,
            refresh_token: None,
            created_at: Utc::now(),
        };
        self.users.insert(&user).await?;
        Ok(user)
    }

    /// Verify credentials, issue both tokens, and persist the refresh
    /// token. The same message covers unknown email and bad password.
    pub async fn login(
        &self,
        email: &str,
        password: &str,
    ) -> Result<(User, String, String), ApiError> {
        let email = email.trim().to_lowercase();
        let user = self
            .users
            .find_by_email(&email)
            .await?
            .ok_or_else(invalid_credentials)?;
        if !verify_password(password, &user.password_hash)? {
            return Err(invalid_credentials());
        }

        let access = self.issue_access_token(&user)?;
        let refresh = self.issue_refresh_token(&user)?;
        self.users.set_refresh_token(user.id, Some(&refresh)).await?;
        Ok((user, access, refresh))
    }

    /// Exchange a refresh token for a fresh access token. The presented
    /// token must verify *and* match the one stored on the user.
    pub async fn refresh(&self, refresh_token: &str) -> Result<(User, String), ApiError> {
        let claims = self
            .verify_refresh_token(refresh_token)
            .ok_or_else(|| ApiError::Forbidden("Invalid or expired refresh token".to_string()))?;
        let user = self
            .users
            .find_by_id(claims.user_id)
            .await?
            .filter(|user| user.refresh_token.as_deref() == Some(refresh_token))
            .ok_or_else(|| ApiError::Forbidden("Invalid refresh token".to_string()))?;
        let access = self.issue_access_token(&user)?;
        Ok((user, access))
    }

    pub async fn logout(&self, user_id: Uuid) -> Result<(), ApiError> {
        self.users.set_refresh_token(user_id, None).await?;
        Ok(())
    }

    /// Resolve verified claims to a live account; deleted users fail auth.
    pub async fn lookup(&self, user_id: Uuid) -> Result<User, ApiError> {
        self.users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| ApiError::Auth("User not found".to_string()))
    }

    pub fn issue_access_token(&self, user: &User) -> Result<String, ApiError> {
        self.sign(user, &self.jwt_secret, Duration::seconds(self.access_ttl_secs))
    }

    pub fn issue_refresh_token(&self, user: &User) -> Result<String, ApiError> {
        self.sign(user, &self.refresh_secret, Duration::days(REFRESH_TTL_DAYS))
    }

    pub fn verify_access_token(&self, token: &str) -> Option<Claims> {
        verify(token, &self.jwt_secret)
    }

    pub fn verify_refresh_token(&self, token: &str) -> Option<Claims> {
        verify(token, &self.refresh_secret)
    }

    fn sign(&self, user: &User, secret: &str, ttl: Duration) -> Result<String, ApiError> {
        let now = Utc::now();
        let claims = Claims {
            user_id: user.id,
            role: user.role,
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .map_err(|err| ApiError::Internal(format!("token signing failed: {err}")))
    }
}

fn verify(token: &str, secret: &str) -> Option<Claims> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|err| warn!("token rejected: {err}"))
    .ok()
}

fn invalid_credentials() -> ApiError {
    ApiError::Auth("Invalid email or password".to_string())
}

fn hash_password(password: &str) -> Result<String, ApiError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|err| ApiError::Internal(format!("password hashing failed: {err}")))
}

fn verify_password(password: &str, hash: &str) -> Result<bool, ApiError> {
    let parsed = PasswordHash::new(hash)
        .map_err(|_| ApiError::Internal("stored password hash is invalid".to_string()))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryUserStore;

    fn service() -> AuthService {
        AuthService::new(
            Arc::new(MemoryUserStore::new()),
            "access-secret".to_string(),
            Some("refresh-secret".to_string()),
            900,
        )
    }

    fn register_body(email: &str) -> RegisterBody {
        RegisterBody {
            name: "Test User".to_string(),
            email: email.to_string(),
            password: "hunter22".to_string(),
            role: Some("admin".to_string()),
        }
    }

    #[tokio::test]
    async fn register_rejects_duplicate_email() {
        let auth = service();
        auth.register(register_body("dup@example.com")).await.unwrap();
        let err = auth
            .register(register_body("dup@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Validation(msg) if msg == "Email already exists"));
    }

    #[tokio::test]
    async fn login_round_trips_and_tokens_verify_with_their_own_secret() {
        let auth = service();
        auth.register(register_body("admin@example.com")).await.unwrap();
        let (user, access, refresh) = auth.login("Admin@Example.com", "hunter22").await.unwrap();
        assert_eq!(user.role, Role::Admin);

        let claims = auth.verify_access_token(&access).unwrap();
        assert_eq!(claims.user_id, user.id);
        assert_eq!(claims.role, Role::Admin);

        // the two token kinds are not interchangeable
        assert!(auth.verify_access_token(&refresh).is_none());
        assert!(auth.verify_refresh_token(&access).is_none());
    }

    #[tokio::test]
    async fn login_rejects_wrong_password() {
        let auth = service();
        auth.register(register_body("user@example.com")).await.unwrap();
        let err = auth
            .login("user@example.com", "wrong-pass")
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Auth(msg) if msg == "Invalid email or password"));
    }

    #[tokio::test]
    async fn refresh_requires_the_stored_token() {
        let auth = service();
        let user = auth.register(register_body("r@example.com")).await.unwrap();
        let (_, _, refresh) = auth.login("r@example.com", "hunter22").await.unwrap();

        let (_, new_access) = auth.refresh(&refresh).await.unwrap();
        assert!(auth.verify_access_token(&new_access).is_some());

        // after logout no stored token remains, so even a verifiable
        // refresh token is rejected
        let stale = auth.issue_refresh_token(&user).unwrap();
        auth.logout(user.id).await.unwrap();
        let err = auth.refresh(&stale).await.unwrap_err();
        assert!(matches!(err, ApiError::Forbidden(_)));
    }
}
