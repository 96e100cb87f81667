//! Authentication service.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use regfeed_common::config::AuthConfig;
use regfeed_common::{AppError, AppResult, parse_duration};
use regfeed_db::entities::admin::{self, AdminRole};
use regfeed_db::repositories::AdminRepository;
use serde::{Deserialize, Serialize};

use crate::identity::RequestAdmin;
use crate::services::log::{LogService, actions};

const INVALID_CREDENTIALS: &str = "Invalid credentials";
const INVALID_REFRESH_TOKEN: &str = "Invalid refresh token";

/// Claims carried by both access and refresh credentials.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the admin id.
    pub sub: String,
    /// Login email.
    pub email: String,
    /// Role at issue time.
    pub role: AdminRole,
    /// Full display name.
    pub fullname: String,
    /// Assigned region ids at issue time.
    #[serde(rename = "allowedRegions")]
    pub allowed_regions: Vec<String>,
    /// Issued-at, seconds since epoch.
    pub iat: usize,
    /// Expiry, seconds since epoch.
    pub exp: usize,
}

/// An issued access/refresh credential pair.
#[derive(Debug, Clone)]
pub struct AuthTokens {
    /// Short-lived access credential.
    pub access_token: String,
    /// Longer-lived refresh credential, signed with a distinct secret.
    pub refresh_token: String,
}

/// Validated token-signing configuration.
///
/// Construction parses the lifetime strings; a malformed lifetime is a
/// fatal configuration error, never a per-request one.
#[derive(Clone)]
pub struct TokenConfig {
    access_secret: String,
    refresh_secret: String,
    access_ttl: chrono::Duration,
    refresh_ttl: chrono::Duration,
}

impl TokenConfig {
    /// Build from the application auth configuration.
    pub fn from_config(auth: &AuthConfig) -> AppResult<Self> {
        Ok(Self {
            access_secret: auth.access_secret.clone(),
            refresh_secret: auth.refresh_secret.clone(),
            access_ttl: parse_duration(&auth.access_expires, "auth.access_expires")?,
            refresh_ttl: parse_duration(&auth.refresh_expires, "auth.refresh_expires")?,
        })
    }
}

/// Service for admin authentication and credential issuance.
#[derive(Clone)]
pub struct AuthService {
    admin_repo: AdminRepository,
    log_service: LogService,
    tokens: TokenConfig,
}

impl AuthService {
    /// Create a new auth service.
    #[must_use]
    pub const fn new(
        admin_repo: AdminRepository,
        log_service: LogService,
        tokens: TokenConfig,
    ) -> Self {
        Self {
            admin_repo,
            log_service,
            tokens,
        }
    }

    /// Authenticate an admin by email and password.
    ///
    /// Unknown email and wrong password are indistinguishable to the
    /// caller; both record a failed-login audit entry without delaying the
    /// error response.
    pub async fn login(&self, email: &str, password: &str) -> AppResult<(AuthTokens, admin::Model)> {
        let normalized = email.trim().to_lowercase();

        let Some(admin) = self.admin_repo.find_by_email(&normalized).await? else {
            self.log_service.record_detached(actions::FAILED_LOGIN, None);
            return Err(AppError::Unauthorized(INVALID_CREDENTIALS.to_string()));
        };

        if !verify_password(password, &admin.password_hash)? {
            self.log_service
                .record_detached(actions::FAILED_LOGIN, Some(admin.id.clone()));
            return Err(AppError::Unauthorized(INVALID_CREDENTIALS.to_string()));
        }

        let allowed_regions = self.admin_repo.region_ids_for(&admin.id).await?;
        let tokens = self.issue_tokens(&admin, allowed_regions)?;

        self.log_service.record(actions::LOGIN, Some(&admin.id)).await;

        Ok((tokens, admin))
    }

    /// Reissue a credential pair from a refresh credential.
    ///
    /// Role and assigned regions are re-read from the directory, not
    /// copied from the stale claims, so directory changes take effect on
    /// the next refresh. Every verification failure maps to one uniform
    /// error.
    pub async fn refresh(&self, refresh_token: &str) -> AppResult<(AuthTokens, admin::Model)> {
        let claims = decode::<Claims>(
            refresh_token,
            &DecodingKey::from_secret(self.tokens.refresh_secret.as_bytes()),
            &Validation::default(),
        )
        .map_err(|_| AppError::Unauthorized(INVALID_REFRESH_TOKEN.to_string()))?
        .claims;

        let admin = self
            .admin_repo
            .find_by_email(&claims.email)
            .await?
            .ok_or_else(|| AppError::Unauthorized(INVALID_REFRESH_TOKEN.to_string()))?;

        let allowed_regions = self.admin_repo.region_ids_for(&admin.id).await?;
        let tokens = self.issue_tokens(&admin, allowed_regions)?;

        Ok((tokens, admin))
    }

    /// Decode and verify an access credential into a caller identity.
    pub fn decode_access(&self, token: &str) -> AppResult<RequestAdmin> {
        let claims = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.tokens.access_secret.as_bytes()),
            &Validation::default(),
        )
        .map_err(|_| AppError::Unauthorized("Invalid or expired token".to_string()))?
        .claims;

        Ok(RequestAdmin {
            id: claims.sub,
            email: claims.email,
            role: claims.role,
            fullname: claims.fullname,
            allowed_regions: claims.allowed_regions,
        })
    }

    fn issue_tokens(
        &self,
        admin: &admin::Model,
        allowed_regions: Vec<String>,
    ) -> AppResult<AuthTokens> {
        let now = chrono::Utc::now();

        let claims = |ttl: chrono::Duration| Claims {
            sub: admin.id.clone(),
            email: admin.email.clone(),
            role: admin.role,
            fullname: admin.fullname.clone(),
            allowed_regions: allowed_regions.clone(),
            iat: now.timestamp() as usize,
            exp: (now + ttl).timestamp() as usize,
        };

        let access_token = encode(
            &Header::default(),
            &claims(self.tokens.access_ttl),
            &EncodingKey::from_secret(self.tokens.access_secret.as_bytes()),
        )
        .map_err(|e| AppError::Internal(format!("Failed to sign access token: {e}")))?;

        let refresh_token = encode(
            &Header::default(),
            &claims(self.tokens.refresh_ttl),
            &EncodingKey::from_secret(self.tokens.refresh_secret.as_bytes()),
        )
        .map_err(|e| AppError::Internal(format!("Failed to sign refresh token: {e}")))?;

        Ok(AuthTokens {
            access_token,
            refresh_token,
        })
    }
}

/// Hash a password with Argon2.
pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {e}")))
}

/// Verify a password against a hash.
pub fn verify_password(password: &str, hash: &str) -> AppResult<bool> {
    let parsed_hash =
        PasswordHash::new(hash).map_err(|e| AppError::Internal(format!("Invalid hash: {e}")))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}
