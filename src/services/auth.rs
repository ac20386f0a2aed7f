//! Auth service — signup/login, password hashing, session management.
//!
//! ARCHITECTURE
//! ============
//! HTTP auth uses long-lived session tokens stored in a cookie. Passwords
//! are stored as `salt$hash` where hash = sha256(salt || password); the salt
//! is a random 16-byte hex string per user.

use std::fmt::Write;

use rand::Rng;
use sha2::{Digest, Sha256};
use sqlx::{PgPool, Row};
use uuid::Uuid;

const MIN_PASSWORD_LEN: usize = 6;
const MIN_USERNAME_LEN: usize = 3;

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("invalid email")]
    InvalidEmail,
    #[error("username must be at least {MIN_USERNAME_LEN} characters of [A-Za-z0-9_]")]
    InvalidUsername,
    #[error("password must be at least {MIN_PASSWORD_LEN} characters")]
    InvalidPassword,
    #[error("full name required")]
    InvalidFullName,
    #[error("email or username already taken")]
    AlreadyExists,
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("database error: {0}")]
    Db(#[from] sqlx::Error),
}

pub(crate) fn bytes_to_hex(bytes: &[u8]) -> String {
    let mut s = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        let _ = write!(s, "{b:02x}");
    }
    s
}

/// Generate a cryptographically random 32-byte hex token.
#[must_use]
pub fn generate_token() -> String {
    let bytes: [u8; 32] = rand::rng().random();
    bytes_to_hex(&bytes)
}

// =============================================================================
// PASSWORD HASHING
// =============================================================================

fn sha256_hex(salt: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    bytes_to_hex(&hasher.finalize())
}

/// Hash a password with a fresh random salt, producing `salt$hash`.
#[must_use]
pub fn hash_password(password: &str) -> String {
    let salt_bytes: [u8; 16] = rand::rng().random();
    let salt = bytes_to_hex(&salt_bytes);
    let hash = sha256_hex(&salt, password);
    format!("{salt}${hash}")
}

/// Verify a password against a stored `salt$hash` string.
#[must_use]
pub fn verify_password(password: &str, stored: &str) -> bool {
    let Some((salt, hash)) = stored.split_once('$') else {
        return false;
    };
    sha256_hex(salt, password) == hash
}

// =============================================================================
// VALIDATION
// =============================================================================

#[must_use]
pub fn normalize_email(email: &str) -> Option<String> {
    let normalized = email.trim().to_ascii_lowercase();
    let parts = normalized.split('@').collect::<Vec<_>>();
    if parts.len() != 2 || parts[0].is_empty() || parts[1].is_empty() {
        return None;
    }
    Some(normalized)
}

#[must_use]
pub fn normalize_username(username: &str) -> Option<String> {
    let trimmed = username.trim();
    if trimmed.len() < MIN_USERNAME_LEN
        || !trimmed.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
    {
        return None;
    }
    Some(trimmed.to_owned())
}

// =============================================================================
// SIGNUP / LOGIN
// =============================================================================

/// Create a new user account. Returns the user's ID.
///
/// # Errors
///
/// Rejects malformed fields and duplicate email/username.
pub async fn signup(
    pool: &PgPool,
    email: &str,
    username: &str,
    full_name: &str,
    password: &str,
) -> Result<Uuid, AuthError> {
    let email = normalize_email(email).ok_or(AuthError::InvalidEmail)?;
    let username = normalize_username(username).ok_or(AuthError::InvalidUsername)?;
    if password.len() < MIN_PASSWORD_LEN {
        return Err(AuthError::InvalidPassword);
    }
    let full_name = full_name.trim();
    if full_name.is_empty() {
        return Err(AuthError::InvalidFullName);
    }

    let password_hash = hash_password(password);
    let row = sqlx::query(
        r"INSERT INTO users (email, username, full_name, password_hash)
          VALUES ($1, $2, $3, $4)
          ON CONFLICT DO NOTHING
          RETURNING id",
    )
    .bind(&email)
    .bind(&username)
    .bind(full_name)
    .bind(&password_hash)
    .fetch_optional(pool)
    .await?;

    row.map(|r| r.get("id")).ok_or(AuthError::AlreadyExists)
}

/// Verify credentials by email. Returns the user's ID.
///
/// # Errors
///
/// Returns `InvalidCredentials` both for an unknown email and a wrong
/// password — callers cannot probe which accounts exist.
pub async fn login(pool: &PgPool, email: &str, password: &str) -> Result<Uuid, AuthError> {
    let email = normalize_email(email).ok_or(AuthError::InvalidCredentials)?;
    let row = sqlx::query("SELECT id, password_hash FROM users WHERE email = $1")
        .bind(&email)
        .fetch_optional(pool)
        .await?
        .ok_or(AuthError::InvalidCredentials)?;

    let stored: String = row.get("password_hash");
    if !verify_password(password, &stored) {
        return Err(AuthError::InvalidCredentials);
    }
    Ok(row.get("id"))
}

// =============================================================================
// SESSIONS
// =============================================================================

/// User row returned from session validation.
#[derive(Debug, Clone, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionUser {
    pub id: Uuid,
    pub email: String,
    pub username: String,
    pub full_name: String,
    pub profile_pic: String,
}

/// Create a session for the given user, returning the token.
pub async fn create_session(pool: &PgPool, user_id: Uuid) -> Result<String, sqlx::Error> {
    let token = generate_token();
    sqlx::query("INSERT INTO sessions (token, user_id) VALUES ($1, $2)")
        .bind(&token)
        .bind(user_id)
        .execute(pool)
        .await?;
    Ok(token)
}

/// Validate a session token and return the associated user.
pub async fn validate_session(pool: &PgPool, token: &str) -> Result<Option<SessionUser>, sqlx::Error> {
    let row = sqlx::query(
        r"SELECT u.id, u.email, u.username, u.full_name, u.profile_pic
          FROM sessions s
          JOIN users u ON u.id = s.user_id
          WHERE s.token = $1 AND s.expires_at > now()",
    )
    .bind(token)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(|r| SessionUser {
        id: r.get("id"),
        email: r.get("email"),
        username: r.get("username"),
        full_name: r.get("full_name"),
        profile_pic: r.get("profile_pic"),
    }))
}

/// Delete a session by token.
pub async fn delete_session(pool: &PgPool, token: &str) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM sessions WHERE token = $1")
        .bind(token)
        .execute(pool)
        .await?;
    Ok(())
}

#[cfg(test)]
#[path = "auth_test.rs"]
mod tests;
