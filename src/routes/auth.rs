//! Auth routes — signup, login, session cookie, public profiles.

use axum::extract::{FromRef, Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::Deserialize;
use time::Duration;
use uuid::Uuid;

use crate::services::auth as auth_svc;
use crate::services::users;
use crate::state::AppState;

const COOKIE_NAME: &str = "session_token";
const SESSION_DAYS: i64 = 30;

pub(crate) fn env_bool(key: &str) -> Option<bool> {
    std::env::var(key)
        .ok()
        .and_then(|raw| match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Some(true),
            "0" | "false" | "no" | "off" => Some(false),
            _ => None,
        })
}

pub(crate) fn cookie_secure() -> bool {
    env_bool("COOKIE_SECURE").unwrap_or(false)
}

fn session_cookie(token: String) -> Cookie<'static> {
    Cookie::build((COOKIE_NAME, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(cookie_secure())
        .max_age(Duration::days(SESSION_DAYS))
        .build()
}

// =============================================================================
// AUTH EXTRACTOR
// =============================================================================

/// Authenticated user extracted from the session cookie.
/// Use as a handler parameter to require authentication.
pub struct AuthUser {
    pub user: auth_svc::SessionUser,
    pub token: String,
}

impl<S> axum::extract::FromRequestParts<S> for AuthUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = StatusCode;

    async fn from_request_parts(parts: &mut axum::http::request::Parts, state: &S) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        let token = jar.get(COOKIE_NAME).map(Cookie::value).unwrap_or_default();
        if token.is_empty() {
            return Err(StatusCode::UNAUTHORIZED);
        }

        let app_state = AppState::from_ref(state);
        let user = auth_svc::validate_session(&app_state.pool, token)
            .await
            .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?
            .ok_or(StatusCode::UNAUTHORIZED)?;

        Ok(Self { user, token: token.to_owned() })
    }
}

// =============================================================================
// HANDLERS
// =============================================================================

#[derive(Deserialize)]
pub struct SignupBody {
    pub email: String,
    pub username: String,
    #[serde(rename = "fullName")]
    pub full_name: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct LoginBody {
    pub email: String,
    pub password: String,
}

fn auth_error_response(err: auth_svc::AuthError) -> Response {
    use auth_svc::AuthError;
    let status = match err {
        AuthError::AlreadyExists => StatusCode::CONFLICT,
        AuthError::InvalidCredentials => StatusCode::UNAUTHORIZED,
        AuthError::Db(_) => StatusCode::INTERNAL_SERVER_ERROR,
        _ => StatusCode::BAD_REQUEST,
    };
    (status, Json(serde_json::json!({ "message": err.to_string() }))).into_response()
}

/// `POST /api/auth/signup` — create an account and start a session.
pub async fn signup(State(state): State<AppState>, jar: CookieJar, Json(body): Json<SignupBody>) -> Response {
    let user_id = match auth_svc::signup(&state.pool, &body.email, &body.username, &body.full_name, &body.password).await
    {
        Ok(id) => id,
        Err(e) => return auth_error_response(e),
    };

    start_session(&state, jar, user_id).await
}

/// `POST /api/auth/login` — verify credentials and start a session.
pub async fn login(State(state): State<AppState>, jar: CookieJar, Json(body): Json<LoginBody>) -> Response {
    let user_id = match auth_svc::login(&state.pool, &body.email, &body.password).await {
        Ok(id) => id,
        Err(e) => return auth_error_response(e),
    };

    start_session(&state, jar, user_id).await
}

async fn start_session(state: &AppState, jar: CookieJar, user_id: Uuid) -> Response {
    let token = match auth_svc::create_session(&state.pool, user_id).await {
        Ok(t) => t,
        Err(e) => {
            tracing::error!(error = %e, "session create failed");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    let user = match auth_svc::validate_session(&state.pool, &token).await {
        Ok(Some(u)) => u,
        _ => return StatusCode::INTERNAL_SERVER_ERROR.into_response(),
    };

    (jar.add(session_cookie(token)), Json(user)).into_response()
}

/// `POST /api/auth/logout` — delete the session and clear the cookie.
pub async fn logout(State(state): State<AppState>, jar: CookieJar, auth: AuthUser) -> Response {
    if let Err(e) = auth_svc::delete_session(&state.pool, &auth.token).await {
        tracing::error!(error = %e, "session delete failed");
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }
    (jar.remove(Cookie::from(COOKIE_NAME)), StatusCode::NO_CONTENT).into_response()
}

/// `GET /api/auth/check` — return the authenticated user.
pub async fn check(auth: AuthUser) -> Json<auth_svc::SessionUser> {
    Json(auth.user)
}

/// `GET /api/auth/user/:username` — public profile lookup.
pub async fn profile_by_username(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<Json<users::UserProfile>, StatusCode> {
    users::get_by_username(&state.pool, &username)
        .await
        .map(Json)
        .map_err(user_error_to_status)
}

/// `GET /api/auth/user/id/:id` — public profile lookup by ID.
pub async fn profile_by_id(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<users::UserProfile>, StatusCode> {
    users::get_by_id(&state.pool, user_id)
        .await
        .map(Json)
        .map_err(user_error_to_status)
}

pub(crate) fn user_error_to_status(err: users::UserError) -> StatusCode {
    match err {
        users::UserError::NotFound => StatusCode::NOT_FOUND,
        users::UserError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}
