use axum::{
    extract::State,
    routing::{get, post},
    Extension, Router,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use encore_core::{CoreError, Validator};
use encore_shared::pii::{redact_email, Masked};
use encore_shared::User;

use crate::credentials::{hash_password, verify_password};
use crate::error::{success, ApiJson, ApiResult, AppError};
use crate::middleware::issue_token;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    pub email: Option<String>,
    pub password: Option<Masked<String>>,
    pub confirm_password: Option<Masked<String>>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<Masked<String>>,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: User,
}

pub fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/signup", post(signup))
        .route("/login", post(login))
        .route("/logout", get(logout))
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/session", post(session))
}

fn secret(value: &Option<Masked<String>>) -> Option<&str> {
    value.as_ref().map(|m| m.0.as_str())
}

async fn signup(State(state): State<AppState>, ApiJson(req): ApiJson<SignupRequest>) -> ApiResult<AuthResponse> {
    let mut v = Validator::new();
    let email = v.email("email", req.email.as_deref());
    let password = v.password("password", secret(&req.password));
    v.check(
        secret(&req.password) == secret(&req.confirm_password),
        "confirmPassword",
        "Passwords do not match",
    );
    v.finish()?;
    let (Some(email), Some(password)) = (email, password) else {
        return Err(AppError::invalid("email", "Email not valid"));
    };

    if state.repos.users.find_user_by_email(&email).await.map_err(CoreError::from)?.is_some() {
        return Err(AppError::invalid("email", "The user is already existing"));
    }

    let user = User::new(email, Some(hash_password(&password)?));
    state.repos.users.insert_user(&user).await.map_err(CoreError::from)?;
    info!("User {} signed up as {}", user.id, redact_email(&user.email));

    let token = issue_token(&state.auth, &user)?;
    success(AuthResponse { token, user })
}

async fn login(State(state): State<AppState>, ApiJson(req): ApiJson<LoginRequest>) -> ApiResult<AuthResponse> {
    let rejected = || AppError::invalid("email", "Invalid email or password.");

    let email = req.email.as_deref().map(|e| e.trim().to_lowercase()).unwrap_or_default();
    let password = secret(&req.password).unwrap_or_default();

    let user = state
        .repos
        .users
        .find_user_by_email(&email)
        .await
        .map_err(CoreError::from)?
        .ok_or_else(|| {
            warn!("Login attempt for unknown account {}", redact_email(&email));
            rejected()
        })?;

    let matches = user
        .password_hash
        .as_deref()
        .is_some_and(|stored| verify_password(password, stored));
    if !matches {
        warn!("Wrong password for {}", redact_email(&email));
        return Err(rejected());
    }

    info!("User {} logged in", user.id);
    let token = issue_token(&state.auth, &user)?;
    success(AuthResponse { token, user })
}

async fn session(Extension(user): Extension<User>) -> ApiResult<User> {
    success(user)
}

async fn logout() -> ApiResult<()> {
    success(())
}
