use axum::{
    extract::State,
    routing::{get, post},
    Extension, Router,
};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use encore_core::directory::require_user;
use encore_core::profile_sync::sync_event_names;
use encore_core::validation::is_http_url;
use encore_core::{CoreError, Validator};
use encore_shared::pii::{redact_email, Masked};
use encore_shared::{AccountType, Profile, PublicUser, User};

use crate::credentials::{hash_password, verify_password};
use crate::error::{success, success_with, ApiJson, ApiPath, ApiQuery, ApiResult, AppError};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsersQuery {
    pub user_type: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileRequest {
    pub user_type: Option<String>,
    pub profile: Option<Profile>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialsRequest {
    pub password: Option<Masked<String>>,
    pub email: Option<String>,
    pub new_password: Option<Masked<String>>,
    pub confirm_password: Option<Masked<String>>,
}

#[derive(Debug, Deserialize)]
pub struct DeleteAccountRequest {
    pub password: Option<Masked<String>>,
}

pub fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users))
        .route("/users/{id}", get(get_user))
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/account/profile", post(update_profile))
        .route("/account/credentials", post(update_credentials))
        .route("/account/delete", post(delete_account))
}

fn parse_user_type(v: &mut Validator, raw: Option<&str>) -> Option<AccountType> {
    match raw.map(str::parse::<AccountType>) {
        Some(Ok(kind)) => Some(kind),
        _ => {
            v.error("userType", "The user type must be Artist, Place or Viewer");
            None
        }
    }
}

/// Accounts without a local password (OAuth sign-in) skip the check.
fn password_matches(user: &User, given: Option<&Masked<String>>) -> bool {
    match user.password_hash.as_deref() {
        Some(stored) => given.is_some_and(|pw| verify_password(&pw.0, stored)),
        None => true,
    }
}

async fn list_users(State(state): State<AppState>, ApiQuery(query): ApiQuery<UsersQuery>) -> ApiResult<Vec<PublicUser>> {
    let mut v = Validator::new();
    let kind = parse_user_type(&mut v, query.user_type.as_deref());
    v.finish()?;
    let Some(kind) = kind else {
        return Err(AppError::invalid("userType", "The user type must be Artist, Place or Viewer"));
    };

    let users = state.repos.users.list_users_by_type(kind).await.map_err(CoreError::from)?;
    success(users.into_iter().map(PublicUser::from).collect())
}

async fn get_user(State(state): State<AppState>, ApiPath(id): ApiPath<Uuid>) -> ApiResult<PublicUser> {
    let user = require_user(&state.repos, id).await?;
    success(PublicUser::from(user))
}

async fn update_profile(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    ApiJson(req): ApiJson<ProfileRequest>,
) -> ApiResult<User> {
    let mut v = Validator::new();
    let kind = parse_user_type(&mut v, req.user_type.as_deref());
    let profile = v.present("profile", req.profile, "The profile is required");
    if let Some(profile) = &profile {
        v.required("profile.fullname", Some(profile.fullname.as_str()), "The name is required");
        for link in &profile.links {
            v.check(is_http_url(&link.url), "profile.links", "Every link must be an http(s) URL");
        }
    }
    v.finish()?;
    let (Some(kind), Some(profile)) = (kind, profile) else {
        return Err(AppError::invalid("profile", "The profile is required"));
    };

    let updated = state
        .repos
        .users
        .update_profile(user.id, kind, &profile)
        .await
        .map_err(CoreError::from)?
        .ok_or_else(|| CoreError::not_found("There is not an user with this id"))?;

    sync_event_names(&state.repos, &updated).await?;
    info!("User {} updated the profile as {}", updated.id, kind);
    success_with("Profile updated", updated)
}

async fn update_credentials(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    ApiJson(req): ApiJson<CredentialsRequest>,
) -> ApiResult<User> {
    if !password_matches(&user, req.password.as_ref()) {
        return Err(AppError::invalid("password", "The password is not correct"));
    }

    let mut v = Validator::new();
    let email = match req.email.as_deref().map(str::trim).filter(|e| !e.is_empty()) {
        Some(raw) => v.email("email", Some(raw)),
        None => None,
    };
    let new_password = match req.new_password.as_ref() {
        Some(pw) => {
            let confirmed = req.confirm_password.as_ref().map(|c| c.0.as_str()) == Some(pw.0.as_str());
            v.check(confirmed, "confirmPassword", "Passwords do not match");
            v.password("newPassword", Some(pw.0.as_str()))
        }
        None => None,
    };
    v.finish()?;

    if let Some(email) = email.as_deref().filter(|e| *e != user.email) {
        let taken = state.repos.users.find_user_by_email(email).await.map_err(CoreError::from)?;
        if taken.is_some() {
            return Err(AppError::invalid("email", "The email is already associated with an user"));
        }
    }

    let email = email.unwrap_or_else(|| user.email.clone());
    let hash = match new_password {
        Some(pw) => Some(hash_password(&pw)?),
        None => user.password_hash.clone(),
    };

    let updated = state
        .repos
        .users
        .update_credentials(user.id, &email, hash.as_deref())
        .await
        .map_err(CoreError::from)?
        .ok_or_else(|| CoreError::not_found("There is not an user with this id"))?;

    info!("User {} changed credentials ({})", updated.id, redact_email(&updated.email));
    success_with("Credentials updated", updated)
}

async fn delete_account(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    ApiJson(req): ApiJson<DeleteAccountRequest>,
) -> ApiResult<()> {
    if !password_matches(&user, req.password.as_ref()) {
        return Err(AppError::invalid("password", "The password is not correct"));
    }

    state.repos.users.delete_user(user.id).await.map_err(CoreError::from)?;
    info!("User {} deleted the account", user.id);
    success_with("Account deleted", ())
}
