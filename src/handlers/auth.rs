use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::response::Response;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::auth::password::{hash_password, verify_password, MIN_PASSWORD_LEN};
use crate::auth::AuthUser;
use crate::models::user::{is_plausible_email, normalize_club, normalize_email};
use crate::models::{NewUser, User};
use crate::state::AppState;
use crate::utils::error::AppError;
use crate::utils::response::{created, success};

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub username: String,
    #[serde(default, alias = "airsoftClub")]
    pub airsoft_club: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct ProfileUpdateRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default, alias = "airsoftClub")]
    pub airsoft_club: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub email: String,
}

fn required_username(raw: &str) -> Result<String, AppError> {
    let username = raw.trim();
    if username.is_empty() {
        return Err(AppError::ValidationError("Username is required".to_string()));
    }
    Ok(username.to_string())
}

fn json_body<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    body.map(|Json(value)| value)
        .map_err(|e| AppError::ValidationError(format!("Invalid input: {}", e.body_text())))
}

/// Resolves the caller's stored user record.
pub(crate) async fn current_user(state: &AppState, auth: &AuthUser) -> Result<User, AppError> {
    state
        .users
        .find_by_email(&auth.email)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))
}

pub async fn register(
    State(state): State<AppState>,
    body: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<Response, AppError> {
    let req = json_body(body)?;

    let email = normalize_email(&req.email);
    if !is_plausible_email(&email) {
        return Err(AppError::ValidationError("Invalid email".to_string()));
    }
    let password = req.password.trim();
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::ValidationError(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    let username = required_username(&req.username)?;

    if state.users.find_by_email(&email).await?.is_some() {
        return Err(AppError::Conflict("Email already in use".to_string()));
    }
    if state.users.username_taken(&username, None).await? {
        return Err(AppError::Conflict("Username already taken".to_string()));
    }

    let user = state
        .users
        .insert(NewUser {
            is_admin: state.is_admin_email(&email),
            email,
            username,
            airsoft_club: normalize_club(req.airsoft_club.as_deref()),
            password_hash: hash_password(password)?,
        })
        .await?;

    let token = state.tokens.issue(&user.email)?;
    info!(user_id = user.id, admin = user.is_admin, "User registered");
    Ok(created(AuthResponse {
        token,
        email: user.email,
    }))
}

pub async fn login(
    State(state): State<AppState>,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Response, AppError> {
    let req = json_body(body)?;

    let email = normalize_email(&req.email);
    let password = req.password.trim();
    if email.is_empty() || password.is_empty() {
        return Err(AppError::ValidationError(
            "Email and password are required".to_string(),
        ));
    }

    let invalid = || AppError::AuthError("Invalid email or password".to_string());
    let user = state.users.find_by_email(&email).await?.ok_or_else(invalid)?;
    if !verify_password(password, &user.password_hash) {
        return Err(invalid());
    }

    let token = state.tokens.issue(&user.email)?;
    info!(user_id = user.id, "User signed in");
    Ok(success(AuthResponse {
        token,
        email: user.email,
    }))
}

pub async fn me(State(state): State<AppState>, auth: AuthUser) -> Result<Response, AppError> {
    let user = current_user(&state, &auth).await?;
    Ok(success(user.profile()))
}

pub async fn update_me(
    State(state): State<AppState>,
    auth: AuthUser,
    body: Result<Json<ProfileUpdateRequest>, JsonRejection>,
) -> Result<Response, AppError> {
    let req = json_body(body)?;
    let user = current_user(&state, &auth).await?;

    let username = required_username(&req.username)?;
    if state.users.username_taken(&username, Some(user.id)).await? {
        return Err(AppError::Conflict("Username already taken".to_string()));
    }

    let club = normalize_club(req.airsoft_club.as_deref());
    let updated = state
        .users
        .update_profile(user.id, &username, &club)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    info!(user_id = updated.id, "Profile updated");
    Ok(success(updated.profile()))
}
