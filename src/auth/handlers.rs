use axum::extract::{FromRef, State};
use axum::http::StatusCode;
use axum::Json;
use lazy_static::lazy_static;
use regex::Regex;
use tracing::{info, instrument, warn};

use crate::auth::dto::{LoginRequest, LoginResponse, PublicUser, SignupRequest, SignupResponse};
use crate::auth::jwt::JwtKeys;
use crate::auth::password::{hash_password, verify_password};
use crate::auth::repo::User;
use crate::error::ApiError;
use crate::profile::repo::Profile;
use crate::state::AppState;

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

fn required(field: Option<String>) -> Option<String> {
    field.filter(|v| !v.is_empty())
}

#[instrument(skip(state, payload))]
pub async fn signup(
    State(state): State<AppState>,
    Json(payload): Json<SignupRequest>,
) -> Result<(StatusCode, Json<SignupResponse>), ApiError> {
    let (name, email, password) = match (
        required(payload.name),
        required(payload.email),
        required(payload.password),
    ) {
        (Some(name), Some(email), Some(password)) => (name, email, password),
        _ => return Err(ApiError::validation("All fields are required")),
    };

    if !is_valid_email(&email) {
        warn!(%email, "invalid email");
        return Err(ApiError::validation("Invalid email"));
    }

    if User::find_by_email(&state.db, &email).await?.is_some() {
        warn!(%email, "email already registered");
        return Err(ApiError::email_taken());
    }

    let hash = hash_password(&password)?;
    // The unique constraint backs up the check above if a concurrent signup
    // slips in between; User::create reports that as the same conflict.
    let user = User::create(&state.db, &name, &email, &hash).await?;

    info!(user_id = %user.id, email = %user.email, "user registered");
    Ok((
        StatusCode::CREATED,
        Json(SignupResponse {
            message: "User registered successfully",
            user_id: user.id,
        }),
    ))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let (email, password) = match (required(payload.email), required(payload.password)) {
        (Some(email), Some(password)) => (email, password),
        _ => return Err(ApiError::validation("Email and password are required")),
    };

    let user = match User::find_by_email(&state.db, &email).await? {
        Some(user) => user,
        None => {
            warn!(%email, "login unknown email");
            return Err(ApiError::Auth);
        }
    };

    if !verify_password(&password, &user.password_hash) {
        warn!(%email, user_id = %user.id, "login invalid password");
        return Err(ApiError::Auth);
    }

    let profile = Profile::lists_for_user(&state.db, user.id).await?;

    let keys = JwtKeys::from_ref(&state);
    let token = keys.sign(&user)?;

    info!(user_id = %user.id, email = %user.email, "user logged in");
    Ok(Json(LoginResponse {
        token,
        user: PublicUser {
            id: user.id,
            name: user.name,
            email: user.email,
            profile,
        },
    }))
}
