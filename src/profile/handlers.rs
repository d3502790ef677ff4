use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use tracing::{info, instrument};

use crate::error::ApiError;
use crate::profile::dto::{ProfileLists, SaveProfileRequest, SaveProfileResponse};
use crate::profile::repo::Profile;
use crate::state::AppState;

#[instrument(skip(state, payload))]
pub async fn save_profile(
    State(state): State<AppState>,
    Json(payload): Json<SaveProfileRequest>,
) -> Result<(StatusCode, Json<SaveProfileResponse>), ApiError> {
    let user_id = payload
        .user_id
        .ok_or_else(|| ApiError::validation("User ID is required"))?;

    let lists = ProfileLists {
        skills: payload.skills,
        experience: payload.experience,
        languages: payload.languages,
    };
    Profile::upsert(&state.db, user_id, &lists).await?;

    info!(user_id = %user_id, "profile saved");
    Ok((
        StatusCode::CREATED,
        Json(SaveProfileResponse {
            message: "Profile data saved successfully",
        }),
    ))
}
