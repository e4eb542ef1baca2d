//! The member's own profile.

use axum::{
    Json, Router,
    extract::State,
    routing::get,
};
use serde::Deserialize;

use crate::db::ContactRepository;
use crate::db::contacts::Profile;
use crate::error::AppError;
use crate::middleware::CurrentMember;
use crate::state::AppState;

use super::{ApiResponse, ok};

/// Build the profile router.
pub fn router() -> Router<AppState> {
    Router::new().route("/api/profile", get(show).put(update))
}

/// The member's resolved contact profile.
///
/// Extraction already ran the resolver, so this is a plain lookup.
///
/// # Errors
///
/// Returns 404 if the contact row vanished since resolution.
pub async fn show(
    member: CurrentMember,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Profile>>, AppError> {
    let profile = ContactRepository::new(state.pool())
        .get(member.contact_id)
        .await?
        .ok_or_else(|| AppError::NotFound("profile".into()))?;
    Ok(ok(profile))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
}

/// Update the member's basic profile fields.
///
/// # Errors
///
/// Returns 400 on empty names.
pub async fn update(
    member: CurrentMember,
    State(state): State<AppState>,
    Json(body): Json<UpdateProfileRequest>,
) -> Result<Json<ApiResponse<Profile>>, AppError> {
    let first_name = body.first_name.trim();
    let last_name = body.last_name.trim();
    if first_name.is_empty() || last_name.is_empty() {
        return Err(AppError::BadRequest(
            "firstName and lastName are required".into(),
        ));
    }

    let profile = ContactRepository::new(state.pool())
        .update_profile(
            member.contact_id,
            first_name,
            last_name,
            body.phone.as_deref(),
        )
        .await?;
    Ok(ok(profile))
}
