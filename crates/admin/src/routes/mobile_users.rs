//! Mobile app user administration: listing, record repair, and push
//! broadcast.

use axum::{
    Json, Router,
    extract::{Query, State},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use wayside_core::ContactSource;

use crate::db::app_users::{AppUserRepository, AppUserWithContact};
use crate::db::contacts::{ContactRepository, NewContact};
use crate::db::Page;
use crate::error::AppError;
use crate::middleware::RequireStaffAuth;
use crate::state::AppState;

use super::api::{ApiResponse, ok};

/// Build the mobile user admin router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/mobile-users", get(list))
        .route("/mobile-users/fix-missing-records", post(fix_missing_records))
        .route("/mobile-users/broadcast", post(broadcast))
}

/// List app users with their linked contact, newest first.
///
/// # Errors
///
/// Returns 500 on a query failure.
pub async fn list(
    RequireStaffAuth(_admin): RequireStaffAuth,
    State(state): State<AppState>,
    Query(page): Query<Page>,
) -> Result<Json<ApiResponse<Vec<AppUserWithContact>>>, AppError> {
    let users = AppUserRepository::new(state.pool())
        .list_with_contacts(page)
        .await?;
    Ok(ok(users))
}

/// Repair summary.
#[derive(Debug, Serialize)]
pub struct FixMissingRecordsResponse {
    pub repaired: usize,
}

/// Create and link a placeholder contact for every app user row missing
/// one. These rows come from pre-release accounts provisioned before the
/// contact link existed.
///
/// # Errors
///
/// Returns 500 if a repair query fails.
pub async fn fix_missing_records(
    RequireStaffAuth(admin): RequireStaffAuth,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<FixMissingRecordsResponse>>, AppError> {
    let app_users = AppUserRepository::new(state.pool());
    let contacts = ContactRepository::new(state.pool());

    let unlinked = app_users.unlinked_identities().await?;
    let mut repaired = 0;

    for identity in unlinked {
        let contact = contacts
            .create(&NewContact {
                email: None,
                first_name: "Mobile".to_owned(),
                last_name: "User".to_owned(),
                phone: None,
                source: ContactSource::MobileApp,
            })
            .await?;
        app_users.upsert_link(identity, Some(contact.id)).await?;
        repaired += 1;
    }

    tracing::info!(staff = %admin.email, repaired, "Mobile user records repaired");
    Ok(ok(FixMissingRecordsResponse { repaired }))
}

/// Broadcast request.
#[derive(Debug, Deserialize)]
pub struct BroadcastRequest {
    pub title: String,
    pub body: String,
    pub data: Option<JsonValue>,
}

/// Delivery summary.
#[derive(Debug, Serialize)]
pub struct BroadcastResponse {
    pub delivered: usize,
    pub tokens: usize,
}

/// Send a push notification to every active app user device.
///
/// # Errors
///
/// Returns 502 if the push service rejects a batch.
pub async fn broadcast(
    RequireStaffAuth(admin): RequireStaffAuth,
    State(state): State<AppState>,
    Json(body): Json<BroadcastRequest>,
) -> Result<Json<ApiResponse<BroadcastResponse>>, AppError> {
    let tokens = AppUserRepository::new(state.pool()).all_push_tokens().await?;
    let delivered = state
        .push()
        .send(&tokens, &body.title, &body.body, body.data.as_ref())
        .await?;

    tracing::info!(
        staff = %admin.email,
        delivered,
        tokens = tokens.len(),
        "Push broadcast sent"
    );

    Ok(ok(BroadcastResponse {
        delivered,
        tokens: tokens.len(),
    }))
}
