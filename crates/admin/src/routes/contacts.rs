//! Contact CRUD for the dashboard.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::get,
};
use serde::Deserialize;

use wayside_core::{ContactId, ContactSource, Email};

use crate::db::contacts::{Contact, ContactRepository, NewContact};
use crate::db::Page;
use crate::error::AppError;
use crate::middleware::RequireStaffAuth;
use crate::state::AppState;

use super::api::{ApiResponse, ok};

/// Build the contacts router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/contacts", get(list).post(create))
        .route(
            "/contacts/{id}",
            get(get_one).put(update).delete(delete_one),
        )
}

/// List query: pagination plus an optional name/email search.
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(flatten)]
    pub page: Page,
    pub search: Option<String>,
}

/// List contacts.
///
/// # Errors
///
/// Returns 500 on a query failure.
pub async fn list(
    RequireStaffAuth(_admin): RequireStaffAuth,
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<ApiResponse<Vec<Contact>>>, AppError> {
    let contacts = ContactRepository::new(state.pool())
        .list(query.page, query.search.as_deref())
        .await?;
    Ok(ok(contacts))
}

/// Get one contact.
///
/// # Errors
///
/// Returns 404 if the contact does not exist.
pub async fn get_one(
    RequireStaffAuth(_admin): RequireStaffAuth,
    State(state): State<AppState>,
    Path(id): Path<ContactId>,
) -> Result<Json<ApiResponse<Contact>>, AppError> {
    let contact = ContactRepository::new(state.pool())
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("contact {id}")))?;
    Ok(ok(contact))
}

/// New contact fields (staff entry).
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateContactRequest {
    pub email: Option<String>,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
}

/// Create a contact.
///
/// # Errors
///
/// Returns a friendly 400 on a duplicate email.
pub async fn create(
    RequireStaffAuth(_admin): RequireStaffAuth,
    State(state): State<AppState>,
    Json(body): Json<CreateContactRequest>,
) -> Result<Json<ApiResponse<Contact>>, AppError> {
    let email = body
        .email
        .as_deref()
        .map(Email::parse)
        .transpose()
        .map_err(|e| AppError::BadRequest(format!("invalid email address: {e}")))?;

    let contact = ContactRepository::new(state.pool())
        .create(&NewContact {
            email,
            first_name: body.first_name,
            last_name: body.last_name,
            phone: body.phone,
            source: ContactSource::StaffEntry,
        })
        .await?;
    Ok(ok(contact))
}

/// Mutable profile fields.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateContactRequest {
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
}

/// Update a contact's profile fields.
///
/// # Errors
///
/// Returns 404 if the contact does not exist.
pub async fn update(
    RequireStaffAuth(_admin): RequireStaffAuth,
    State(state): State<AppState>,
    Path(id): Path<ContactId>,
    Json(body): Json<UpdateContactRequest>,
) -> Result<Json<ApiResponse<Contact>>, AppError> {
    let contact = ContactRepository::new(state.pool())
        .update_profile(id, &body.first_name, &body.last_name, body.phone.as_deref())
        .await?;
    Ok(ok(contact))
}

/// Delete a contact. Dashboard only; the mobile surface never deletes.
///
/// # Errors
///
/// Returns 404 if the contact does not exist.
pub async fn delete_one(
    RequireStaffAuth(admin): RequireStaffAuth,
    State(state): State<AppState>,
    Path(id): Path<ContactId>,
) -> Result<Json<ApiResponse<bool>>, AppError> {
    let deleted = ContactRepository::new(state.pool()).delete(id).await?;
    if !deleted {
        return Err(AppError::NotFound(format!("contact {id}")));
    }
    tracing::info!(staff = %admin.email, contact_id = %id, "Contact deleted");
    Ok(ok(true))
}
