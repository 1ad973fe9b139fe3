//! Admin JSON API over contact messages
//!
//! Every route requires the configured bearer token. While no token is
//! configured the whole API rejects requests, which is the safe default
//! for a freshly deployed site.

use axum::extract::{Path, Query, State};
use axum::http::{header, HeaderMap};
use axum::Json;
use serde::{Deserialize, Serialize};

use keystone_core::DbContact;

use crate::error::{WebError, WebResult};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ListParams {
    /// Restrict to unread messages
    #[serde(default)]
    pub unread: bool,
    /// Search term over name, email, subject and message body
    pub q: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ContactView {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub subject: String,
    pub message: String,
    pub received_at: String,
    pub read: bool,
    pub notes: String,
}

impl From<DbContact> for ContactView {
    fn from(contact: DbContact) -> Self {
        let received_at = contact.received_at();
        Self {
            id: contact.id,
            name: contact.name,
            email: contact.email,
            phone: contact.phone,
            subject: contact.subject,
            message: contact.message,
            received_at,
            read: contact.is_read,
            notes: contact.notes,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ReadUpdate {
    pub read: bool,
}

#[derive(Debug, Deserialize)]
pub struct NotesUpdate {
    pub notes: String,
}

fn authorize(state: &AppState, headers: &HeaderMap) -> Result<(), WebError> {
    let expected = state
        .config
        .admin_token
        .as_deref()
        .ok_or_else(|| WebError::Unauthorized("admin API token not configured".to_string()))?;

    let provided = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "));

    match provided {
        Some(token) if token == expected => Ok(()),
        _ => Err(WebError::Unauthorized("invalid admin token".to_string())),
    }
}

pub async fn list(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<ListParams>,
) -> WebResult<Json<Vec<ContactView>>> {
    authorize(&state, &headers)?;

    let contacts = match params.q.as_deref().map(str::trim) {
        Some(term) if !term.is_empty() => state.db.search_contacts(term).await?,
        _ => state.db.list_contacts(params.unread).await?,
    };

    Ok(Json(contacts.into_iter().map(Into::into).collect()))
}

pub async fn detail(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> WebResult<Json<ContactView>> {
    authorize(&state, &headers)?;
    let contact = state.db.get_contact(id).await?;
    Ok(Json(contact.into()))
}

pub async fn set_read(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(update): Json<ReadUpdate>,
) -> WebResult<Json<ContactView>> {
    authorize(&state, &headers)?;
    state.db.set_read(id, update.read).await?;
    let contact = state.db.get_contact(id).await?;
    Ok(Json(contact.into()))
}

pub async fn set_notes(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(update): Json<NotesUpdate>,
) -> WebResult<Json<ContactView>> {
    authorize(&state, &headers)?;
    state.db.set_notes(id, &update.notes).await?;
    let contact = state.db.get_contact(id).await?;
    Ok(Json(contact.into()))
}

pub async fn unread_count(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> WebResult<Json<serde_json::Value>> {
    authorize(&state, &headers)?;
    let unread = state.db.count_unread().await?;
    Ok(Json(serde_json::json!({ "unread": unread })))
}
