use axum::extract::{Path, State};
use axum::response::Response;
use tracing::info;

use crate::auth::AuthUser;
use crate::handlers::payload::EventSubmission;
use crate::state::AppState;
use crate::utils::error::AppError;
use crate::utils::response::{created, no_content, success};

pub(crate) fn parse_event_id(raw: &str) -> Result<i32, AppError> {
    raw.trim()
        .parse::<i32>()
        .ok()
        .filter(|id| *id > 0)
        .ok_or_else(|| AppError::ValidationError(format!("Invalid event id '{raw}'")))
}

fn not_found(id: i32) -> AppError {
    AppError::NotFound(format!("Event with id '{id}' was not found"))
}

pub async fn list_events(State(state): State<AppState>) -> Result<Response, AppError> {
    let events = state.events.list().await?;
    Ok(success(events))
}

pub async fn create_event(
    State(state): State<AppState>,
    auth: Option<AuthUser>,
    submission: EventSubmission,
) -> Result<Response, AppError> {
    let mut event = submission.fields.into_new_event()?;
    if let Some(user) = auth {
        event.creator_email = Some(user.email);
    }
    let stored = match submission.upload {
        Some(upload) => Some(state.thumbnails.save(upload).await?),
        None => None,
    };
    if stored.is_some() {
        event.thumbnail = stored.clone();
    }

    let event = match state.events.insert(event).await {
        Ok(event) => event,
        Err(e) => {
            if let Some(path) = stored {
                state.thumbnails.discard(&path).await;
            }
            return Err(e);
        }
    };
    info!(event_id = event.id, name = %event.name, "Event created");
    Ok(created(event))
}

pub async fn update_event(
    State(state): State<AppState>,
    Path(id): Path<String>,
    submission: EventSubmission,
) -> Result<Response, AppError> {
    let id = parse_event_id(&id)?;
    let mut changes = submission.fields.into_changes()?;
    if changes.is_empty() && submission.upload.is_none() {
        return Err(AppError::ValidationError("No fields to update".to_string()));
    }
    let mut stored = None;
    if let Some(upload) = submission.upload {
        // Unknown ids must not leave a stored file behind.
        if state.events.find(id).await?.is_none() {
            return Err(not_found(id));
        }
        let path = state.thumbnails.save(upload).await?;
        changes.thumbnail = Some(path.clone());
        stored = Some(path);
    }

    let updated = state
        .events
        .update(id, changes)
        .await
        .and_then(|event| event.ok_or_else(|| not_found(id)));
    let event = match updated {
        Ok(event) => event,
        Err(e) => {
            if let Some(path) = stored {
                state.thumbnails.discard(&path).await;
            }
            return Err(e);
        }
    };
    info!(event_id = event.id, "Event updated");
    Ok(success(event))
}

pub async fn delete_event(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let id = parse_event_id(&id)?;
    let removed = state.events.delete(id).await?;
    info!(event_id = id, removed, "Event delete requested");
    Ok(no_content())
}
