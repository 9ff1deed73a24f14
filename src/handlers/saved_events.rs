use axum::extract::{Path, State};
use axum::response::Response;
use tracing::info;

use crate::auth::AuthUser;
use crate::handlers::auth::current_user;
use crate::handlers::events::parse_event_id;
use crate::state::AppState;
use crate::utils::error::AppError;
use crate::utils::response::{no_content, success};

pub async fn list_saved_events(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Response, AppError> {
    let user = current_user(&state, &auth).await?;
    let events = state.saved_events.list_for_user(user.id).await?;
    Ok(success(events))
}

pub async fn save_event(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let event_id = parse_event_id(&id)?;
    let user = current_user(&state, &auth).await?;
    if state.events.find(event_id).await?.is_none() {
        return Err(AppError::NotFound(format!(
            "Event with id '{event_id}' was not found"
        )));
    }

    state.saved_events.save(user.id, event_id).await?;
    info!(user_id = user.id, event_id, "Event saved");
    Ok(no_content())
}

pub async fn unsave_event(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let event_id = parse_event_id(&id)?;
    let user = current_user(&state, &auth).await?;

    state.saved_events.unsave(user.id, event_id).await?;
    info!(user_id = user.id, event_id, "Event unsaved");
    Ok(no_content())
}
