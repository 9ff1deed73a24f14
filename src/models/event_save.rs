use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

/// A user's bookmark on an event, keyed by the (user, event) pair.
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct EventSave {
    pub user_id: i32,
    pub event_id: i32,
    pub created_at: DateTime<Utc>,
}
