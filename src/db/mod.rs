use async_trait::async_trait;

use crate::models::{Category, Event, EventChanges, NewEvent, NewUser, User};
use crate::utils::error::AppError;

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[async_trait]
pub trait EventRepository: Send + Sync {
    /// All events ordered by date, then id.
    async fn list(&self) -> Result<Vec<Event>, AppError>;
    async fn find(&self, id: i32) -> Result<Option<Event>, AppError>;
    async fn count(&self) -> Result<i64, AppError>;
    async fn insert(&self, event: NewEvent) -> Result<Event, AppError>;
    /// `Ok(None)` when no event has `id`.
    async fn update(&self, id: i32, changes: EventChanges) -> Result<Option<Event>, AppError>;
    /// Returns whether a row was removed.
    async fn delete(&self, id: i32) -> Result<bool, AppError>;
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError>;
    /// Fails with `Conflict` when the email or username is already taken.
    async fn insert(&self, user: NewUser) -> Result<User, AppError>;
    /// Case-insensitive; `exclude_user_id` lets a user keep their own name.
    async fn username_taken(
        &self,
        username: &str,
        exclude_user_id: Option<i32>,
    ) -> Result<bool, AppError>;
    async fn update_profile(
        &self,
        id: i32,
        username: &str,
        airsoft_club: &str,
    ) -> Result<Option<User>, AppError>;
    /// Sets the admin flag for every listed email; returns rows touched.
    async fn promote_admins(&self, emails: &[String]) -> Result<u64, AppError>;
}

#[async_trait]
pub trait SavedEventRepository: Send + Sync {
    /// Saving an already saved event is a no-op.
    async fn save(&self, user_id: i32, event_id: i32) -> Result<(), AppError>;
    async fn unsave(&self, user_id: i32, event_id: i32) -> Result<(), AppError>;
    async fn list_for_user(&self, user_id: i32) -> Result<Vec<Event>, AppError>;
}

fn demo_events() -> Vec<NewEvent> {
    vec![
        NewEvent {
            name: "Event 1".to_string(),
            date: "2024-07-01".to_string(),
            description: "Desc 1".to_string(),
            location: "Croatia".to_string(),
            lat: 45.0,
            lng: 16.0,
            category: Category::Skirmish,
            facebook_link: "https://www.facebook.com/events/792766179793560".to_string(),
            ..Default::default()
        },
        NewEvent {
            name: "Event 2".to_string(),
            date: "2024-07-15".to_string(),
            description: "Desc 2".to_string(),
            location: "Croatia".to_string(),
            lat: 46.0,
            lng: 17.0,
            category: Category::Skirmish,
            facebook_link: "https://www.facebook.com/events/2075916069838446".to_string(),
            ..Default::default()
        },
    ]
}

/// Inserts the demo events when the table is empty. Returns how many were added.
pub async fn seed_events(repo: &dyn EventRepository) -> Result<usize, AppError> {
    if repo.count().await? > 0 {
        return Ok(0);
    }

    let events = demo_events();
    let seeded = events.len();
    for event in events {
        repo.insert(event).await?;
    }
    Ok(seeded)
}
