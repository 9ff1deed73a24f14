use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;

use crate::db::{EventRepository, SavedEventRepository, UserRepository};
use crate::models::{Event, EventChanges, EventSave, NewEvent, NewUser, User};
use crate::utils::error::AppError;

#[derive(Default)]
struct Tables {
    events: BTreeMap<i32, Event>,
    last_event_id: i32,
    users: Vec<User>,
    last_user_id: i32,
    saves: Vec<EventSave>,
}

impl Tables {
    fn username_taken(&self, username: &str, exclude_user_id: Option<i32>) -> bool {
        let wanted = username.trim().to_lowercase();
        if wanted.is_empty() {
            return false;
        }
        self.users.iter().any(|u| {
            Some(u.id) != exclude_user_id
                && u.username.as_deref().map(str::to_lowercase).as_deref() == Some(wanted.as_str())
        })
    }

    fn sorted_events<'a>(&self, events: impl Iterator<Item = &'a Event>) -> Vec<Event> {
        let mut events: Vec<Event> = events.cloned().collect();
        events.sort_by(|a, b| a.date.cmp(&b.date).then(a.id.cmp(&b.id)));
        events
    }
}

/// Process-local store with the same semantics as the Postgres tables,
/// including uniqueness rules and cascading deletes.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl EventRepository for MemoryStore {
    async fn list(&self) -> Result<Vec<Event>, AppError> {
        let tables = self.tables.lock().await;
        Ok(tables.sorted_events(tables.events.values()))
    }

    async fn find(&self, id: i32) -> Result<Option<Event>, AppError> {
        Ok(self.tables.lock().await.events.get(&id).cloned())
    }

    async fn count(&self) -> Result<i64, AppError> {
        Ok(self.tables.lock().await.events.len() as i64)
    }

    async fn insert(&self, event: NewEvent) -> Result<Event, AppError> {
        let mut tables = self.tables.lock().await;
        tables.last_event_id += 1;
        let stored = event.into_event(tables.last_event_id);
        tables.events.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn update(&self, id: i32, changes: EventChanges) -> Result<Option<Event>, AppError> {
        let mut tables = self.tables.lock().await;
        Ok(tables.events.get_mut(&id).map(|event| {
            changes.apply_to(event);
            event.clone()
        }))
    }

    async fn delete(&self, id: i32) -> Result<bool, AppError> {
        let mut tables = self.tables.lock().await;
        tables.saves.retain(|save| save.event_id != id);
        Ok(tables.events.remove(&id).is_some())
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let tables = self.tables.lock().await;
        Ok(tables.users.iter().find(|u| u.email == email).cloned())
    }

    async fn insert(&self, user: NewUser) -> Result<User, AppError> {
        let mut tables = self.tables.lock().await;
        if tables.users.iter().any(|u| u.email == user.email)
            || tables.username_taken(&user.username, None)
        {
            return Err(AppError::Conflict(
                "Email or username already in use".to_string(),
            ));
        }

        tables.last_user_id += 1;
        let stored = User {
            id: tables.last_user_id,
            email: user.email,
            username: Some(user.username),
            airsoft_club: user.airsoft_club,
            password_hash: user.password_hash,
            is_admin: user.is_admin,
            created_at: Utc::now(),
        };
        tables.users.push(stored.clone());
        Ok(stored)
    }

    async fn username_taken(
        &self,
        username: &str,
        exclude_user_id: Option<i32>,
    ) -> Result<bool, AppError> {
        Ok(self
            .tables
            .lock()
            .await
            .username_taken(username, exclude_user_id))
    }

    async fn update_profile(
        &self,
        id: i32,
        username: &str,
        airsoft_club: &str,
    ) -> Result<Option<User>, AppError> {
        let mut tables = self.tables.lock().await;
        if tables.username_taken(username, Some(id)) {
            return Err(AppError::Conflict("Username already taken".to_string()));
        }
        Ok(tables.users.iter_mut().find(|u| u.id == id).map(|user| {
            user.username = Some(username.to_string());
            user.airsoft_club = airsoft_club.to_string();
            user.clone()
        }))
    }

    async fn promote_admins(&self, emails: &[String]) -> Result<u64, AppError> {
        let mut tables = self.tables.lock().await;
        let mut promoted = 0;
        for user in tables.users.iter_mut() {
            if emails.iter().any(|e| e.eq_ignore_ascii_case(&user.email)) {
                user.is_admin = true;
                promoted += 1;
            }
        }
        Ok(promoted)
    }
}

#[async_trait]
impl SavedEventRepository for MemoryStore {
    async fn save(&self, user_id: i32, event_id: i32) -> Result<(), AppError> {
        let mut tables = self.tables.lock().await;
        let exists = tables
            .saves
            .iter()
            .any(|s| s.user_id == user_id && s.event_id == event_id);
        if !exists {
            tables.saves.push(EventSave {
                user_id,
                event_id,
                created_at: Utc::now(),
            });
        }
        Ok(())
    }

    async fn unsave(&self, user_id: i32, event_id: i32) -> Result<(), AppError> {
        self.tables
            .lock()
            .await
            .saves
            .retain(|s| !(s.user_id == user_id && s.event_id == event_id));
        Ok(())
    }

    async fn list_for_user(&self, user_id: i32) -> Result<Vec<Event>, AppError> {
        let tables = self.tables.lock().await;
        let saved = tables
            .saves
            .iter()
            .filter(|s| s.user_id == user_id)
            .filter_map(|s| tables.events.get(&s.event_id));
        Ok(tables.sorted_events(saved))
    }
}
