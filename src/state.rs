use std::sync::Arc;

use crate::auth::token::TokenService;
use crate::db::{EventRepository, SavedEventRepository, UserRepository};
use crate::uploads::ThumbnailStore;

/// Shared handles passed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub events: Arc<dyn EventRepository>,
    pub users: Arc<dyn UserRepository>,
    pub saved_events: Arc<dyn SavedEventRepository>,
    pub tokens: Arc<dyn TokenService>,
    pub thumbnails: ThumbnailStore,
    admin_emails: Arc<Vec<String>>,
}

impl AppState {
    pub fn new<S>(store: Arc<S>, tokens: Arc<dyn TokenService>, thumbnails: ThumbnailStore) -> Self
    where
        S: EventRepository + UserRepository + SavedEventRepository + 'static,
    {
        Self {
            events: store.clone(),
            users: store.clone(),
            saved_events: store,
            tokens,
            thumbnails,
            admin_emails: Arc::new(Vec::new()),
        }
    }

    /// Emails (already normalized) that register as admins.
    pub fn with_admin_emails(mut self, emails: Vec<String>) -> Self {
        self.admin_emails = Arc::new(emails);
        self
    }

    pub fn is_admin_email(&self, email: &str) -> bool {
        self.admin_emails.iter().any(|admin| admin == email)
    }
}
