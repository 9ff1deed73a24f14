use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::{Postgres, QueryBuilder};

use crate::db::{EventRepository, SavedEventRepository, UserRepository};
use crate::models::{Event, EventChanges, NewEvent, NewUser, User};
use crate::utils::error::AppError;

const EVENT_COLUMNS: &str = "id, name, date, description, detailed_description, location, \
     lat, lng, category, facebook_link, thumbnail, creator_email";

const USER_COLUMNS: &str =
    "id, email, username, airsoft_club, password_hash, is_admin, created_at";

pub async fn connect(database_url: &str, max_connections: u32) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await
}

/// Repositories over one Postgres pool.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn migrate(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!().run(&self.pool).await
    }
}

#[async_trait]
impl EventRepository for PgStore {
    async fn list(&self) -> Result<Vec<Event>, AppError> {
        let sql = format!("SELECT {EVENT_COLUMNS} FROM events ORDER BY date, id");
        let events = sqlx::query_as::<_, Event>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(events)
    }

    async fn find(&self, id: i32) -> Result<Option<Event>, AppError> {
        let sql = format!("SELECT {EVENT_COLUMNS} FROM events WHERE id = $1");
        let event = sqlx::query_as::<_, Event>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(event)
    }

    async fn count(&self) -> Result<i64, AppError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM events")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn insert(&self, event: NewEvent) -> Result<Event, AppError> {
        let sql = format!(
            "INSERT INTO events (name, date, description, detailed_description, location, \
             lat, lng, category, facebook_link, thumbnail, creator_email) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11) \
             RETURNING {EVENT_COLUMNS}"
        );
        let stored = sqlx::query_as::<_, Event>(&sql)
            .bind(event.name)
            .bind(event.date)
            .bind(event.description)
            .bind(event.detailed_description)
            .bind(event.location)
            .bind(event.lat)
            .bind(event.lng)
            .bind(event.category.as_str())
            .bind(event.facebook_link)
            .bind(event.thumbnail)
            .bind(event.creator_email)
            .fetch_one(&self.pool)
            .await?;
        Ok(stored)
    }

    async fn update(&self, id: i32, changes: EventChanges) -> Result<Option<Event>, AppError> {
        if changes.is_empty() {
            return self.find(id).await;
        }

        let mut query: QueryBuilder<Postgres> = QueryBuilder::new("UPDATE events SET ");
        let mut columns = query.separated(", ");
        if let Some(name) = changes.name {
            columns.push("name = ").push_bind_unseparated(name);
        }
        if let Some(date) = changes.date {
            columns.push("date = ").push_bind_unseparated(date);
        }
        if let Some(description) = changes.description {
            columns.push("description = ").push_bind_unseparated(description);
        }
        if let Some(detailed) = changes.detailed_description {
            columns
                .push("detailed_description = ")
                .push_bind_unseparated(detailed);
        }
        if let Some(location) = changes.location {
            columns.push("location = ").push_bind_unseparated(location);
        }
        if let Some(lat) = changes.lat {
            columns.push("lat = ").push_bind_unseparated(lat);
        }
        if let Some(lng) = changes.lng {
            columns.push("lng = ").push_bind_unseparated(lng);
        }
        if let Some(category) = changes.category {
            columns
                .push("category = ")
                .push_bind_unseparated(category.as_str());
        }
        if let Some(link) = changes.facebook_link {
            columns.push("facebook_link = ").push_bind_unseparated(link);
        }
        if let Some(thumbnail) = changes.thumbnail {
            columns.push("thumbnail = ").push_bind_unseparated(thumbnail);
        }
        query.push(" WHERE id = ").push_bind(id);
        query.push(" RETURNING ").push(EVENT_COLUMNS);

        let event = query
            .build_query_as::<Event>()
            .fetch_optional(&self.pool)
            .await?;
        Ok(event)
    }

    async fn delete(&self, id: i32) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM events WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl UserRepository for PgStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1 LIMIT 1");
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn insert(&self, user: NewUser) -> Result<User, AppError> {
        let sql = format!(
            "INSERT INTO users (email, username, airsoft_club, password_hash, is_admin) \
             VALUES ($1, $2, $3, $4, $5) RETURNING {USER_COLUMNS}"
        );
        sqlx::query_as::<_, User>(&sql)
            .bind(user.email)
            .bind(user.username)
            .bind(user.airsoft_club)
            .bind(user.password_hash)
            .bind(user.is_admin)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::from_unique_violation(e, "Email or username already in use"))
    }

    async fn username_taken(
        &self,
        username: &str,
        exclude_user_id: Option<i32>,
    ) -> Result<bool, AppError> {
        let username = username.trim().to_lowercase();
        if username.is_empty() {
            return Ok(false);
        }
        let taken: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM users WHERE lower(username) = $1 \
             AND ($2::INTEGER IS NULL OR id <> $2))",
        )
        .bind(username)
        .bind(exclude_user_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(taken)
    }

    async fn update_profile(
        &self,
        id: i32,
        username: &str,
        airsoft_club: &str,
    ) -> Result<Option<User>, AppError> {
        let sql = format!(
            "UPDATE users SET username = $1, airsoft_club = $2 WHERE id = $3 \
             RETURNING {USER_COLUMNS}"
        );
        sqlx::query_as::<_, User>(&sql)
            .bind(username)
            .bind(airsoft_club)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::from_unique_violation(e, "Username already taken"))
    }

    async fn promote_admins(&self, emails: &[String]) -> Result<u64, AppError> {
        if emails.is_empty() {
            return Ok(0);
        }
        let result = sqlx::query("UPDATE users SET is_admin = TRUE WHERE lower(email) = ANY($1)")
            .bind(emails.to_vec())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}

#[async_trait]
impl SavedEventRepository for PgStore {
    async fn save(&self, user_id: i32, event_id: i32) -> Result<(), AppError> {
        sqlx::query(
            "INSERT INTO event_saves (user_id, event_id) VALUES ($1, $2) \
             ON CONFLICT (user_id, event_id) DO NOTHING",
        )
        .bind(user_id)
        .bind(event_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn unsave(&self, user_id: i32, event_id: i32) -> Result<(), AppError> {
        sqlx::query("DELETE FROM event_saves WHERE user_id = $1 AND event_id = $2")
            .bind(user_id)
            .bind(event_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn list_for_user(&self, user_id: i32) -> Result<Vec<Event>, AppError> {
        let sql = format!(
            "SELECT {} FROM events e JOIN event_saves s ON s.event_id = e.id \
             WHERE s.user_id = $1 ORDER BY e.date, e.id",
            prefixed_event_columns("e")
        );
        let events = sqlx::query_as::<_, Event>(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(events)
    }
}

fn prefixed_event_columns(alias: &str) -> String {
    EVENT_COLUMNS
        .split(',')
        .map(|column| format!("{alias}.{}", column.trim()))
        .collect::<Vec<_>>()
        .join(", ")
}
