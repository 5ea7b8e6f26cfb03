use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::event::{Event, EventInput, EventSignup};
use crate::utils::error::AppResult;

/// Event rows in the hosted store.
#[async_trait]
pub trait EventRepository: Send + Sync {
    /// All events, soonest first, optionally limited to one organizer.
    async fn list(&self, created_by: Option<Uuid>) -> AppResult<Vec<Event>>;

    async fn find(&self, id: Uuid) -> AppResult<Option<Event>>;

    async fn create(&self, input: &EventInput, created_by: Uuid) -> AppResult<Event>;

    /// Returns `None` when no event has that id.
    async fn update(&self, id: Uuid, input: &EventInput) -> AppResult<Option<Event>>;

    /// Returns the deleted row, or `None` when no event has that id.
    async fn delete(&self, id: Uuid) -> AppResult<Option<Event>>;

    /// Returns `None` when the user was already signed up.
    async fn signup(&self, event_id: Uuid, user_id: Uuid) -> AppResult<Option<EventSignup>>;
}

pub struct PgEventRepository {
    pool: PgPool,
}

impl PgEventRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EventRepository for PgEventRepository {
    async fn list(&self, created_by: Option<Uuid>) -> AppResult<Vec<Event>> {
        let events = sqlx::query_as::<_, Event>(
            r#"
            SELECT * FROM events
            WHERE ($1::uuid IS NULL OR created_by = $1)
            ORDER BY start_time ASC
            "#,
        )
        .bind(created_by)
        .fetch_all(&self.pool)
        .await?;

        Ok(events)
    }

    async fn find(&self, id: Uuid) -> AppResult<Option<Event>> {
        let event = sqlx::query_as::<_, Event>("SELECT * FROM events WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(event)
    }

    async fn create(&self, input: &EventInput, created_by: Uuid) -> AppResult<Event> {
        let event = sqlx::query_as::<_, Event>(
            r#"
            INSERT INTO events
                (title, description, start_time, end_time, location, price, image_url, created_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(&input.title)
        .bind(&input.description)
        .bind(input.start_time)
        .bind(input.end_time)
        .bind(&input.location)
        .bind(input.price)
        .bind(&input.image_url)
        .bind(created_by)
        .fetch_one(&self.pool)
        .await?;

        Ok(event)
    }

    async fn update(&self, id: Uuid, input: &EventInput) -> AppResult<Option<Event>> {
        let event = sqlx::query_as::<_, Event>(
            r#"
            UPDATE events
            SET title = $1,
                description = $2,
                start_time = $3,
                end_time = $4,
                location = $5,
                price = $6,
                image_url = $7,
                updated_at = NOW()
            WHERE id = $8
            RETURNING *
            "#,
        )
        .bind(&input.title)
        .bind(&input.description)
        .bind(input.start_time)
        .bind(input.end_time)
        .bind(&input.location)
        .bind(input.price)
        .bind(&input.image_url)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(event)
    }

    async fn delete(&self, id: Uuid) -> AppResult<Option<Event>> {
        let event = sqlx::query_as::<_, Event>("DELETE FROM events WHERE id = $1 RETURNING *")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(event)
    }

    async fn signup(&self, event_id: Uuid, user_id: Uuid) -> AppResult<Option<EventSignup>> {
        let signup = sqlx::query_as::<_, EventSignup>(
            r#"
            INSERT INTO event_signups (event_id, user_id)
            VALUES ($1, $2)
            ON CONFLICT (event_id, user_id) DO NOTHING
            RETURNING *
            "#,
        )
        .bind(event_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(signup)
    }
}
