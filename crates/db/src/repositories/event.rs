//! Event repository.

use std::sync::Arc;

use crate::entities::{Event, event};
use koinonia_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, ModelTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect,
};

/// Event repository for database operations.
#[derive(Clone)]
pub struct EventRepository {
    db: Arc<DatabaseConnection>,
}

impl EventRepository {
    /// Create a new event repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find an event by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<event::Model>> {
        Event::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find an event by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<event::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("event {id}")))
    }

    /// Create a new event.
    pub async fn create(&self, model: event::ActiveModel) -> AppResult<event::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Update an event.
    pub async fn update(&self, model: event::ActiveModel) -> AppResult<event::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Upcoming events, soonest first.
    pub async fn find_upcoming(&self, limit: u64) -> AppResult<Vec<event::Model>> {
        Event::find()
            .filter(event::Column::StartsAt.gte(chrono::Utc::now()))
            .order_by_asc(event::Column::StartsAt)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Page of all events, newest start first.
    pub async fn find_page(&self, limit: u64, offset: u64) -> AppResult<Vec<event::Model>> {
        Event::find()
            .order_by_desc(event::Column::StartsAt)
            .offset(offset)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count all events.
    pub async fn count(&self) -> AppResult<u64> {
        Event::find()
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete an event.
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        let event = self.find_by_id(id).await?;
        if let Some(e) = event {
            e.delete(self.db.as_ref())
                .await
                .map_err(|e| AppError::Database(e.to_string()))?;
        }
        Ok(())
    }
}
