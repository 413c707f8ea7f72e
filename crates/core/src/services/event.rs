//! Event service.

use chrono::{DateTime, Utc};
use koinonia_common::{AppError, AppResult, IdGenerator};
use koinonia_db::{
    entities::{event, user},
    repositories::EventRepository,
};
use sea_orm::Set;
use serde::Deserialize;
use validator::Validate;

/// Input for creating an event.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateEventInput {
    #[validate(length(min = 1, max = 256))]
    pub title: String,

    pub description: Option<String>,

    #[validate(length(max = 256))]
    pub location: Option<String>,

    pub starts_at: DateTime<Utc>,

    pub ends_at: Option<DateTime<Utc>>,
}

/// Sparse patch for an event.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateEventInput {
    #[validate(length(min = 1, max = 256))]
    pub title: Option<String>,

    pub description: Option<String>,

    #[validate(length(max = 256))]
    pub location: Option<String>,

    pub starts_at: Option<DateTime<Utc>>,

    pub ends_at: Option<DateTime<Utc>>,
}

/// Event service for business logic.
#[derive(Clone)]
pub struct EventService {
    event_repo: EventRepository,
    id_gen: IdGenerator,
}

impl EventService {
    /// Create a new event service.
    #[must_use]
    pub const fn new(event_repo: EventRepository) -> Self {
        Self {
            event_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Create an event.
    pub async fn create(
        &self,
        author: &user::Model,
        input: CreateEventInput,
    ) -> AppResult<event::Model> {
        input.validate()?;

        if let Some(ends_at) = input.ends_at
            && ends_at < input.starts_at
        {
            return Err(AppError::Validation(
                "ends_at must not precede starts_at".to_string(),
            ));
        }

        let model = event::ActiveModel {
            id: Set(self.id_gen.generate()),
            author_id: Set(author.id.clone()),
            title: Set(input.title),
            description: Set(input.description),
            location: Set(input.location),
            starts_at: Set(input.starts_at.into()),
            ends_at: Set(input.ends_at.map(Into::into)),
            created_at: Set(Utc::now().into()),
            updated_at: Set(None),
        };

        self.event_repo.create(model).await
    }

    /// Get an event by ID.
    pub async fn get(&self, id: &str) -> AppResult<event::Model> {
        self.event_repo.get_by_id(id).await
    }

    /// Upcoming events, soonest first.
    pub async fn list_upcoming(&self, limit: u64) -> AppResult<Vec<event::Model>> {
        self.event_repo.find_upcoming(limit.clamp(1, 100)).await
    }

    /// Page of all events.
    pub async fn list(&self, page: u64, page_size: u64) -> AppResult<(Vec<event::Model>, bool)> {
        let page = page.max(1);
        let page_size = page_size.clamp(1, 100);

        let mut events = self
            .event_repo
            .find_page(page_size + 1, (page - 1) * page_size)
            .await?;
        let has_more = events.len() as u64 > page_size;
        events.truncate(page_size as usize);

        Ok((events, has_more))
    }

    /// Apply a sparse patch to an event.
    pub async fn update(&self, id: &str, input: UpdateEventInput) -> AppResult<event::Model> {
        input.validate()?;

        let event = self.event_repo.get_by_id(id).await?;
        let mut active: event::ActiveModel = event.into();

        if let Some(title) = input.title {
            active.title = Set(title);
        }
        if let Some(description) = input.description {
            active.description = Set(Some(description));
        }
        if let Some(location) = input.location {
            active.location = Set(Some(location));
        }
        if let Some(starts_at) = input.starts_at {
            active.starts_at = Set(starts_at.into());
        }
        if let Some(ends_at) = input.ends_at {
            active.ends_at = Set(Some(ends_at.into()));
        }
        active.updated_at = Set(Some(Utc::now().into()));

        self.event_repo.update(active).await
    }

    /// Delete an event.
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        self.event_repo.get_by_id(id).await?;
        self.event_repo.delete(id).await
    }
}
