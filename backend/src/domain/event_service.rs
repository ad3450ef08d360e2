use anyhow::Result;
use log::info;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::commands::events::{
    CreateEventCommand, CreateEventResult, DeleteEventCommand, DeleteEventResult, ListEventsResult,
};
use crate::domain::dates;
use crate::domain::user_service::UserService;
use crate::storage::csv::{CsvConnection, EventRepository, PetRepository};
use crate::storage::traits::{EventStorage, PetStorage};
use shared::Event;

/// Service for managing one-shot events
#[derive(Clone)]
pub struct EventService {
    event_repository: EventRepository,
    pet_repository: PetRepository,
    user_service: UserService,
}

impl EventService {
    /// Create a new EventService
    pub fn new(csv_conn: Arc<CsvConnection>) -> Self {
        Self {
            event_repository: EventRepository::new(csv_conn.clone()),
            pet_repository: PetRepository::new(csv_conn.clone()),
            user_service: UserService::new(csv_conn),
        }
    }

    /// Create a new event
    pub fn create_event(&self, command: CreateEventCommand) -> Result<CreateEventResult> {
        info!("Creating event: name={}, pet={}", command.name, command.pet_id);

        if command.name.trim().is_empty() {
            return Err(anyhow::anyhow!("Event name cannot be empty"));
        }

        let user_id = self.user_service.resolve_user_id(command.user_id)?;

        if self.pet_repository.get_pet(&user_id, &command.pet_id)?.is_none() {
            return Err(anyhow::anyhow!("Pet not found: {}", command.pet_id));
        }

        let event = Event {
            id: format!("event::{}", Uuid::new_v4()),
            pet_id: command.pet_id,
            name: command.name.trim().to_string(),
            date: dates::to_calendar_date(&command.date),
            location: command.location,
            description: command.description,
        };

        self.event_repository.store_event(&user_id, &event)?;

        info!("Created event: {} with ID: {}", event.name, event.id);

        Ok(CreateEventResult { event })
    }

    /// List all events
    pub fn list_events(&self, user_id: Option<String>) -> Result<ListEventsResult> {
        let user_id = self.user_service.resolve_user_id(user_id)?;
        let events = self.event_repository.list_events(&user_id)?;
        Ok(ListEventsResult { events })
    }

    /// Delete an event
    pub fn delete_event(&self, command: DeleteEventCommand) -> Result<DeleteEventResult> {
        info!("Deleting event: {}", command.event_id);

        let user_id = self.user_service.resolve_user_id(command.user_id)?;

        if !self.event_repository.delete_event(&user_id, &command.event_id)? {
            return Err(anyhow::anyhow!("Event not found: {}", command.event_id));
        }

        Ok(DeleteEventResult {
            success_message: "Event deleted successfully".to_string(),
        })
    }
}
