//! # Storage Traits
//!
//! This module defines the storage abstraction traits that allow different
//! storage backends to be used interchangeably in the domain layer. All
//! operations are synchronous; the async session layer wraps them behind its
//! own collaborator traits.

use anyhow::Result;

use crate::domain::models::{Pet as DomainPet, Profile as DomainProfile, Task as DomainTask};
use shared::{Event, Vaccine};

/// Trait defining the interface for pet storage operations
pub trait PetStorage: Send + Sync {
    /// Store a new pet
    fn store_pet(&self, user_id: &str, pet: &DomainPet) -> Result<()>;

    /// Retrieve a specific pet by ID
    fn get_pet(&self, user_id: &str, pet_id: &str) -> Result<Option<DomainPet>>;

    /// List all pets ordered by creation time (oldest first)
    fn list_pets(&self, user_id: &str) -> Result<Vec<DomainPet>>;

    /// Update an existing pet
    fn update_pet(&self, user_id: &str, pet: &DomainPet) -> Result<()>;

    /// Delete a pet by ID
    /// Returns true if the pet was found and deleted, false otherwise
    fn delete_pet(&self, user_id: &str, pet_id: &str) -> Result<bool>;
}

/// Trait defining the interface for task storage operations
pub trait TaskStorage: Send + Sync {
    /// Store a new task
    fn store_task(&self, user_id: &str, task: &DomainTask) -> Result<()>;

    /// Retrieve a specific task by ID
    fn get_task(&self, user_id: &str, task_id: &str) -> Result<Option<DomainTask>>;

    /// List all tasks ordered by next due date ascending
    fn list_tasks(&self, user_id: &str) -> Result<Vec<DomainTask>>;

    /// Update an existing task
    fn update_task(&self, user_id: &str, task: &DomainTask) -> Result<()>;

    /// Delete a single task
    /// Returns true if the task was found and deleted, false otherwise
    fn delete_task(&self, user_id: &str, task_id: &str) -> Result<bool>;

    /// Delete all tasks belonging to a pet (cascade on pet deletion)
    /// Returns the number of tasks deleted
    fn delete_tasks_for_pet(&self, user_id: &str, pet_id: &str) -> Result<usize>;
}

/// Trait defining the interface for event storage operations
pub trait EventStorage: Send + Sync {
    /// Store a new event
    fn store_event(&self, user_id: &str, event: &Event) -> Result<()>;

    /// List all events ordered by date ascending
    fn list_events(&self, user_id: &str) -> Result<Vec<Event>>;

    /// Delete a single event
    /// Returns true if the event was found and deleted, false otherwise
    fn delete_event(&self, user_id: &str, event_id: &str) -> Result<bool>;

    /// Delete all events belonging to a pet (cascade on pet deletion)
    /// Returns the number of events deleted
    fn delete_events_for_pet(&self, user_id: &str, pet_id: &str) -> Result<usize>;
}

/// Trait defining the interface for vaccine record storage operations
pub trait VaccineStorage: Send + Sync {
    /// Store a new vaccine record
    fn store_vaccine(&self, user_id: &str, vaccine: &Vaccine) -> Result<()>;

    /// List all vaccine records ordered by date descending (most recent first)
    fn list_vaccines(&self, user_id: &str) -> Result<Vec<Vaccine>>;

    /// Delete a single vaccine record
    /// Returns true if the record was found and deleted, false otherwise
    fn delete_vaccine(&self, user_id: &str, vaccine_id: &str) -> Result<bool>;

    /// Delete all vaccine records belonging to a pet (cascade on pet deletion)
    /// Returns the number of records deleted
    fn delete_vaccines_for_pet(&self, user_id: &str, pet_id: &str) -> Result<usize>;
}

/// Trait defining the interface for user profile storage operations
///
/// The payment webhook rewrites subscription fields through this trait, so
/// lookups by external id and by email both have to work.
pub trait ProfileStorage: Send + Sync {
    /// Store or replace a user profile
    fn store_profile(&self, profile: &DomainProfile) -> Result<()>;

    /// Retrieve a profile by user ID
    fn get_profile(&self, user_id: &str) -> Result<Option<DomainProfile>>;

    /// Find a profile by email address (case-insensitive)
    fn find_profile_by_email(&self, email: &str) -> Result<Option<DomainProfile>>;

    /// List all profiles ordered by name
    fn list_profiles(&self) -> Result<Vec<DomainProfile>>;

    /// Get the currently active user ID
    fn get_active_user(&self) -> Result<Option<String>>;

    /// Set the currently active user
    fn set_active_user(&self, user_id: &str) -> Result<()>;
}
