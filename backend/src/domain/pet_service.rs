use anyhow::Result;
use chrono::Utc;
use log::info;
use std::sync::Arc;

use crate::domain::commands::pets::{
    AddWeightEntryCommand, CreatePetCommand, CreatePetResult, DeletePetCommand, DeletePetResult,
    ListPetsResult, UpdatePetCommand, UpdatePetResult,
};
use crate::domain::dates;
use crate::domain::models::Pet as DomainPet;
use crate::domain::user_service::UserService;
use crate::storage::csv::{CsvConnection, EventRepository, PetRepository, TaskRepository, VaccineRepository};
use crate::storage::traits::{EventStorage, PetStorage, TaskStorage, VaccineStorage};
use shared::WeightEntry;

/// Service for managing pets, including the cascade delete of everything
/// that hangs off a pet.
#[derive(Clone)]
pub struct PetService {
    pet_repository: PetRepository,
    task_repository: TaskRepository,
    event_repository: EventRepository,
    vaccine_repository: VaccineRepository,
    user_service: UserService,
}

impl PetService {
    /// Create a new PetService
    pub fn new(csv_conn: Arc<CsvConnection>) -> Self {
        Self {
            pet_repository: PetRepository::new(csv_conn.clone()),
            task_repository: TaskRepository::new(csv_conn.clone()),
            event_repository: EventRepository::new(csv_conn.clone()),
            vaccine_repository: VaccineRepository::new(csv_conn.clone()),
            user_service: UserService::new(csv_conn),
        }
    }

    /// Create a new pet
    pub fn create_pet(&self, command: CreatePetCommand) -> Result<CreatePetResult> {
        info!("Creating pet: name={}", command.name);

        if command.name.trim().is_empty() {
            return Err(anyhow::anyhow!("Pet name cannot be empty"));
        }

        let user_id = self.user_service.resolve_user_id(command.user_id)?;

        let mut weight_history = Vec::new();
        if let Some(weight) = command.current_weight {
            // An initial weight seeds the history
            weight_history.push(WeightEntry {
                id: DomainPet::generate_weight_entry_id(),
                weight,
                unit: command.weight_unit.clone().unwrap_or_else(|| "kg".to_string()),
                date: dates::today(),
            });
        }

        let pet = DomainPet {
            id: DomainPet::generate_id(),
            name: command.name.trim().to_string(),
            kind: command.kind,
            breed: command.breed,
            size: command.size,
            birthday: command.birthday.as_deref().map(dates::to_calendar_date),
            current_weight: command.current_weight,
            weight_unit: command.weight_unit,
            gender: command.gender,
            coat_type: command.coat_type,
            weight_history,
            created_at: Utc::now(),
        };

        self.pet_repository.store_pet(&user_id, &pet)?;

        info!("Created pet: {} with ID: {}", pet.name, pet.id);

        Ok(CreatePetResult { pet })
    }

    /// Get a pet by ID
    pub fn get_pet(&self, user_id: Option<String>, pet_id: &str) -> Result<Option<DomainPet>> {
        let user_id = self.user_service.resolve_user_id(user_id)?;
        self.pet_repository.get_pet(&user_id, pet_id)
    }

    /// List all pets
    pub fn list_pets(&self, user_id: Option<String>) -> Result<ListPetsResult> {
        let user_id = self.user_service.resolve_user_id(user_id)?;
        let pets = self.pet_repository.list_pets(&user_id)?;
        info!("Found {} pets", pets.len());
        Ok(ListPetsResult { pets })
    }

    /// Update an existing pet
    pub fn update_pet(&self, command: UpdatePetCommand) -> Result<UpdatePetResult> {
        info!("Updating pet: {}", command.pet_id);

        let user_id = self.user_service.resolve_user_id(command.user_id)?;

        let mut pet = self
            .pet_repository
            .get_pet(&user_id, &command.pet_id)?
            .ok_or_else(|| anyhow::anyhow!("Pet not found: {}", command.pet_id))?;

        if let Some(name) = command.name {
            if name.trim().is_empty() {
                return Err(anyhow::anyhow!("Pet name cannot be empty"));
            }
            pet.name = name.trim().to_string();
        }
        if let Some(kind) = command.kind {
            pet.kind = kind;
        }
        if command.breed.is_some() {
            pet.breed = command.breed;
        }
        if command.size.is_some() {
            pet.size = command.size;
        }
        if command.current_weight.is_some() {
            pet.current_weight = command.current_weight;
        }
        if command.weight_unit.is_some() {
            pet.weight_unit = command.weight_unit;
        }
        if command.gender.is_some() {
            pet.gender = command.gender;
        }
        if command.coat_type.is_some() {
            pet.coat_type = command.coat_type;
        }

        self.pet_repository.update_pet(&user_id, &pet)?;

        info!("Updated pet: {} with ID: {}", pet.name, pet.id);

        Ok(UpdatePetResult { pet })
    }

    /// Append a weight measurement to a pet's history and update its
    /// current weight
    pub fn add_weight_entry(&self, command: AddWeightEntryCommand) -> Result<UpdatePetResult> {
        info!("Adding weight entry for pet: {}", command.pet_id);

        if command.weight <= 0.0 {
            return Err(anyhow::anyhow!("Weight must be positive"));
        }

        let user_id = self.user_service.resolve_user_id(command.user_id)?;

        let mut pet = self
            .pet_repository
            .get_pet(&user_id, &command.pet_id)?
            .ok_or_else(|| anyhow::anyhow!("Pet not found: {}", command.pet_id))?;

        let entry = WeightEntry {
            id: DomainPet::generate_weight_entry_id(),
            weight: command.weight,
            unit: command.unit.clone(),
            date: command
                .date
                .as_deref()
                .map(dates::to_calendar_date)
                .unwrap_or_else(dates::today),
        };

        pet.weight_history.push(entry);
        pet.current_weight = Some(command.weight);
        pet.weight_unit = Some(command.unit);

        self.pet_repository.update_pet(&user_id, &pet)?;

        Ok(UpdatePetResult { pet })
    }

    /// Delete a pet and cascade to its tasks, events and vaccine records
    pub fn delete_pet(&self, command: DeletePetCommand) -> Result<DeletePetResult> {
        info!("Deleting pet: {}", command.pet_id);

        let user_id = self.user_service.resolve_user_id(command.user_id)?;

        let pet = self
            .pet_repository
            .get_pet(&user_id, &command.pet_id)?
            .ok_or_else(|| anyhow::anyhow!("Pet not found: {}", command.pet_id))?;

        let deleted_tasks = self.task_repository.delete_tasks_for_pet(&user_id, &command.pet_id)?;
        let deleted_events = self.event_repository.delete_events_for_pet(&user_id, &command.pet_id)?;
        let deleted_vaccines = self
            .vaccine_repository
            .delete_vaccines_for_pet(&user_id, &command.pet_id)?;
        self.pet_repository.delete_pet(&user_id, &command.pet_id)?;

        info!(
            "Deleted pet {} and cascaded {} tasks, {} events, {} vaccines",
            pet.name, deleted_tasks, deleted_events, deleted_vaccines
        );

        Ok(DeletePetResult {
            deleted_tasks,
            deleted_events,
            deleted_vaccines,
            success_message: format!("Pet '{}' deleted successfully", pet.name),
        })
    }
}
