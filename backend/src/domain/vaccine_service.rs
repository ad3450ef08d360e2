use anyhow::Result;
use log::info;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::commands::vaccines::{
    CreateVaccineCommand, CreateVaccineResult, DeleteVaccineCommand, DeleteVaccineResult,
    ListVaccinesResult,
};
use crate::domain::dates;
use crate::domain::user_service::UserService;
use crate::storage::csv::{CsvConnection, PetRepository, VaccineRepository};
use crate::storage::traits::{PetStorage, VaccineStorage};
use shared::Vaccine;

/// Service for managing vaccine records
#[derive(Clone)]
pub struct VaccineService {
    vaccine_repository: VaccineRepository,
    pet_repository: PetRepository,
    user_service: UserService,
}

impl VaccineService {
    /// Create a new VaccineService
    pub fn new(csv_conn: Arc<CsvConnection>) -> Self {
        Self {
            vaccine_repository: VaccineRepository::new(csv_conn.clone()),
            pet_repository: PetRepository::new(csv_conn.clone()),
            user_service: UserService::new(csv_conn),
        }
    }

    /// Record an administered vaccine
    pub fn create_vaccine(&self, command: CreateVaccineCommand) -> Result<CreateVaccineResult> {
        info!("Recording vaccine: name={}, pet={}", command.name, command.pet_id);

        if command.name.trim().is_empty() {
            return Err(anyhow::anyhow!("Vaccine name cannot be empty"));
        }

        let user_id = self.user_service.resolve_user_id(command.user_id)?;

        if self.pet_repository.get_pet(&user_id, &command.pet_id)?.is_none() {
            return Err(anyhow::anyhow!("Pet not found: {}", command.pet_id));
        }

        let vaccine = Vaccine {
            id: format!("vaccine::{}", Uuid::new_v4()),
            pet_id: command.pet_id,
            name: command.name.trim().to_string(),
            brand: command.brand,
            date: dates::to_calendar_date(&command.date),
            veterinarian: command.veterinarian,
            clinic: command.clinic,
        };

        self.vaccine_repository.store_vaccine(&user_id, &vaccine)?;

        info!("Recorded vaccine: {} with ID: {}", vaccine.name, vaccine.id);

        Ok(CreateVaccineResult { vaccine })
    }

    /// List all vaccine records
    pub fn list_vaccines(&self, user_id: Option<String>) -> Result<ListVaccinesResult> {
        let user_id = self.user_service.resolve_user_id(user_id)?;
        let vaccines = self.vaccine_repository.list_vaccines(&user_id)?;
        Ok(ListVaccinesResult { vaccines })
    }

    /// Delete a vaccine record
    pub fn delete_vaccine(&self, command: DeleteVaccineCommand) -> Result<DeleteVaccineResult> {
        info!("Deleting vaccine record: {}", command.vaccine_id);

        let user_id = self.user_service.resolve_user_id(command.user_id)?;

        if !self.vaccine_repository.delete_vaccine(&user_id, &command.vaccine_id)? {
            return Err(anyhow::anyhow!("Vaccine record not found: {}", command.vaccine_id));
        }

        Ok(DeleteVaccineResult {
            success_message: "Vaccine record deleted successfully".to_string(),
        })
    }
}
