//! Domain-level command and query types
//!
//! These structs are used by services inside the domain layer and are **not**
//! exposed over the public API. The REST layer maps the public DTOs defined
//! in the `shared` crate to these internal types. Commands carry
//! `user_id: Option<String>`; `None` resolves to the active user.

pub mod pets {
    use crate::domain::models::Pet;
    use shared::{PetGender, PetKind, PetSize};

    /// Input for creating a new pet.
    #[derive(Debug, Clone)]
    pub struct CreatePetCommand {
        pub user_id: Option<String>,
        pub name: String,
        pub kind: PetKind,
        pub breed: Option<String>,
        pub size: Option<PetSize>,
        pub birthday: Option<String>,
        pub current_weight: Option<f64>,
        pub weight_unit: Option<String>,
        pub gender: Option<PetGender>,
        pub coat_type: Option<String>,
    }

    /// Input for updating a pet. `None` fields are left untouched.
    #[derive(Debug, Clone, Default)]
    pub struct UpdatePetCommand {
        pub user_id: Option<String>,
        pub pet_id: String,
        pub name: Option<String>,
        pub kind: Option<PetKind>,
        pub breed: Option<String>,
        pub size: Option<PetSize>,
        pub current_weight: Option<f64>,
        pub weight_unit: Option<String>,
        pub gender: Option<PetGender>,
        pub coat_type: Option<String>,
    }

    /// Input for appending a weight measurement to a pet's history.
    #[derive(Debug, Clone)]
    pub struct AddWeightEntryCommand {
        pub user_id: Option<String>,
        pub pet_id: String,
        pub weight: f64,
        pub unit: String,
        /// Measurement date; defaults to today when omitted
        pub date: Option<String>,
    }

    #[derive(Debug, Clone)]
    pub struct DeletePetCommand {
        pub user_id: Option<String>,
        pub pet_id: String,
    }

    #[derive(Debug, Clone)]
    pub struct CreatePetResult {
        pub pet: Pet,
    }

    #[derive(Debug, Clone)]
    pub struct UpdatePetResult {
        pub pet: Pet,
    }

    #[derive(Debug, Clone)]
    pub struct ListPetsResult {
        pub pets: Vec<Pet>,
    }

    /// Result of deleting a pet, with counts of the cascaded records.
    #[derive(Debug, Clone)]
    pub struct DeletePetResult {
        pub deleted_tasks: usize,
        pub deleted_events: usize,
        pub deleted_vaccines: usize,
        pub success_message: String,
    }
}

pub mod tasks {
    use crate::domain::models::Task;
    use shared::Frequency;

    /// Input for creating a new recurring task.
    #[derive(Debug, Clone)]
    pub struct CreateTaskCommand {
        pub user_id: Option<String>,
        pub pet_id: String,
        pub name: String,
        pub frequency: Frequency,
        /// Explicit interval override; wins over the frequency default when
        /// positive
        pub frequency_days: Option<u32>,
        pub next_date: String,
        pub time: Option<String>,
        pub color: String,
    }

    /// Input for acknowledging a task's current occurrence.
    #[derive(Debug, Clone)]
    pub struct CompleteTaskCommand {
        pub user_id: Option<String>,
        pub task_id: String,
    }

    #[derive(Debug, Clone)]
    pub struct DeleteTaskCommand {
        pub user_id: Option<String>,
        pub task_id: String,
    }

    #[derive(Debug, Clone)]
    pub struct CreateTaskResult {
        pub task: Task,
    }

    #[derive(Debug, Clone)]
    pub struct CompleteTaskResult {
        pub task: Task,
    }

    #[derive(Debug, Clone)]
    pub struct ListTasksResult {
        pub tasks: Vec<Task>,
    }

    #[derive(Debug, Clone)]
    pub struct DeleteTaskResult {
        pub success_message: String,
    }
}

pub mod events {
    use shared::Event;

    /// Input for creating a new one-shot event.
    #[derive(Debug, Clone)]
    pub struct CreateEventCommand {
        pub user_id: Option<String>,
        pub pet_id: String,
        pub name: String,
        pub date: String,
        pub location: Option<String>,
        pub description: Option<String>,
    }

    #[derive(Debug, Clone)]
    pub struct DeleteEventCommand {
        pub user_id: Option<String>,
        pub event_id: String,
    }

    #[derive(Debug, Clone)]
    pub struct CreateEventResult {
        pub event: Event,
    }

    #[derive(Debug, Clone)]
    pub struct ListEventsResult {
        pub events: Vec<Event>,
    }

    #[derive(Debug, Clone)]
    pub struct DeleteEventResult {
        pub success_message: String,
    }
}

pub mod vaccines {
    use shared::Vaccine;

    /// Input for recording an administered vaccine.
    #[derive(Debug, Clone)]
    pub struct CreateVaccineCommand {
        pub user_id: Option<String>,
        pub pet_id: String,
        pub name: String,
        pub brand: Option<String>,
        pub date: String,
        pub veterinarian: Option<String>,
        pub clinic: Option<String>,
    }

    #[derive(Debug, Clone)]
    pub struct DeleteVaccineCommand {
        pub user_id: Option<String>,
        pub vaccine_id: String,
    }

    #[derive(Debug, Clone)]
    pub struct CreateVaccineResult {
        pub vaccine: Vaccine,
    }

    #[derive(Debug, Clone)]
    pub struct ListVaccinesResult {
        pub vaccines: Vec<Vaccine>,
    }

    #[derive(Debug, Clone)]
    pub struct DeleteVaccineResult {
        pub success_message: String,
    }
}

pub mod reports {
    /// Query for selecting report data over a date range.
    #[derive(Debug, Clone, Default)]
    pub struct ReportDataQuery {
        pub user_id: Option<String>,
        /// Restrict to a single pet when set
        pub pet_id: Option<String>,
        /// Inclusive range bounds, canonical YYYY-MM-DD
        pub start_date: Option<String>,
        pub end_date: Option<String>,
    }

    /// Result of purging records older than the retention window.
    #[derive(Debug, Clone)]
    pub struct PurgeOldDataResult {
        pub deleted_tasks: usize,
        pub deleted_events: usize,
        pub deleted_vaccines: usize,
    }
}
