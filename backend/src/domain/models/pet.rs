use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared::{PetGender, PetKind, PetSize, WeightEntry};
use uuid::Uuid;

/// Domain model of a pet, the root every task/event/vaccine hangs off.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pet {
    pub id: String,
    pub name: String,
    pub kind: PetKind,
    pub breed: Option<String>,
    pub size: Option<PetSize>,
    /// Birthday as a canonical calendar date, when known
    pub birthday: Option<String>,
    pub current_weight: Option<f64>,
    pub weight_unit: Option<String>,
    pub gender: Option<PetGender>,
    pub coat_type: Option<String>,
    /// Ordered history of weight measurements, oldest first
    pub weight_history: Vec<WeightEntry>,
    pub created_at: DateTime<Utc>,
}

impl Pet {
    /// Generate a unique ID for a pet
    pub fn generate_id() -> String {
        format!("pet::{}", Uuid::new_v4())
    }

    /// Generate a unique ID for a weight entry
    pub fn generate_weight_entry_id() -> String {
        format!("weight::{}", Uuid::new_v4())
    }
}

impl From<Pet> for shared::Pet {
    fn from(pet: Pet) -> Self {
        shared::Pet {
            id: pet.id,
            name: pet.name,
            kind: pet.kind,
            breed: pet.breed,
            size: pet.size,
            birthday: pet.birthday,
            current_weight: pet.current_weight,
            weight_unit: pet.weight_unit,
            gender: pet.gender,
            coat_type: pet.coat_type,
            weight_history: pet.weight_history,
            created_at: pet.created_at.to_rfc3339(),
        }
    }
}
