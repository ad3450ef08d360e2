use anyhow::Result;
use log::info;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use super::connection::CsvConnection;
use crate::domain::models::Pet as DomainPet;
use crate::storage::traits::PetStorage;
use shared::{PetGender, PetKind, PetSize, WeightEntry};

const PETS_FILE: &str = "pets.yaml";

/// Intermediate struct for YAML serialization with string date fields
#[derive(Debug, Clone, Serialize, Deserialize)]
struct YamlWeightEntry {
    id: String,
    weight: f64,
    unit: String,
    date: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct YamlPet {
    id: String,
    name: String,
    kind: String,
    breed: Option<String>,
    size: Option<String>,
    birthday: Option<String>,
    current_weight: Option<f64>,
    weight_unit: Option<String>,
    gender: Option<String>,
    coat_type: Option<String>,
    #[serde(default)]
    weight_history: Vec<YamlWeightEntry>,
    created_at: String, // String representation for YAML
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct YamlPetFile {
    #[serde(default)]
    pets: Vec<YamlPet>,
}

fn kind_to_str(kind: PetKind) -> &'static str {
    match kind {
        PetKind::Dog => "dog",
        PetKind::Cat => "cat",
        PetKind::Bird => "bird",
        PetKind::Fish => "fish",
        PetKind::Other => "other",
    }
}

fn parse_kind(raw: &str) -> PetKind {
    match raw {
        "dog" => PetKind::Dog,
        "cat" => PetKind::Cat,
        "bird" => PetKind::Bird,
        "fish" => PetKind::Fish,
        _ => PetKind::Other,
    }
}

fn size_to_str(size: PetSize) -> &'static str {
    match size {
        PetSize::Small => "small",
        PetSize::Medium => "medium",
        PetSize::Large => "large",
    }
}

fn parse_size(raw: &str) -> Option<PetSize> {
    match raw {
        "small" => Some(PetSize::Small),
        "medium" => Some(PetSize::Medium),
        "large" => Some(PetSize::Large),
        _ => None,
    }
}

fn gender_to_str(gender: PetGender) -> &'static str {
    match gender {
        PetGender::Male => "male",
        PetGender::Female => "female",
    }
}

fn parse_gender(raw: &str) -> Option<PetGender> {
    match raw {
        "male" => Some(PetGender::Male),
        "female" => Some(PetGender::Female),
        _ => None,
    }
}

/// YAML-based pet repository. Pets carry a nested weight history, which is
/// why they live in YAML rather than a flat CSV file.
#[derive(Clone)]
pub struct PetRepository {
    connection: Arc<CsvConnection>,
}

impl PetRepository {
    /// Create a new pet repository
    pub fn new(connection: Arc<CsvConnection>) -> Self {
        Self { connection }
    }

    fn get_pets_yaml_path(&self, user_id: &str) -> PathBuf {
        self.connection.get_user_directory(user_id).join(PETS_FILE)
    }

    fn load_pets(&self, user_id: &str) -> Result<Vec<DomainPet>> {
        let yaml_path = self.get_pets_yaml_path(user_id);

        if !yaml_path.exists() {
            return Ok(Vec::new());
        }

        let yaml_content = fs::read_to_string(&yaml_path)?;
        let file: YamlPetFile = serde_yaml::from_str(&yaml_content)?;

        let mut pets = Vec::new();
        for yaml_pet in file.pets {
            let created_at = chrono::DateTime::parse_from_rfc3339(&yaml_pet.created_at)
                .map_err(|e| anyhow::anyhow!("Failed to parse pet created_at: {}", e))?
                .with_timezone(&chrono::Utc);

            pets.push(DomainPet {
                id: yaml_pet.id,
                name: yaml_pet.name,
                kind: parse_kind(&yaml_pet.kind),
                breed: yaml_pet.breed,
                size: yaml_pet.size.as_deref().and_then(parse_size),
                birthday: yaml_pet.birthday,
                current_weight: yaml_pet.current_weight,
                weight_unit: yaml_pet.weight_unit,
                gender: yaml_pet.gender.as_deref().and_then(parse_gender),
                coat_type: yaml_pet.coat_type,
                weight_history: yaml_pet
                    .weight_history
                    .into_iter()
                    .map(|w| WeightEntry {
                        id: w.id,
                        weight: w.weight,
                        unit: w.unit,
                        date: w.date,
                    })
                    .collect(),
                created_at,
            });
        }

        Ok(pets)
    }

    fn save_pets(&self, user_id: &str, pets: &[DomainPet]) -> Result<()> {
        let user_dir = self.connection.get_user_directory(user_id);
        if !user_dir.exists() {
            fs::create_dir_all(&user_dir)?;
            info!("Created user directory: {:?}", user_dir);
        }

        let file = YamlPetFile {
            pets: pets
                .iter()
                .map(|pet| YamlPet {
                    id: pet.id.clone(),
                    name: pet.name.clone(),
                    kind: kind_to_str(pet.kind).to_string(),
                    breed: pet.breed.clone(),
                    size: pet.size.map(|s| size_to_str(s).to_string()),
                    birthday: pet.birthday.clone(),
                    current_weight: pet.current_weight,
                    weight_unit: pet.weight_unit.clone(),
                    gender: pet.gender.map(|g| gender_to_str(g).to_string()),
                    coat_type: pet.coat_type.clone(),
                    weight_history: pet
                        .weight_history
                        .iter()
                        .map(|w| YamlWeightEntry {
                            id: w.id.clone(),
                            weight: w.weight,
                            unit: w.unit.clone(),
                            date: w.date.clone(),
                        })
                        .collect(),
                    created_at: pet.created_at.to_rfc3339(),
                })
                .collect(),
        };

        let yaml_path = self.get_pets_yaml_path(user_id);
        let yaml_content = serde_yaml::to_string(&file)?;

        // Atomic write using temp file
        let temp_path = yaml_path.with_extension("tmp");
        fs::write(&temp_path, yaml_content)?;
        fs::rename(&temp_path, &yaml_path)?;

        Ok(())
    }
}

impl PetStorage for PetRepository {
    fn store_pet(&self, user_id: &str, pet: &DomainPet) -> Result<()> {
        let mut pets = self.load_pets(user_id)?;
        pets.push(pet.clone());
        self.save_pets(user_id, &pets)
    }

    fn get_pet(&self, user_id: &str, pet_id: &str) -> Result<Option<DomainPet>> {
        let pets = self.load_pets(user_id)?;
        Ok(pets.into_iter().find(|p| p.id == pet_id))
    }

    fn list_pets(&self, user_id: &str) -> Result<Vec<DomainPet>> {
        let mut pets = self.load_pets(user_id)?;
        pets.sort_by_key(|p| p.created_at);
        Ok(pets)
    }

    fn update_pet(&self, user_id: &str, pet: &DomainPet) -> Result<()> {
        let mut pets = self.load_pets(user_id)?;
        let slot = pets
            .iter_mut()
            .find(|p| p.id == pet.id)
            .ok_or_else(|| anyhow::anyhow!("Pet not found for update: {}", pet.id))?;
        *slot = pet.clone();
        self.save_pets(user_id, &pets)
    }

    fn delete_pet(&self, user_id: &str, pet_id: &str) -> Result<bool> {
        let mut pets = self.load_pets(user_id)?;
        let before = pets.len();
        pets.retain(|p| p.id != pet_id);
        if pets.len() == before {
            return Ok(false);
        }
        self.save_pets(user_id, &pets)?;
        Ok(true)
    }
}
