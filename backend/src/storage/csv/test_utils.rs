/// Test utilities module for automatic cleanup and consistent test
/// infrastructure.
///
/// RAII-based cleanup guarantees test data is removed even if tests panic.
use anyhow::Result;
use chrono::Utc;
use std::sync::Arc;
use tempfile::TempDir;

use super::connection::CsvConnection;
use super::event_repository::EventRepository;
use super::pet_repository::PetRepository;
use super::profile_repository::ProfileRepository;
use super::task_repository::TaskRepository;
use super::vaccine_repository::VaccineRepository;
use crate::domain::models::{Pet as DomainPet, Profile as DomainProfile};
use crate::storage::traits::{PetStorage, ProfileStorage};
use shared::{PetKind, SubscriptionStatus};

/// Test environment that provides a temporary directory and connection
/// that will be automatically cleaned up when the environment is dropped,
/// even if tests panic or fail.
pub struct TestEnvironment {
    pub connection: Arc<CsvConnection>,
    /// Base directory path for manual inspection if needed
    pub base_path: std::path::PathBuf,
    _temp_dir: TempDir, // Keep alive to prevent cleanup
}

/// Test helper that provides repository instances for a test environment
pub struct TestHelper {
    pub env: TestEnvironment,
    pub pet_repo: PetRepository,
    pub task_repo: TaskRepository,
    pub event_repo: EventRepository,
    pub vaccine_repo: VaccineRepository,
    pub profile_repo: ProfileRepository,
}

impl TestEnvironment {
    /// Create a new test environment with a temporary directory
    pub fn new() -> Result<Self> {
        let temp_dir = TempDir::new()?;
        let connection = Arc::new(CsvConnection::new(temp_dir.path())?);
        Ok(Self {
            connection,
            base_path: temp_dir.path().to_path_buf(),
            _temp_dir: temp_dir,
        })
    }
}

impl TestHelper {
    /// Create a new test helper with a fresh environment
    pub fn new() -> Result<Self> {
        let env = TestEnvironment::new()?;
        let pet_repo = PetRepository::new(env.connection.clone());
        let task_repo = TaskRepository::new(env.connection.clone());
        let event_repo = EventRepository::new(env.connection.clone());
        let vaccine_repo = VaccineRepository::new(env.connection.clone());
        let profile_repo = ProfileRepository::new(env.connection.clone());

        Ok(Self {
            env,
            pet_repo,
            task_repo,
            event_repo,
            vaccine_repo,
            profile_repo,
        })
    }

    /// Create a test profile with default values and mark it active
    pub fn create_test_user(&self, user_id: &str) -> Result<DomainProfile> {
        let profile = DomainProfile {
            id: user_id.to_string(),
            name: "Test User".to_string(),
            email: format!("{}@example.com", user_id),
            is_admin: false,
            subscription_status: SubscriptionStatus::Trial,
            subscription_end_date: None,
        };

        self.profile_repo.store_profile(&profile)?;
        self.profile_repo.set_active_user(user_id)?;
        Ok(profile)
    }

    /// Create a test pet with default values for the given user
    pub fn create_test_pet(&self, user_id: &str, name: &str) -> Result<DomainPet> {
        let pet = DomainPet {
            id: DomainPet::generate_id(),
            name: name.to_string(),
            kind: PetKind::Dog,
            breed: None,
            size: None,
            birthday: None,
            current_weight: None,
            weight_unit: None,
            gender: None,
            coat_type: None,
            weight_history: Vec::new(),
            created_at: Utc::now(),
        };

        self.pet_repo.store_pet(user_id, &pet)?;
        Ok(pet)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_environment_cleanup() -> Result<()> {
        let base_path;
        {
            let env = TestEnvironment::new()?;
            base_path = env.base_path.clone();
            assert!(base_path.exists());
            // Environment dropped here
        }
        assert!(!base_path.exists());
        Ok(())
    }

    #[test]
    fn test_repository_helper() -> Result<()> {
        let helper = TestHelper::new()?;

        let profile = helper.create_test_user("user-1")?;
        assert_eq!(helper.profile_repo.get_active_user()?, Some(profile.id.clone()));

        let pet = helper.create_test_pet("user-1", "Luna")?;
        let loaded = helper.pet_repo.get_pet("user-1", &pet.id)?;
        assert!(loaded.is_some());

        Ok(())
    }
}
