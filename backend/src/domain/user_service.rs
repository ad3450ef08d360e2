use anyhow::Result;
use log::{debug, info, warn};
use std::sync::Arc;

use crate::domain::models::Profile;
use crate::storage::csv::{CsvConnection, ProfileRepository};
use crate::storage::traits::ProfileStorage;

/// Service for managing user profiles and active-user resolution
#[derive(Clone)]
pub struct UserService {
    profile_repository: ProfileRepository,
}

impl UserService {
    /// Create a new UserService
    pub fn new(csv_conn: Arc<CsvConnection>) -> Self {
        let profile_repository = ProfileRepository::new(csv_conn);
        Self { profile_repository }
    }

    /// Store or replace a user profile
    pub fn store_profile(&self, profile: &Profile) -> Result<()> {
        info!("Storing profile for user: {}", profile.id);
        self.profile_repository.store_profile(profile)
    }

    /// Get a profile by user ID
    pub fn get_profile(&self, user_id: &str) -> Result<Option<Profile>> {
        let profile = self.profile_repository.get_profile(user_id)?;
        if profile.is_none() {
            warn!("Profile not found: {}", user_id);
        }
        Ok(profile)
    }

    /// Find a profile by email address
    pub fn find_profile_by_email(&self, email: &str) -> Result<Option<Profile>> {
        self.profile_repository.find_profile_by_email(email)
    }

    /// List all profiles
    pub fn list_profiles(&self) -> Result<Vec<Profile>> {
        self.profile_repository.list_profiles()
    }

    /// Set the currently active user
    pub fn set_active_user(&self, user_id: &str) -> Result<()> {
        self.profile_repository.set_active_user(user_id)
    }

    /// Get the profile of the currently active user, if one is set
    pub fn get_active_profile(&self) -> Result<Option<Profile>> {
        match self.profile_repository.get_active_user()? {
            Some(user_id) => self.get_profile(&user_id),
            None => {
                debug!("No active user set");
                Ok(None)
            }
        }
    }

    /// Resolve an optional explicit user ID to a concrete one, falling back
    /// to the configured active user. Commands carry `None` in the common
    /// single-user case.
    pub fn resolve_user_id(&self, explicit: Option<String>) -> Result<String> {
        if let Some(user_id) = explicit {
            return Ok(user_id);
        }

        self.profile_repository
            .get_active_user()?
            .ok_or_else(|| anyhow::anyhow!("No user specified and no active user configured"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::SubscriptionStatus;
    use tempfile::TempDir;

    fn setup_test_service() -> (UserService, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let connection = Arc::new(CsvConnection::new(temp_dir.path()).unwrap());
        (UserService::new(connection), temp_dir)
    }

    fn sample_profile(id: &str) -> Profile {
        Profile {
            id: id.to_string(),
            name: "Test User".to_string(),
            email: format!("{}@example.com", id),
            is_admin: false,
            subscription_status: SubscriptionStatus::Trial,
            subscription_end_date: None,
        }
    }

    #[test]
    fn test_resolve_user_id_prefers_explicit() {
        let (service, _temp_dir) = setup_test_service();

        service.store_profile(&sample_profile("user-1")).unwrap();
        service.store_profile(&sample_profile("user-2")).unwrap();
        service.set_active_user("user-1").unwrap();

        assert_eq!(service.resolve_user_id(Some("user-2".to_string())).unwrap(), "user-2");
        assert_eq!(service.resolve_user_id(None).unwrap(), "user-1");
    }

    #[test]
    fn test_resolve_user_id_without_active_user_fails() {
        let (service, _temp_dir) = setup_test_service();
        assert!(service.resolve_user_id(None).is_err());
    }

    #[test]
    fn test_get_active_profile() {
        let (service, _temp_dir) = setup_test_service();
        assert!(service.get_active_profile().unwrap().is_none());

        service.store_profile(&sample_profile("user-1")).unwrap();
        service.set_active_user("user-1").unwrap();

        let active = service.get_active_profile().unwrap().unwrap();
        assert_eq!(active.id, "user-1");
    }
}
