use anyhow::Result;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use super::connection::CsvConnection;
use crate::domain::models::Profile as DomainProfile;
use crate::storage::traits::ProfileStorage;
use shared::SubscriptionStatus;

const PROFILE_FILE: &str = "profile.yaml";

/// Intermediate struct for YAML serialization with string date fields
#[derive(Debug, Clone, Serialize, Deserialize)]
struct YamlProfile {
    id: String,
    name: String,
    email: String,
    is_admin: bool,
    subscription_status: String,
    subscription_end_date: Option<String>, // String representation for YAML
}

fn status_to_str(status: SubscriptionStatus) -> &'static str {
    match status {
        SubscriptionStatus::Trial => "trial",
        SubscriptionStatus::Active => "active",
        SubscriptionStatus::Expired => "expired",
        SubscriptionStatus::Canceled => "canceled",
    }
}

fn parse_status(raw: &str) -> SubscriptionStatus {
    match raw {
        "active" => SubscriptionStatus::Active,
        "expired" => SubscriptionStatus::Expired,
        "canceled" => SubscriptionStatus::Canceled,
        "trial" => SubscriptionStatus::Trial,
        other => {
            warn!("Unknown subscription status '{}', treating as trial", other);
            SubscriptionStatus::Trial
        }
    }
}

/// YAML-based profile repository using filesystem discovery: each user
/// directory holds a profile.yaml, and the active user lives in the global
/// config file.
#[derive(Clone)]
pub struct ProfileRepository {
    connection: Arc<CsvConnection>,
}

impl ProfileRepository {
    /// Create a new profile repository
    pub fn new(connection: Arc<CsvConnection>) -> Self {
        Self { connection }
    }

    fn get_profile_yaml_path(&self, user_id: &str) -> PathBuf {
        self.connection.get_user_directory(user_id).join(PROFILE_FILE)
    }

    fn load_profile_from_path(&self, yaml_path: &PathBuf) -> Result<Option<DomainProfile>> {
        if !yaml_path.exists() {
            return Ok(None);
        }

        let yaml_content = fs::read_to_string(yaml_path)?;
        let yaml_profile: YamlProfile = serde_yaml::from_str(&yaml_content)?;

        let subscription_end_date = match yaml_profile.subscription_end_date {
            Some(raw) => Some(
                chrono::DateTime::parse_from_rfc3339(&raw)
                    .map_err(|e| anyhow::anyhow!("Failed to parse subscription end date: {}", e))?
                    .with_timezone(&chrono::Utc),
            ),
            None => None,
        };

        Ok(Some(DomainProfile {
            id: yaml_profile.id,
            name: yaml_profile.name,
            email: yaml_profile.email,
            is_admin: yaml_profile.is_admin,
            subscription_status: parse_status(&yaml_profile.subscription_status),
            subscription_end_date,
        }))
    }

    /// Discover all profiles by scanning user directories
    fn discover_profiles(&self) -> Result<Vec<DomainProfile>> {
        let base_dir = self.connection.base_directory();

        if !base_dir.exists() {
            debug!("Base directory doesn't exist, returning empty profile list");
            return Ok(Vec::new());
        }

        let mut profiles = Vec::new();

        for entry in fs::read_dir(base_dir)? {
            let entry = entry?;
            let path = entry.path();

            if !path.is_dir() {
                continue;
            }

            match self.load_profile_from_path(&path.join(PROFILE_FILE)) {
                Ok(Some(profile)) => {
                    debug!("Discovered profile: {} in {:?}", profile.id, path);
                    profiles.push(profile);
                }
                Ok(None) => {
                    debug!("Directory {:?} doesn't contain a profile", path);
                }
                Err(e) => {
                    warn!("Error loading profile from {:?}: {}", path, e);
                }
            }
        }

        profiles.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(profiles)
    }
}

impl ProfileStorage for ProfileRepository {
    fn store_profile(&self, profile: &DomainProfile) -> Result<()> {
        let user_dir = self.connection.get_user_directory(&profile.id);
        if !user_dir.exists() {
            fs::create_dir_all(&user_dir)?;
            info!("Created user directory: {:?}", user_dir);
        }

        let yaml_profile = YamlProfile {
            id: profile.id.clone(),
            name: profile.name.clone(),
            email: profile.email.clone(),
            is_admin: profile.is_admin,
            subscription_status: status_to_str(profile.subscription_status).to_string(),
            subscription_end_date: profile.subscription_end_date.map(|t| t.to_rfc3339()),
        };

        let yaml_path = self.get_profile_yaml_path(&profile.id);
        let yaml_content = serde_yaml::to_string(&yaml_profile)?;

        // Atomic write using temp file
        let temp_path = yaml_path.with_extension("tmp");
        fs::write(&temp_path, yaml_content)?;
        fs::rename(&temp_path, &yaml_path)?;

        info!("Saved profile for user: {}", profile.id);

        Ok(())
    }

    fn get_profile(&self, user_id: &str) -> Result<Option<DomainProfile>> {
        self.load_profile_from_path(&self.get_profile_yaml_path(user_id))
    }

    fn find_profile_by_email(&self, email: &str) -> Result<Option<DomainProfile>> {
        let needle = email.to_lowercase();
        let profiles = self.discover_profiles()?;
        Ok(profiles.into_iter().find(|p| p.email.to_lowercase() == needle))
    }

    fn list_profiles(&self) -> Result<Vec<DomainProfile>> {
        self.discover_profiles()
    }

    fn get_active_user(&self) -> Result<Option<String>> {
        let global_config_path = self.connection.global_config_path();

        if !global_config_path.exists() {
            return Ok(None);
        }

        let yaml_content = fs::read_to_string(&global_config_path)?;
        let config: serde_yaml::Value = serde_yaml::from_str(&yaml_content)?;

        Ok(config
            .get("active_user_id")
            .and_then(|v| v.as_str())
            .map(|s| s.to_string()))
    }

    fn set_active_user(&self, user_id: &str) -> Result<()> {
        if self.get_profile(user_id)?.is_none() {
            return Err(anyhow::anyhow!("User not found: {}", user_id));
        }

        let global_config_path = self.connection.global_config_path();

        let mut config = serde_yaml::Value::Mapping(serde_yaml::Mapping::new());
        config["active_user_id"] = serde_yaml::Value::String(user_id.to_string());
        config["data_format_version"] = serde_yaml::Value::String("1.0".to_string());

        let yaml_content = serde_yaml::to_string(&config)?;

        // Atomic write using temp file
        let temp_path = global_config_path.with_extension("tmp");
        fs::write(&temp_path, yaml_content)?;
        fs::rename(&temp_path, &global_config_path)?;

        info!("Set active user to: {}", user_id);
        Ok(())
    }
}
