use anyhow::Result;
use log::info;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// CsvConnection manages file paths and ensures data files exist for each
/// user directory.
#[derive(Clone)]
pub struct CsvConnection {
    base_directory: Arc<Mutex<PathBuf>>,
}

impl CsvConnection {
    /// Create a new CSV connection with a base directory
    pub fn new<P: AsRef<Path>>(base_directory: P) -> Result<Self> {
        let base_path = base_directory.as_ref().to_path_buf();

        // Create the base directory if it doesn't exist
        if !base_path.exists() {
            fs::create_dir_all(&base_path)?;
        }

        Ok(Self {
            base_directory: Arc::new(Mutex::new(base_path)),
        })
    }

    /// Create a new CSV connection in the default data directory.
    /// Honors the PAWTRACK_DATA_DIR environment variable, falling back to
    /// ~/Documents/Pawtrack.
    pub fn new_default() -> Result<Self> {
        if let Ok(dir) = std::env::var("PAWTRACK_DATA_DIR") {
            info!("Using data directory from PAWTRACK_DATA_DIR: {}", dir);
            return Self::new(dir);
        }

        let home_dir = std::env::var("HOME")
            .or_else(|_| std::env::var("USERPROFILE"))
            .map_err(|_| anyhow::anyhow!("Could not determine home directory"))?;

        let data_dir = PathBuf::from(home_dir).join("Documents").join("Pawtrack");
        info!("Using default data directory: {}", data_dir.display());
        Self::new(data_dir)
    }

    /// Generate a safe filesystem directory name from a user ID.
    /// Identity-provider IDs can contain characters that are awkward in
    /// paths, so anything non-alphanumeric collapses to an underscore.
    pub fn safe_directory_name(user_id: &str) -> String {
        let mut result = String::with_capacity(user_id.len());
        let mut last_was_underscore = false;

        for c in user_id.chars() {
            if c.is_ascii_alphanumeric() {
                result.push(c.to_ascii_lowercase());
                last_was_underscore = false;
            } else if !last_was_underscore {
                result.push('_');
                last_was_underscore = true;
            }
        }

        result.trim_matches('_').to_string()
    }

    /// Get the directory path for a user's data
    pub fn get_user_directory(&self, user_id: &str) -> PathBuf {
        let base_dir = self.base_directory.lock().unwrap();
        base_dir.join(Self::safe_directory_name(user_id))
    }

    /// Ensure a CSV file exists with the given header inside the user's
    /// directory, creating the directory as needed.
    pub fn ensure_csv_file_exists(&self, user_id: &str, file_name: &str, header: &str) -> Result<PathBuf> {
        let user_dir = self.get_user_directory(user_id);

        if !user_dir.exists() {
            fs::create_dir_all(&user_dir)?;
        }

        let file_path = user_dir.join(file_name);
        if !file_path.exists() {
            fs::write(&file_path, format!("{}\n", header))?;
        }

        Ok(file_path)
    }

    /// Get the base directory path
    pub fn base_directory(&self) -> PathBuf {
        let base_dir = self.base_directory.lock().unwrap();
        base_dir.clone()
    }

    /// Get the path to the global configuration file
    pub fn global_config_path(&self) -> PathBuf {
        self.base_directory().join("global_config.yaml")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_safe_directory_name() {
        assert_eq!(CsvConnection::safe_directory_name("user-123"), "user_123");
        assert_eq!(CsvConnection::safe_directory_name("A.B@c"), "a_b_c");
        assert_eq!(CsvConnection::safe_directory_name("__x__"), "x");
    }

    #[test]
    fn test_ensure_csv_file_creates_header_once() {
        let temp_dir = TempDir::new().unwrap();
        let connection = CsvConnection::new(temp_dir.path()).unwrap();

        let path = connection
            .ensure_csv_file_exists("user-1", "tasks.csv", "id,pet_id,name")
            .unwrap();
        assert!(path.exists());

        // Appending data then re-ensuring must not truncate
        std::fs::write(&path, "id,pet_id,name\ntask::1,pet::1,Brush\n").unwrap();
        connection
            .ensure_csv_file_exists("user-1", "tasks.csv", "id,pet_id,name")
            .unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("task::1"));
    }
}
