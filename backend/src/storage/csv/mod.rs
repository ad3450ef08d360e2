//! # CSV/YAML Storage Implementation
//!
//! File-backed storage: one directory per user under the base data
//! directory. Flat collections (tasks, events, vaccines) live in CSV files;
//! nested records (pets with weight history, the profile) live in YAML.
//! Every write goes through a temp file and an atomic rename.

pub mod connection;
pub mod event_repository;
pub mod pet_repository;
pub mod profile_repository;
pub mod task_repository;
pub mod vaccine_repository;

#[cfg(test)]
pub mod test_utils;

pub use connection::CsvConnection;
pub use event_repository::EventRepository;
pub use pet_repository::PetRepository;
pub use profile_repository::ProfileRepository;
pub use task_repository::TaskRepository;
pub use vaccine_repository::VaccineRepository;
