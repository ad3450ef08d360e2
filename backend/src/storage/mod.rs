//! # Storage Layer
//!
//! Storage abstraction traits plus the CSV/YAML file-backed implementation.
//! Each user owns a directory under the base data directory; flat entity
//! collections live in CSV files, nested records in YAML.

pub mod csv;
pub mod traits;

pub use traits::{EventStorage, PetStorage, ProfileStorage, TaskStorage, VaccineStorage};
