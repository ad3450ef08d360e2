//! Domain models.
//!
//! Pet, Task and Profile carry real chrono timestamps internally and convert
//! to the string-dated DTOs in `shared` at the API boundary. Events and
//! vaccines are pure string records with no lifecycle, so the shared DTOs are
//! used directly for them.

pub mod pet;
pub mod profile;
pub mod task;

pub use pet::Pet;
pub use profile::Profile;
pub use task::{Task, TaskStatus};

// Pure records, used as-is throughout the domain.
pub use shared::{Event, Vaccine, WeightEntry};
