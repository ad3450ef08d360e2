//! Domain layer: models, pure scheduling/gating rules, and the services that
//! orchestrate them over the storage traits.

pub mod access;
pub mod agenda;
pub mod commands;
pub mod dates;
pub mod event_service;
pub mod models;
pub mod pet_service;
pub mod report_service;
pub mod subscription_service;
pub mod task_service;
pub mod user_service;
pub mod vaccine_service;

pub use agenda::AgendaService;
pub use event_service::EventService;
pub use pet_service::PetService;
pub use report_service::ReportService;
pub use subscription_service::SubscriptionService;
pub use task_service::TaskService;
pub use user_service::UserService;
pub use vaccine_service::VaccineService;
