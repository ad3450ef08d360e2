//! # Pawtrack Backend
//!
//! Backend library for the Pawtrack pet-care tracker. The domain layer holds
//! the scheduling and access-gating rules, the storage layer persists entity
//! data to per-user CSV/YAML files, and the session layer models the client
//! orchestration (bounded session checks, joined data loading, gated access).
//! The REST layer exposes the services over HTTP, including the payment
//! webhook that mutates subscription state.

pub mod domain;
pub mod rest;
pub mod session;
pub mod storage;

pub use storage::csv::CsvConnection;
