//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the data-access contract consumed by the service layer.
//! - Isolate SQLite query details from service/business orchestration.
//!
//! # Invariants
//! - Repository writes must enforce `CountryRecord::validate()` before
//!   persistence.
//! - Read paths reject invalid persisted state instead of masking it.

pub mod country_repo;
