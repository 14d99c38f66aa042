//! Core domain logic for the Atlas country catalog.
//! This crate is the single source of truth for business invariants.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use db::{open_db, open_db_in_memory, DbError, DbResult};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::country::{Continent, CountryRecord, CountryValidationError};
pub use repo::country_repo::{
    CountryLanguageCount, CountryRepository, RepoError, RepoResult, SqliteCountryRepository,
};
pub use service::country_service::{
    CountryService, CountryServiceError, CountryUpdate, CountryView, LanguageView,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
