//! Domain model for the country catalog.
//!
//! # Responsibility
//! - Define the canonical country record shared by repository and service.
//! - Keep identity and validation rules in one place.
//!
//! # Invariants
//! - Every persisted row is identified by its ISO-3166 alpha-3 `code`.
//! - Write paths must pass `CountryRecord::validate()` before persistence.

pub mod country;
