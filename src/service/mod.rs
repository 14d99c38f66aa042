//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into caller-facing APIs.
//! - Keep outer layers decoupled from storage details.

pub mod country_service;
