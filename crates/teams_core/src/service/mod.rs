//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate allocator and repository calls into use-case level APIs.
//! - Keep transport layers decoupled from storage details.

pub mod group_service;
pub mod import_endpoint;
pub mod import_service;
