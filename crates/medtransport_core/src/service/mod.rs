//! Core use-case services.
//!
//! # Responsibility
//! - Gate repository reads behind the authorization collaborator.
//! - Keep request/CLI layers decoupled from storage details.

pub mod scheduling_service;
