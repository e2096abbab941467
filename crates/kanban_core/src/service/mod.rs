//! Core use-case services.
//!
//! # Responsibility
//! - Wrap the pure reducer with persistence, logging and warning collection.
//! - Keep the presentation layer decoupled from storage details.

pub mod board_service;
