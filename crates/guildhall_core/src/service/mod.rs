//! Use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into use-case level APIs.
//! - Keep callers decoupled from storage details.

pub mod activity_service;
pub mod link_service;
pub mod notification_service;
pub mod report_service;
