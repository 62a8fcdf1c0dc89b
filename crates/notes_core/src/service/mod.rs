//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into use-case level APIs.
//! - Resolve the current user so callers never pass ownership by hand.

pub mod account_service;
pub mod storage_service;
