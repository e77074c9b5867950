//! Presentation Layer
//!
//! HTTP surface: form DTOs, session cookie plumbing, handlers, router.

pub mod dto;
pub mod handlers;
pub mod router;
pub mod session_layer;
