//! Platform Crate - Technical Infrastructure
//!
//! This crate provides shared technical foundations:
//! - Password hashing (Argon2id, NIST SP 800-63B compliant)
//! - Cookie management
//! - Random token generation and constant-time comparison

pub mod cookie;
pub mod password;
pub mod token;
