//! Domain Layer
//!
//! Entities, value objects, and the store/guard abstractions.

pub mod entity {
    pub mod session;
    pub mod user;
}

pub mod value_object {
    pub mod email;
    pub mod password;
}

pub mod guard;
pub mod repository;
