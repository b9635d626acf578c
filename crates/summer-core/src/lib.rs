//! # Summer Core
//!
//! The domain layer of the Summer social backend.
//! This crate contains users, posts and the like-toggle transition, the
//! port traits infrastructure must implement, and the services that drive
//! them. It has zero infrastructure dependencies.

pub mod domain;
pub mod error;
pub mod ports;
pub mod services;
pub mod validation;

pub use error::DomainError;
pub use services::{PostService, UserService};
