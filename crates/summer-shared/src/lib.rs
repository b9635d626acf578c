//! # Summer Shared
//!
//! Wire types for the Summer HTTP API, shared between the server and any
//! Rust client.

pub mod dto;
pub mod response;

pub use response::{ErrorResponse, MessageResponse, SuccessResponse};
