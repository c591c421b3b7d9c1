//! # scribe-core
//!
//! Core types, traits, and abstractions for scribe.
//!
//! This crate provides the foundational data structures and trait definitions
//! that the other scribe crates depend on: the error taxonomy, the domain
//! models with their validated enumerations, the chat-transcript parser, and
//! the repository/inference seams.

pub mod chat;
pub mod defaults;
pub mod error;
pub mod models;
pub mod traits;

// Re-export commonly used types at crate root
pub use chat::parse_transcript;
pub use error::{Error, Result};
pub use models::*;
pub use traits::*;
