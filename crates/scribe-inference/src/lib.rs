//! # scribe-inference
//!
//! LLM analyzer for scribe.
//!
//! This crate provides:
//! - The [`Analyzer`] with one operation per content type (note, document,
//!   diary message, chat report, friend profile, monthly report/summary)
//! - A DeepSeek (OpenAI-compatible) generation backend
//! - The textual fallback chain for chat reports
//! - A mock backend for tests
//!
//! The analyzer is constructed over any [`scribe_core::GenerationBackend`],
//! so tests run against canned responses and the server runs against
//! DeepSeek.

pub mod analyzer;
pub mod deepseek;
pub mod mock;

// Re-export core types
pub use scribe_core::{Error, Result};

pub use analyzer::{basic_chat_report, Analyzer};
pub use deepseek::{DeepSeekBackend, DeepSeekConfig};
pub use mock::MockBackend;
