//! Handler modules for scribe-api.

pub mod auth;
pub mod chat;
pub mod documents;
pub mod notes;
pub mod notion;
pub mod reports;
pub mod system;
pub mod wechat;
