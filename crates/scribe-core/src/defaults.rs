//! Centralized default constants for scribe.
//!
//! **This module is the single source of truth** for shared default values.
//! All crates reference these constants instead of defining their own magic
//! numbers.

// =============================================================================
// ANALYZER
// =============================================================================

/// Default DeepSeek API endpoint (OpenAI-compatible).
pub const DEEPSEEK_URL: &str = "https://api.deepseek.com";

/// Default generation model.
pub const GEN_MODEL: &str = "deepseek-chat";

/// Timeout for generation requests (seconds).
pub const GEN_TIMEOUT_SECS: u64 = 120;

/// Minimum tag count an analysis must produce.
pub const MIN_TAGS: usize = 3;

/// Maximum tag count an analysis must produce.
pub const MAX_TAGS: usize = 5;

// =============================================================================
// DOCUMENTS
// =============================================================================

/// Maximum raw upload size in bytes (25 MB).
pub const MAX_DOCUMENT_BYTES: u64 = 25 * 1024 * 1024;

/// Maximum decoded text length in characters.
pub const MAX_DOCUMENT_CHARS: usize = 200_000;

// =============================================================================
// NOTION
// =============================================================================

/// Notion REST API base URL.
pub const NOTION_API_URL: &str = "https://api.notion.com/v1";

/// Pinned Notion-Version header value.
pub const NOTION_VERSION: &str = "2022-06-28";

/// Timeout for Notion requests (seconds).
pub const NOTION_TIMEOUT_SECS: u64 = 30;

// =============================================================================
// PAGINATION
// =============================================================================

/// Default page size for note and document listings.
pub const PAGE_LIMIT: usize = 10;

/// Default page number (1-based).
pub const PAGE_FIRST: usize = 1;

// =============================================================================
// AUTH
// =============================================================================

/// Minimum password length accepted at registration.
pub const MIN_PASSWORD_LEN: usize = 6;

/// Session token lifetime in days.
pub const SESSION_TTL_DAYS: i64 = 7;

// =============================================================================
// SERVER
// =============================================================================

/// Default HTTP server port.
pub const SERVER_PORT: u16 = 3000;

/// Request body limit in bytes. Slightly above the document cap so a 25 MB
/// file still fits inside its multipart framing.
pub const BODY_LIMIT_BYTES: usize = 26 * 1024 * 1024;
