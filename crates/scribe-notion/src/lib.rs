//! # scribe-notion
//!
//! Notion REST client for scribe.
//!
//! Thin wrapper over the Notion v1 API: OAuth code exchange, database
//! provisioning, page creation, and database retrieval. The `Notion-Version`
//! header is pinned; all requests carry explicit timeouts. Sync through this
//! crate is at-most-once and best-effort: callers log and swallow failures
//! on the mirror path rather than failing their primary operation.

pub mod blocks;
pub mod client;
pub mod oauth;

pub use client::{CreatedDatabase, DatabaseInfo, DatabaseParent, NotionClient};
pub use oauth::{NotionOAuth, OAuthTokens};

/// Normalize a Notion database id to the hyphenated UUID form.
///
/// Accepts both hyphenated and bare 32-hex-character ids; anything else is
/// returned unchanged and left for the API to reject.
pub fn normalize_database_id(raw: &str) -> String {
    let bare: String = raw.chars().filter(|c| *c != '-').collect();
    if bare.len() != 32 || !bare.chars().all(|c| c.is_ascii_hexdigit()) {
        return raw.to_string();
    }

    format!(
        "{}-{}-{}-{}-{}",
        &bare[0..8],
        &bare[8..12],
        &bare[12..16],
        &bare[16..20],
        &bare[20..32]
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_id_gains_hyphens() {
        assert_eq!(
            normalize_database_id("19bd365876894610978d0260a48d9885"),
            "19bd3658-7689-4610-978d-0260a48d9885"
        );
    }

    #[test]
    fn hyphenated_id_is_unchanged() {
        assert_eq!(
            normalize_database_id("19bd3658-7689-4610-978d-0260a48d9885"),
            "19bd3658-7689-4610-978d-0260a48d9885"
        );
    }

    #[test]
    fn non_hex_input_passes_through() {
        assert_eq!(normalize_database_id("not-a-database-id"), "not-a-database-id");
        assert_eq!(normalize_database_id(""), "");
    }

    #[test]
    fn wrong_length_passes_through() {
        assert_eq!(normalize_database_id("19bd3658"), "19bd3658");
    }
}
