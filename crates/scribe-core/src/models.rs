//! Domain models for scribe.
//!
//! Every analyzed record carries the full structured schema for its content
//! type; producing calls fail rather than store a partial record. Category
//! and priority are closed enums so an out-of-range analyzer answer is a
//! deserialization error, not silently stored free text.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::Error;

// =============================================================================
// ENUMERATIONS
// =============================================================================

/// Content category shared by notes and documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "日常")]
    Daily,
    #[serde(rename = "工作")]
    Work,
    #[serde(rename = "学习")]
    Study,
    #[serde(rename = "其他")]
    Other,
}

impl Category {
    /// The wire/display label for this category.
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Daily => "日常",
            Category::Work => "工作",
            Category::Study => "学习",
            Category::Other => "其他",
        }
    }

    /// All categories in display order.
    pub fn all() -> [Category; 4] {
        [
            Category::Daily,
            Category::Work,
            Category::Study,
            Category::Other,
        ]
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "日常" => Ok(Category::Daily),
            "工作" => Ok(Category::Work),
            "学习" => Ok(Category::Study),
            "其他" => Ok(Category::Other),
            other => Err(Error::InvalidInput(format!("unknown category: {}", other))),
        }
    }
}

/// Importance level assigned by the analyzer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Priority {
    #[serde(rename = "低")]
    Low,
    #[serde(rename = "中")]
    Medium,
    #[serde(rename = "高")]
    High,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "低",
            Priority::Medium => "中",
            Priority::High => "高",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// ANALYSIS RESULTS
// =============================================================================

/// Structured analysis of free-text note content.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NoteAnalysis {
    pub title: String,
    pub summary: String,
    pub category: Category,
    pub tags: Vec<String>,
    pub priority: Priority,
    pub action_items: Vec<String>,
    pub insights: Vec<String>,
}

/// Structured analysis of an uploaded document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentAnalysis {
    pub title: String,
    pub summary: String,
    pub category: Category,
    pub tags: Vec<String>,
    pub key_points: Vec<String>,
    pub action_items: Vec<String>,
    /// Document kind as free text: 报告, 方案, 笔记, 资料…
    pub document_type: String,
}

/// Structured analysis of a diary message (WeChat channel).
///
/// Unlike notes and documents, diary categories are free text (生活, 工作,
/// 学习, 感悟, 计划…) because the upstream schema leaves them open.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiaryAnalysis {
    pub title: String,
    pub summary: String,
    pub emotion: String,
    pub keywords: Vec<String>,
    pub category: String,
    /// Mood score, 1–10.
    pub mood_score: u8,
    pub structured_content: String,
    pub insights: Vec<String>,
}

/// A diary entry produced from an inbound channel message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiaryEntry {
    pub user_id: String,
    pub original_content: String,
    #[serde(flatten)]
    pub analysis: DiaryAnalysis,
    pub created_at: DateTime<Utc>,
    pub processed_at: DateTime<Utc>,
}

// =============================================================================
// NOTES & DOCUMENTS
// =============================================================================

/// A stored note: original text plus its analysis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Note {
    pub id: Uuid,
    pub user_id: String,
    pub original_content: String,
    #[serde(flatten)]
    pub analysis: NoteAnalysis,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Note {
    /// Build a new note from its analysis. IDs are UUIDv7 so creation order
    /// is recoverable from the id alone.
    pub fn new(user_id: String, original_content: String, analysis: NoteAnalysis) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            user_id,
            original_content,
            analysis,
            created_at: now,
            updated_at: now,
        }
    }
}

/// A stored document: uploaded file metadata, text, and analysis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub id: Uuid,
    pub user_id: String,
    pub file_name: String,
    pub file_size: u64,
    pub original_content: String,
    #[serde(flatten)]
    pub analysis: DocumentAnalysis,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Document {
    pub fn new(
        user_id: String,
        file_name: String,
        file_size: u64,
        original_content: String,
        analysis: DocumentAnalysis,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            user_id,
            file_name,
            file_size,
            original_content,
            analysis,
            created_at: now,
            updated_at: now,
        }
    }

    /// Listing/detail view without the original text (bandwidth).
    pub fn summary(&self) -> DocumentSummary {
        DocumentSummary {
            id: self.id,
            user_id: self.user_id.clone(),
            file_name: self.file_name.clone(),
            file_size: self.file_size,
            analysis: self.analysis.clone(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// Document view with the original content stripped.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentSummary {
    pub id: Uuid,
    pub user_id: String,
    pub file_name: String,
    pub file_size: u64,
    #[serde(flatten)]
    pub analysis: DocumentAnalysis,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// USERS & NOTION CREDENTIALS
// =============================================================================

/// A registered user. The password is stored as a SHA-256 hex digest.
#[derive(Debug, Clone)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

/// Public projection of a user, safe to return to clients.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserPublic {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub notion_connected: bool,
}

/// Per-user Notion capability credential, scoped to one workspace.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotionAuth {
    pub user_id: String,
    pub access_token: String,
    pub workspace_id: Option<String>,
    pub workspace_name: Option<String>,
    pub bot_id: Option<String>,
    pub database_id: Option<String>,
    pub database_name: Option<String>,
    pub authorized_at: DateTime<Utc>,
}

// =============================================================================
// CHAT REPORTS
// =============================================================================

/// One parsed chat message. Derived and non-authoritative; discarded after
/// report generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub sender: String,
    pub time: String,
    pub content: String,
}

/// A diary-style report generated from a chat transcript.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatReport {
    pub date: String,
    pub friend: String,
    pub original_chat: String,
    pub narrative: String,
    pub emotions: Vec<String>,
    pub messages: Vec<ChatMessage>,
}

/// Personality profile of a chat partner.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FriendProfile {
    pub name: String,
    pub personality: String,
    pub relationship_type: String,
    pub common_topics: Vec<String>,
    pub communication_style: String,
    pub emotional_tone: String,
}

// =============================================================================
// MONTHLY REPORTS
// =============================================================================

/// Locally computed month statistics (never delegated to the analyzer).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonthlyStatistics {
    pub total_notes: usize,
    pub total_documents: usize,
    pub category_breakdown: BTreeMap<String, usize>,
    pub most_active_day: String,
}

/// Per-category narrative sections of a monthly report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryAnalysis {
    pub work: String,
    pub study: String,
    pub daily: String,
}

/// Analyzer-produced portion of a monthly report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonthlyReportAnalysis {
    pub title: String,
    pub summary: String,
    pub highlights: Vec<String>,
    pub insights: Vec<String>,
    pub action_items: Vec<String>,
    pub category_analysis: CategoryAnalysis,
}

/// A complete monthly report over a user's notes and documents.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonthlyReport {
    #[serde(flatten)]
    pub analysis: MonthlyReportAnalysis,
    pub statistics: MonthlyStatistics,
    pub year: i32,
    pub month: u32,
    pub user_id: String,
    pub created_at: DateTime<Utc>,
}

/// One frequently contacted friend in a monthly chat summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopFriend {
    pub name: String,
    pub chat_count: u32,
    pub main_topics: Vec<String>,
    pub emotional_tone: String,
}

/// One emotion trend entry in a monthly chat summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmotionalTrend {
    pub emotion: String,
    pub frequency: u32,
    pub description: String,
}

/// One word-cloud entry in a monthly chat summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WordEntry {
    pub word: String,
    pub frequency: u32,
}

/// Monthly summary over chat reports.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonthlySummary {
    pub total_chats: u32,
    pub top_friends: Vec<TopFriend>,
    pub emotional_trends: Vec<EmotionalTrend>,
    pub highlights: Vec<String>,
    pub word_cloud: Vec<WordEntry>,
    pub summary: String,
    pub insights: Vec<String>,
}
