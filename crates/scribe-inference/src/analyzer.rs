//! Content analyzer: turns free text into structured records.
//!
//! Each content type has a fixed output schema; the prompt states the JSON
//! shape and the response is parsed into the matching typed result. An
//! unparsable response is an [`Error::Inference`]; only the chat-report
//! path degrades further, first to a plain-text generation with line-prefix
//! extraction, leaving the no-model fallback to the caller.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;
use tracing::{debug, warn};

use scribe_core::defaults::{MAX_TAGS, MIN_TAGS};
use scribe_core::{
    parse_transcript, ChatReport, DiaryAnalysis, DocumentAnalysis, Error, FriendProfile,
    GenerationBackend, MonthlyReportAnalysis, MonthlySummary, NoteAnalysis, Result,
};

/// Analyzer over a pluggable generation backend.
pub struct Analyzer {
    backend: Arc<dyn GenerationBackend>,
}

impl Analyzer {
    pub fn new(backend: Arc<dyn GenerationBackend>) -> Self {
        Self { backend }
    }

    /// Model identifier of the underlying backend.
    pub fn model_name(&self) -> &str {
        self.backend.model_name()
    }

    // -----------------------------------------------------------------------
    // Notes
    // -----------------------------------------------------------------------

    /// Analyze note text into the seven-field note schema.
    pub async fn analyze_note(&self, content: &str) -> Result<NoteAnalysis> {
        require_content(content)?;

        let prompt = format!(
            r#"请分析以下笔记内容，将其结构化处理：

笔记内容：
{content}

请严格按照以下JSON格式返回：
{{
  "title": "简洁有吸引力的标题",
  "summary": "核心要点摘要",
  "category": "日常 | 工作 | 学习 | 其他（四选一）",
  "tags": ["关键词标签，3-5个"],
  "priority": "低 | 中 | 高（三选一）",
  "action_items": ["可执行的行动项"],
  "insights": ["深度洞察和思考点"]
}}

请用中文回复，只返回JSON对象，不要附加说明。"#
        );

        let raw = self.backend.generate(&prompt).await?;
        let mut analysis: NoteAnalysis = parse_structured(&raw)?;

        analysis.tags.truncate(MAX_TAGS);
        if analysis.tags.len() < MIN_TAGS {
            return Err(Error::Inference(format!(
                "analysis returned {} tags, expected {}-{}",
                analysis.tags.len(),
                MIN_TAGS,
                MAX_TAGS
            )));
        }

        debug!(title = %analysis.title, category = %analysis.category, "note analyzed");
        Ok(analysis)
    }

    // -----------------------------------------------------------------------
    // Documents
    // -----------------------------------------------------------------------

    /// Analyze an uploaded document's decoded text.
    pub async fn analyze_document(
        &self,
        file_name: &str,
        content: &str,
    ) -> Result<DocumentAnalysis> {
        require_content(content)?;

        let prompt = format!(
            r#"请分析以下文档内容，将其结构化处理：

文档名称：{file_name}
文档内容：
{content}

请严格按照以下JSON格式返回：
{{
  "title": "合适的文档标题",
  "summary": "200字以内的摘要",
  "category": "日常 | 工作 | 学习 | 其他（四选一）",
  "tags": ["关键词标签"],
  "key_points": ["关键要点，3-5个"],
  "action_items": ["可执行的行动项"],
  "document_type": "文档类型：报告、方案、笔记、资料等"
}}

请用中文回复，只返回JSON对象，不要附加说明。"#
        );

        let raw = self.backend.generate(&prompt).await?;
        let analysis: DocumentAnalysis = parse_structured(&raw)?;
        debug!(title = %analysis.title, document_type = %analysis.document_type, "document analyzed");
        Ok(analysis)
    }

    // -----------------------------------------------------------------------
    // Diary messages (WeChat channel)
    // -----------------------------------------------------------------------

    /// Analyze an inbound channel message into a diary record.
    pub async fn analyze_diary(
        &self,
        content: &str,
        timestamp: DateTime<Utc>,
    ) -> Result<DiaryAnalysis> {
        require_content(content)?;

        let prompt = format!(
            r#"请分析以下用户发送的文字内容，将其转化为结构化的日记记录：

用户内容：
{content}

发送时间：{}

请严格按照以下JSON格式返回：
{{
  "title": "吸引人的日记标题",
  "summary": "核心摘要",
  "emotion": "主要情绪：开心、平静、思考、焦虑、兴奋、感动等",
  "keywords": ["关键词标签，3-5个"],
  "category": "分类：生活、工作、学习、感悟、计划等",
  "mood_score": 7,
  "structured_content": "将原文优化为更好的日记格式",
  "insights": ["深度洞察和思考点"]
}}

mood_score 为 1-10 的心情指数。请用中文回复，只返回JSON对象，内容要有温度和深度。"#,
            timestamp.to_rfc3339()
        );

        let raw = self.backend.generate(&prompt).await?;
        let mut analysis: DiaryAnalysis = parse_structured(&raw)?;
        analysis.mood_score = analysis.mood_score.clamp(1, 10);
        debug!(title = %analysis.title, mood_score = analysis.mood_score, "diary analyzed");
        Ok(analysis)
    }

    // -----------------------------------------------------------------------
    // Chat reports
    // -----------------------------------------------------------------------

    /// Turn a chat transcript into a diary-style report.
    ///
    /// Tries the structured schema first; if the response cannot be parsed,
    /// falls back to plain-text generation with line-prefix extraction and
    /// the heuristic transcript parse.
    pub async fn chat_report(&self, chat_content: &str) -> Result<ChatReport> {
        require_content(chat_content)?;

        match self.chat_report_structured(chat_content).await {
            Ok(report) => Ok(report),
            Err(Error::Inference(msg)) => {
                warn!(error = %msg, "structured chat analysis failed, trying text fallback");
                self.chat_report_text_fallback(chat_content).await
            }
            Err(e) => Err(e),
        }
    }

    async fn chat_report_structured(&self, chat_content: &str) -> Result<ChatReport> {
        let prompt = format!(
            r#"请分析以下微信聊天记录，并生成一份温暖的日记报告。

聊天记录：
{chat_content}

请严格按照以下JSON格式返回：
{{
  "friend": "朋友的名字（优先使用备注名）",
  "narrative": "将聊天内容转化为第三人称的温暖叙述，像在讲述一个故事",
  "emotions": ["情感标签，3-5个，如：温馨、回忆、争论、欢乐"],
  "messages": [
    {{ "sender": "发送者", "time": "时间", "content": "消息内容" }}
  ]
}}

叙述要有温度，体现朋友间的情感和互动。请用中文回复，只返回JSON对象。"#
        );

        let raw = self.backend.generate(&prompt).await?;

        #[derive(serde::Deserialize)]
        struct ChatAnalysis {
            friend: String,
            narrative: String,
            emotions: Vec<String>,
            messages: Vec<scribe_core::ChatMessage>,
        }

        let analysis: ChatAnalysis = parse_structured(&raw)?;
        Ok(ChatReport {
            date: report_date(),
            friend: analysis.friend,
            original_chat: chat_content.to_string(),
            narrative: analysis.narrative,
            emotions: analysis.emotions,
            messages: analysis.messages,
        })
    }

    async fn chat_report_text_fallback(&self, chat_content: &str) -> Result<ChatReport> {
        let prompt = format!(
            r#"请分析以下微信聊天记录，并生成一份温暖的日记报告：

聊天记录：
{chat_content}

请按照以下格式回复：
朋友名字：[朋友的名字]
故事叙述：[第三人称温暖叙述]
情感标签：[标签1,标签2,标签3]

请用中文回复。"#
        );

        let text = self.backend.generate(&prompt).await?;

        let mut friend = "未知朋友".to_string();
        let mut narrative = "这是一段温暖的对话。".to_string();
        let mut emotions = vec!["温馨".to_string()];

        for line in text.lines() {
            if let Some(rest) = line.trim().strip_prefix("朋友名字：") {
                friend = rest.trim().to_string();
            } else if let Some(rest) = line.trim().strip_prefix("故事叙述：") {
                narrative = rest.trim().to_string();
            } else if let Some(rest) = line.trim().strip_prefix("情感标签：") {
                let parsed: Vec<String> = rest
                    .split([',', '，'])
                    .map(str::trim)
                    .filter(|e| !e.is_empty())
                    .map(str::to_string)
                    .collect();
                if !parsed.is_empty() {
                    emotions = parsed;
                }
            }
        }

        Ok(ChatReport {
            date: report_date(),
            friend,
            original_chat: chat_content.to_string(),
            narrative,
            emotions,
            messages: parse_transcript(chat_content),
        })
    }

    // -----------------------------------------------------------------------
    // Friend profiles
    // -----------------------------------------------------------------------

    /// Build a personality profile for a chat partner.
    pub async fn friend_profile(
        &self,
        friend_name: &str,
        chat_history: &str,
    ) -> Result<FriendProfile> {
        require_content(chat_history)?;

        let prompt = format!(
            r#"基于以下聊天记录，分析并生成朋友的个性画像：

朋友姓名：{friend_name}
聊天记录：
{chat_history}

请严格按照以下JSON格式返回：
{{
  "name": "朋友的名字或备注名",
  "personality": "性格特点描述",
  "relationship_type": "关系类型：朋友、同事、家人等",
  "common_topics": ["常聊话题"],
  "communication_style": "沟通风格",
  "emotional_tone": "情感基调"
}}

请用中文回复，分析要准确且有温度，只返回JSON对象。"#
        );

        let raw = self.backend.generate(&prompt).await?;
        parse_structured(&raw)
    }

    // -----------------------------------------------------------------------
    // Monthly reports
    // -----------------------------------------------------------------------

    /// Generate the narrative portion of a monthly report from note and
    /// document digests. Statistics are computed by the caller, never here.
    pub async fn monthly_report(
        &self,
        year: i32,
        month: u32,
        notes: &JsonValue,
        documents: &JsonValue,
    ) -> Result<MonthlyReportAnalysis> {
        let prompt = format!(
            r#"请基于以下{year}年{month}月的数据生成月度报告：

笔记数据：
{notes}

文档数据：
{documents}

请严格按照以下JSON格式返回：
{{
  "title": "月报标题",
  "summary": "全面的月度总结",
  "highlights": ["本月亮点"],
  "insights": ["深度洞察"],
  "action_items": ["下月行动计划"],
  "category_analysis": {{
    "work": "工作方面分析",
    "study": "学习方面分析",
    "daily": "日常方面分析"
  }}
}}

请用中文回复，内容要有深度和实用性，只返回JSON对象。"#,
            notes = serde_json::to_string_pretty(notes)?,
            documents = serde_json::to_string_pretty(documents)?,
        );

        let raw = self.backend.generate(&prompt).await?;
        parse_structured(&raw)
    }

    /// Generate a monthly summary over chat reports.
    pub async fn monthly_summary(
        &self,
        year: i32,
        month: u32,
        reports: &JsonValue,
    ) -> Result<MonthlySummary> {
        let prompt = format!(
            r#"请基于以下{year}年{month}月的聊天记录生成月度总结报告：

聊天记录数据：
{reports}

请严格按照以下JSON格式返回：
{{
  "total_chats": 0,
  "top_friends": [
    {{ "name": "朋友", "chat_count": 0, "main_topics": ["话题"], "emotional_tone": "基调" }}
  ],
  "emotional_trends": [
    {{ "emotion": "情感", "frequency": 0, "description": "描述" }}
  ],
  "highlights": ["本月重要时刻"],
  "word_cloud": [
    {{ "word": "词汇", "frequency": 0 }}
  ],
  "summary": "温暖的月度总结",
  "insights": ["深度洞察和建议"]
}}

请用中文回复，内容要有温度和深度，只返回JSON对象。"#,
            reports = serde_json::to_string_pretty(reports)?,
        );

        let raw = self.backend.generate(&prompt).await?;
        parse_structured(&raw)
    }
}

/// No-model last resort for chat reports: heuristic parse plus a canned
/// narrative. Used by callers when even the text fallback fails.
pub fn basic_chat_report(chat_content: &str) -> ChatReport {
    let messages = parse_transcript(chat_content);
    let friend = messages
        .first()
        .map(|m| m.sender.clone())
        .unwrap_or_else(|| "未知朋友".to_string());

    ChatReport {
        date: report_date(),
        friend,
        original_chat: chat_content.to_string(),
        narrative: "今天和朋友进行了一段有意义的对话，虽然无法生成详细分析，但这段对话记录了美好的时光。"
            .to_string(),
        emotions: vec!["温馨".to_string(), "友谊".to_string()],
        messages,
    }
}

fn report_date() -> String {
    Utc::now().format("%Y/%m/%d").to_string()
}

fn require_content(content: &str) -> Result<()> {
    if content.trim().is_empty() {
        return Err(Error::InvalidInput("content is required".to_string()));
    }
    Ok(())
}

/// Extract the JSON object from a model response, tolerating Markdown code
/// fences and prose around the object.
fn extract_json(raw: &str) -> Result<&str> {
    let start = raw
        .find('{')
        .ok_or_else(|| Error::Inference("response contains no JSON object".to_string()))?;
    let end = raw
        .rfind('}')
        .filter(|&end| end > start)
        .ok_or_else(|| Error::Inference("response contains no JSON object".to_string()))?;
    Ok(&raw[start..=end])
}

fn parse_structured<T: DeserializeOwned>(raw: &str) -> Result<T> {
    serde_json::from_str(extract_json(raw)?)
        .map_err(|e| Error::Inference(format!("response does not match schema: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockBackend;

    fn note_json() -> &'static str {
        r#"{
            "title": "周末计划",
            "summary": "安排周末的学习与休息",
            "category": "日常",
            "tags": ["周末", "计划", "休息"],
            "priority": "中",
            "action_items": ["整理书桌"],
            "insights": ["劳逸结合"]
        }"#
    }

    #[tokio::test]
    async fn analyze_note_parses_structured_response() {
        let analyzer = Analyzer::new(Arc::new(MockBackend::replying(vec![note_json()])));
        let analysis = analyzer.analyze_note("周末想好好休息一下").await.unwrap();
        assert_eq!(analysis.title, "周末计划");
        assert_eq!(analysis.category, scribe_core::Category::Daily);
        assert_eq!(analysis.tags.len(), 3);
    }

    #[tokio::test]
    async fn analyze_note_strips_code_fences() {
        let fenced = format!("```json\n{}\n```", note_json());
        let analyzer = Analyzer::new(Arc::new(MockBackend::replying(vec![&fenced])));
        let analysis = analyzer.analyze_note("content").await.unwrap();
        assert_eq!(analysis.title, "周末计划");
    }

    #[tokio::test]
    async fn analyze_note_rejects_empty_content() {
        let analyzer = Analyzer::new(Arc::new(MockBackend::replying(vec![note_json()])));
        let err = analyzer.analyze_note("   ").await.unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[tokio::test]
    async fn analyze_note_rejects_unknown_category() {
        let bad = note_json().replace("日常", "随想");
        let analyzer = Analyzer::new(Arc::new(MockBackend::replying(vec![&bad])));
        let err = analyzer.analyze_note("content").await.unwrap_err();
        assert!(matches!(err, Error::Inference(_)));
    }

    #[tokio::test]
    async fn analyze_note_enforces_minimum_tags() {
        let sparse = note_json().replace(r#"["周末", "计划", "休息"]"#, r#"["周末"]"#);
        let analyzer = Analyzer::new(Arc::new(MockBackend::replying(vec![&sparse])));
        let err = analyzer.analyze_note("content").await.unwrap_err();
        assert!(matches!(err, Error::Inference(_)));
    }

    #[tokio::test]
    async fn analyze_note_truncates_excess_tags() {
        let crowded = note_json().replace(
            r#"["周末", "计划", "休息"]"#,
            r#"["a", "b", "c", "d", "e", "f", "g"]"#,
        );
        let analyzer = Analyzer::new(Arc::new(MockBackend::replying(vec![&crowded])));
        let analysis = analyzer.analyze_note("content").await.unwrap();
        assert_eq!(analysis.tags.len(), MAX_TAGS);
    }

    #[tokio::test]
    async fn analyze_diary_clamps_mood_score() {
        let json = r#"{
            "title": "t", "summary": "s", "emotion": "开心",
            "keywords": ["a"], "category": "生活", "mood_score": 99,
            "structured_content": "c", "insights": []
        }"#;
        let analyzer = Analyzer::new(Arc::new(MockBackend::replying(vec![json])));
        let analysis = analyzer
            .analyze_diary("今天很开心", Utc::now())
            .await
            .unwrap();
        assert_eq!(analysis.mood_score, 10);
    }

    #[tokio::test]
    async fn chat_report_uses_structured_response() {
        let json = r#"{
            "friend": "小明",
            "narrative": "两人聊起了周末",
            "emotions": ["温馨", "欢乐"],
            "messages": [{"sender": "小明", "time": "10:30", "content": "你好"}]
        }"#;
        let analyzer = Analyzer::new(Arc::new(MockBackend::replying(vec![json])));
        let report = analyzer.chat_report("小明 10:30\n你好").await.unwrap();
        assert_eq!(report.friend, "小明");
        assert_eq!(report.messages.len(), 1);
        assert_eq!(report.original_chat, "小明 10:30\n你好");
    }

    #[tokio::test]
    async fn chat_report_falls_back_to_text_parse() {
        let analyzer = Analyzer::new(Arc::new(MockBackend::replying(vec![
            "这不是JSON",
            "朋友名字：小红\n故事叙述：两位朋友聊了很久。\n情感标签：温馨,回忆",
        ])));
        let report = analyzer
            .chat_report("小红 9:15\n最近怎么样")
            .await
            .unwrap();
        assert_eq!(report.friend, "小红");
        assert_eq!(report.narrative, "两位朋友聊了很久。");
        assert_eq!(report.emotions, vec!["温馨", "回忆"]);
        assert_eq!(report.messages.len(), 1);
    }

    #[tokio::test]
    async fn chat_report_errors_when_both_attempts_fail() {
        let analyzer = Analyzer::new(Arc::new(MockBackend::failing("model unavailable")));
        let err = analyzer.chat_report("小红 9:15\n你好").await.unwrap_err();
        assert!(matches!(err, Error::Inference(_)));
    }

    #[test]
    fn basic_chat_report_names_first_sender() {
        let report = basic_chat_report("Alice 10:30\nHello there\nBob 10:31\nHi!");
        assert_eq!(report.friend, "Alice");
        assert_eq!(report.messages.len(), 2);
        assert_eq!(report.emotions, vec!["温馨", "友谊"]);
    }

    #[test]
    fn basic_chat_report_handles_unparsable_transcript() {
        let report = basic_chat_report("???");
        assert_eq!(report.friend, "未知朋友");
        assert!(report.messages.is_empty());
    }

    #[test]
    fn extract_json_finds_object_in_prose() {
        let raw = "好的，这是结果：\n```json\n{\"a\": 1}\n```\n希望有帮助";
        assert_eq!(extract_json(raw).unwrap(), "{\"a\": 1}");
    }

    #[test]
    fn extract_json_rejects_plain_text() {
        assert!(extract_json("没有对象").is_err());
        assert!(extract_json("}{").is_err());
    }
}
