use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Ai,
}

/// One turn of the pre-consultation transcript. Append-only; the order
/// of messages is significant because history is replayed verbatim into
/// prompts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: MessageRole,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }

    pub fn ai(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Ai,
            content: content.into(),
        }
    }
}

/// Subject area of a consultation session. Classified once from the first
/// user message and then fixed: the caller echoes it back on every
/// subsequent request and the engine never re-classifies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Track {
    Skin,
    Eye,
    Sleep,
    Digestion,
    Mood,
    #[default]
    General,
}

impl Track {
    pub fn label(&self) -> &'static str {
        match self {
            Track::Skin => "피부 고민",
            Track::Eye => "눈 건강",
            Track::Sleep => "수면 리듬",
            Track::Digestion => "소화 건강",
            Track::Mood => "마음 건강",
            Track::General => "일반 상담",
        }
    }
}

/// Why the user entered the flow. Affects prompt phrasing only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EntryIntent {
    SymptomCheck,
    Booking,
    GeneralQuestion,
}

/// Caller-supplied state for one exchange. The engine is stateless per
/// call; history, turn count and track all arrive here on every request.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    #[serde(default)]
    pub history: Vec<ChatMessage>,
    #[serde(default)]
    pub turn_count: u32,
    #[serde(default)]
    pub track: Option<Track>,
    #[serde(default)]
    pub entry_intent: Option<EntryIntent>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatResponse {
    pub role: &'static str,
    pub content: String,
    pub turn_count: u32,
    pub track: Track,
    #[serde(skip_serializing_if = "is_false")]
    pub require_login: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub is_hard_stop: bool,
}

impl ChatResponse {
    pub fn new(content: impl Into<String>, turn_count: u32, track: Track) -> Self {
        Self {
            role: "ai",
            content: content.into(),
            turn_count,
            track,
            require_login: false,
            is_hard_stop: false,
        }
    }
}

fn is_false(value: &bool) -> bool {
    !*value
}

/// Structured output of the summary extractor, produced once per
/// completed session from the full transcript.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryResult {
    pub pattern_tags: Vec<String>,
    pub rhythm_score: i64,
    pub summary_text: String,
    pub main_concern: String,
}

impl SummaryResult {
    /// Substituted whenever generation or parsing of the real summary
    /// fails. Summarization never surfaces an error to its caller.
    pub fn fallback() -> Self {
        Self {
            pattern_tags: vec!["분석 실패".to_string()],
            rhythm_score: 50,
            summary_text: "대화 내용을 분석하지 못했습니다. 상담 기록은 그대로 보관됩니다."
                .to_string(),
            main_concern: "분석 실패".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SummaryRequest {
    #[serde(default)]
    pub topic: Option<Track>,
}
