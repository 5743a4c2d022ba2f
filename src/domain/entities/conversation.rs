use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const DEFAULT_SLIDE_WINDOW: usize = 5;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationSession {
    pub id: Uuid,
    /// Folder path selecting which indexed resumes this session may search.
    pub scope_id: String,
    pub messages: Vec<Message>,
    /// How many prior messages participate in query condensation.
    pub slide_window: usize,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ConversationSession {
    pub fn new(scope_id: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            scope_id: scope_id.into(),
            messages: Vec::new(),
            slide_window: DEFAULT_SLIDE_WINDOW,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_slide_window(mut self, slide_window: usize) -> Self {
        self.slide_window = slide_window;
        self
    }

    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
        self.updated_at = Utc::now();
    }

    /// Trailing `slide_window` messages, excluding the final (current,
    /// unanswered) entry. Empty on the first turn; the start index clamps
    /// to zero when fewer than `slide_window + 1` messages exist.
    pub fn history_window(&self) -> &[Message] {
        let len = self.messages.len();
        if len < 2 {
            return &[];
        }
        let end = len - 1;
        let start = end.saturating_sub(self.slide_window);
        &self.messages[start..end]
    }

    pub fn reset(&mut self) {
        self.messages.clear();
        self.updated_at = Utc::now();
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: MessageRole,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_documents: Option<serde_json::Value>,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
            source_documents: None,
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: content.into(),
            source_documents: None,
        }
    }

    pub fn with_source_documents(mut self, sources: serde_json::Value) -> Self {
        self.source_documents = Some(sources);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
}

impl MessageRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "User",
            Self::Assistant => "Assistant",
        }
    }
}
