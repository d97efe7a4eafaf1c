use chrono::{ DateTime, Utc };
use serde::{ Serialize, Deserialize };

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }

    /// Label shown above a message in the conversation view.
    pub fn display_name(&self) -> &'static str {
        match self {
            Role::User => "You",
            Role::Assistant => "Assistant",
        }
    }
}

/// Ordering token for transcript entries, derived from the creation time in
/// milliseconds and bumped past the previous id when the clock has not moved.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MessageId(i64);

impl MessageId {
    pub fn after(previous: Option<MessageId>, now: DateTime<Utc>) -> Self {
        let millis = now.timestamp_millis();
        match previous {
            Some(MessageId(last)) if millis <= last => MessageId(last + 1),
            _ => MessageId(millis),
        }
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChatMessage {
    id: MessageId,
    role: Role,
    content: String,
    timestamp: DateTime<Utc>,
}

impl ChatMessage {
    pub fn new(id: MessageId, role: Role, content: String, timestamp: DateTime<Utc>) -> Self {
        Self { id, role, content, timestamp }
    }

    pub fn id(&self) -> MessageId {
        self.id
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}
