use chrono::Utc;
use crate::models::chat::{ ChatMessage, MessageId, Role };

/// Append-only conversation log. Insertion order is display order.
#[derive(Debug, Clone, Default)]
pub struct Transcript {
    messages: Vec<ChatMessage>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, role: Role, content: impl Into<String>) -> &ChatMessage {
        let now = Utc::now();
        let id = MessageId::after(self.messages.last().map(ChatMessage::id), now);
        self.messages.push(ChatMessage::new(id, role, content.into(), now));
        &self.messages[self.messages.len() - 1]
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Messages appended at or after position `index`.
    pub fn since(&self, index: usize) -> &[ChatMessage] {
        self.messages.get(index..).unwrap_or(&[])
    }

    pub fn last(&self) -> Option<&ChatMessage> {
        self.messages.last()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_keeps_order_and_monotonic_ids() {
        let mut transcript = Transcript::new();
        transcript.push(Role::User, "one");
        transcript.push(Role::Assistant, "two");
        transcript.push(Role::User, "three");

        let contents: Vec<&str> = transcript.messages().iter().map(|m| m.content()).collect();
        assert_eq!(contents, ["one", "two", "three"]);
        let ids: Vec<MessageId> = transcript.messages().iter().map(|m| m.id()).collect();
        assert!(ids.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn since_returns_tail() {
        let mut transcript = Transcript::new();
        transcript.push(Role::User, "a");
        transcript.push(Role::Assistant, "b");
        assert_eq!(transcript.since(1).len(), 1);
        assert_eq!(transcript.since(1)[0].content(), "b");
        assert!(transcript.since(2).is_empty());
        assert!(transcript.since(10).is_empty());
    }
}
