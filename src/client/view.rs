use chrono::{ DateTime, Local, Utc };

use super::ChatSession;
use crate::models::chat::ChatMessage;

pub const WELCOME_TITLE: &str = "Welcome";
pub const WELCOME_TEXT: &str =
    "Set your API key, ask questions, and experience fast, accurate AI search.";
pub const MISSING_KEY_HINT: &str = "⚠ Please enter Perplexity API key to use chat.";
pub const LOADING_TEXT: &str = "Searching...";
pub const INPUT_HINT: &str = "Press Enter to send • Shift+Enter for new line";

/// Everything a front-end needs to draw the current state of a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatView<'a> {
    pub key_button_label: &'static str,
    pub placeholder: &'static str,
    pub input_enabled: bool,
    pub send_enabled: bool,
    pub editor_open: bool,
    /// `Some` only while the transcript is empty.
    pub welcome: Option<Welcome>,
    pub loading: Option<&'static str>,
    pub messages: &'a [ChatMessage],
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Welcome {
    pub title: &'static str,
    pub text: &'static str,
    pub missing_key_hint: Option<&'static str>,
}

impl ChatSession {
    pub fn view(&self) -> ChatView<'_> {
        let saved = self.is_key_saved();
        let messages = self.transcript().messages();
        ChatView {
            key_button_label: if saved { "API Connected" } else { "Set API Key" },
            placeholder: if saved { "Ask Perplexity..." } else { "Enter API key first" },
            input_enabled: saved && !self.is_loading(),
            send_enabled: self.can_submit(),
            editor_open: self.is_editor_open(),
            welcome: messages.is_empty().then(|| Welcome {
                title: WELCOME_TITLE,
                text: WELCOME_TEXT,
                missing_key_hint: (!saved).then_some(MISSING_KEY_HINT),
            }),
            loading: self.is_loading().then_some(LOADING_TEXT),
            messages,
        }
    }
}

pub fn format_time(timestamp: DateTime<Utc>) -> String {
    timestamp.with_timezone(&Local).format("%H:%M").to_string()
}

/// `You · 14:05`
pub fn message_header(message: &ChatMessage) -> String {
    format!("{} · {}", message.role().display_name(), format_time(message.timestamp()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::storage::{ MemorySessionStore, CREDENTIAL_KEY, SessionStore };
    use crate::client::tests::StubRelay;
    use crate::models::chat::{ MessageId, Role };
    use chrono::TimeZone;
    use std::sync::Arc;

    fn session(saved: bool) -> ChatSession {
        let store = MemorySessionStore::new();
        if saved {
            store.set(CREDENTIAL_KEY, "pplx-key");
        }
        ChatSession::mount(Arc::new(store), StubRelay::answering("hi"))
    }

    #[test]
    fn without_credential() {
        let session = session(false);
        let view = session.view();
        assert_eq!(view.key_button_label, "Set API Key");
        assert_eq!(view.placeholder, "Enter API key first");
        assert!(!view.input_enabled);
        assert!(!view.send_enabled);
        assert_eq!(view.welcome.unwrap().missing_key_hint, Some(MISSING_KEY_HINT));
        assert_eq!(view.loading, None);
    }

    #[test]
    fn ready_with_and_without_input() {
        let mut session = session(true);
        {
            let view = session.view();
            assert_eq!(view.key_button_label, "API Connected");
            assert_eq!(view.placeholder, "Ask Perplexity...");
            assert!(view.input_enabled);
            assert!(!view.send_enabled);
            assert_eq!(view.welcome.unwrap().missing_key_hint, None);
        }
        session.set_input("hello");
        assert!(session.view().send_enabled);
    }

    #[test]
    fn in_flight_disables_input_and_shows_loader() {
        let mut session = session(true);
        session.set_input("hello");
        let _turn = session.begin_turn().unwrap();

        let view = session.view();
        assert!(!view.input_enabled);
        assert!(!view.send_enabled);
        assert_eq!(view.loading, Some(LOADING_TEXT));
        assert!(view.welcome.is_none());
        assert_eq!(view.messages.len(), 1);
    }

    #[test]
    fn header_names_role() {
        let ts = Utc.with_ymd_and_hms(2024, 5, 1, 9, 30, 0).unwrap();
        let message = ChatMessage::new(MessageId::after(None, ts), Role::Assistant, "x".into(), ts);
        let header = message_header(&message);
        assert!(header.starts_with("Assistant · "));
        assert_eq!(format_time(ts).len(), 5);
    }
}
