//! Single-session conversation state machine.
//!
//! A session owns the transcript and the credential lifecycle. Every user turn
//! is split into a synchronous `begin_turn`, one awaited relay call, and a
//! synchronous `finish_turn`; the in-flight flag keeps a second turn from
//! starting while one is outstanding.

pub mod relay;
pub mod storage;
pub mod terminal;
pub mod view;

use log::{ debug, info, warn };
use std::sync::Arc;

use self::relay::{ RelayCallError, RelayClient, RelayReply };
use self::storage::{ SessionStore, CREDENTIAL_KEY };
use crate::history::Transcript;
use crate::models::chat::{ ChatMessage, Role };

pub const FAILURE_MARKER: &str = "❌ ";
pub const EMPTY_ANSWER: &str = "(No answer received.)";
pub const UNKNOWN_ERROR: &str = "Unknown error.";

/// A turn that has been recorded in the transcript and awaits its relay call.
#[derive(PartialEq, Eq)]
pub struct PendingTurn {
    prompt: String,
    api_key: String,
}

impl PendingTurn {
    pub fn prompt(&self) -> &str {
        &self.prompt
    }
}

impl std::fmt::Debug for PendingTurn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PendingTurn").field("prompt", &self.prompt).finish_non_exhaustive()
    }
}

pub struct ChatSession {
    store: Arc<dyn SessionStore>,
    relay: Arc<dyn RelayClient>,
    api_key: String,
    key_saved: bool,
    transcript: Transcript,
    input: String,
    loading: bool,
    editor_open: bool,
}

impl ChatSession {
    /// Builds a session and restores a credential left in `store` by an
    /// earlier session.
    pub fn mount(store: Arc<dyn SessionStore>, relay: Arc<dyn RelayClient>) -> Self {
        let saved = store.get(CREDENTIAL_KEY).filter(|k| !k.is_empty());
        if saved.is_some() {
            info!("Restored API key from session storage");
        }
        Self {
            store,
            relay,
            key_saved: saved.is_some(),
            api_key: saved.unwrap_or_default(),
            transcript: Transcript::new(),
            input: String::new(),
            loading: false,
            editor_open: false,
        }
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn is_key_saved(&self) -> bool {
        self.key_saved
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn is_editor_open(&self) -> bool {
        self.editor_open
    }

    pub fn key_draft(&self) -> &str {
        &self.api_key
    }

    pub fn set_input(&mut self, text: impl Into<String>) {
        self.input = text.into();
    }

    pub fn toggle_editor(&mut self) {
        self.editor_open = !self.editor_open;
    }

    pub fn set_key_draft(&mut self, draft: impl Into<String>) {
        self.api_key = draft.into();
    }

    /// Stores the draft credential. Blank drafts are ignored.
    pub fn save_key(&mut self) -> bool {
        if self.api_key.trim().is_empty() {
            return false;
        }
        self.store.set(CREDENTIAL_KEY, &self.api_key);
        self.key_saved = true;
        self.editor_open = false;
        info!("API key saved for this session");
        true
    }

    pub fn cancel_editor(&mut self) {
        self.editor_open = false;
    }

    /// Forgets the stored credential. The editor stays open.
    pub fn clear_key(&mut self) -> bool {
        if !self.key_saved {
            return false;
        }
        self.store.remove(CREDENTIAL_KEY);
        self.api_key.clear();
        self.key_saved = false;
        info!("API key cleared");
        true
    }

    /// Enter submits; Shift+Enter adds a line break to the pending input.
    pub async fn press_enter(&mut self, shift: bool) -> bool {
        if shift {
            self.input.push('\n');
            return false;
        }
        self.submit().await
    }

    pub fn can_submit(&self) -> bool {
        self.key_saved && !self.loading && !self.input.trim().is_empty()
    }

    /// Runs one full turn. Returns false when the submit was a no-op.
    pub async fn submit(&mut self) -> bool {
        match self.begin_turn() {
            Some(turn) => {
                self.resolve_turn(turn).await;
                true
            }
            None => false,
        }
    }

    /// Records the user message and enters the in-flight state.
    pub fn begin_turn(&mut self) -> Option<PendingTurn> {
        if !self.can_submit() {
            debug!(
                "Ignoring submit (key saved: {}, in flight: {})",
                self.key_saved,
                self.loading
            );
            return None;
        }

        let prompt = std::mem::take(&mut self.input);
        self.transcript.push(Role::User, prompt.clone());
        self.loading = true;

        // An absent entry is sent as an empty key and rejected by the relay.
        let api_key = self.store.get(CREDENTIAL_KEY).unwrap_or_default();
        Some(PendingTurn { prompt, api_key })
    }

    /// Makes the relay call for `turn`. Without a turn in flight nothing is sent.
    pub async fn resolve_turn(&mut self, turn: PendingTurn) -> Option<&ChatMessage> {
        if !self.loading {
            warn!("No turn in flight; not calling the relay");
            return None;
        }
        let relay = Arc::clone(&self.relay);
        let result = relay.ask(&turn.prompt, &turn.api_key).await;
        self.finish_turn(result)
    }

    /// Appends the assistant message for the outstanding turn and leaves the
    /// in-flight state. Ignored when no turn is outstanding.
    pub fn finish_turn(
        &mut self,
        result: Result<RelayReply, RelayCallError>
    ) -> Option<&ChatMessage> {
        if !self.loading {
            warn!("Relay result arrived with no turn in flight; dropping it");
            return None;
        }
        let content = assistant_text(result);
        self.loading = false;
        Some(self.transcript.push(Role::Assistant, content))
    }
}

fn assistant_text(result: Result<RelayReply, RelayCallError>) -> String {
    match result {
        Ok(RelayReply { ok: true, body }) => body.answer
            .filter(|a| !a.is_empty())
            .unwrap_or_else(|| EMPTY_ANSWER.to_string()),
        Ok(RelayReply { ok: false, body }) => {
            let error = body.error.filter(|e| !e.is_empty());
            format!("{}{}", FAILURE_MARKER, error.as_deref().unwrap_or(UNKNOWN_ERROR))
        }
        Err(e) => {
            debug!("Relay call failed: {}", e);
            format!("{}Error: {}", FAILURE_MARKER, e)
        }
    }
}
