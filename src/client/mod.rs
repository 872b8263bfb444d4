//! Client side of the chat: an append-only conversation, the request state
//! machine guarding it, and a pure renderer.

pub mod render;
pub mod repl;
pub mod transport;

use crate::models::chat::ChatMessage;
use log::{ debug, error };

pub use self::render::render;
pub use self::transport::{ ChatTransport, ClientError, HttpTransport };

/// Shown as the assistant turn whenever a request fails, whatever the cause.
pub const APOLOGY: &str = "Sorry, I encountered an error. Please try again.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatState {
    Idle,
    AwaitingResponse,
}

/// Ordered messages of one session. Only grows.
#[derive(Debug, Default, Clone)]
pub struct ConversationStore {
    messages: Vec<ChatMessage>,
}

impl ConversationStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&mut self, message: ChatMessage) {
        self.messages.push(message);
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

#[derive(Debug)]
pub struct ChatSession {
    store: ConversationStore,
    state: ChatState,
}

impl Default for ChatSession {
    fn default() -> Self {
        Self::new()
    }
}

impl ChatSession {
    pub fn new() -> Self {
        Self {
            store: ConversationStore::new(),
            state: ChatState::Idle,
        }
    }

    pub fn state(&self) -> ChatState {
        self.state
    }

    pub fn store(&self) -> &ConversationStore {
        &self.store
    }

    /// Starts a turn. Returns the utterance to send, or `None` when the input is
    /// blank or a reply is still outstanding.
    pub fn submit(&mut self, text: &str) -> Option<String> {
        let utterance = text.trim();
        if utterance.is_empty() {
            return None;
        }
        if self.state == ChatState::AwaitingResponse {
            debug!("Ignoring submit while a reply is pending");
            return None;
        }

        self.store.push(ChatMessage::user(utterance));
        self.state = ChatState::AwaitingResponse;
        Some(utterance.to_string())
    }

    /// Finishes the outstanding turn with exactly one assistant message.
    pub fn resolve(&mut self, outcome: Result<String, ClientError>) {
        if self.state != ChatState::AwaitingResponse {
            debug!("Ignoring reply with no pending turn");
            return;
        }

        let content = match outcome {
            Ok(reply) => reply,
            Err(e) => {
                error!("Chat request failed: {}", e);
                APOLOGY.to_string()
            }
        };
        self.store.push(ChatMessage::assistant(content));
        self.state = ChatState::Idle;
    }

    /// Runs one full turn against `transport`. Returns false when `submit` was a no-op.
    pub async fn exchange(&mut self, text: &str, transport: &dyn ChatTransport) -> bool {
        let Some(utterance) = self.submit(text) else {
            return false;
        };
        let outcome = transport.send(&utterance).await;
        self.resolve(outcome);
        true
    }

    pub fn render(&self) -> String {
        render(self.store.messages(), self.state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::chat::Role;
    use async_trait::async_trait;
    use std::sync::atomic::{ AtomicUsize, Ordering };

    struct ScriptedTransport {
        reply: Option<String>,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl ChatTransport for ScriptedTransport {
        async fn send(&self, _utterance: &str) -> Result<String, ClientError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.reply {
                Some(text) => Ok(text.clone()),
                None => Err(ClientError::Status(500)),
            }
        }
    }

    fn roles(session: &ChatSession) -> Vec<Role> {
        session.store().messages().iter().map(|m| m.role()).collect()
    }

    #[test]
    fn blank_submit_is_noop() {
        let mut session = ChatSession::new();
        assert_eq!(session.submit(""), None);
        assert_eq!(session.submit("  \t\n"), None);
        assert!(session.store().is_empty());
        assert_eq!(session.state(), ChatState::Idle);
    }

    #[test]
    fn submit_trims_and_enters_awaiting() {
        let mut session = ChatSession::new();
        assert_eq!(session.submit("  hello there \n"), Some("hello there".to_string()));
        assert_eq!(session.state(), ChatState::AwaitingResponse);
        assert_eq!(session.store().messages()[0].content(), "hello there");
        assert_eq!(session.store().messages()[0].role(), Role::User);
    }

    #[test]
    fn submit_while_awaiting_leaves_store_unchanged() {
        let mut session = ChatSession::new();
        session.submit("first").unwrap();
        assert_eq!(session.submit("second"), None);
        assert_eq!(session.store().len(), 1);

        session.resolve(Ok("reply".to_string()));
        assert_eq!(session.store().len(), 2);
        assert_eq!(session.submit("second"), Some("second".to_string()));
        assert_eq!(session.store().len(), 3);
    }

    #[test]
    fn resolve_without_pending_turn_is_ignored() {
        let mut session = ChatSession::new();
        session.resolve(Ok("stray".to_string()));
        assert!(session.store().is_empty());
        assert_eq!(session.state(), ChatState::Idle);
    }

    #[tokio::test]
    async fn exchange_appends_user_then_assistant() {
        let transport = ScriptedTransport { reply: Some("Hi!".to_string()), calls: AtomicUsize::new(0) };
        let mut session = ChatSession::new();

        assert!(session.exchange("hello", &transport).await);
        assert_eq!(roles(&session), vec![Role::User, Role::Assistant]);
        assert_eq!(session.store().messages()[1].content(), "Hi!");
        assert_eq!(session.state(), ChatState::Idle);
        assert_eq!(transport.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn failed_exchange_appends_apology_verbatim() {
        let transport = ScriptedTransport { reply: None, calls: AtomicUsize::new(0) };
        let mut session = ChatSession::new();

        assert!(session.exchange("hello", &transport).await);
        assert_eq!(roles(&session), vec![Role::User, Role::Assistant]);
        assert_eq!(session.store().messages()[1].content(), APOLOGY);
        assert_eq!(session.state(), ChatState::Idle);
    }

    #[tokio::test]
    async fn blank_exchange_never_reaches_transport() {
        let transport = ScriptedTransport { reply: Some("x".to_string()), calls: AtomicUsize::new(0) };
        let mut session = ChatSession::new();

        assert!(!session.exchange("   ", &transport).await);
        assert_eq!(transport.calls.load(Ordering::SeqCst), 0);
        assert!(session.store().is_empty());
    }

    #[test]
    fn message_ids_are_unique() {
        let mut session = ChatSession::new();
        session.submit("a");
        session.resolve(Ok("b".to_string()));
        let ids: Vec<_> = session.store().messages().iter().map(|m| m.id()).collect();
        assert_ne!(ids[0], ids[1]);
    }
}
