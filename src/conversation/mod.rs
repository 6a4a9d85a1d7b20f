//! Conversation store and per-session context.
//!
//! A [`Conversation`] is an append-only transcript. The router owns the only
//! mutable handle during a turn through `&mut Session`, so two turns cannot
//! interleave on one transcript. Concurrent sessions each hold their own.

use crate::models::{Message, Role};
use uuid::Uuid;

/// Ordered, append-only log of role-tagged messages.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Conversation {
    messages: Vec<Message>,
}

impl Conversation {
    /// Creates an empty conversation.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            messages: Vec::new(),
        }
    }

    /// Creates a conversation that starts with a system message.
    #[must_use]
    pub fn from_system_message(content: impl Into<String>) -> Self {
        let mut convo = Self::new();
        convo.push(Message::system(content));
        convo
    }

    /// Appends a user message, builder style.
    #[must_use]
    pub fn with_user_message(mut self, content: impl Into<String>) -> Self {
        self.append_user(content);
        self
    }

    /// Appends every message of `other`, preserving order, builder style.
    #[must_use]
    pub fn with_history(mut self, other: &Self) -> Self {
        self.messages.extend_from_slice(other.history());
        self
    }

    /// Appends a user message.
    pub fn append_user(&mut self, content: impl Into<String>) {
        self.push(Message::user(content));
    }

    /// Appends an assistant message.
    pub fn append_assistant(&mut self, content: impl Into<String>) {
        self.push(Message::assistant(content));
    }

    /// Returns the messages in insertion order.
    #[must_use]
    pub fn history(&self) -> &[Message] {
        &self.messages
    }

    /// Returns the most recent message, if any.
    #[must_use]
    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    /// Counts messages with the given role.
    #[must_use]
    pub fn count_role(&self, role: Role) -> usize {
        self.messages.iter().filter(|m| m.role() == role).count()
    }

    /// Number of messages.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.messages.len()
    }

    /// Whether the conversation has no messages.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Clears the transcript.
    pub fn reset(&mut self) {
        self.messages.clear();
    }

    fn push(&mut self, message: Message) {
        self.messages.push(message);
    }
}

/// State owned by the caller for one chat session.
///
/// Created at session start, passed `&mut` to the router on every turn, and
/// dropped at session end.
#[derive(Debug, Clone)]
pub struct Session {
    id: Uuid,
    conversation: Conversation,
}

impl Session {
    /// Starts a new session with an empty conversation.
    #[must_use]
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            conversation: Conversation::new(),
        }
    }

    /// Session identifier, recorded on every turn's span.
    #[must_use]
    pub const fn id(&self) -> Uuid {
        self.id
    }

    /// Read view over the committed turns.
    #[must_use]
    pub const fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    /// Mutable access for committing a turn.
    pub const fn conversation_mut(&mut self) -> &mut Conversation {
        &mut self.conversation
    }

    /// Clears the transcript but keeps the session identity.
    pub fn reset(&mut self) {
        tracing::debug!(session_id = %self.id, "Resetting conversation");
        self.conversation.reset();
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_preserves_order() {
        let mut convo = Conversation::new();
        convo.append_user("Hello");
        convo.append_assistant("Hi, how can I help you?");
        convo.append_user("Can you say `Hello World`?");

        let roles: Vec<Role> = convo.history().iter().map(Message::role).collect();
        assert_eq!(roles, vec![Role::User, Role::Assistant, Role::User]);
        assert_eq!(convo.history()[1].content(), "Hi, how can I help you?");
        assert_eq!(convo.len(), 3);
        assert_eq!(convo.count_role(Role::User), 2);
    }

    #[test]
    fn test_builder_prompt() {
        let mut history = Conversation::new();
        history.append_user("q1");
        history.append_assistant("a1");

        let prompt = Conversation::from_system_message("You are helpful.")
            .with_history(&history)
            .with_user_message("q2");

        let contents: Vec<&str> = prompt.history().iter().map(Message::content).collect();
        assert_eq!(contents, vec!["You are helpful.", "q1", "a1", "q2"]);
        assert_eq!(prompt.history()[0].role(), Role::System);
        // The source history is untouched.
        assert_eq!(history.len(), 2);
    }

    #[test]
    fn test_reset() {
        let mut convo = Conversation::from_system_message("s");
        convo.append_user("u");
        convo.reset();
        assert!(convo.is_empty());
        assert!(convo.last().is_none());
    }

    #[test]
    fn test_session_reset_keeps_id() {
        let mut session = Session::new();
        let id = session.id();
        session.conversation_mut().append_user("hi");
        session.reset();
        assert_eq!(session.id(), id);
        assert!(session.conversation().is_empty());
    }

    #[test]
    fn test_sessions_are_independent() {
        let mut a = Session::new();
        let b = Session::new();
        a.conversation_mut().append_user("only in a");
        assert_ne!(a.id(), b.id());
        assert!(b.conversation().is_empty());
    }
}
