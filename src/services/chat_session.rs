// src/services/chat_session.rs
use std::{
    fmt::{self, Debug},
    sync::{Mutex, MutexGuard},
};

use futures_util::StreamExt;
use serde::Serialize;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use super::conversation::{ChatError, Conversation, ConversationalProvider};

pub const WELCOME_MESSAGE: &str = "مرحباً بك في مركز المسوقين الجزائري! كيف يمكنني مساعدتك اليوم؟";
pub const STREAM_FAILED_MESSAGE: &str = "عذراً، حدث خطأ ما. يرجى المحاولة مرة أخرى.";
pub const CHAT_UNAVAILABLE_MESSAGE: &str = "لا يمكن بدء خدمة الدردشة الآن.";

const EVENT_CAPACITY: usize = 256;

/// Creation-time-ordered message id.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct MessageId(Uuid);

impl MessageId {
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for MessageId {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Ai,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ChatMessage {
    pub id: MessageId,
    pub text: String,
    pub sender: Sender,
}

impl ChatMessage {
    fn new(sender: Sender, text: impl Into<String>) -> Self {
        Self { id: MessageId::new(), text: text.into(), sender }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChatEvent {
    Opened,
    Closed,
    MessageAppended { message: ChatMessage },
    MessageUpdated { id: MessageId, text: String },
    LoadingChanged { is_loading: bool },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IgnoreReason {
    EmptyMessage,
    Busy,
    Unavailable,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SendOutcome {
    Completed,
    Failed,
    Cancelled,
    Ignored(IgnoreReason),
}

#[derive(Clone, Debug, Serialize)]
pub struct ChatSnapshot {
    pub is_open: bool,
    pub messages: Vec<ChatMessage>,
    pub is_loading: bool,
    pub last_error: Option<String>,
    pub welcome_sent: bool,
    pub streaming: Option<MessageId>,
}

#[derive(Default)]
struct ChatState {
    is_open: bool,
    messages: Vec<ChatMessage>,
    welcome_sent: bool,
    last_error: Option<String>,
    // The mutable tail AI message; `is_loading` is derived from it.
    streaming: Option<MessageId>,
    cancel: Option<CancellationToken>,
}

impl ChatState {
    fn message_mut(&mut self, id: MessageId) -> Option<&mut ChatMessage> {
        self.messages.iter_mut().rev().find(|m| m.id == id)
    }
}

/// A reply that has been accepted and is waiting to be streamed.
#[derive(Debug)]
pub struct PendingReply {
    text: String,
    placeholder: MessageId,
    token: CancellationToken,
}

impl PendingReply {
    pub fn placeholder(&self) -> MessageId {
        self.placeholder
    }
}

pub struct ChatSessionController {
    state: Mutex<ChatState>,
    conversation: Option<Box<dyn Conversation>>,
    events: broadcast::Sender<ChatEvent>,
}

impl Debug for ChatSessionController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.lock();
        f.debug_struct("ChatSessionController")
            .field("messages", &state.messages.len())
            .field("is_loading", &state.streaming.is_some())
            .field("last_error", &state.last_error)
            .finish()
    }
}

impl ChatSessionController {
    /// Open the conversation. A failure is kept as the session error and
    /// disables sending for the lifetime of this controller.
    pub fn connect(provider: &dyn ConversationalProvider, system_prompt: &str, model: &str) -> Self {
        match provider.create_session(system_prompt, model) {
            Ok(conversation) => Self::with_conversation(Some(conversation)),
            Err(e) => Self::unavailable(e),
        }
    }

    /// A controller whose provider could not be set up. Every send is ignored.
    pub fn unavailable(error: impl fmt::Display) -> Self {
        tracing::error!(error = %error, "failed to initialize conversational session");
        let controller = Self::with_conversation(None);
        controller.lock().last_error = Some(CHAT_UNAVAILABLE_MESSAGE.to_string());
        controller
    }

    fn with_conversation(conversation: Option<Box<dyn Conversation>>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self { state: Mutex::new(ChatState::default()), conversation, events }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ChatEvent> {
        self.events.subscribe()
    }

    pub fn open(&self) {
        let mut state = self.lock();
        state.is_open = true;
        self.emit(ChatEvent::Opened);
        if !state.welcome_sent {
            state.welcome_sent = true;
            let welcome = ChatMessage::new(Sender::Ai, WELCOME_MESSAGE);
            state.messages.push(welcome.clone());
            self.emit(ChatEvent::MessageAppended { message: welcome });
        }
    }

    /// Hide the window. An in-flight reply keeps streaming.
    pub fn close(&self) {
        self.lock().is_open = false;
        self.emit(ChatEvent::Closed);
    }

    pub fn is_loading(&self) -> bool {
        self.lock().streaming.is_some()
    }

    pub fn last_error(&self) -> Option<String> {
        self.lock().last_error.clone()
    }

    pub fn snapshot(&self) -> ChatSnapshot {
        let state = self.lock();
        ChatSnapshot {
            is_open: state.is_open,
            messages: state.messages.clone(),
            is_loading: state.streaming.is_some(),
            last_error: state.last_error.clone(),
            welcome_sent: state.welcome_sent,
            streaming: state.streaming,
        }
    }

    pub async fn send_message(&self, text: &str) -> SendOutcome {
        match self.begin(text) {
            Ok(pending) => self.complete(pending).await,
            Err(reason) => SendOutcome::Ignored(reason),
        }
    }

    /// Append the user message and the AI placeholder, and enter the sending state.
    pub fn begin(&self, text: &str) -> Result<PendingReply, IgnoreReason> {
        let text = text.trim();
        if text.is_empty() {
            return Err(IgnoreReason::EmptyMessage);
        }
        if self.conversation.is_none() {
            return Err(IgnoreReason::Unavailable);
        }

        let mut state = self.lock();
        if state.streaming.is_some() {
            return Err(IgnoreReason::Busy);
        }

        let user = ChatMessage::new(Sender::User, text);
        let placeholder = ChatMessage::new(Sender::Ai, "");
        let token = CancellationToken::new();
        let pending = PendingReply { text: text.to_string(), placeholder: placeholder.id, token: token.clone() };

        state.messages.push(user.clone());
        state.messages.push(placeholder.clone());
        state.streaming = Some(placeholder.id);
        state.cancel = Some(token);

        self.emit(ChatEvent::MessageAppended { message: user });
        self.emit(ChatEvent::MessageAppended { message: placeholder });
        self.emit(ChatEvent::LoadingChanged { is_loading: true });
        Ok(pending)
    }

    /// Stream the reply into the placeholder, then leave the sending state.
    pub async fn complete(&self, pending: PendingReply) -> SendOutcome {
        let outcome = match self.conversation.as_deref() {
            Some(conversation) => self.stream_reply(conversation, &pending).await,
            None => SendOutcome::Ignored(IgnoreReason::Unavailable),
        };

        let mut state = self.lock();
        if state.streaming == Some(pending.placeholder) {
            state.streaming = None;
            state.cancel = None;
            self.emit(ChatEvent::LoadingChanged { is_loading: false });
        }
        outcome
    }

    /// Stop applying chunks to the active reply. Returns false when idle.
    pub fn cancel(&self) -> bool {
        match self.lock().cancel.as_ref() {
            Some(token) => {
                token.cancel();
                true
            }
            None => false,
        }
    }

    async fn stream_reply(&self, conversation: &dyn Conversation, pending: &PendingReply) -> SendOutcome {
        let token = &pending.token;
        let opened = tokio::select! {
            biased;
            _ = token.cancelled() => return SendOutcome::Cancelled,
            opened = conversation.send_streamed(&pending.text) => opened,
        };
        let mut chunks = match opened {
            Ok(chunks) => chunks,
            Err(e) => {
                self.fail(pending.placeholder, e);
                return SendOutcome::Failed;
            }
        };

        loop {
            let next = tokio::select! {
                biased;
                _ = token.cancelled() => None,
                next = chunks.next() => Some(next),
            };
            let Some(next) = next else {
                tracing::info!("chat reply cancelled");
                return SendOutcome::Cancelled;
            };
            if token.is_cancelled() {
                return SendOutcome::Cancelled;
            }
            match next {
                Some(Ok(chunk)) => self.apply_chunk(pending.placeholder, &chunk),
                Some(Err(e)) => {
                    self.fail(pending.placeholder, e);
                    return SendOutcome::Failed;
                }
                None => return SendOutcome::Completed,
            }
        }
    }

    fn apply_chunk(&self, id: MessageId, chunk: &str) {
        let mut state = self.lock();
        if let Some(message) = state.message_mut(id) {
            message.text.push_str(chunk);
            let text = message.text.clone();
            self.emit(ChatEvent::MessageUpdated { id, text });
        }
    }

    fn fail(&self, id: MessageId, error: ChatError) {
        tracing::error!(error = %error, "error streaming chat reply");
        let mut state = self.lock();
        if let Some(message) = state.message_mut(id) {
            message.text = STREAM_FAILED_MESSAGE.to_string();
            self.emit(ChatEvent::MessageUpdated { id, text: STREAM_FAILED_MESSAGE.to_string() });
        }
    }

    fn emit(&self, event: ChatEvent) {
        // Nobody listening is fine.
        let _ = self.events.send(event);
    }

    fn lock(&self) -> MutexGuard<'_, ChatState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Broken;

    impl ConversationalProvider for Broken {
        fn create_session(&self, _: &str, _: &str) -> Result<Box<dyn Conversation>, ChatError> {
            Err(ChatError::MissingCredential)
        }
    }

    #[test]
    fn message_ids_follow_creation_order() {
        let a = MessageId::new();
        let b = MessageId::new();
        assert!(a < b);
    }

    #[tokio::test]
    async fn init_failure_is_recorded_and_disables_sending() {
        let chat = ChatSessionController::connect(&Broken, "prompt", "model");
        assert_eq!(chat.last_error().as_deref(), Some(CHAT_UNAVAILABLE_MESSAGE));
        assert_eq!(
            chat.send_message("مرحبا").await,
            SendOutcome::Ignored(IgnoreReason::Unavailable)
        );
        assert!(chat.snapshot().messages.is_empty());
    }

    #[test]
    fn welcome_is_sent_once() {
        let chat = ChatSessionController::connect(&Broken, "prompt", "model");
        chat.open();
        chat.close();
        chat.open();
        let snapshot = chat.snapshot();
        assert!(snapshot.is_open);
        assert!(snapshot.welcome_sent);
        assert_eq!(snapshot.messages.len(), 1);
        assert_eq!(snapshot.messages[0].text, WELCOME_MESSAGE);
        assert_eq!(snapshot.messages[0].sender, Sender::Ai);
    }

    #[test]
    fn cancel_when_idle_reports_nothing_to_cancel() {
        let chat = ChatSessionController::connect(&Broken, "prompt", "model");
        assert!(!chat.cancel());
    }
}
