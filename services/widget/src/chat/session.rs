//! services/widget/src/chat/session.rs
//!
//! The chat session state holder: transcript, draft, composing and visibility
//! flags. It is mutated only by user input and by the completion of a reply
//! task, and notifies subscribers after every mutation.

use crate::chat::{
    format::{CONNECTIVITY_APOLOGY, GREETING},
    resolver::ReplyResolver,
};
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use storefront_chat_core::{
    domain::{ClientId, Message, Role},
    ports::TranscriptStore,
};
use tokio::{
    sync::{Mutex, MutexGuard},
    task::JoinHandle,
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

pub const DEFAULT_HISTORY_LIMIT: usize = 100;

//=========================================================================================
// Configuration and Public Views
//=========================================================================================

/// Per-session settings supplied by the host.
#[derive(Clone, Debug)]
pub struct SessionConfig {
    pub client_id: ClientId,
    /// How many of the newest messages are persisted and restored.
    pub history_limit: usize,
    pub greeting: String,
}

impl SessionConfig {
    pub fn new(client_id: ClientId) -> Self {
        Self {
            client_id,
            history_limit: DEFAULT_HISTORY_LIMIT,
            greeting: GREETING.to_string(),
        }
    }
}

/// A borrowed, read-only view handed to subscribers after each mutation.
#[derive(Debug, Clone, Copy)]
pub struct SessionView<'a> {
    pub messages: &'a [Message],
    pub is_open: bool,
    pub is_composing: bool,
    pub draft: &'a str,
}

/// An owned copy of the session state.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSnapshot {
    pub messages: Vec<Message>,
    pub is_open: bool,
    pub is_composing: bool,
    pub draft: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Observer = Box<dyn Fn(&SessionView<'_>) + Send + Sync>;

/// What `submit_draft` did with the current draft.
#[derive(Debug)]
pub enum SubmitOutcome {
    /// The trimmed draft was empty; nothing changed.
    Ignored,
    /// The session was shut down; nothing changed.
    Closed,
    /// A reply is still in flight; the draft was kept and nothing was appended.
    Busy,
    /// The user message was appended and a reply is being resolved.
    Sent(PendingReply),
}

impl SubmitOutcome {
    pub fn is_sent(&self) -> bool {
        matches!(self, SubmitOutcome::Sent(_))
    }
}

/// Handle to the reply task of one send cycle.
#[derive(Debug)]
pub struct PendingReply {
    handle: JoinHandle<()>,
}

impl PendingReply {
    /// Waits until the reply has been appended (or discarded on shutdown).
    pub async fn wait(self) {
        if let Err(e) = self.handle.await {
            error!("Reply task failed: {}", e);
        }
    }
}

//=========================================================================================
// Internal State
//=========================================================================================

struct SessionState {
    messages: Vec<Message>,
    is_open: bool,
    is_composing: bool,
    draft: String,
    next_id: u64,
    observers: Vec<(SubscriptionId, Observer)>,
    next_subscription: u64,
}

impl SessionState {
    fn seeded(greeting: &str) -> Self {
        let mut state = Self::with_messages(Vec::new());
        state.push(Role::Assistant, greeting.to_string());
        state
    }

    fn with_messages(messages: Vec<Message>) -> Self {
        let next_id = messages.iter().map(|m| m.id).max().map_or(1, |max| max + 1);
        Self {
            messages,
            is_open: false,
            is_composing: false,
            draft: String::new(),
            next_id,
            observers: Vec::new(),
            next_subscription: 0,
        }
    }

    fn push(&mut self, role: Role, text: String) {
        let message = match role {
            Role::User => Message::user(self.next_id, text),
            Role::Assistant => Message::assistant(self.next_id, text),
        };
        self.next_id += 1;
        self.messages.push(message);
    }

    fn tail(&self, limit: usize) -> &[Message] {
        let start = self.messages.len().saturating_sub(limit);
        &self.messages[start..]
    }

    fn notify(&self) {
        let view = SessionView {
            messages: &self.messages,
            is_open: self.is_open,
            is_composing: self.is_composing,
            draft: &self.draft,
        };
        for (id, observer) in &self.observers {
            if panic::catch_unwind(AssertUnwindSafe(|| observer(&view))).is_err() {
                error!("Subscriber {:?} panicked; skipping it for this update.", id);
            }
        }
    }

    fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            messages: self.messages.clone(),
            is_open: self.is_open,
            is_composing: self.is_composing,
            draft: self.draft.clone(),
        }
    }
}

struct SessionShared {
    state: Mutex<SessionState>,
    /// Held across each save so writes land in mutation order.
    persist_lock: Mutex<()>,
    resolver: ReplyResolver,
    store: Option<Arc<dyn TranscriptStore>>,
    config: SessionConfig,
}

impl SessionShared {
    /// Releases `state`, then saves the newest messages it held.
    ///
    /// Failures are logged and never interrupt the session.
    async fn persist(&self, state: MutexGuard<'_, SessionState>) {
        let Some(store) = &self.store else {
            return;
        };
        let tail = state.tail(self.config.history_limit).to_vec();
        let _ordered = self.persist_lock.lock().await;
        drop(state);

        let key = self.config.client_id.storage_key();
        if let Err(e) = store.save(&key, &tail).await {
            warn!("Failed to persist transcript under {}: {}", key, e);
        }
    }
}

//=========================================================================================
// ChatSession
//=========================================================================================

/// One widget's conversation. Dropping the session cancels any reply in flight.
pub struct ChatSession {
    shared: Arc<SessionShared>,
    cancel: CancellationToken,
}

impl ChatSession {
    /// Creates a session seeded with the configured greeting and no persistence.
    pub fn new(config: SessionConfig, resolver: ReplyResolver) -> Self {
        let state = SessionState::seeded(&config.greeting);
        Self::build(config, resolver, None, state)
    }

    /// Creates a persistent session, rehydrating the stored transcript when present.
    pub async fn restore(
        config: SessionConfig,
        resolver: ReplyResolver,
        store: Arc<dyn TranscriptStore>,
    ) -> Self {
        let key = config.client_id.storage_key();
        let state = match store.load(&key).await {
            Ok(Some(messages)) if !messages.is_empty() => {
                let start = messages.len().saturating_sub(config.history_limit);
                let kept = messages[start..].to_vec();
                info!("Restored {} messages for client {}", kept.len(), config.client_id);
                SessionState::with_messages(kept)
            }
            Ok(_) => SessionState::seeded(&config.greeting),
            Err(e) => {
                warn!("Could not load transcript under {}: {}", key, e);
                SessionState::seeded(&config.greeting)
            }
        };
        Self::build(config, resolver, Some(store), state)
    }

    fn build(
        config: SessionConfig,
        resolver: ReplyResolver,
        store: Option<Arc<dyn TranscriptStore>>,
        state: SessionState,
    ) -> Self {
        Self {
            shared: Arc::new(SessionShared {
                state: Mutex::new(state),
                persist_lock: Mutex::new(()),
                resolver,
                store,
                config,
            }),
            cancel: CancellationToken::new(),
        }
    }

    pub fn client_id(&self) -> &ClientId {
        &self.shared.config.client_id
    }

    /// Registers `observer` to be called after every mutation.
    pub async fn subscribe<F>(&self, observer: F) -> SubscriptionId
    where
        F: Fn(&SessionView<'_>) + Send + Sync + 'static,
    {
        let mut state = self.shared.state.lock().await;
        let id = SubscriptionId(state.next_subscription);
        state.next_subscription += 1;
        state.observers.push((id, Box::new(observer)));
        id
    }

    /// Returns `false` when `id` was not subscribed.
    pub async fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut state = self.shared.state.lock().await;
        let before = state.observers.len();
        state.observers.retain(|(sub, _)| *sub != id);
        state.observers.len() != before
    }

    /// Flips the widget's visibility and returns the new value.
    pub async fn toggle_visibility(&self) -> bool {
        let mut state = self.shared.state.lock().await;
        state.is_open = !state.is_open;
        state.notify();
        state.is_open
    }

    pub async fn update_draft(&self, text: impl Into<String>) {
        let mut state = self.shared.state.lock().await;
        state.draft = text.into();
        state.notify();
    }

    /// Sends the current draft.
    ///
    /// Appends the user message right away and resolves the assistant reply on a
    /// background task tied to this session's lifetime.
    pub async fn submit_draft(&self) -> SubmitOutcome {
        let transcript = {
            let mut state = self.shared.state.lock().await;
            if self.cancel.is_cancelled() {
                debug!("Submission rejected after shutdown.");
                return SubmitOutcome::Closed;
            }
            let text = state.draft.trim().to_string();
            if text.is_empty() {
                return SubmitOutcome::Ignored;
            }
            if state.is_composing {
                debug!("Submission rejected while a reply is in flight.");
                return SubmitOutcome::Busy;
            }

            state.push(Role::User, text);
            state.draft.clear();
            state.is_composing = true;
            state.notify();
            let transcript = state.messages.clone();
            self.shared.persist(state).await;
            transcript
        };

        let shared = Arc::clone(&self.shared);
        let token = self.cancel.clone();
        let handle = tokio::spawn(async move {
            // Resolved on its own task; a panic there still ends the cycle.
            let resolving = {
                let shared = Arc::clone(&shared);
                tokio::spawn(async move { shared.resolver.resolve(&transcript).await })
            };
            let abort = resolving.abort_handle();

            let reply = tokio::select! {
                _ = token.cancelled() => {
                    abort.abort();
                    None
                }
                joined = resolving => match joined {
                    Ok(reply) => Some(reply),
                    Err(e) => {
                        error!("Reply resolution failed: {}", e);
                        Some(CONNECTIVITY_APOLOGY.to_string())
                    }
                },
            };

            let mut state = shared.state.lock().await;
            state.is_composing = false;
            match reply {
                Some(reply) if !token.is_cancelled() => {
                    state.push(Role::Assistant, reply);
                    state.notify();
                    shared.persist(state).await;
                }
                _ => {
                    info!("Session closed before the reply was applied; discarding it.");
                    state.notify();
                }
            }
        });

        SubmitOutcome::Sent(PendingReply { handle })
    }

    pub async fn snapshot(&self) -> SessionSnapshot {
        self.shared.state.lock().await.snapshot()
    }

    pub async fn transcript(&self) -> Vec<Message> {
        self.shared.state.lock().await.messages.clone()
    }

    /// Cancels any reply in flight; it will not be appended. Later submissions
    /// return [`SubmitOutcome::Closed`].
    pub fn shutdown(&self) {
        self.cancel.cancel();
    }
}

impl Drop for ChatSession {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
