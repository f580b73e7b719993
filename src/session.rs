use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use serde::Serialize;
use tokio::sync::Mutex;
use uuid::Uuid;

/// Who authored a transcript turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One message of the visible conversation.
#[derive(Debug, Clone, Serialize)]
pub struct Turn {
    pub role: Role,
    pub content: String,
}

/// Append-only, insertion-ordered record of the conversation. Display order
/// is insertion order; nothing here is ever sent back to the model.
#[derive(Debug, Default)]
pub struct Transcript {
    turns: Vec<Turn>,
}

impl Transcript {
    pub fn push_user(&mut self, content: impl Into<String>) {
        self.turns.push(Turn {
            role: Role::User,
            content: content.into(),
        });
    }

    pub fn push_assistant(&mut self, content: impl Into<String>) {
        self.turns.push(Turn {
            role: Role::Assistant,
            content: content.into(),
        });
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }
}

/// Submission lifecycle of a session: `AwaitingResponse` between a submitted
/// question and the generation result, `Idle` otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Status {
    #[default]
    Idle,
    AwaitingResponse,
}

/// Per-browser-session state. Created empty on first contact and dropped
/// with the process; there is no persistence.
#[derive(Debug, Default)]
pub struct Session {
    pub transcript: Transcript,
    pub status: Status,
    /// Display text of the most recent failed generation, cleared when the
    /// next submission starts. Errors are never stored as transcript turns.
    pub last_error: Option<String>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Sessions are guarded by an async mutex taken briefly to read or flip
/// state. The submit path releases it for the duration of the generation
/// call, so a render issued mid-generation still sees the busy status.
pub type SharedSession = Arc<Mutex<Session>>;

/// Thread-safe in-memory store of all active sessions, keyed by the id the
/// browser carries in its cookie. Sessions are never evicted while the
/// process runs and all of them vanish on shutdown.
#[derive(Clone, Default)]
pub struct SessionStore {
    inner: Arc<RwLock<HashMap<Uuid, SharedSession>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mints a fresh session under a new v4 id.
    pub fn create(&self) -> (Uuid, SharedSession) {
        let id = Uuid::new_v4();
        let session: SharedSession = Arc::new(Mutex::new(Session::new()));
        self.inner.write().unwrap().insert(id, session.clone());
        (id, session)
    }

    pub fn get(&self, id: Uuid) -> Option<SharedSession> {
        self.inner.read().unwrap().get(&id).cloned()
    }

    /// Resolves a claimed session id to a live session. Unknown or absent
    /// ids get a fresh session; the returned flag says whether one was
    /// minted, so the caller knows to re-issue the cookie.
    pub fn get_or_create(&self, id: Option<Uuid>) -> (Uuid, SharedSession, bool) {
        if let Some(id) = id {
            if let Some(session) = self.get(id) {
                return (id, session, false);
            }
        }
        let (id, session) = self.create();
        (id, session, true)
    }
}
