use std::sync::Arc;

use tracing::{error, warn};

use crate::gemini_client::GenerateText;
use crate::session::{SessionStore, SharedSession, Status};

/// Fixed instructional preamble prepended to every question. The model sees
/// only this text plus the latest input; prior turns stay on the page.
pub const SYSTEM_PREAMBLE: &str = "\
You are UPSC Insight – elite mentor (former civil servant level) for UPSC/PCS/SSC.
Answer rules:
- 100% accurate, no hallucinations
- Structured: 1. Direct answer 2. Detailed explanation + examples/cases 3. Relevant PYQs 4. Exam tips
- Use bullets, tables, short paragraphs
- Professional Indian English
- Balanced length (400–1200 words)
- Knowledge cutoff: early 2026";

/// Canned questions offered in the sidebar. Clicking one submits its text
/// verbatim through the same path as typed input.
pub const EXAMPLE_PROMPTS: [&str; 5] = [
    "Explain the basic structure doctrine with key cases",
    "Solve PYQ: Anti-defection law is in which Schedule? (a) 7th (b) 8th (c) 10th",
    "Structure a 250-word Mains answer: Women empowerment in India",
    "Compare FR vs DPSP – landmark judgments",
    "India’s Neighbourhood First Policy – recent developments 2025–26",
];

/// The text sent to the generation client: preamble, blank line, then the
/// input exactly as typed. No escaping, even if the input contains the
/// preamble itself.
pub fn compose_full_prompt(input: &str) -> String {
    format!("{SYSTEM_PREAMBLE}\n\n{input}")
}

/// Which path a submission took through the turn handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Round completed; the assistant turn was appended.
    Answered,
    /// Generation failed; the transcript still ends with the user turn and
    /// the error text sits on the session.
    Failed,
    /// Blank input; nothing changed.
    IgnoredEmpty,
    /// A request is already outstanding for this session; nothing changed.
    Busy,
}

/// Owns the session store and the generation client, and runs the
/// submission state machine (`Idle → AwaitingResponse → Idle`) one round
/// at a time per session.
pub struct ChatContext {
    client: Arc<dyn GenerateText>,
    sessions: SessionStore,
}

impl ChatContext {
    pub fn new(client: Arc<dyn GenerateText>) -> Self {
        Self {
            client,
            sessions: SessionStore::new(),
        }
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    /// Runs one round: append the user turn, generate, append the answer or
    /// record the error. No lock is held while the model call is in flight,
    /// so concurrent renders observe the pending user turn and the busy
    /// status.
    pub async fn submit(&self, session: &SharedSession, input: &str) -> SubmitOutcome {
        if input.trim().is_empty() {
            return SubmitOutcome::IgnoredEmpty;
        }

        {
            let mut session = session.lock().await;
            if session.status == Status::AwaitingResponse {
                return SubmitOutcome::Busy;
            }
            session.transcript.push_user(input);
            session.last_error = None;
            session.status = Status::AwaitingResponse;
        }

        let client = self.client.clone();
        let round_session = session.clone();
        let full_prompt = compose_full_prompt(input);

        // Detached: the server drops this request future when the connection
        // goes away, and the round must still finish and return the session
        // to idle.
        let round = tokio::spawn(async move {
            let result = client.generate(&full_prompt).await;
            let mut session = round_session.lock().await;
            session.status = Status::Idle;
            match result {
                Ok(answer) => {
                    session.transcript.push_assistant(answer.trim());
                    SubmitOutcome::Answered
                }
                Err(e) => {
                    warn!("Generation failed: {e}");
                    // The user turn stays the last transcript entry; the
                    // error is surfaced beside the transcript, never inside
                    // it.
                    session.last_error = Some(e.to_string());
                    SubmitOutcome::Failed
                }
            }
        });

        match round.await {
            Ok(outcome) => outcome,
            Err(e) => {
                error!("Generation round panicked: {e}");
                let mut session = session.lock().await;
                session.status = Status::Idle;
                session.last_error =
                    Some("internal error while generating the answer".to_string());
                SubmitOutcome::Failed
            }
        }
    }
}
