//! Chat session: the ordered log of questions and assistant replies.

use std::sync::Arc;

use async_graphql::{Enum, SimpleObject};
use chrono::{DateTime, Utc};
use tokio::{runtime::Handle, sync::Mutex};
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use crate::{
    llm::{ModelClient, RequestError},
    reply::{parse_reply, Confidence, StructuredReply},
};

const GREETING: &str = "Hello! I'm CompliGuard, your auditable compliance assistant. I can answer \
    questions based on internal policies and ISO/GDPR regulations. All my answers are backed by \
    citations.";
const MISSING_KEY_REPLY: &str = "I can't reach the policy engine because no API key is \
    configured. Please check your API key and try again.";
const SERVICE_FAILURE_REPLY: &str = "I encountered an error connecting to the policy engine. \
    Please try again.";
const INTERRUPTED_REPLY: &str = "The previous request was interrupted before a reply arrived. \
    Please ask again.";

#[derive(Enum, Copy, Clone, Debug, Eq, PartialEq)]
pub(crate) enum Role {
    User,
    Assistant,
    System,
}

#[derive(SimpleObject, Clone, Debug)]
pub(crate) struct Message {
    pub(crate) id: String,
    pub(crate) role: Role,
    /// Raw text: the question, the unparsed model reply, or a failure notice.
    pub(crate) content: String,
    pub(crate) timestamp: DateTime<Utc>,
    pub(crate) reply: Option<StructuredReply>,
}

impl Message {
    fn new(role: Role, content: String, reply: Option<StructuredReply>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            role,
            content,
            timestamp: Utc::now(),
            reply,
        }
    }

    fn greeting() -> Self {
        Self::new(
            Role::System,
            String::new(),
            Some(StructuredReply {
                answer: GREETING.to_string(),
                confidence: Confidence::High,
                ..StructuredReply::default()
            }),
        )
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub(crate) enum SessionError {
    #[error("query must not be empty")]
    EmptyQuery,
    #[error("a request is already in progress for this session")]
    Busy,
}

pub(crate) struct ChatSession {
    messages: Vec<Message>,
    pending: bool,
}

impl Default for ChatSession {
    fn default() -> Self {
        Self::new()
    }
}

impl ChatSession {
    pub(crate) fn new() -> Self {
        Self {
            messages: vec![Message::greeting()],
            pending: false,
        }
    }

    pub(crate) fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub(crate) fn is_pending(&self) -> bool {
        self.pending
    }

    /// Records the user's question and marks a request as in flight.
    /// Returns the trimmed query to send.
    pub(crate) fn begin(&mut self, input: &str) -> Result<String, SessionError> {
        let query = input.trim();
        if query.is_empty() {
            return Err(SessionError::EmptyQuery);
        }
        if self.pending {
            return Err(SessionError::Busy);
        }
        self.pending = true;
        self.messages
            .push(Message::new(Role::User, query.to_string(), None));
        Ok(query.to_string())
    }

    /// Records the outcome of the request started by [`ChatSession::begin`].
    pub(crate) fn finish(&mut self, outcome: Result<String, RequestError>) -> Message {
        self.pending = false;
        let message = match outcome {
            Ok(raw) => {
                let reply = parse_reply(&raw);
                Message::new(Role::Assistant, raw, Some(reply))
            }
            Err(e) => {
                error!(error = %e, "Compliance request failed");
                Message::new(Role::Assistant, failure_reply(&e).to_string(), None)
            }
        };
        self.messages.push(message.clone());
        message
    }

    /// Closes a request whose caller went away before the reply arrived.
    fn abandon(&mut self) {
        self.pending = false;
        self.messages.push(Message::new(
            Role::Assistant,
            INTERRUPTED_REPLY.to_string(),
            None,
        ));
    }

    /// Drops the conversation, keeping only the greeting. Refused while a
    /// request is in flight, so its reply cannot outlive its question.
    pub(crate) fn clear(&mut self) -> Result<(), SessionError> {
        if self.pending {
            return Err(SessionError::Busy);
        }
        self.messages = vec![Message::greeting()];
        Ok(())
    }
}

/// Clears the in-flight flag if the request future is dropped before
/// [`ChatSession::finish`] runs.
struct InFlight {
    session: Option<Arc<Mutex<ChatSession>>>,
}

impl InFlight {
    fn new(session: Arc<Mutex<ChatSession>>) -> Self {
        Self {
            session: Some(session),
        }
    }

    fn disarm(mut self) {
        self.session = None;
    }
}

impl Drop for InFlight {
    fn drop(&mut self) {
        let Some(session) = self.session.take() else {
            return;
        };
        warn!("Compliance request dropped before completion");
        if let Ok(mut guard) = session.try_lock() {
            guard.abandon();
            return;
        }
        match Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move {
                    session.lock().await.abandon();
                });
            }
            Err(e) => error!(error = %e, "Cannot release chat session outside the runtime"),
        }
    }
}

fn failure_reply(e: &RequestError) -> &'static str {
    match e {
        RequestError::Configuration => MISSING_KEY_REPLY,
        RequestError::Service(_) => SERVICE_FAILURE_REPLY,
    }
}

/// Sends `input` on behalf of `session`, holding the session lock only while
/// the log is updated, never across the model call.
///
/// The in-flight flag is released even if this future is dropped midway.
#[instrument(skip_all)]
pub(crate) async fn ask(
    session: &Arc<Mutex<ChatSession>>,
    client: &dyn ModelClient,
    input: &str,
) -> Result<Message, SessionError> {
    let query = session.lock().await.begin(input)?;
    let in_flight = InFlight::new(session.clone());
    info!(%query, "Sending compliance question");
    let outcome = client.generate(&query).await;
    let message = session.lock().await.finish(outcome);
    in_flight.disarm();
    Ok(message)
}
