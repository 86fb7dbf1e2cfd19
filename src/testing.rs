//! Scripted model, counting search provider and HTTP stub for tests.

use crate::agent::{ConversationModel, ConversationSession, SessionReply, ToolCallRequest};
use crate::error::{Result, VeritasError};
use crate::search::{SearchDocument, SearchProvider, SearchResults};
use async_trait::async_trait;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json, Router};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// A message the loop sent through a scripted session.
#[derive(Debug, Clone)]
pub enum SentMessage {
    User(String),
    ToolResult {
        call_id: String,
        payload: serde_json::Value,
    },
}

/// Model whose sessions replay a fixed list of replies.
///
/// Each session gets its own copy of the script; all sent messages are
/// recorded in one shared log.
pub struct ScriptedModel {
    script: Vec<SessionReply>,
    sent: Arc<Mutex<Vec<SentMessage>>>,
    sessions: AtomicUsize,
}

impl ScriptedModel {
    pub fn new(script: Vec<SessionReply>) -> Arc<Self> {
        Arc::new(Self {
            script,
            sent: Arc::new(Mutex::new(Vec::new())),
            sessions: AtomicUsize::new(0),
        })
    }

    pub fn sent(&self) -> Vec<SentMessage> {
        self.sent.lock().unwrap().clone()
    }

    pub fn sessions_opened(&self) -> usize {
        self.sessions.load(Ordering::SeqCst)
    }
}

impl ConversationModel for ScriptedModel {
    fn open_session(&self) -> Box<dyn ConversationSession> {
        self.sessions.fetch_add(1, Ordering::SeqCst);
        Box::new(ScriptedSession {
            replies: self.script.iter().cloned().collect(),
            sent: self.sent.clone(),
        })
    }

    fn model_name(&self) -> &str {
        "scripted"
    }
}

struct ScriptedSession {
    replies: VecDeque<SessionReply>,
    sent: Arc<Mutex<Vec<SentMessage>>>,
}

impl ScriptedSession {
    fn next_reply(&mut self) -> Result<SessionReply> {
        self.replies
            .pop_front()
            .ok_or_else(|| VeritasError::Session("script exhausted".to_string()))
    }
}

#[async_trait]
impl ConversationSession for ScriptedSession {
    async fn send_user_message(&mut self, text: &str) -> Result<SessionReply> {
        self.sent
            .lock()
            .unwrap()
            .push(SentMessage::User(text.to_string()));
        self.next_reply()
    }

    async fn send_tool_result(
        &mut self,
        call: &ToolCallRequest,
        payload: serde_json::Value,
    ) -> Result<SessionReply> {
        self.sent.lock().unwrap().push(SentMessage::ToolResult {
            call_id: call.id.clone(),
            payload,
        });
        self.next_reply()
    }
}

/// Search provider that counts calls and returns canned documents.
pub struct CountingSearch {
    documents: Option<Vec<SearchDocument>>,
    calls: AtomicUsize,
    queries: Mutex<Vec<String>>,
}

impl CountingSearch {
    pub fn with_urls(urls: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            documents: Some(urls.iter().map(|u| SearchDocument::new(*u)).collect()),
            calls: AtomicUsize::new(0),
            queries: Mutex::new(Vec::new()),
        })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            documents: None,
            calls: AtomicUsize::new(0),
            queries: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl SearchProvider for CountingSearch {
    async fn search(&self, query: &str, max_results: usize) -> Result<SearchResults> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.queries.lock().unwrap().push(query.to_string());

        match &self.documents {
            Some(docs) => {
                let docs = docs.iter().take(max_results).cloned().collect();
                Ok(SearchResults::new(query, docs))
            }
            None => Err(VeritasError::SearchUnavailable("rate limited".to_string())),
        }
    }

    fn name(&self) -> &str {
        "counting"
    }
}

/// Local HTTP server that answers every request with canned responses.
///
/// Responses are served in order; the last one repeats.
pub struct StubServer {
    pub base_url: String,
    state: Arc<StubState>,
}

struct StubState {
    responses: Vec<(u16, serde_json::Value)>,
    hits: AtomicUsize,
}

impl StubServer {
    pub async fn start(responses: Vec<(u16, serde_json::Value)>) -> Self {
        let state = Arc::new(StubState {
            responses,
            hits: AtomicUsize::new(0),
        });
        let app = Router::new().fallback(stub_respond).with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: format!("http://{}", addr),
            state,
        }
    }

    pub fn hits(&self) -> usize {
        self.state.hits.load(Ordering::SeqCst)
    }
}

async fn stub_respond(State(state): State<Arc<StubState>>) -> impl IntoResponse {
    let n = state.hits.fetch_add(1, Ordering::SeqCst);
    let (status, body) = state
        .responses
        .get(n)
        .or(state.responses.last())
        .cloned()
        .unwrap_or((500, serde_json::Value::Null));
    (StatusCode::from_u16(status).unwrap(), Json(body))
}
