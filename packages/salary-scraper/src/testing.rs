//! Testing utilities including mock implementations.
//!
//! These let the pipeline run end to end without network or LLM calls.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Arc, Mutex, RwLock};
use std::time::Duration;

use crate::error::{Result, ScrapeError};
use crate::extraction::LanguageModel;
use crate::sources::Source;
use crate::types::{CompanyQuery, DiscussionText, ThreadReference};

/// Error produced by the mocks.
#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct MockError(pub String);

// =============================================================================
// MockModel
// =============================================================================

#[derive(Debug, Clone)]
enum MockReply {
    Text(String),
    Error(String),
}

/// A scripted language model.
///
/// Replies are taken from prompt rules first (first rule whose needle occurs
/// in the prompt), then from a FIFO queue. Clones share state, so keep a
/// clone around to inspect calls after handing one to an extractor.
#[derive(Clone, Default)]
pub struct MockModel {
    rules: Arc<RwLock<Vec<(String, String)>>>,
    queue: Arc<Mutex<VecDeque<MockReply>>>,
    prompts: Arc<Mutex<Vec<String>>>,
}

impl MockModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a reply.
    pub fn with_response(self, text: impl Into<String>) -> Self {
        self.queue
            .lock()
            .unwrap()
            .push_back(MockReply::Text(text.into()));
        self
    }

    /// Queue a failed call.
    pub fn with_error(self, message: impl Into<String>) -> Self {
        self.queue
            .lock()
            .unwrap()
            .push_back(MockReply::Error(message.into()));
        self
    }

    /// Always answer `text` when the prompt contains `needle`.
    pub fn with_response_for(self, needle: impl Into<String>, text: impl Into<String>) -> Self {
        self.rules
            .write()
            .unwrap()
            .push((needle.into(), text.into()));
        self
    }

    /// Prompts received so far, in call order.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }
}

#[async_trait]
impl LanguageModel for MockModel {
    fn name(&self) -> &str {
        "mock"
    }

    async fn generate(&self, prompt: &str) -> Result<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());

        let ruled = self
            .rules
            .read()
            .unwrap()
            .iter()
            .find(|(needle, _)| prompt.contains(needle.as_str()))
            .map(|(_, text)| text.clone());
        if let Some(text) = ruled {
            return Ok(text);
        }

        let reply = self.queue.lock().unwrap().pop_front();
        match reply {
            Some(MockReply::Text(text)) => Ok(text),
            Some(MockReply::Error(message)) => Err(ScrapeError::Model(Box::new(MockError(message)))),
            None => Err(ScrapeError::Model(Box::new(MockError(
                "no scripted response".to_string(),
            )))),
        }
    }
}

// =============================================================================
// MockSource
// =============================================================================

/// Record of a call made to the mock source.
#[derive(Debug, Clone, PartialEq)]
pub enum MockSourceCall {
    Discover { keyword: String },
    Retrieve { identifier: String },
}

/// An in-memory source keyed by company keyword and thread identifier.
///
/// Threads with no registered text retrieve as `Missing`. A per-thread
/// delay makes retrievals finish out of discovery order.
#[derive(Clone)]
pub struct MockSource {
    name: String,
    threads: Arc<RwLock<HashMap<String, Vec<ThreadReference>>>>,
    texts: Arc<RwLock<HashMap<String, String>>>,
    delays: Arc<RwLock<HashMap<String, Duration>>>,
    failing_discovery: Arc<RwLock<HashSet<String>>>,
    failing_retrieval: Arc<RwLock<HashSet<String>>>,
    calls: Arc<RwLock<Vec<MockSourceCall>>>,
}

impl MockSource {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            threads: Default::default(),
            texts: Default::default(),
            delays: Default::default(),
            failing_discovery: Default::default(),
            failing_retrieval: Default::default(),
            calls: Default::default(),
        }
    }

    /// Register a thread for `company` with its body text.
    pub fn with_thread(
        self,
        company: &str,
        identifier: &str,
        text: impl Into<String>,
    ) -> Self {
        self.add_thread(company, identifier);
        self.texts
            .write()
            .unwrap()
            .insert(identifier.to_string(), text.into());
        self
    }

    /// Register a thread whose page has no readable body.
    pub fn with_missing_thread(self, company: &str, identifier: &str) -> Self {
        self.add_thread(company, identifier);
        self
    }

    /// Hold retrieval of `identifier` for `delay`.
    pub fn with_delay(self, identifier: &str, delay: Duration) -> Self {
        self.delays
            .write()
            .unwrap()
            .insert(identifier.to_string(), delay);
        self
    }

    pub fn failing_discovery(self, company: &str) -> Self {
        self.failing_discovery
            .write()
            .unwrap()
            .insert(CompanyQuery::new(company).keyword());
        self
    }

    pub fn failing_retrieval(self, identifier: &str) -> Self {
        self.failing_retrieval
            .write()
            .unwrap()
            .insert(identifier.to_string());
        self
    }

    pub fn calls(&self) -> Vec<MockSourceCall> {
        self.calls.read().unwrap().clone()
    }

    fn add_thread(&self, company: &str, identifier: &str) {
        self.threads
            .write()
            .unwrap()
            .entry(CompanyQuery::new(company).keyword())
            .or_default()
            .push(ThreadReference::new(identifier, format!("post-{}", identifier)));
    }
}

#[async_trait]
impl Source for MockSource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn discover(&self, company: &CompanyQuery) -> Result<Vec<ThreadReference>> {
        let keyword = company.keyword();
        self.calls.write().unwrap().push(MockSourceCall::Discover {
            keyword: keyword.clone(),
        });

        if self.failing_discovery.read().unwrap().contains(&keyword) {
            return Err(ScrapeError::Discovery {
                source_name: self.name.clone(),
                message: "mock search failure".to_string(),
            });
        }

        Ok(self
            .threads
            .read()
            .unwrap()
            .get(&keyword)
            .cloned()
            .unwrap_or_default())
    }

    async fn retrieve(&self, thread: &ThreadReference) -> Result<DiscussionText> {
        self.calls.write().unwrap().push(MockSourceCall::Retrieve {
            identifier: thread.identifier.clone(),
        });

        let delay = self.delays.read().unwrap().get(&thread.identifier).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if self
            .failing_retrieval
            .read()
            .unwrap()
            .contains(&thread.identifier)
        {
            return Err(ScrapeError::RetrievalExhausted {
                url: thread.url("mock://"),
                attempts: 1,
                last_error: "mock fetch failure".to_string(),
            });
        }

        Ok(DiscussionText::from(
            self.texts.read().unwrap().get(&thread.identifier).cloned(),
        ))
    }
}
