//! Single-agent backend: classify once, act, summarise.

use async_trait::async_trait;

use crate::agent_backend::{
    domain::{BackendError, BackendKind},
    ports::{AgentBackend, AgentResult},
    services::{IntentClassifier, ResponseRenderer, execute},
};
use crate::task::adapters::traced::TracedTaskStore;

/// One agent interprets the whole request and performs a single store call.
#[derive(Debug)]
pub struct SingleAgentBackend {
    classifier: IntentClassifier,
    renderer: ResponseRenderer,
}

impl SingleAgentBackend {
    /// Creates the backend.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError`] if the request patterns or response
    /// templates fail to load.
    pub fn new() -> Result<Self, BackendError> {
        Ok(Self {
            classifier: IntentClassifier::new()?,
            renderer: ResponseRenderer::new()?,
        })
    }
}

#[async_trait]
impl AgentBackend for SingleAgentBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Single
    }

    async fn handle(&self, input: &str, store: &TracedTaskStore<'_>) -> AgentResult<String> {
        let intent = self.classifier.classify(input)?;
        store.record_event(
            "intent_classified",
            [("intent", intent.name()), ("backend", BackendKind::Single.as_str())],
        );
        let outcome = execute(intent, store)?;
        Ok(self.renderer.outcome(&outcome)?)
    }
}
