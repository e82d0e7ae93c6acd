//! Multi-agent backend: a planner, an executor, and a reporter.
//!
//! The planner splits the request into steps and classifies each one
//! before anything touches the store, so a request with an unintelligible
//! step fails without side effects. The executor then runs the steps in
//! order and stops at the first failure.

use async_trait::async_trait;
use regex::Regex;
use tracing::debug;

use crate::agent_backend::{
    domain::{AgentError, BackendError, BackendKind, Intent},
    ports::{AgentBackend, AgentResult},
    services::{IntentClassifier, Outcome, ResponseRenderer, execute},
};
use crate::task::adapters::traced::TracedTaskStore;

/// Cooperating sub-agents behind the common backend interface.
#[derive(Debug)]
pub struct MultiAgentBackend {
    planner: Planner,
    executor: Executor,
    reporter: Reporter,
}

impl MultiAgentBackend {
    /// Creates the backend.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError`] if the request patterns or response
    /// templates fail to load.
    pub fn new() -> Result<Self, BackendError> {
        Ok(Self {
            planner: Planner::new()?,
            executor: Executor {
                backend: BackendKind::Multi,
            },
            reporter: Reporter {
                renderer: ResponseRenderer::new()?,
            },
        })
    }
}

#[async_trait]
impl AgentBackend for MultiAgentBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Multi
    }

    async fn handle(&self, input: &str, store: &TracedTaskStore<'_>) -> AgentResult<String> {
        let plan = self.planner.plan(input)?;
        let intents = plan
            .iter()
            .map(|step| step.intent.name())
            .collect::<Vec<_>>()
            .join(",");
        store.record_event(
            "plan_created",
            [
                ("steps", plan.len().to_string()),
                ("intents", intents),
                ("backend", BackendKind::Multi.as_str().to_owned()),
            ],
        );
        let outcomes = self.executor.run(plan, store)?;
        Ok(self.reporter.report(&outcomes)?)
    }
}

#[derive(Debug)]
struct PlannedStep {
    text: String,
    intent: Intent,
}

/// Splits a request into independently classified steps.
#[derive(Debug)]
struct Planner {
    separator: Regex,
    classifier: IntentClassifier,
}

impl Planner {
    fn new() -> Result<Self, BackendError> {
        Ok(Self {
            separator: Regex::new(r"(?i)\s*;\s*|\s+and\s+then\s+|\s+then\s+")?,
            classifier: IntentClassifier::new()?,
        })
    }

    fn plan(&self, input: &str) -> Result<Vec<PlannedStep>, BackendError> {
        let steps = self
            .separator
            .split(input)
            .map(str::trim)
            .filter(|step| !step.is_empty())
            .map(|text| {
                self.classifier.classify(text).map(|intent| PlannedStep {
                    text: text.to_owned(),
                    intent,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        if steps.is_empty() {
            return Err(BackendError::Unrecognised(input.trim().to_owned()));
        }
        debug!(steps = steps.len(), "request planned");
        Ok(steps)
    }
}

/// Runs planned steps in order through the traced store.
#[derive(Debug)]
struct Executor {
    backend: BackendKind,
}

impl Executor {
    fn run(
        &self,
        plan: Vec<PlannedStep>,
        store: &TracedTaskStore<'_>,
    ) -> Result<Vec<Outcome>, AgentError> {
        let mut outcomes = Vec::with_capacity(plan.len());
        for (index, step) in plan.into_iter().enumerate() {
            let intent = step.intent.name();
            debug!(
                backend = %self.backend,
                step = index + 1,
                intent,
                text = %step.text,
                "executing step"
            );
            outcomes.push(execute(step.intent, store)?);
            store.record_event(
                "step_completed",
                [("step", (index + 1).to_string()), ("intent", intent.to_owned())],
            );
        }
        Ok(outcomes)
    }
}

/// Turns step outcomes into the final response.
#[derive(Debug)]
struct Reporter {
    renderer: ResponseRenderer,
}

impl Reporter {
    fn report(&self, outcomes: &[Outcome]) -> Result<String, BackendError> {
        let summaries = outcomes
            .iter()
            .map(|outcome| self.renderer.outcome(outcome))
            .collect::<Result<Vec<_>, _>>()?;
        match summaries.as_slice() {
            [single] => Ok(single.clone()),
            _ => self.renderer.report(&summaries),
        }
    }
}
