//! Response text rendered from store outcomes.

use minijinja::{Environment, context};

use super::execute::Outcome;
use crate::agent_backend::domain::BackendError;

const CREATED: &str = "Task created successfully: ID {{ task.id }} - {{ task.title }} \
(Priority: {{ task.priority }}, Status: {{ task.status }}\
{% if task.due_date %}, Due: {{ task.due_date }}{% endif %})";

const LISTED: &str = "{% if tasks %}Found {{ tasks | length }} task(s)\
{% if filter %} with {{ filter }}{% endif %}:\
{% for task in tasks %}\n  • ID {{ task.id }}: {{ task.title }} \
({{ task.status }}, {{ task.priority }} priority){% endfor %}\
{% else %}No tasks found{% if filter %} with {{ filter }}{% endif %}.{% endif %}";

const RETRIEVED: &str = "Task {{ task.id }}: {{ task.title }}\
\n  Status: {{ task.status }}\
\n  Priority: {{ task.priority }}\
{% if task.description %}\n  Description: {{ task.description }}{% endif %}\
{% if task.due_date %}\n  Due: {{ task.due_date }}{% endif %}";

const UPDATED: &str = "Task {{ task.id }} updated successfully: {{ task.title }} \
- Status: {{ task.status }}, Priority: {{ task.priority }}";

const DELETED: &str = "Task {{ id }} deleted.";

const STATS: &str = "Task Statistics:\
\n• Total Tasks: {{ stats.total }}\
\n• Pending: {{ stats.pending }}\
\n• In Progress: {{ stats.in_progress }}\
\n• Completed: {{ stats.completed }}\
\n• Cancelled: {{ stats.cancelled }}\
\n• High Priority: {{ stats.high }}\
\n• Medium Priority: {{ stats.medium }}\
\n• Low Priority: {{ stats.low }}";

const REPORT: &str = "{% for step in steps %}{{ loop.index }}. {{ step }}\
{% if not loop.last %}\n{% endif %}{% endfor %}";

/// Renders outcomes into the text returned to the caller.
#[derive(Debug)]
pub struct ResponseRenderer {
    environment: Environment<'static>,
}

impl ResponseRenderer {
    /// Loads the response templates.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::Render`] if a template fails to parse.
    pub fn new() -> Result<Self, BackendError> {
        let mut environment = Environment::new();
        for (name, source) in [
            ("created", CREATED),
            ("listed", LISTED),
            ("retrieved", RETRIEVED),
            ("updated", UPDATED),
            ("deleted", DELETED),
            ("stats", STATS),
            ("report", REPORT),
        ] {
            environment.add_template(name, source)?;
        }
        Ok(Self { environment })
    }

    /// Renders the summary of one store call.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::Render`] when rendering fails.
    pub fn outcome(&self, outcome: &Outcome) -> Result<String, BackendError> {
        let rendered = match outcome {
            Outcome::Created(task) => self.render("created", context! { task })?,
            Outcome::Listed { filter, tasks } => self.render(
                "listed",
                context! { filter => filter.describe(), tasks },
            )?,
            Outcome::Retrieved(task) => self.render("retrieved", context! { task })?,
            Outcome::Updated(task) => self.render("updated", context! { task })?,
            Outcome::Deleted(id) => self.render("deleted", context! { id => id.value() })?,
            Outcome::Stats(stats) => self.render("stats", context! { stats })?,
        };
        Ok(rendered)
    }

    /// Joins per-step summaries into one numbered report.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::Render`] when rendering fails.
    pub fn report(&self, steps: &[String]) -> Result<String, BackendError> {
        self.render("report", context! { steps })
    }

    fn render(&self, name: &str, context: minijinja::Value) -> Result<String, BackendError> {
        Ok(self.environment.get_template(name)?.render(context)?)
    }
}
