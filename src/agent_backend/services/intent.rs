//! Rule-based interpretation of free-text requests.
//!
//! The classifier stands in for the model layer: it recognises a fixed
//! vocabulary of task-management phrasings and extracts their arguments.
//! Argument values are passed through raw so the task store remains the
//! single place that validates statuses, priorities, and dates.

use regex::Regex;

use crate::agent_backend::domain::{BackendError, Intent, ListFilter};
use crate::task::domain::{NewTask, TaskId, TaskPatch};

/// Status words the store understands.
const STATUS_WORDS: &str = r"pending|todo|in[ _-]progress|started|completed|done|cancell?ed";
/// Priority words the store understands.
const PRIORITY_WORDS: &str = r"low|medium|normal|high|urgent";

/// Maps free text onto an [`Intent`].
#[derive(Debug, Clone)]
pub struct IntentClassifier {
    create: Regex,
    delete: Regex,
    mark: Regex,
    shorthand: Regex,
    update: Regex,
    get: Regex,
    stats: Regex,
    list: Regex,
    task_id: Regex,
    any_id: Regex,
    priority: Regex,
    status: Regex,
    status_field: Regex,
    list_status: Regex,
    list_priority: Regex,
    due: Regex,
    description: Regex,
    title_field: Regex,
    title_noise: Regex,
}

impl IntentClassifier {
    /// Compiles the request patterns.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::Pattern`] if a pattern fails to compile.
    pub fn new() -> Result<Self, BackendError> {
        Ok(Self {
            create: Regex::new(r"(?is)^\s*(?:please\s+)?(?:create|add|new|make)\b\s*(?P<rest>.*)$")?,
            delete: Regex::new(r"(?i)^\s*(?:please\s+)?(?:delete|remove|drop)\b")?,
            mark: Regex::new(r"(?i)^\s*(?:please\s+)?mark\b.*?\bas\s+(?P<status>.+)$")?,
            shorthand: Regex::new(
                r"(?i)^\s*(?:please\s+)?(?P<verb>complete|finish|start|begin|cancel|reopen)\b",
            )?,
            update: Regex::new(
                r"(?i)^\s*(?:please\s+)?(?:update|change|set|edit|modify|rename)\b",
            )?,
            get: Regex::new(r"(?i)^\s*(?:please\s+)?(?:get|show|view|describe|display|find)\b")?,
            stats: Regex::new(r"(?i)\b(?:stats|statistics|summary|overview|how\s+many)\b")?,
            list: Regex::new(r"(?i)\b(?:list|show|display|view|tasks|todos)\b")?,
            task_id: Regex::new(r"(?i)(?:\btask\s*#?|#)\s*(?P<id>\d+)\b")?,
            any_id: Regex::new(r"\b(?P<id>\d+)\b")?,
            priority: Regex::new(&format!(
                r"(?i)\b(?P<level>{PRIORITY_WORDS})[\s-]+priority\b|\bpriority\s*(?:[:=]|of|to|as)?\s*(?P<level_after>{PRIORITY_WORDS})\b"
            ))?,
            status: Regex::new(&format!(
                r"(?i)\b(?:status\s*(?:to|=|:|as)?|as|to)\s*(?P<status>{STATUS_WORDS})\b"
            ))?,
            status_field: Regex::new(r"(?i)\bstatus\s*(?:to|=|:|as)?\s*(?P<status>[a-z_-]+)")?,
            list_status: Regex::new(&format!(r"(?i)\b(?P<status>{STATUS_WORDS})\b"))?,
            list_priority: Regex::new(&format!(r"(?i)\b(?P<priority>{PRIORITY_WORDS})\b"))?,
            due: Regex::new(
                r"(?i)\b(?:due(?:\s+(?:on|by|date))?|by|deadline)\s*[:=]?\s*(?P<date>\d{4}-\d{2}-\d{2})\b",
            )?,
            description: Regex::new(
                r"(?i)(?:,\s*|\s+|^)(?:with\s+)?description\s*[:=]\s*(?P<text>.+)$",
            )?,
            title_field: Regex::new(
                r"(?i)\b(?:title\s*(?:to|=|:)|rename\b.*?\bto)\s*(?P<title>.+)$",
            )?,
            title_noise: Regex::new(
                r"(?i)^(?:(?:an?|the|new|one)\s+)*(?:tasks?|todos?|items?)?\b\s*(?:(?:called|named|titled|to|for)\s+)?",
            )?,
        })
    }

    /// Interprets one request.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::Unrecognised`] when no intent matches,
    /// [`BackendError::MissingArgument`] when a required argument is absent,
    /// or [`BackendError::InvalidArgument`] when a task id does not fit.
    pub fn classify(&self, input: &str) -> Result<Intent, BackendError> {
        let text = input.trim();
        if let Some(caps) = self.create.captures(text) {
            let rest = caps.name("rest").map_or("", |m| m.as_str());
            return self.create_request(rest).map(Intent::Create);
        }
        if self.delete.is_match(text) {
            return Ok(Intent::Delete(self.task_id(text, "delete")?));
        }
        if let Some(caps) = self.mark.captures(text) {
            let id = self.task_id(text, "update")?;
            let status = caps.name("status").map_or("", |m| m.as_str());
            return Ok(Intent::Update {
                id,
                patch: TaskPatch::new().with_status(clean_text(status)),
            });
        }
        if let Some(caps) = self.shorthand.captures(text) {
            let id = self.task_id(text, "update")?;
            let verb = caps.name("verb").map_or("", |m| m.as_str());
            return Ok(Intent::Update {
                id,
                patch: TaskPatch::new().with_status(shorthand_status(verb)),
            });
        }
        if self.update.is_match(text) {
            let id = self.task_id(text, "update")?;
            let patch = self.update_patch(text);
            if patch.is_empty() {
                return Err(BackendError::MissingArgument {
                    intent: "update",
                    argument: "fields",
                });
            }
            return Ok(Intent::Update { id, patch });
        }
        if self.get.is_match(text) && self.task_id.is_match(text) {
            return Ok(Intent::Get(self.task_id(text, "get")?));
        }
        if self.stats.is_match(text) {
            return Ok(Intent::Stats);
        }
        if self.list.is_match(text) {
            return Ok(Intent::List(self.list_filter(text)));
        }
        Err(BackendError::Unrecognised(text.to_owned()))
    }

    fn create_request(&self, rest: &str) -> Result<NewTask, BackendError> {
        let mut remaining = rest.to_owned();
        let description = take_capture(&self.description, &mut remaining, "text");
        let due_date = take_capture(&self.due, &mut remaining, "date");
        let priority = self.take_priority(&mut remaining);

        let title = self.title_from(&remaining);
        if title.is_empty() {
            return Err(BackendError::MissingArgument {
                intent: "create",
                argument: "title",
            });
        }

        let mut request = NewTask::new(title);
        if let Some(text) = description {
            request = request.with_description(clean_text(&text));
        }
        if let Some(level) = priority {
            request = request.with_priority(level);
        }
        if let Some(date) = due_date {
            request = request.with_due_date(date);
        }
        Ok(request)
    }

    fn update_patch(&self, text: &str) -> TaskPatch {
        let mut remaining = text.to_owned();
        let mut patch = TaskPatch::new();
        if let Some(title) = take_capture(&self.title_field, &mut remaining, "title") {
            patch = patch.with_title(clean_text(&title));
        }
        if let Some(description) = take_capture(&self.description, &mut remaining, "text") {
            patch = patch.with_description(clean_text(&description));
        }
        if let Some(date) = take_capture(&self.due, &mut remaining, "date") {
            patch = patch.with_due_date(date);
        }
        if let Some(level) = self.take_priority(&mut remaining) {
            patch = patch.with_priority(level);
        }
        let status = self
            .status
            .captures(&remaining)
            .or_else(|| self.status_field.captures(&remaining))
            .and_then(|caps| caps.name("status"))
            .map(|m| m.as_str().to_owned());
        if let Some(value) = status {
            patch = patch.with_status(value);
        }
        patch
    }

    fn list_filter(&self, text: &str) -> ListFilter {
        if let Some(status) = capture(&self.list_status, text, "status") {
            return ListFilter::Status(status.to_ascii_lowercase());
        }
        capture(&self.list_priority, text, "priority")
            .map_or(ListFilter::All, |level| {
                ListFilter::Priority(level.to_ascii_lowercase())
            })
    }

    fn task_id(&self, text: &str, intent: &'static str) -> Result<TaskId, BackendError> {
        let raw = capture(&self.task_id, text, "id")
            .or_else(|| capture(&self.any_id, text, "id"))
            .ok_or(BackendError::MissingArgument {
                intent,
                argument: "task id",
            })?;
        raw.parse::<u64>()
            .map(TaskId::new)
            .map_err(|_| BackendError::InvalidArgument {
                argument: "task id",
                value: raw,
            })
    }

    fn take_priority(&self, text: &mut String) -> Option<String> {
        let (range, level) = {
            let caps = self.priority.captures(text)?;
            let level = caps
                .name("level")
                .or_else(|| caps.name("level_after"))?
                .as_str()
                .to_ascii_lowercase();
            (caps.get(0)?.range(), level)
        };
        text.replace_range(range, " ");
        Some(level)
    }

    fn title_from(&self, text: &str) -> String {
        let candidate = text.split_once(": ").map_or_else(
            || self.title_noise.replace(text.trim(), "").into_owned(),
            |(_, after)| after.to_owned(),
        );
        clean_text(&candidate)
    }
}

fn capture(pattern: &Regex, text: &str, group: &str) -> Option<String> {
    pattern
        .captures(text)
        .and_then(|caps| caps.name(group).map(|m| m.as_str().to_owned()))
}

/// Removes the whole match of `pattern` from `text`, returning the named
/// group.
fn take_capture(pattern: &Regex, text: &mut String, group: &str) -> Option<String> {
    let (range, value) = {
        let caps = pattern.captures(text)?;
        let value = caps.name(group)?.as_str().trim().to_owned();
        (caps.get(0)?.range(), value)
    };
    text.replace_range(range, " ");
    Some(value)
}

fn shorthand_status(verb: &str) -> &'static str {
    match verb.to_ascii_lowercase().as_str() {
        "start" | "begin" => "in_progress",
        "cancel" => "cancelled",
        "reopen" => "pending",
        _ => "completed",
    }
}

/// Collapses whitespace and strips wrapping quotes and trailing punctuation.
fn clean_text(text: &str) -> String {
    let joined = text.split_whitespace().collect::<Vec<_>>().join(" ");
    joined
        .trim_matches(|c: char| matches!(c, '"' | '\'' | '.' | ',' | '!' | '?'))
        .trim()
        .to_owned()
}
