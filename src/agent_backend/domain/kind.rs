//! Backend variant selector.

use super::ParseBackendKindError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The closed set of agent backend variants.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    /// One agent classifies and acts in a single pass.
    #[default]
    Single,
    /// A planner, executor, and reporter cooperate on each request.
    Multi,
}

impl BackendKind {
    /// Every variant, in selector order.
    pub const ALL: [Self; 2] = [Self::Single, Self::Multi];

    /// Returns the selector string for this variant.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Single => "single",
            Self::Multi => "multi",
        }
    }

    /// Returns the trace name used for requests served by this variant.
    #[must_use]
    pub fn trace_name(self) -> String {
        format!("task_manager_{}", self.as_str())
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for BackendKind {
    type Error = ParseBackendKindError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "single" => Ok(Self::Single),
            "multi" => Ok(Self::Multi),
            _ => Err(ParseBackendKindError(value.to_owned())),
        }
    }
}
