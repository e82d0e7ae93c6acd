//! Shared request interpretation used by every backend variant.

mod execute;
mod intent;
mod render;

pub use execute::{Outcome, execute};
pub use intent::IntentClassifier;
pub use render::ResponseRenderer;
