//! Backend variants selectable per request.

mod multi;
mod single;

pub use multi::MultiAgentBackend;
pub use single::SingleAgentBackend;
