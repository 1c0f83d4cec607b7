pub mod sample;
pub mod store;
pub mod types;

pub use store::{KnowledgeStore, LoadOutcome};
pub use types::{KnowledgeBase, KnowledgeUpdate, Location, Record, RecordValue};
