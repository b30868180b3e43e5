//! Application use cases (business logic orchestration).

mod collection_tree;
#[cfg(test)]
pub(crate) mod memory_store;
mod request_catalog;
mod request_sequencer;

pub use collection_tree::*;
pub use request_catalog::*;
pub use request_sequencer::*;
