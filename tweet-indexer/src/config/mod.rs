//! Configuration and dependency wiring for the tweet indexer.

mod dependencies;
mod settings;

pub use dependencies::Dependencies;
pub use settings::{ConnectionMode, IndexerConfig};
