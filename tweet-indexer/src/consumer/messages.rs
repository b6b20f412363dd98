//! Message types for the consumer.
//!
//! Defines the messages that flow from a consumer into the orchestrator.

use tweet_indexer_shared::PostEvent;

/// Messages that flow through the ingest.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamMessage {
    /// A post received from the streaming source.
    Post(PostEvent),
    /// The source reports that this client is falling behind.
    StallWarning {
        code: String,
        message: String,
        percent_full: Option<u32>,
    },
    /// Stream has ended.
    End,
    /// An error occurred.
    Error(String),
}
