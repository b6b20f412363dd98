//! Consumer module for the tweet indexer ingest.
//!
//! Provides the `Consumer` seam and the Twitter sample-stream implementation.

mod messages;
mod oauth;
mod twitter_stream;

pub use messages::StreamMessage;
pub use oauth::{OAuthCredentials, OAuthSigner};
pub use twitter_stream::{decode_line, TwitterStream, SAMPLE_STREAM_URL};

use async_trait::async_trait;
use tokio::sync::{broadcast, mpsc};

use crate::errors::IngestError;

/// A source of stream messages.
///
/// `run` pushes messages into `sender` until the source is exhausted or `shutdown`
/// fires, then returns. Implementations should send [`StreamMessage::End`] before
/// returning normally.
#[async_trait]
pub trait Consumer: Send + Sync {
    async fn run(
        &self,
        sender: mpsc::Sender<StreamMessage>,
        shutdown: broadcast::Receiver<()>,
    ) -> Result<(), IngestError>;
}
