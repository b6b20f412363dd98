//! Twitter sample-stream consumer.
//!
//! Opens a signed, long-lived `GET` on the sample endpoint and turns the
//! newline-delimited JSON body into [`StreamMessage`]s.

use async_trait::async_trait;
use futures::StreamExt;
use reqwest::header::AUTHORIZATION;
use serde::Deserialize;
use std::time::Duration;
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, error, info, instrument, warn};
use url::Url;

use crate::consumer::messages::StreamMessage;
use crate::consumer::oauth::{OAuthCredentials, OAuthSigner};
use crate::consumer::Consumer;
use crate::errors::IngestError;
use tweet_indexer_shared::{Coordinates, PostEvent};

/// English-only sample stream with stall warnings enabled.
pub const SAMPLE_STREAM_URL: &str =
    "https://stream.twitter.com/1.1/statuses/sample.json?language=en&stall_warnings=true";

const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// Longest line kept while waiting for its newline.
const MAX_LINE_BYTES: usize = 1024 * 1024;

/// Consumer for the Twitter sample stream.
pub struct TwitterStream {
    client: reqwest::Client,
    signer: OAuthSigner,
    url: Url,
}

impl TwitterStream {
    /// Create a consumer for the default sample stream endpoint.
    pub fn new(credentials: OAuthCredentials) -> Result<Self, IngestError> {
        let url = Url::parse(SAMPLE_STREAM_URL).map_err(|e| IngestError::stream(e.to_string()))?;
        Self::with_url(credentials, url)
    }

    /// Create a consumer for a custom endpoint.
    pub fn with_url(credentials: OAuthCredentials, url: Url) -> Result<Self, IngestError> {
        let client = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .build()?;

        Ok(Self {
            client,
            signer: OAuthSigner::new(credentials),
            url,
        })
    }

    /// Decode one line and forward it. Returns false once the receiver is gone.
    async fn forward_line(&self, line: &[u8], sender: &mpsc::Sender<StreamMessage>) -> bool {
        let line = String::from_utf8_lossy(line);
        let message = match decode_line(&line) {
            Ok(Some(message)) => message,
            Ok(None) => return true,
            Err(e) => {
                warn!(error = %e, "Skipping undecodable stream line");
                return true;
            }
        };

        sender.send(message).await.is_ok()
    }
}

#[async_trait]
impl Consumer for TwitterStream {
    #[instrument(skip(self, sender, shutdown), fields(url = %self.url))]
    async fn run(
        &self,
        sender: mpsc::Sender<StreamMessage>,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), IngestError> {
        let authorization = self.signer.authorization_header("GET", &self.url)?;
        let request = self
            .client
            .get(self.url.clone())
            .header(AUTHORIZATION, authorization)
            .send();

        let response = tokio::select! {
            _ = shutdown.recv() => {
                info!("Consumer received shutdown signal while connecting");
                let _ = sender.send(StreamMessage::End).await;
                return Ok(());
            }
            response = request => response?,
        };

        let status = response.status();
        if !status.is_success() {
            return Err(IngestError::stream(format!(
                "Subscription rejected with status {}",
                status
            )));
        }

        info!("Connected to Twitter sample stream");

        let mut body = response.bytes_stream();
        let mut lines = LineBuffer::new(MAX_LINE_BYTES);

        'outer: loop {
            tokio::select! {
                _ = shutdown.recv() => {
                    info!("Consumer received shutdown signal");
                    break;
                }
                chunk = body.next() => {
                    match chunk {
                        Some(Ok(bytes)) => {
                            lines.extend(&bytes);
                            while let Some(line) = lines.next_line() {
                                if !self.forward_line(&line, &sender).await {
                                    debug!("Receiver dropped, stopping consumer");
                                    break 'outer;
                                }
                            }
                        }
                        Some(Err(e)) => {
                            error!(error = %e, "Twitter stream failed");
                            let _ = sender.send(StreamMessage::Error(e.to_string())).await;
                            break;
                        }
                        None => {
                            info!("Twitter stream closed by source");
                            break;
                        }
                    }
                }
            }
        }

        // Dropping the body closes the subscription.
        drop(body);
        let _ = sender.send(StreamMessage::End).await;
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
struct RawTweet {
    #[serde(default)]
    id_str: String,
    #[serde(default)]
    text: String,
    #[serde(default)]
    possibly_sensitive: bool,
    #[serde(default)]
    source: String,
    #[serde(default)]
    created_at: String,
    #[serde(default)]
    user: RawUser,
    #[serde(default)]
    entities: RawEntities,
    #[serde(default)]
    coordinates: Option<RawPoint>,
}

#[derive(Debug, Default, Deserialize)]
struct RawUser {
    #[serde(default)]
    screen_name: String,
    #[serde(default)]
    location: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct RawEntities {
    #[serde(default)]
    hashtags: Vec<RawHashtag>,
}

#[derive(Debug, Deserialize)]
struct RawHashtag {
    text: String,
}

/// GeoJSON point, `[longitude, latitude]`.
#[derive(Debug, Deserialize)]
struct RawPoint {
    coordinates: [f64; 2],
}

#[derive(Debug, Deserialize)]
struct RawWarning {
    #[serde(default)]
    code: String,
    #[serde(default)]
    message: String,
    #[serde(default)]
    percent_full: Option<u32>,
}

impl From<RawTweet> for PostEvent {
    fn from(raw: RawTweet) -> Self {
        PostEvent {
            id: raw.id_str,
            user: raw.user.screen_name,
            text: raw.text,
            possibly_sensitive: raw.possibly_sensitive,
            hashtags: raw.entities.hashtags.into_iter().map(|h| h.text).collect(),
            source: raw.source,
            user_location: raw.user.location.unwrap_or_default(),
            created_at: raw.created_at,
            coordinates: raw
                .coordinates
                .map(|p| Coordinates::new(p.coordinates[0], p.coordinates[1])),
        }
    }
}

/// Splits a chunked body into newline-terminated lines.
///
/// A line growing past `max_line` bytes is discarded up to its next newline.
struct LineBuffer {
    buffer: Vec<u8>,
    scanned: usize,
    max_line: usize,
    discarding: bool,
}

impl LineBuffer {
    fn new(max_line: usize) -> Self {
        Self {
            buffer: Vec::new(),
            scanned: 0,
            max_line,
            discarding: false,
        }
    }

    fn extend(&mut self, bytes: &[u8]) {
        self.buffer.extend_from_slice(bytes);
    }

    /// Next complete line, newline included.
    fn next_line(&mut self) -> Option<Vec<u8>> {
        loop {
            match self.buffer[self.scanned..].iter().position(|b| *b == b'\n') {
                Some(pos) => {
                    let end = self.scanned + pos;
                    let line: Vec<u8> = self.buffer.drain(..=end).collect();
                    self.scanned = 0;
                    if self.discarding {
                        self.discarding = false;
                        continue;
                    }
                    return Some(line);
                }
                None => {
                    if self.buffer.len() > self.max_line {
                        if !self.discarding {
                            warn!(
                                max_line_bytes = self.max_line,
                                "Discarding oversized stream line"
                            );
                        }
                        self.discarding = true;
                        self.buffer.clear();
                    }
                    self.scanned = self.buffer.len();
                    return None;
                }
            }
        }
    }
}

/// Decode one line of the stream body.
///
/// # Returns
///
/// * `Ok(Some(StreamMessage::Post))` - A tweet with a non-empty `id_str`
/// * `Ok(Some(StreamMessage::StallWarning))` - A `{"warning": ...}` message
/// * `Ok(None)` - A keep-alive line or a message kind the indexer ignores
/// * `Err(IngestError::ParseError)` - Invalid JSON, or a tweet without an identifier
pub fn decode_line(line: &str) -> Result<Option<StreamMessage>, IngestError> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }

    let value: serde_json::Value = serde_json::from_str(line)?;

    if let Some(warning) = value.get("warning") {
        let warning = RawWarning::deserialize(warning)?;
        return Ok(Some(StreamMessage::StallWarning {
            code: warning.code,
            message: warning.message,
            percent_full: warning.percent_full,
        }));
    }

    if value.get("text").is_none() || value.get("user").is_none() {
        let kind = value
            .as_object()
            .and_then(|o| o.keys().next().cloned())
            .unwrap_or_default();
        debug!(kind = %kind, "Ignoring non-tweet stream message");
        return Ok(None);
    }

    let tweet = RawTweet::deserialize(value)?;
    if tweet.id_str.is_empty() {
        return Err(IngestError::parse("Tweet without id_str"));
    }

    Ok(Some(StreamMessage::Post(tweet.into())))
}
