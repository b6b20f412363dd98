//! Post processor implementation.
//!
//! Drops sensitive posts and flattens the rest into `NormalizedRecord`s for indexing.

use chrono::DateTime;
use tracing::{debug, instrument};

use tweet_indexer_shared::{fields, NormalizedRecord, PostEvent};

/// Layout of Twitter's `created_at`, e.g. `Wed Oct 10 20:19:24 +0000 2018`.
pub const CREATED_AT_FORMAT: &str = "%a %b %d %H:%M:%S %z %Y";

const SOURCE_LABEL_START: &str = "\"nofollow\">";
const SOURCE_LABEL_END: &str = "</a>";

/// Processor that turns posts into index records.
///
/// The processor is responsible for:
/// - Discarding posts flagged as possibly sensitive
/// - Flattening the surviving posts into flat field mappings
#[derive(Debug, Default, Clone, Copy)]
pub struct PostProcessor;

impl PostProcessor {
    /// Create a new post processor.
    pub fn new() -> Self {
        Self
    }

    /// Filter and normalize one post.
    ///
    /// # Returns
    ///
    /// `None` if the post is flagged as possibly sensitive, otherwise its record.
    #[instrument(skip(self, event), fields(id = %event.id))]
    pub fn process(&self, event: &PostEvent) -> Option<NormalizedRecord> {
        if !self.should_index(event) {
            debug!("Discarding possibly sensitive post");
            return None;
        }
        Some(self.normalize(event))
    }

    /// Whether a post may reach the index.
    pub fn should_index(&self, event: &PostEvent) -> bool {
        !event.possibly_sensitive
    }

    /// Flatten a post into a record. Never fails.
    ///
    /// `id`, `user`, `text` and `source` are always set. `hashtags`, `location`,
    /// `created` and `coordinates` are set only when the post carries usable data
    /// for them.
    pub fn normalize(&self, event: &PostEvent) -> NormalizedRecord {
        let mut record = NormalizedRecord::new(event.id.as_str());
        record.insert(fields::USER, event.user.as_str());
        record.insert(fields::TEXT, event.text.as_str());

        let hashtags = event.hashtags.join(",");
        if !hashtags.is_empty() {
            debug!(hashtags = %hashtags, "Hashtags");
            record.insert(fields::HASHTAGS, hashtags);
        }

        let source = extract_source_label(&event.source);
        debug!(source = %source, "Source");
        record.insert(fields::SOURCE, source);

        if !event.user_location.is_empty() {
            debug!(location = %event.user_location, "Location");
            record.insert(fields::LOCATION, event.user_location.as_str());
        }

        if let Some(created) = parse_created_at(&event.created_at) {
            debug!(created = created, "Creation timestamp");
            record.insert(fields::CREATED, created);
        }

        if let Some(coordinates) = &event.coordinates {
            if coordinates.longitude.is_finite() && coordinates.latitude.is_finite() {
                let point = format!("{:.6} {:.6}", coordinates.longitude, coordinates.latitude);
                debug!(coordinates = %point, "Coordinates");
                record.insert(fields::COORDINATES, point);
            }
        }

        record
    }
}

/// Extract the client label from an anchor such as
/// `<a href="http://twitter.com" rel="nofollow">Twitter Web Client</a>`.
///
/// Returns `"unknown"` when the descriptor is empty, a delimiter is missing, or the
/// label between them is empty.
///
/// # Example
///
/// ```
/// use tweet_indexer::processor::extract_source_label;
///
/// let anchor = r#"<a href="http://twitter.com" rel="nofollow">Twitter Web Client</a>"#;
/// assert_eq!(extract_source_label(anchor), "Twitter Web Client");
/// assert_eq!(extract_source_label("Twitter Web Client"), "unknown");
/// ```
pub fn extract_source_label(descriptor: &str) -> String {
    let label = descriptor
        .find(SOURCE_LABEL_START)
        .map(|start| start + SOURCE_LABEL_START.len())
        .and_then(|start| {
            descriptor[start..]
                .find(SOURCE_LABEL_END)
                .map(|len| &descriptor[start..start + len])
        });

    match label {
        Some(label) if !label.is_empty() => label.to_string(),
        _ => fields::UNKNOWN_SOURCE.to_string(),
    }
}

/// Parse a `created_at` value into nanoseconds since the Unix epoch (UTC).
pub fn parse_created_at(created_at: &str) -> Option<i64> {
    DateTime::parse_from_str(created_at, CREATED_AT_FORMAT)
        .ok()?
        .timestamp_nanos_opt()
}
