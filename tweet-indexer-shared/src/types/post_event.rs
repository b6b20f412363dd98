//! Post event types.
//!
//! A `PostEvent` is one item received from the streaming source. It is read-only
//! input for the normalizer and is never written to the index as-is.

use serde::{Deserialize, Serialize};

/// Geographic point attached to a post.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Coordinates {
    pub longitude: f64,
    pub latitude: f64,
}

impl Coordinates {
    pub fn new(longitude: f64, latitude: f64) -> Self {
        Self {
            longitude,
            latitude,
        }
    }
}

/// One post received from the streaming source.
///
/// # Fields
///
/// - `id`: Unique identifier of the post, never empty
/// - `user`: Author handle
/// - `text`: Body text
/// - `possibly_sensitive`: Sensitivity flag set by the source
/// - `hashtags`: Hashtags in the order they appear in the post
/// - `source`: Origin-client descriptor, usually an HTML anchor
/// - `user_location`: Free-form location from the author profile
/// - `created_at`: Creation timestamp as sent by the source
/// - `coordinates`: Exact point the post was sent from, if shared
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct PostEvent {
    pub id: String,
    pub user: String,
    pub text: String,
    #[serde(default)]
    pub possibly_sensitive: bool,
    #[serde(default)]
    pub hashtags: Vec<String>,
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub user_location: String,
    #[serde(default)]
    pub created_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<Coordinates>,
}

impl PostEvent {
    /// Create a post with only the always-present fields set.
    ///
    /// # Example
    ///
    /// ```
    /// use tweet_indexer_shared::PostEvent;
    ///
    /// let post = PostEvent::new("1", "rustlang", "Rust 2024 is out")
    ///     .with_hashtags(vec!["rust".to_string()]);
    /// assert_eq!(post.hashtags, vec!["rust".to_string()]);
    /// ```
    pub fn new(id: impl Into<String>, user: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            user: user.into(),
            text: text.into(),
            ..Default::default()
        }
    }

    pub fn with_hashtags(mut self, hashtags: Vec<String>) -> Self {
        self.hashtags = hashtags;
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.user_location = location.into();
        self
    }

    pub fn with_created_at(mut self, created_at: impl Into<String>) -> Self {
        self.created_at = created_at.into();
        self
    }

    pub fn with_coordinates(mut self, coordinates: Coordinates) -> Self {
        self.coordinates = Some(coordinates);
        self
    }

    pub fn sensitive(mut self) -> Self {
        self.possibly_sensitive = true;
        self
    }
}
