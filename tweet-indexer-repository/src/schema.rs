//! Index schema definition.
//!
//! The schema is fixed and versionless: it is recreated from scratch on every start,
//! so there is no migration path to describe.

use tweet_indexer_shared::fields;

/// Key prefix binding stored tweet records to the index.
pub const TWEET_KEY_PREFIX: &str = "tweet:";

/// Type of an indexed field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Tokenized full-text field.
    Text,
    /// Comma-separated exact-match tags.
    Tag,
    /// Numeric field, optionally sortable.
    Numeric { sortable: bool },
    /// Geo point stored as `"<longitude> <latitude>"`.
    Geo,
}

/// One field of the index schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexField {
    pub name: String,
    pub kind: FieldKind,
}

impl IndexField {
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }
}

/// Field definitions plus the key prefix of the records they index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexSchema {
    pub key_prefix: String,
    pub fields: Vec<IndexField>,
}

impl IndexSchema {
    /// The tweet index: text fields `id, user, text, source, location`, tag field
    /// `hashtags`, sortable numeric `created` and geo `coordinates`, keyed under `tweet:`.
    pub fn tweets() -> Self {
        Self {
            key_prefix: TWEET_KEY_PREFIX.to_string(),
            fields: vec![
                IndexField::new(fields::ID, FieldKind::Text),
                IndexField::new(fields::USER, FieldKind::Text),
                IndexField::new(fields::TEXT, FieldKind::Text),
                IndexField::new(fields::SOURCE, FieldKind::Text),
                IndexField::new(fields::HASHTAGS, FieldKind::Tag),
                IndexField::new(fields::LOCATION, FieldKind::Text),
                IndexField::new(fields::CREATED, FieldKind::Numeric { sortable: true }),
                IndexField::new(fields::COORDINATES, FieldKind::Geo),
            ],
        }
    }

    pub fn field(&self, name: &str) -> Option<&IndexField> {
        self.fields.iter().find(|f| f.name == name)
    }
}

impl Default for IndexSchema {
    fn default() -> Self {
        Self::tweets()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tweet_schema_field_types() {
        let schema = IndexSchema::tweets();

        assert_eq!(schema.key_prefix, "tweet:");
        assert_eq!(schema.fields.len(), 8);
        for name in ["id", "user", "text", "source", "location"] {
            assert_eq!(schema.field(name).map(|f| f.kind), Some(FieldKind::Text));
        }
        assert_eq!(schema.field("hashtags").map(|f| f.kind), Some(FieldKind::Tag));
        assert_eq!(
            schema.field("created").map(|f| f.kind),
            Some(FieldKind::Numeric { sortable: true })
        );
        assert_eq!(schema.field("coordinates").map(|f| f.kind), Some(FieldKind::Geo));
    }
}
