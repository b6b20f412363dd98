//! Search result types.
//!
//! This module defines the page returned from a search operation.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Stored fields of one matched record, exactly as held by the index.
pub type Document = BTreeMap<String, String>;

/// One page of search results with hit-count metadata.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct SearchPage {
    /// Total number of matching documents.
    /// May be greater than the number of returned documents due to pagination.
    pub total: u64,

    /// Matched documents in the order returned by the search engine.
    pub documents: Vec<Document>,
}

impl SearchPage {
    /// Create an empty page.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Create a new page.
    pub fn new(total: u64, documents: Vec<Document>) -> Self {
        Self { total, documents }
    }

    /// Returns true if the page holds no documents.
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Number of documents in this page.
    pub fn len(&self) -> usize {
        self.documents.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_page_empty() {
        let page = SearchPage::empty();
        assert!(page.is_empty());
        assert_eq!(page.len(), 0);
        assert_eq!(page.total, 0);
    }

    #[test]
    fn test_total_can_exceed_page_size() {
        let mut doc = Document::new();
        doc.insert("id".to_string(), "1".to_string());

        let page = SearchPage::new(42, vec![doc]);
        assert_eq!(page.len(), 1);
        assert_eq!(page.total, 42);
    }

    #[test]
    fn test_documents_serialize_as_plain_objects() {
        let mut doc = Document::new();
        doc.insert("id".to_string(), "1".to_string());
        let page = SearchPage::new(42, vec![doc]);

        let body = serde_json::to_string(&page.documents).unwrap();
        assert_eq!(body, r#"[{"id":"1"}]"#);
    }
}
