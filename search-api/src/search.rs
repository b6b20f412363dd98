//! Search execution for the `/search` endpoint.

use std::sync::Arc;
use tracing::{info, instrument};
use tweet_indexer_repository::SearchIndexService;
use tweet_indexer_shared::SearchPage;

use crate::errors::ApiError;
use crate::translator::translate;

/// Translates a query string and runs it against the index.
#[derive(Clone)]
pub struct SearchHandler {
    search_index: Arc<SearchIndexService>,
}

impl SearchHandler {
    pub fn new(search_index: Arc<SearchIndexService>) -> Self {
        Self { search_index }
    }

    /// Translate, execute and classify.
    ///
    /// # Returns
    ///
    /// * `Ok(SearchPage)` - Total hit count plus the documents of the requested page
    /// * `Err(ApiError)` - A translation error, or the classified search failure
    #[instrument(skip(self))]
    pub async fn handle(&self, raw_query: Option<&str>) -> Result<SearchPage, ApiError> {
        let request = translate(raw_query)?;

        let page = self.search_index.search(&request).await?;

        info!(
            query = %request.query,
            total = page.total,
            returned = page.len(),
            paging = ?request.paging,
            "Search completed"
        );

        Ok(page)
    }
}
