// Application state shared across handlers
use std::sync::Arc;
use tweet_indexer_repository::SearchIndexService;

use crate::search::SearchHandler;

#[derive(Clone)]
pub struct AppState {
    pub search: SearchHandler,
}

impl AppState {
    pub fn new(search_index: Arc<SearchIndexService>) -> Self {
        Self {
            search: SearchHandler::new(search_index),
        }
    }
}
