// HTTP request handlers
use axum::{
    extract::{RawQuery, State},
    http::{header, HeaderName, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use tracing::{error, warn};

use crate::errors::ApiError;
use crate::server::state::AppState;

/// Total number of matches for the query.
pub const SEARCH_HITS_HEADER: HeaderName = HeaderName::from_static("search-hits");
/// Number of documents in this response.
pub const PAGE_SIZE_HEADER: HeaderName = HeaderName::from_static("page-size");

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "search api is running")
}

/// Search endpoint - answers with the matched documents as a JSON array
pub async fn search_handler(
    State(state): State<AppState>,
    RawQuery(raw_query): RawQuery,
) -> Result<Response, ApiError> {
    let result = state.search.handle(raw_query.as_deref()).await.and_then(|page| {
        let body = serde_json::to_vec(&page.documents).map_err(ApiError::serialization)?;
        Ok((page.total, page.len(), body))
    });

    let (total, page_size, body) = match result {
        Ok(parts) => parts,
        Err(e) => {
            if e.status_code().is_server_error() {
                error!(error = %e, "Search failed");
            } else {
                warn!(error = %e, "Search rejected");
            }
            return Err(e);
        }
    };

    Ok((
        StatusCode::OK,
        [
            (
                header::CONTENT_TYPE,
                HeaderValue::from_static("application/json"),
            ),
            (SEARCH_HITS_HEADER, HeaderValue::from(total)),
            (PAGE_SIZE_HEADER, HeaderValue::from(page_size)),
        ],
        body,
    )
        .into_response())
}
