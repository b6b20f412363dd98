//! Query string translation.
//!
//! Turns the raw query string of a `/search` request into a [`SearchRequest`]:
//!
//! - `q`: query text, passed verbatim (absent or empty means an empty query)
//! - `fields`: comma-separated fields to return, in order
//! - `offset_limit`: `offset,limit`, both non-negative integers
//!
//! When a parameter appears more than once, its first value is used.

use std::collections::HashMap;
use tweet_indexer_shared::{Paging, SearchRequest};
use url::form_urlencoded;

use crate::errors::{ApiError, PaginationField};

pub const QUERY_PARAM: &str = "q";
pub const FIELDS_PARAM: &str = "fields";
pub const OFFSET_LIMIT_PARAM: &str = "offset_limit";

/// Translate a raw query string into a search request.
///
/// # Arguments
///
/// * `raw` - The query string without the leading `?`, if the request had one
///
/// # Returns
///
/// * `Ok(SearchRequest)` - The structured request
/// * `Err(ApiError::MalformedQuery)` - If the query string cannot be parsed at all
/// * `Err(ApiError::InvalidPagination)` - If `offset_limit` does not hold two integers
///
/// # Example
///
/// ```
/// use search_api::translate;
/// use tweet_indexer_shared::Paging;
///
/// let request = translate(Some("q=rust&offset_limit=10,5")).unwrap();
/// assert_eq!(request.query, "rust");
/// assert_eq!(request.paging, Some(Paging::new(10, 5)));
/// ```
pub fn translate(raw: Option<&str>) -> Result<SearchRequest, ApiError> {
    let raw = raw.unwrap_or_default();
    validate(raw)?;

    let mut params: HashMap<String, String> = HashMap::new();
    for (key, value) in form_urlencoded::parse(raw.as_bytes()) {
        params
            .entry(key.into_owned())
            .or_insert_with(|| value.into_owned());
    }

    let mut request = SearchRequest::new(params.remove(QUERY_PARAM).unwrap_or_default());

    if let Some(fields) = params.get(FIELDS_PARAM).and_then(|v| parse_fields(v)) {
        request = request.with_return_fields(fields);
    }

    if let Some(value) = params.get(OFFSET_LIMIT_PARAM).filter(|v| !v.is_empty()) {
        request = request.with_paging(parse_offset_limit(value)?);
    }

    Ok(request)
}

/// Reject query strings with broken percent escapes or `;` separators.
fn validate(raw: &str) -> Result<(), ApiError> {
    if raw.contains(';') {
        return Err(ApiError::malformed("invalid semicolon separator in query"));
    }

    let bytes = raw.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let escape = bytes.get(i + 1..i + 3);
            match escape {
                Some(hex) if hex.iter().all(u8::is_ascii_hexdigit) => i += 3,
                _ => {
                    let end = (i + 3).min(bytes.len());
                    return Err(ApiError::malformed(format!(
                        "invalid URL escape \"{}\"",
                        String::from_utf8_lossy(&bytes[i..end])
                    )));
                }
            }
        } else {
            i += 1;
        }
    }

    Ok(())
}

fn parse_fields(value: &str) -> Option<Vec<String>> {
    let fields: Vec<String> = value
        .split(',')
        .filter(|field| !field.is_empty())
        .map(str::to_string)
        .collect();

    if fields.is_empty() {
        None
    } else {
        Some(fields)
    }
}

fn parse_offset_limit(value: &str) -> Result<Paging, ApiError> {
    let mut parts = value.split(',');

    let offset = parts
        .next()
        .and_then(|v| v.parse::<usize>().ok())
        .ok_or(ApiError::InvalidPagination(PaginationField::Offset))?;
    let limit = parts
        .next()
        .and_then(|v| v.parse::<usize>().ok())
        .ok_or(ApiError::InvalidPagination(PaginationField::Limit))?;

    Ok(Paging::new(offset, limit))
}
