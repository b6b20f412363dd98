//! RediSearch provider implementation.
//!
//! This module provides the concrete implementation of `SearchIndexProvider`
//! on top of a Redis server with the RediSearch module loaded.

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::{Client, RedisError, Value};
use tracing::{debug, error, info};

use crate::config::RedisSettings;
use crate::errors::SearchIndexError;
use crate::interfaces::SearchIndexProvider;
use crate::redisearch::index_config::{create_index_args, drop_index_args};
use crate::schema::IndexSchema;
use crate::types::WriteRecordRequest;
use tweet_indexer_shared::{Document, SearchPage, SearchRequest};

/// Text RediSearch puts in the reply when it cannot parse a query.
pub const QUERY_SYNTAX_ERROR_MARKER: &str = "Syntax error";

/// RediSearch provider implementation.
///
/// Bound to a single index. The underlying `ConnectionManager` multiplexes one
/// connection and reconnects on its own, so the provider is cheap to share behind
/// an `Arc`.
///
/// # Example
///
/// ```ignore
/// let settings = RedisSettings::from_env()?;
/// let provider = RediSearchProvider::connect(&settings).await?;
///
/// provider.create_index(&IndexSchema::tweets()).await?;
/// let page = provider.search(&SearchRequest::new("@user:jack")).await?;
/// ```
#[derive(Clone)]
pub struct RediSearchProvider {
    connection: ConnectionManager,
    index_name: String,
}

impl RediSearchProvider {
    /// Connect to the server described by `settings`.
    ///
    /// # Returns
    ///
    /// * `Ok(RediSearchProvider)` - A provider with a live connection
    /// * `Err(SearchIndexError)` - If the URL is invalid or the server cannot be reached
    pub async fn connect(settings: &RedisSettings) -> Result<Self, SearchIndexError> {
        let url = settings
            .connection_url()
            .map_err(|e| SearchIndexError::connection(e.to_string()))?;

        let client =
            Client::open(url.as_str()).map_err(|e| SearchIndexError::connection(e.to_string()))?;
        let connection = ConnectionManager::new(client)
            .await
            .map_err(|e| SearchIndexError::connection(e.to_string()))?;

        info!(
            host = %settings.host,
            port = settings.port,
            tls = settings.tls,
            index = %settings.index_name,
            "Connected to RediSearch"
        );

        Ok(Self {
            connection,
            index_name: settings.index_name.clone(),
        })
    }

    /// Name of the index this provider is bound to.
    pub fn index_name(&self) -> &str {
        &self.index_name
    }
}

#[async_trait]
impl SearchIndexProvider for RediSearchProvider {
    async fn drop_index(&self) -> Result<(), SearchIndexError> {
        let mut conn = self.connection.clone();
        let _: () = redis::cmd("FT.DROPINDEX")
            .arg(drop_index_args(&self.index_name))
            .query_async(&mut conn)
            .await
            .map_err(|e| SearchIndexError::index_drop(server_message(&e)))?;

        info!(index = %self.index_name, "Dropped index and its documents");
        Ok(())
    }

    async fn create_index(&self, schema: &IndexSchema) -> Result<(), SearchIndexError> {
        let mut conn = self.connection.clone();
        let _: () = redis::cmd("FT.CREATE")
            .arg(create_index_args(&self.index_name, schema))
            .query_async(&mut conn)
            .await
            .map_err(|e| SearchIndexError::index_creation(server_message(&e)))?;

        info!(
            index = %self.index_name,
            prefix = %schema.key_prefix,
            fields = schema.fields.len(),
            "Created index"
        );
        Ok(())
    }

    async fn write_record(&self, request: &WriteRecordRequest) -> Result<(), SearchIndexError> {
        if request.fields.is_empty() {
            return Err(SearchIndexError::validation(format!(
                "Record {} has no fields",
                request.key
            )));
        }

        let mut conn = self.connection.clone();
        let mut cmd = redis::cmd("HSET");
        cmd.arg(&request.key);
        for (name, value) in &request.fields {
            cmd.arg(name).arg(value);
        }

        let _: () = cmd
            .query_async(&mut conn)
            .await
            .map_err(|e| SearchIndexError::write(server_message(&e)))?;

        debug!(key = %request.key, fields = request.fields.len(), "Record written");
        Ok(())
    }

    async fn search(&self, request: &SearchRequest) -> Result<SearchPage, SearchIndexError> {
        let mut conn = self.connection.clone();
        let reply: Value = redis::cmd("FT.SEARCH")
            .arg(search_args(&self.index_name, request))
            .query_async(&mut conn)
            .await
            .map_err(|e| {
                let err = classify_search_failure(server_message(&e));
                error!(error = %err, query = %request.query, "Search failed");
                err
            })?;

        parse_search_reply(reply)
    }
}

/// Arguments following `FT.SEARCH` for a request.
///
/// `RETURN` is only sent for a non-empty projection and `LIMIT` only when paging was
/// requested, so the engine defaults apply otherwise.
pub fn search_args(index_name: &str, request: &SearchRequest) -> Vec<String> {
    let mut args = vec![index_name.to_string(), request.query.clone()];

    if let Some(fields) = request.return_fields.as_ref().filter(|f| !f.is_empty()) {
        args.push("RETURN".to_string());
        args.push(fields.len().to_string());
        args.extend(fields.iter().cloned());
    }

    if let Some(paging) = &request.paging {
        args.push("LIMIT".to_string());
        args.push(paging.offset.to_string());
        args.push(paging.limit.to_string());
    }

    args
}

/// Map a failure description onto the query syntax or generic search error kind.
pub fn classify_search_failure(message: String) -> SearchIndexError {
    if message.contains(QUERY_SYNTAX_ERROR_MARKER) {
        SearchIndexError::query_syntax(message)
    } else {
        SearchIndexError::search(message)
    }
}

/// The error line as the server sent it.
///
/// Redis splits the first word of an error reply off as its code, so it is joined
/// back here to keep markers like `Syntax error` intact.
fn server_message(err: &RedisError) -> String {
    match (err.code(), err.detail()) {
        (Some(code), Some(detail)) => format!("{} {}", code, detail),
        _ => err.to_string(),
    }
}

/// Decode an `FT.SEARCH` reply: `[total, key, [field, value, ...], key, [...], ...]`.
///
/// Keys are not part of the returned documents; each document holds exactly the
/// stored (or projected) fields.
pub fn parse_search_reply(reply: Value) -> Result<SearchPage, SearchIndexError> {
    let items = match reply {
        Value::Array(items) => items,
        other => {
            return Err(SearchIndexError::parse(format!(
                "Expected an array reply, got {:?}",
                other
            )))
        }
    };

    let mut items = items.into_iter();
    let total = match items.next() {
        Some(Value::Int(total)) if total >= 0 => total as u64,
        other => {
            return Err(SearchIndexError::parse(format!(
                "Expected a hit count, got {:?}",
                other
            )))
        }
    };

    let mut documents = Vec::new();
    while let Some(_key) = items.next() {
        let document = match items.next() {
            Some(Value::Array(fields)) => parse_document(fields)?,
            Some(Value::Nil) | None => Document::new(),
            Some(other) => {
                return Err(SearchIndexError::parse(format!(
                    "Expected a field list, got {:?}",
                    other
                )))
            }
        };
        documents.push(document);
    }

    Ok(SearchPage::new(total, documents))
}

fn parse_document(fields: Vec<Value>) -> Result<Document, SearchIndexError> {
    if fields.len() % 2 != 0 {
        return Err(SearchIndexError::parse(
            "Field list has an odd number of entries",
        ));
    }

    let mut document = Document::new();
    let mut fields = fields.into_iter();
    while let (Some(name), Some(value)) = (fields.next(), fields.next()) {
        document.insert(value_to_string(name)?, value_to_string(value)?);
    }
    Ok(document)
}

fn value_to_string(value: Value) -> Result<String, SearchIndexError> {
    match value {
        Value::BulkString(bytes) => Ok(String::from_utf8_lossy(&bytes).into_owned()),
        Value::SimpleString(s) => Ok(s),
        Value::Int(i) => Ok(i.to_string()),
        other => Err(SearchIndexError::parse(format!(
            "Expected a string, got {:?}",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tweet_indexer_shared::Paging;

    fn bulk(s: &str) -> Value {
        Value::BulkString(s.as_bytes().to_vec())
    }

    #[test]
    fn test_search_args_plain_query() {
        let args = search_args("tweets", &SearchRequest::new("hello"));
        assert_eq!(args, vec!["tweets", "hello"]);
    }

    #[test]
    fn test_search_args_with_projection_and_paging() {
        let request = SearchRequest::new("@user:jack")
            .with_return_fields(vec!["user".to_string(), "text".to_string()])
            .with_paging(Paging::new(0, 10));

        let args = search_args("tweets", &request);
        assert_eq!(
            args,
            vec!["tweets", "@user:jack", "RETURN", "2", "user", "text", "LIMIT", "0", "10"]
        );
    }

    #[test]
    fn test_search_args_skip_empty_projection() {
        let request = SearchRequest::new("x").with_return_fields(vec![]);
        assert_eq!(search_args("tweets", &request), vec!["tweets", "x"]);
    }

    #[test]
    fn test_parse_search_reply() {
        let reply = Value::Array(vec![
            Value::Int(42),
            bulk("tweet:1"),
            Value::Array(vec![bulk("id"), bulk("1"), bulk("user"), bulk("jack")]),
            bulk("tweet:2"),
            Value::Array(vec![bulk("id"), bulk("2")]),
        ]);

        let page = parse_search_reply(reply).unwrap();
        assert_eq!(page.total, 42);
        assert_eq!(page.len(), 2);
        assert_eq!(page.documents[0].get("user").map(String::as_str), Some("jack"));
        assert_eq!(page.documents[1].get("id").map(String::as_str), Some("2"));
        assert!(!page.documents[0].contains_key("tweet:1"));
    }

    #[test]
    fn test_parse_empty_reply() {
        let page = parse_search_reply(Value::Array(vec![Value::Int(0)])).unwrap();
        assert_eq!(page, SearchPage::empty());
    }

    #[test]
    fn test_parse_rejects_non_array() {
        let result = parse_search_reply(Value::Okay);
        assert!(matches!(result, Err(SearchIndexError::ParseError(_))));
    }

    #[test]
    fn test_classify_search_failure() {
        let err = classify_search_failure("Syntax error at offset 5 near foo".to_string());
        assert!(err.is_query_syntax());

        let err = classify_search_failure("Unknown Index name".to_string());
        assert_eq!(err, SearchIndexError::search("Unknown Index name"));
    }

    #[test]
    fn test_server_error_code_is_joined_back() {
        let err: RedisError = redis::parse_redis_value(b"-Syntax error at offset 5 near x\r\n")
            .and_then(|v| v.extract_error())
            .unwrap_err();

        let message = server_message(&err);
        assert_eq!(message, "Syntax error at offset 5 near x");
        assert!(classify_search_failure(message).is_query_syntax());
    }

    #[test]
    fn test_other_server_errors_are_search_failures() {
        let err: RedisError = redis::parse_redis_value(b"-Unknown Index name\r\n")
            .and_then(|v| v.extract_error())
            .unwrap_err();

        assert!(!classify_search_failure(server_message(&err)).is_query_syntax());
    }
}
