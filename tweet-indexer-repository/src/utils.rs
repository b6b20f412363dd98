//! Utility functions for the tweet indexer repository.

/// Build the storage key for a record from the index prefix and the record identifier.
///
/// # Example
///
/// ```
/// use tweet_indexer_repository::record_key;
///
/// assert_eq!(record_key("tweet:", "1049393432123"), "tweet:1049393432123");
/// ```
pub fn record_key(prefix: &str, id: &str) -> String {
    format!("{}{}", prefix, id)
}

/// Split a `host[:port]` address, falling back to `default_port` when no port is given.
///
/// Returns `None` when the host part is empty or the port is not a number.
pub fn split_host_port(address: &str, default_port: u16) -> Option<(String, u16)> {
    let (host, port) = match address.rsplit_once(':') {
        Some((host, port)) => (host, port.parse::<u16>().ok()?),
        None => (address, default_port),
    };

    if host.is_empty() {
        return None;
    }

    Some((host.to_string(), port))
}
