//! OAuth 1.0a request signing (HMAC-SHA1) for the Twitter streaming API.
//!
//! The signature covers the HTTP method, the URL without its query, and every
//! `oauth_*` and query parameter:
//!
//! ```text
//! base   = METHOD & enc(base_url) & enc(sorted "k=v" pairs joined by "&")
//! key    = enc(consumer_secret) & enc(token_secret)
//! sig    = base64(HMAC-SHA1(key, base))
//! ```

use base64::{engine::general_purpose::STANDARD, Engine as _};
use hmac::{Hmac, Mac};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use sha1::Sha1;
use url::Url;
use uuid::Uuid;

use crate::errors::IngestError;

type HmacSha1 = Hmac<Sha1>;

/// Everything except the RFC 3986 unreserved characters `A-Z a-z 0-9 - . _ ~`.
const RFC3986: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Consumer and access credentials of a Twitter app.
#[derive(Clone, PartialEq, Eq)]
pub struct OAuthCredentials {
    pub consumer_key: String,
    pub consumer_secret: String,
    pub access_token: String,
    pub access_secret: String,
}

impl std::fmt::Debug for OAuthCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OAuthCredentials")
            .field("consumer_key", &self.consumer_key)
            .field("access_token", &self.access_token)
            .finish_non_exhaustive()
    }
}

/// Produces `Authorization` header values for signed requests.
#[derive(Debug, Clone)]
pub struct OAuthSigner {
    credentials: OAuthCredentials,
}

impl OAuthSigner {
    pub fn new(credentials: OAuthCredentials) -> Self {
        Self { credentials }
    }

    /// Sign a request with a fresh nonce and the current time.
    pub fn authorization_header(&self, method: &str, url: &Url) -> Result<String, IngestError> {
        let nonce = Uuid::new_v4().simple().to_string();
        let timestamp = chrono::Utc::now().timestamp().to_string();
        self.authorization_header_with(method, url, &nonce, &timestamp)
    }

    /// Sign a request with a caller-supplied nonce and timestamp.
    pub fn authorization_header_with(
        &self,
        method: &str,
        url: &Url,
        nonce: &str,
        timestamp: &str,
    ) -> Result<String, IngestError> {
        let mut base_url = url.clone();
        base_url.set_query(None);
        base_url.set_fragment(None);

        let query: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();

        let mut oauth_params = self.oauth_params(nonce, timestamp);
        let signature = self.signature(method, base_url.as_str(), &oauth_params, &query)?;
        oauth_params.push(("oauth_signature".to_string(), signature));
        oauth_params.sort();

        let header = oauth_params
            .iter()
            .map(|(k, v)| format!("{}=\"{}\"", encode(k), encode(v)))
            .collect::<Vec<_>>()
            .join(", ");

        Ok(format!("OAuth {}", header))
    }

    fn oauth_params(&self, nonce: &str, timestamp: &str) -> Vec<(String, String)> {
        vec![
            (
                "oauth_consumer_key".to_string(),
                self.credentials.consumer_key.clone(),
            ),
            ("oauth_nonce".to_string(), nonce.to_string()),
            (
                "oauth_signature_method".to_string(),
                "HMAC-SHA1".to_string(),
            ),
            ("oauth_timestamp".to_string(), timestamp.to_string()),
            ("oauth_token".to_string(), self.credentials.access_token.clone()),
            ("oauth_version".to_string(), "1.0".to_string()),
        ]
    }

    /// Compute the base64 HMAC-SHA1 signature over the request.
    pub fn signature(
        &self,
        method: &str,
        base_url: &str,
        oauth_params: &[(String, String)],
        request_params: &[(String, String)],
    ) -> Result<String, IngestError> {
        let mut encoded: Vec<(String, String)> = oauth_params
            .iter()
            .chain(request_params.iter())
            .map(|(k, v)| (encode(k), encode(v)))
            .collect();
        encoded.sort();

        let parameter_string = encoded
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join("&");

        let base_string = format!(
            "{}&{}&{}",
            method.to_uppercase(),
            encode(base_url),
            encode(&parameter_string)
        );
        let signing_key = format!(
            "{}&{}",
            encode(&self.credentials.consumer_secret),
            encode(&self.credentials.access_secret)
        );

        let mut mac = HmacSha1::new_from_slice(signing_key.as_bytes())
            .map_err(|e| IngestError::stream(format!("Invalid signing key: {}", e)))?;
        mac.update(base_string.as_bytes());

        Ok(STANDARD.encode(mac.finalize().into_bytes()))
    }
}

fn encode(value: &str) -> String {
    utf8_percent_encode(value, RFC3986).to_string()
}
