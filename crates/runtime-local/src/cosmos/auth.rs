use base64::Engine as _;
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use reqwest::Method;
use sha2::Sha256;

/// The decoded account master key.
pub(super) struct MasterKey(Vec<u8>);

impl MasterKey {
    pub(super) fn new(key: Vec<u8>) -> Self {
        Self(key)
    }

    /// Builds the url-encoded `authorization` header value for a master key token:
    /// an HMAC-SHA256 over the verb, resource type, resource link and date.
    pub(super) fn authorization(&self, method: &Method, resource_type: &str, resource_link: &str, date: &str) -> String {
        let payload = format!(
            "{}\n{}\n{}\n{}\n\n",
            method.as_str().to_lowercase(),
            resource_type.to_lowercase(),
            resource_link,
            date.to_lowercase()
        );

        // HMAC accepts keys of any length
        let mut mac = Hmac::<Sha256>::new_from_slice(&self.0).unwrap_or_else(|_| unreachable!());
        mac.update(payload.as_bytes());

        let signature = base64::engine::general_purpose::STANDARD.encode(mac.finalize().into_bytes());
        let token = format!("type=master&ver=1.0&sig={signature}");

        url::form_urlencoded::byte_serialize(token.as_bytes()).collect()
    }
}

/// RFC 1123 date, the format Cosmos DB expects in `x-ms-date`.
pub(super) fn http_date(now: DateTime<Utc>) -> String {
    now.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}
