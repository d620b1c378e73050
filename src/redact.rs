//! Secret redaction for API keys in logs and debug output.
//!
//! Provider URLs embed the Infura project id, so the key and any URL built
//! from it are wrapped in [`Redacted`] before they can reach a log line.

use std::fmt::{self, Debug, Display};

/// Wrapper that redacts its inner value when formatted or serialized.
///
/// ```ignore
/// use swap_check::redact::Redacted;
///
/// let key = Redacted("0123abcd".to_string());
/// tracing::info!(key = %key, "Building provider");
/// // Logs: key = <redacted>
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct Redacted<T>(pub T);

impl<T> Redacted<T> {
    /// Borrow the wrapped secret
    pub fn expose(&self) -> &T {
        &self.0
    }
}

impl<T> Debug for Redacted<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("<redacted>")
    }
}

impl<T> Display for Redacted<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("<redacted>")
    }
}

impl<T> serde::Serialize for Redacted<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        "<redacted>".serialize(serializer)
    }
}

/// Render an RPC URL as `scheme://host` so it can be logged without its
/// path (where Infura keeps the project id).
pub fn rpc_origin(rpc_url: &str) -> String {
    match url::Url::parse(rpc_url) {
        Ok(url) => match url.host_str() {
            Some(host) => format!("{}://{}", url.scheme(), host),
            None => "<invalid rpc url>".to_string(),
        },
        Err(_) => "<invalid rpc url>".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redacted_hides_value() {
        let key = Redacted("secret-project-id".to_string());
        assert_eq!(format!("{}", key), "<redacted>");
        assert_eq!(format!("{:?}", key), "<redacted>");
        assert_eq!(serde_json::to_string(&key).unwrap(), "\"<redacted>\"");
        assert_eq!(key.expose(), "secret-project-id");
    }

    #[test]
    fn test_rpc_origin_strips_key() {
        let origin = rpc_origin("https://arbitrum-mainnet.infura.io/v3/abcdef0123");
        assert_eq!(origin, "https://arbitrum-mainnet.infura.io");
        assert!(!origin.contains("abcdef0123"));

        assert_eq!(rpc_origin("not a url"), "<invalid rpc url>");
    }
}
