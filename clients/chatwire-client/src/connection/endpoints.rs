//! Endpoint rotation
//!
//! An ordered list of candidate chat servers with a cursor that hands out
//! the next address to try, wrapping back to the first after the last.

use anyhow::{bail, Context, Result};
use url::Url;

/// Servers tried when no configuration overrides them
pub const DEFAULT_ENDPOINTS: [&str; 3] = [
    "ws://localhost:8090",
    "ws://192.168.1.100:8090",
    "ws://D3nexus.de:8090",
];

#[derive(Debug, Clone)]
pub struct EndpointList {
    urls: Vec<String>,
    cursor: usize,
}

impl EndpointList {
    /// Create a list from WebSocket URLs.
    ///
    /// Fails when the list is empty or any entry is not a parseable `ws://`
    /// or `wss://` URL with a host. Scheme case is normalised.
    pub fn new<I, S>(urls: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let urls = urls
            .into_iter()
            .map(|url| normalize(&url.into()))
            .collect::<Result<Vec<_>>>()?;

        if urls.is_empty() {
            bail!("At least one endpoint is required");
        }

        Ok(Self { urls, cursor: 0 })
    }

    /// Return the endpoint under the cursor and advance it
    pub fn next_endpoint(&mut self) -> &str {
        let index = self.cursor;
        self.cursor = (self.cursor + 1) % self.urls.len();
        &self.urls[index]
    }

    /// Endpoint the next call to [`next_endpoint`](Self::next_endpoint) returns
    pub fn peek(&self) -> &str {
        &self.urls[self.cursor]
    }

    pub fn len(&self) -> usize {
        self.urls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }

    pub fn urls(&self) -> &[String] {
        &self.urls
    }
}

impl Default for EndpointList {
    fn default() -> Self {
        Self {
            urls: DEFAULT_ENDPOINTS.iter().map(|u| u.to_string()).collect(),
            cursor: 0,
        }
    }
}

/// Validate one endpoint and lower-case its scheme, keeping the rest as
/// written
fn normalize(raw: &str) -> Result<String> {
    let raw = raw.trim();
    let parsed = Url::parse(raw).with_context(|| format!("Endpoint `{}` is not a valid URL", raw))?;

    match parsed.scheme() {
        "ws" | "wss" => {}
        other => bail!("Endpoint `{}` must use the ws:// or wss:// scheme, not {}://", raw, other),
    }
    if parsed.host_str().map_or(true, str::is_empty) {
        bail!("Endpoint `{}` has no host", raw);
    }

    Ok(format!("{}{}", parsed.scheme(), &raw[parsed.scheme().len()..]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_robin_wraps() {
        let mut endpoints = EndpointList::default();

        let picked: Vec<String> = (0..7).map(|_| endpoints.next_endpoint().to_string()).collect();

        assert_eq!(
            picked,
            vec![
                DEFAULT_ENDPOINTS[0],
                DEFAULT_ENDPOINTS[1],
                DEFAULT_ENDPOINTS[2],
                DEFAULT_ENDPOINTS[0],
                DEFAULT_ENDPOINTS[1],
                DEFAULT_ENDPOINTS[2],
                DEFAULT_ENDPOINTS[0],
            ]
        );
    }

    #[test]
    fn test_single_endpoint_repeats() {
        let mut endpoints = EndpointList::new(["wss://chat.example:443"]).unwrap();
        assert_eq!(endpoints.next_endpoint(), "wss://chat.example:443");
        assert_eq!(endpoints.next_endpoint(), "wss://chat.example:443");
    }

    #[test]
    fn test_peek_does_not_advance() {
        let mut endpoints = EndpointList::new(["ws://a:1", "ws://b:2"]).unwrap();
        assert_eq!(endpoints.peek(), "ws://a:1");
        assert_eq!(endpoints.peek(), "ws://a:1");
        endpoints.next_endpoint();
        assert_eq!(endpoints.peek(), "ws://b:2");
    }

    #[test]
    fn test_rejects_bad_lists() {
        assert!(EndpointList::new(Vec::<String>::new()).is_err());
        assert!(EndpointList::new(["http://localhost:8090"]).is_err());
        assert!(EndpointList::new(["ws://ok:1", "localhost:8090"]).is_err());
    }

    #[test]
    fn test_rejects_hostless_and_malformed_urls() {
        assert!(EndpointList::new(["ws://"]).is_err());
        assert!(EndpointList::new(["wss://:443"]).is_err());
        assert!(EndpointList::new(["ws://bad host:99"]).is_err());
        assert!(EndpointList::new(["ws://localhost:notaport"]).is_err());
    }

    #[test]
    fn test_scheme_case_is_normalized() {
        let endpoints = EndpointList::new(["WS://localhost:8090", " Wss://chat.example/room "]).unwrap();
        assert_eq!(
            endpoints.urls(),
            ["ws://localhost:8090", "wss://chat.example/room"]
        );
    }
}
