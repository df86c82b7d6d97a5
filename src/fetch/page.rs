// src/fetch/page.rs
// =============================================================================
// Fetches the HTML of the page we are inspecting.
//
// Strategy:
// - Add "https://" when the user typed a bare host name
// - GET the page with the shared client (same browser-like headers as probes)
// - Read the body as a stream of chunks so we can stop at max_body_bytes
//
// A non-2xx answer is NOT an error here: a 404 page still has HTML worth
// scanning, and its status ends up in the report. Only "no response at all"
// is an error.
// =============================================================================

use futures::StreamExt; // StreamExt gives us .next() on the body stream
use log::warn;
use reqwest::{Client, StatusCode};
use url::Url;

use crate::error::FetchError;

/// The fetched root page
#[derive(Debug)]
pub struct FetchedPage {
    pub status: StatusCode,
    pub body: Vec<u8>,
    /// True when the body was cut short (size cap or a broken stream)
    pub truncated: bool,
}

// Makes sure the URL has a scheme
//
// Examples:
//   "example.com"          -> "https://example.com"
//   "http://example.com"   -> "http://example.com" (unchanged)
//   " https://a.b/c "      -> "https://a.b/c"
pub fn normalize_url(input: &str) -> String {
    let input = input.trim();

    if input.starts_with("https://") || input.starts_with("http://") {
        input.to_string()
    } else {
        format!("https://{}", input)
    }
}

// Formats a status like "404 Not Found" (just "999" for unknown codes)
pub fn status_line(status: StatusCode) -> String {
    match status.canonical_reason() {
        Some(reason) => format!("{} {}", status.as_u16(), reason),
        None => status.as_u16().to_string(),
    }
}

// Fetches a page and reads at most `max_body_bytes` of its body
//
// Parameters:
//   client: shared reqwest client
//   url: absolute URL (run it through normalize_url first)
//   max_body_bytes: stop reading after this many bytes
//
// Returns: the status and (possibly truncated) body, or an error when no
// response was received at all
pub async fn fetch_page(
    client: &Client,
    url: &str,
    max_body_bytes: usize,
) -> Result<FetchedPage, FetchError> {
    let parsed = Url::parse(url).map_err(|source| FetchError::InvalidUrl {
        url: url.to_string(),
        source,
    })?;

    let response = client.get(parsed).send().await?;
    let status = response.status();

    let mut body = Vec::new();
    let mut truncated = false;
    let mut chunks = response.bytes_stream();

    while let Some(chunk) = chunks.next().await {
        match chunk {
            Ok(bytes) => {
                let room = max_body_bytes - body.len();
                if bytes.len() > room {
                    body.extend_from_slice(&bytes[..room]);
                    truncated = true;
                    warn!("{}: body larger than {} bytes, scanning the first part only", url, max_body_bytes);
                    break;
                }
                body.extend_from_slice(&bytes);
            }
            Err(e) => {
                // Keep what we have: a partial page still gives a partial report
                truncated = true;
                warn!("{}: body stream failed after {} bytes: {}", url, body.len(), e);
                break;
            }
        }
    }

    Ok(FetchedPage {
        status,
        body,
        truncated,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_normalize_url_adds_https() {
        assert_eq!(normalize_url("example.com"), "https://example.com");
        assert_eq!(normalize_url("nosuchhost"), "https://nosuchhost");
    }

    #[test]
    fn test_normalize_url_keeps_scheme() {
        assert_eq!(normalize_url("http://example.com"), "http://example.com");
        assert_eq!(normalize_url(" https://a.b/c "), "https://a.b/c");
    }

    #[test]
    fn test_status_line() {
        assert_eq!(status_line(StatusCode::OK), "200 OK");
        assert_eq!(status_line(StatusCode::NOT_FOUND), "404 Not Found");
        assert_eq!(status_line(StatusCode::from_u16(999).unwrap()), "999");
    }

    #[tokio::test]
    async fn test_fetch_keeps_body_of_error_pages() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/missing"))
            .respond_with(ResponseTemplate::new(404).set_body_string("<title>Gone</title>"))
            .mount(&server)
            .await;

        let page = fetch_page(&Client::new(), &format!("{}/missing", server.uri()), 1024)
            .await
            .unwrap();

        assert_eq!(page.status, StatusCode::NOT_FOUND);
        assert_eq!(page.body, b"<title>Gone</title>");
        assert!(!page.truncated);
    }

    #[tokio::test]
    async fn test_fetch_caps_body_size() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("x".repeat(100)))
            .mount(&server)
            .await;

        let page = fetch_page(&Client::new(), &server.uri(), 10).await.unwrap();

        assert_eq!(page.body.len(), 10);
        assert!(page.truncated);
    }

    #[tokio::test]
    async fn test_fetch_invalid_url() {
        let result = fetch_page(&Client::new(), "https://exa mple.com", 10).await;
        assert!(matches!(result, Err(FetchError::InvalidUrl { .. })));
    }

    #[tokio::test]
    async fn test_fetch_without_response_is_error() {
        let result = fetch_page(&Client::new(), "http://127.0.0.1:1/", 10).await;
        assert!(matches!(result, Err(FetchError::Request(_))));
    }
}
