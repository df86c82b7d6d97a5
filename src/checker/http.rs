// src/checker/http.rs
// =============================================================================
// This module checks if a link is alive by making one HTTP request.
//
// Key functionality:
// - Sends a GET that looks like it comes from a real browser
//   (User-Agent + sec-ch-ua / Sec-Fetch-* headers), because many sites
//   answer 403 to anything that looks like a bot
// - Turns the response (or the failure) into a status code for the link
// - Writes that status into the link; nothing else in the report is touched
//
// Status policy:
// - got a response             -> its status code
// - error that carries a status -> that status code
// - request could not be built -> 500, link tagged "error"
// - no response at all         -> 408 (timeout-class)
// - status above 599           -> 200, link tagged "unscannable"
//   (some sites answer bots with made-up codes like 999; that is not a
//    dead link, we just cannot scan it)
// =============================================================================

use std::sync::Arc;

use log::debug;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Client, StatusCode};
use url::Url;

use crate::config::InspectorConfig;
use crate::report::{InspectedLink, ProbeTag};

/// Status recorded when a request produced no response at all (Request Timeout)
pub const NO_RESPONSE_STATUS: u16 = 408;

/// Status recorded when the probe request could not be built (Internal Server Error)
pub const UNBUILDABLE_STATUS: u16 = 500;

// Highest status code with a meaning in HTTP
const MAX_VALID_STATUS: u16 = 599;

/// What a probe found out about one link
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeVerdict {
    pub status_code: u16,
    pub tag: Option<ProbeTag>,
}

impl ProbeVerdict {
    // Maps a raw status code, normalizing out-of-range codes
    fn from_status(status_code: u16) -> Self {
        if status_code > MAX_VALID_STATUS {
            ProbeVerdict {
                status_code: StatusCode::OK.as_u16(),
                tag: Some(ProbeTag::Unscannable),
            }
        } else {
            ProbeVerdict {
                status_code,
                tag: None,
            }
        }
    }

    fn unbuildable() -> Self {
        ProbeVerdict {
            status_code: UNBUILDABLE_STATUS,
            tag: Some(ProbeTag::Error),
        }
    }
}

// Builds the HTTP client shared by the root fetch and all probes
//
// Client is cheap to clone (it's an Arc inside), so every probe task gets
// its own clone and they all share one connection pool.
pub fn build_client(config: &InspectorConfig) -> reqwest::Result<Client> {
    Client::builder()
        .user_agent(config.user_agent.clone())
        .default_headers(browser_headers())
        .timeout(config.request_timeout)
        .redirect(reqwest::redirect::Policy::limited(10))
        .build()
}

// Fetch-metadata headers a desktop Chrome sends on a top-level navigation
fn browser_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        "sec-ch-ua",
        HeaderValue::from_static(
            r#"" Not A;Brand";v="99", "Chromium";v="100", "Google Chrome";v="100""#,
        ),
    );
    headers.insert("sec-ch-ua-mobile", HeaderValue::from_static("?0"));
    headers.insert("sec-ch-ua-platform", HeaderValue::from_static(r#""Linux""#));
    headers.insert("sec-fetch-dest", HeaderValue::from_static("document"));
    headers.insert("sec-fetch-mode", HeaderValue::from_static("navigate"));
    headers.insert("sec-fetch-site", HeaderValue::from_static("same-origin"));
    headers.insert("sec-fetch-user", HeaderValue::from_static("?1"));
    headers
}

// Probes one URL and returns its verdict
//
// The response body is never read: dropping the response closes it.
pub async fn probe_url(client: &Client, target: &str) -> ProbeVerdict {
    let url = match Url::parse(target) {
        Ok(url) => url,
        Err(e) => {
            debug!("cannot probe '{}': {}", target, e);
            return ProbeVerdict::unbuildable();
        }
    };

    match client.get(url).send().await {
        Ok(response) => ProbeVerdict::from_status(response.status().as_u16()),
        Err(e) => categorize_error(target, &e),
    }
}

// Picks a status for a failed request
fn categorize_error(target: &str, error: &reqwest::Error) -> ProbeVerdict {
    if error.is_builder() {
        debug!("cannot build request for '{}': {}", target, error);
        return ProbeVerdict::unbuildable();
    }

    match error.status() {
        Some(status) => ProbeVerdict::from_status(status.as_u16()),
        None => {
            debug!("no response from '{}': {}", target, error);
            ProbeVerdict {
                status_code: NO_RESPONSE_STATUS,
                tag: None,
            }
        }
    }
}

// Probes a link and records the result on it
//
// This is the job the inspector submits to the probe pool for every
// checkable link. If the pool cancels it midway, this future is dropped
// before record_probe() runs and the link stays "not analysed".
pub async fn check_link(client: Client, link: Arc<InspectedLink>) {
    let Some(target) = link.target() else {
        return;
    };

    let verdict = probe_url(&client, target).await;
    debug!(
        "probed {} -> {}{}",
        target,
        verdict.status_code,
        verdict
            .tag
            .map(|tag| format!(" ({})", tag.as_str()))
            .unwrap_or_default()
    );

    link.record_probe(verdict.status_code, verdict.tag);
}
