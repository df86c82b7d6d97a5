// src/inspector.rs
// =============================================================================
// Ties everything together: fetch the page, scan it, start the link probes.
//
// What happens in inspect():
// 1. Default the URL to https:// and fetch it
// 2. Scan the HTML into a Report; every checkable link is handed to the
//    probe pool the moment the scanner finds it
// 3. Return an Inspection handle right away - probes keep running in the
//    background
//
// The caller then decides how to consume the Inspection: snapshot it now,
// snapshot it every few seconds while waiting, or just wait for the end.
// Dropping the Inspection cancels whatever probes are still running.
//
// The root body is buffered (up to max_body_bytes) before scanning, so the
// scan itself never waits on the network; the tokenizer still reads it in
// one forward pass.
// =============================================================================

use std::io::Read;
use std::sync::Arc;

use log::{info, warn};
use reqwest::Client;
use tokio::time::Instant;

use crate::checker::{build_client, check_link, ProbeContext, ProbePool, WaitOutcome};
use crate::config::InspectorConfig;
use crate::error::InspectorError;
use crate::fetch::{fetch_page, normalize_url, status_line};
use crate::report::{LinkCounts, Report, ReportSnapshot};
use crate::scanner::{scan_page, TokenStream};

/// Status recorded when the root page produced no response at all
pub const FETCH_FAILED_STATUS: u16 = 400;

/// Inspects pages; cheap to share, one per process is enough
#[derive(Debug, Clone)]
pub struct Inspector {
    client: Client,
    config: InspectorConfig,
}

impl Inspector {
    pub fn new(config: InspectorConfig) -> Result<Self, InspectorError> {
        config.validate()?;
        let client = build_client(&config)?;

        Ok(Inspector { client, config })
    }

    pub fn config(&self) -> &InspectorConfig {
        &self.config
    }

    // Fetches and scans `url`, then starts the link probes
    //
    // Parameters:
    //   url: page to inspect; "example.com" means "https://example.com"
    //   deadline: when link probing must stop. None = do not probe links.
    //
    // Returns once the page is scanned. A page that cannot be fetched gives
    // a report with status 400 and the error text as its status message.
    pub async fn inspect(&self, url: &str, deadline: Option<Instant>) -> Inspection {
        let url = normalize_url(url);
        info!("inspecting {}", url);

        match fetch_page(&self.client, &url, self.config.max_body_bytes).await {
            Ok(page) => {
                let mut inspection = self.inspect_document(
                    &url,
                    page.status.as_u16(),
                    &status_line(page.status),
                    page.body.as_slice(),
                    deadline,
                );
                inspection.report.body_truncated = page.truncated;
                inspection
            }
            Err(e) => {
                warn!("could not fetch {}: {}", url, e);

                let mut report = Report::new(&url);
                report.set_status(FETCH_FAILED_STATUS, e.to_string());
                Inspection { report, pool: None }
            }
        }
    }

    // Scans an already-fetched document as if it were served at `url`
    //
    // Useful when the page comes from somewhere else (a cache, an archive, a
    // test fixture). With a deadline this must run inside a tokio runtime,
    // since the probes are spawned as tasks.
    pub fn inspect_document<R: Read>(
        &self,
        url: &str,
        status_code: u16,
        status_msg: &str,
        body: R,
        deadline: Option<Instant>,
    ) -> Inspection {
        let mut report = Report::new(url);
        report.set_status(status_code, status_msg);

        let pool = deadline.map(|deadline| {
            ProbePool::new(
                self.config.max_concurrent_probes,
                ProbeContext::with_deadline(deadline),
            )
        });

        scan_page(
            TokenStream::new(body),
            &mut report,
            self.config.relative_links,
            |link| {
                if let Some(pool) = &pool {
                    pool.submit(check_link(self.client.clone(), Arc::clone(link)));
                }
            },
        );

        if let Some(pool) = &pool {
            pool.close();
        }

        info!(
            "scanned {} ({}): {} link(s), {} probe(s) started",
            report.url(),
            report.status_code(),
            report.links().len(),
            pool.as_ref().map(ProbePool::in_flight).unwrap_or(0)
        );

        Inspection { report, pool }
    }
}

/// A scanned page whose links may still be being probed
///
/// Dropping it cancels the remaining probes.
#[derive(Debug)]
pub struct Inspection {
    report: Report,
    pool: Option<ProbePool>,
}

impl Inspection {
    pub fn report(&self) -> &Report {
        &self.report
    }

    // Point-in-time copy of the report, tallies included
    //
    // May run while probes are still writing; links finishing during the
    // call may or may not be counted. Call wait() first for final numbers.
    pub fn snapshot(&self) -> ReportSnapshot {
        self.report.snapshot()
    }

    pub fn link_counts(&self) -> LinkCounts {
        self.report.link_counts()
    }

    /// True while at least one probe is queued or running
    pub fn is_probing(&self) -> bool {
        self.pool.as_ref().is_some_and(|pool| pool.in_flight() > 0)
    }

    // Waits until every probe finished or the inspection deadline passed
    pub async fn wait(&self) -> WaitOutcome {
        match &self.pool {
            Some(pool) => pool.wait().await,
            None => WaitOutcome::Drained,
        }
    }

    // Like wait(), but returns at `deadline` if that comes first
    pub async fn wait_until(&self, deadline: Instant) -> WaitOutcome {
        match &self.pool {
            Some(pool) => pool.wait_until(deadline).await,
            None => WaitOutcome::Drained,
        }
    }

    // Stops all probes now; links not probed yet stay "not analysed"
    pub fn cancel(&self) {
        if let Some(pool) = &self.pool {
            pool.cancel();
        }
    }
}
