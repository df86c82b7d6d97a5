// src/report.rs
// =============================================================================
// The inspection report: everything we learned about one page.
//
// The report is filled in two phases:
// 1. The page scanner writes it synchronously (title, headings, links...)
// 2. Background link probes then update each link's status code
//
// Phase 2 overlaps with callers reading the report, so every link keeps
// its status in atomics. Each probe writes only its own link, and a reader
// can take a snapshot at any moment without locking anything.
//
// Rust concepts:
// - Arc: shared ownership between the report and the probe tasks
// - Atomics: lock-free status updates visible across threads
// - Serde: the snapshot serializes straight to JSON
// =============================================================================

use std::collections::BTreeMap;
use std::fmt;
use std::sync::atomic::{AtomicU16, AtomicU8, Ordering};
use std::sync::Arc;

use serde::Serialize;

use crate::scanner::doctype::NOT_DEFINED;
use crate::scanner::links::{ClassifiedLink, LinkScope};

/// What kind of link an href is, decided while scanning
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkKind {
    /// http:// or https://
    External,
    /// #anchor on the same page
    Fragment,
    /// tel:
    Telephone,
    /// mailto:
    Email,
    /// /path on the same host
    Absolute,
    /// path relative to the page
    Relative,
    /// an absolute or relative link we could not resolve
    Invalid,
    /// any other scheme, e.g. "javascript" for javascript:void(0)
    Scheme(String),
}

impl LinkKind {
    pub fn as_str(&self) -> &str {
        match self {
            LinkKind::External => "external",
            LinkKind::Fragment => "fragment",
            LinkKind::Telephone => "telephone",
            LinkKind::Email => "email",
            LinkKind::Absolute => "absolute",
            LinkKind::Relative => "relative",
            LinkKind::Invalid => "invalid",
            LinkKind::Scheme(scheme) => scheme,
        }
    }

    // Kinds that get a liveness probe
    pub fn is_checkable(&self) -> bool {
        matches!(
            self,
            LinkKind::External | LinkKind::Absolute | LinkKind::Relative
        )
    }
}

impl fmt::Display for LinkKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A tag a probe can put on a link, replacing its scan-time kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ProbeTag {
    /// The probe request could not even be built
    Error = 1,
    /// The site answered with a bogus status code (anti-bot behaviour)
    Unscannable = 2,
}

impl ProbeTag {
    fn from_u8(value: u8) -> Option<Self> {
        match value {
            1 => Some(ProbeTag::Error),
            2 => Some(ProbeTag::Unscannable),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ProbeTag::Error => "error",
            ProbeTag::Unscannable => "unscannable",
        }
    }
}

/// One <a href> found on the page
#[derive(Debug)]
pub struct InspectedLink {
    url: String,
    text: String,
    kind: LinkKind,
    target: Option<String>,
    // 0 means "not probed (yet)"
    status_code: AtomicU16,
    // 0 means "no probe tag", otherwise a ProbeTag discriminant
    probe_tag: AtomicU8,
}

impl InspectedLink {
    pub fn new(href: &str, text: String, classified: &ClassifiedLink) -> Self {
        InspectedLink {
            url: href.to_string(),
            text,
            kind: classified.kind.clone(),
            target: classified.target.clone(),
            status_code: AtomicU16::new(classified.status_code),
            probe_tag: AtomicU8::new(0),
        }
    }

    /// The href exactly as written in the page
    pub fn url(&self) -> &str {
        &self.url
    }

    /// The cleaned display text
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn kind(&self) -> &LinkKind {
        &self.kind
    }

    /// The absolute URL probed for this link, if it is checkable
    pub fn target(&self) -> Option<&str> {
        self.target.as_deref()
    }

    pub fn status_code(&self) -> u16 {
        self.status_code.load(Ordering::Acquire)
    }

    pub fn probe_tag(&self) -> Option<ProbeTag> {
        ProbeTag::from_u8(self.probe_tag.load(Ordering::Acquire))
    }

    // The tag shown to users: a probe tag wins over the scan-time kind
    pub fn type_label(&self) -> String {
        match self.probe_tag() {
            Some(tag) => tag.as_str().to_string(),
            None => self.kind.as_str().to_string(),
        }
    }

    // Called by the probe that owns this link, once it has a verdict
    pub(crate) fn record_probe(&self, status_code: u16, tag: Option<ProbeTag>) {
        if let Some(tag) = tag {
            self.probe_tag.store(tag as u8, Ordering::Release);
        }
        self.status_code.store(status_code, Ordering::Release);
    }
}

/// Derived link tallies, recomputed from the link list on every call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LinkCounts {
    pub total: usize,
    pub external: usize,
    pub internal: usize,
    /// Links that are probed or already carry a status
    pub analyzable: usize,
    pub accessible: usize,
    pub inaccessible: usize,
    pub not_analysed: usize,
}

/// The report for one inspected page
#[derive(Debug)]
pub struct Report {
    pub(crate) url: String,
    pub(crate) status_code: u16,
    pub(crate) status_msg: String,
    // Only the first max_body_bytes of the page were scanned
    pub(crate) body_truncated: bool,
    pub(crate) html_version: String,
    pub(crate) page_title: String,
    pub(crate) headings: BTreeMap<String, Vec<String>>,
    pub(crate) login_field_count: usize,
    pub(crate) links: Vec<Arc<InspectedLink>>,
    pub(crate) external_link_count: usize,
    pub(crate) internal_link_count: usize,
}

impl Report {
    // A fresh report with every field at its default
    pub fn new(url: &str) -> Self {
        Report {
            url: url.to_string(),
            status_code: 0,
            status_msg: String::new(),
            body_truncated: false,
            html_version: NOT_DEFINED.to_string(),
            page_title: NOT_DEFINED.to_string(),
            headings: BTreeMap::new(),
            login_field_count: 0,
            links: Vec::new(),
            external_link_count: 0,
            internal_link_count: 0,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn status_code(&self) -> u16 {
        self.status_code
    }

    pub fn status_msg(&self) -> &str {
        &self.status_msg
    }

    /// True when the page body was cut short (size cap or a failed read)
    pub fn body_truncated(&self) -> bool {
        self.body_truncated
    }

    pub fn html_version(&self) -> &str {
        &self.html_version
    }

    pub fn page_title(&self) -> &str {
        &self.page_title
    }

    pub fn headings(&self) -> &BTreeMap<String, Vec<String>> {
        &self.headings
    }

    pub fn login_field_count(&self) -> usize {
        self.login_field_count
    }

    pub fn links(&self) -> &[Arc<InspectedLink>] {
        &self.links
    }

    pub fn external_link_count(&self) -> usize {
        self.external_link_count
    }

    pub fn internal_link_count(&self) -> usize {
        self.internal_link_count
    }

    pub(crate) fn set_status(&mut self, status_code: u16, status_msg: impl Into<String>) {
        self.status_code = status_code;
        self.status_msg = status_msg.into();
    }

    // Appends a classified link and bumps exactly one of internal/external
    pub(crate) fn push_link(&mut self, link: InspectedLink, scope: LinkScope) -> Arc<InspectedLink> {
        match scope {
            LinkScope::Internal => self.internal_link_count += 1,
            LinkScope::External => self.external_link_count += 1,
        }

        let link = Arc::new(link);
        self.links.push(Arc::clone(&link));
        link
    }

    // Recomputes the link tallies from the current link statuses
    //
    // Safe to call while probes are still running. The result is a
    // point-in-time view, not a consistent cut: a probe finishing while we
    // iterate may or may not be counted. Wait for the probes first if you
    // need final numbers.
    pub fn link_counts(&self) -> LinkCounts {
        let mut counts = LinkCounts {
            total: self.links.len(),
            external: self.external_link_count,
            internal: self.internal_link_count,
            ..LinkCounts::default()
        };

        for link in &self.links {
            let status = link.status_code();

            if status == 0 {
                if link.kind().is_checkable() {
                    counts.not_analysed += 1;
                    counts.analyzable += 1;
                }
            } else if status < 400 {
                counts.accessible += 1;
                counts.analyzable += 1;
            } else {
                counts.inaccessible += 1;
                counts.analyzable += 1;
            }
        }

        counts
    }

    // An owned copy of the whole report with fresh tallies, ready to serialize
    pub fn snapshot(&self) -> ReportSnapshot {
        let counts = self.link_counts();

        ReportSnapshot {
            url: self.url.clone(),
            status_code: self.status_code,
            status_msg: self.status_msg.clone(),
            body_truncated: self.body_truncated,
            html_version: self.html_version.clone(),
            page_title: self.page_title.clone(),
            headings: self.headings.clone(),
            login_field_count: self.login_field_count,
            links: self
                .links
                .iter()
                .map(|link| LinkRecord {
                    url: link.url().to_string(),
                    text: link.text().to_string(),
                    link_type: link.type_label(),
                    status_code: link.status_code(),
                })
                .collect(),
            accessible_link_count: counts.accessible,
            inaccessible_link_count: counts.inaccessible,
            not_analysed_link_count: counts.not_analysed,
            total_link_count: counts.total,
            external_link_count: counts.external,
            internal_link_count: counts.internal,
        }
    }
}

/// One link as it appears in a snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LinkRecord {
    pub url: String,
    pub text: String,
    #[serde(rename = "type")]
    pub link_type: String,
    pub status_code: u16,
}

impl LinkRecord {
    // Accessible means probed with a status below 400
    pub fn is_accessible(&self) -> bool {
        self.status_code != 0 && self.status_code < 400
    }
}

/// A serializable, point-in-time copy of a report
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportSnapshot {
    pub url: String,
    pub status_code: u16,
    pub status_msg: String,
    pub body_truncated: bool,
    pub html_version: String,
    pub page_title: String,
    /// "h1" -> ["first h1", "second h1"], in document order
    pub headings: BTreeMap<String, Vec<String>>,
    pub login_field_count: usize,
    pub links: Vec<LinkRecord>,
    pub accessible_link_count: usize,
    pub inaccessible_link_count: usize,
    pub not_analysed_link_count: usize,
    pub total_link_count: usize,
    pub external_link_count: usize,
    pub internal_link_count: usize,
}
