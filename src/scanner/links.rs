// src/scanner/links.rs
// =============================================================================
// Classifies the href of every <a> tag found on the page.
//
// For each href we decide:
// - what kind of link it is (external, fragment, email, ...)
// - whether it counts as an internal or an external link
// - whether it can be liveness-checked, and at which absolute URL
//
// The rules are checked in a fixed order and the FIRST match wins, so
// "https://..." is external even though it also looks like "scheme:".
//
// This module is pure: the same (href, page URL) always gives the same
// answer, and nothing here touches the network.
// =============================================================================

use std::sync::LazyLock;

use regex::Regex;
use url::Url;

use crate::config::RelativeLinkPolicy;
use crate::report::LinkKind;

// A leading "scheme:" such as javascript:, sms:, ftp:
static SCHEME_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([a-zA-Z0-9]+):").expect("scheme pattern is a valid regex")
});

/// Which tally a link belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkScope {
    Internal,
    External,
}

/// The outcome of classifying one href
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedLink {
    pub kind: LinkKind,
    pub scope: LinkScope,
    /// Absolute URL to probe; `None` for links we never check
    pub target: Option<String>,
    /// Status assigned at classification time (400 for invalid links, else 0)
    pub status_code: u16,
}

impl ClassifiedLink {
    // True when the link should get a liveness probe
    pub fn is_checkable(&self) -> bool {
        self.target.is_some()
    }

    fn unchecked(kind: LinkKind, scope: LinkScope) -> Self {
        ClassifiedLink {
            kind,
            scope,
            target: None,
            status_code: 0,
        }
    }

    fn checked(kind: LinkKind, scope: LinkScope, target: String) -> Self {
        ClassifiedLink {
            kind,
            scope,
            target: Some(target),
            status_code: 0,
        }
    }

    fn invalid() -> Self {
        ClassifiedLink {
            kind: LinkKind::Invalid,
            scope: LinkScope::Internal,
            target: None,
            status_code: 400,
        }
    }
}

// Classifies an href found on the page at `page_url`
//
// Returns None for an empty href: such links are dropped entirely.
//
// Examples (page_url = "https://x.org/p"):
//   "https://rust-lang.org" -> External, checked as-is
//   "#top"                  -> Fragment, not checked
//   "/about"                -> Absolute, checked at https://x.org/about
//   "contact"               -> Relative, checked at https://x.org/p/contact
pub fn classify_link(
    href: &str,
    page_url: &str,
    relative_links: RelativeLinkPolicy,
) -> Option<ClassifiedLink> {
    if href.is_empty() {
        return None;
    }

    let classified = if href.starts_with("http") {
        ClassifiedLink::checked(LinkKind::External, LinkScope::External, href.to_string())
    } else if href.starts_with('#') {
        ClassifiedLink::unchecked(LinkKind::Fragment, LinkScope::Internal)
    } else if href.starts_with("tel:") {
        ClassifiedLink::unchecked(LinkKind::Telephone, LinkScope::External)
    } else if href.starts_with("mailto:") {
        ClassifiedLink::unchecked(LinkKind::Email, LinkScope::External)
    } else if let Some(captures) = SCHEME_PATTERN.captures(href) {
        let scheme = captures[1].to_string();
        ClassifiedLink::unchecked(LinkKind::Scheme(scheme), LinkScope::External)
    } else if href.starts_with('/') {
        match origin_of(page_url) {
            Some(origin) => ClassifiedLink::checked(
                LinkKind::Absolute,
                LinkScope::Internal,
                format!("{}{}", origin, href),
            ),
            None => ClassifiedLink::invalid(),
        }
    } else {
        match resolve_relative(href, page_url, relative_links) {
            Some(target) => {
                ClassifiedLink::checked(LinkKind::Relative, LinkScope::Internal, target)
            }
            None => ClassifiedLink::invalid(),
        }
    };

    Some(classified)
}

// "https://x.org:8080/p?q" -> "https://x.org:8080"
fn origin_of(page_url: &str) -> Option<String> {
    let url = Url::parse(page_url).ok()?;
    let host = url.host_str()?;

    Some(match url.port() {
        Some(port) => format!("{}://{}:{}", url.scheme(), host, port),
        None => format!("{}://{}", url.scheme(), host),
    })
}

// Resolves a relative href
//
// Concatenate is a best-effort string join, NOT RFC 3986 resolution: it does
// not understand "../", and it keeps the page's query and fragment.
//   page "https://x.org/p", href "contact" -> "https://x.org/p/contact"
fn resolve_relative(href: &str, page_url: &str, policy: RelativeLinkPolicy) -> Option<String> {
    match policy {
        RelativeLinkPolicy::Concatenate => {
            let base = page_url.strip_prefix('/').unwrap_or(page_url);
            Some(format!("{}/{}", base, href))
        }
        RelativeLinkPolicy::Rfc3986 => {
            let base = Url::parse(page_url).ok()?;
            base.join(href).ok().map(|url| url.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = "https://x.org/p";

    fn classify(href: &str) -> ClassifiedLink {
        classify_link(href, PAGE, RelativeLinkPolicy::Concatenate).expect("href is not empty")
    }

    #[test]
    fn test_empty_href_is_dropped() {
        assert_eq!(classify_link("", PAGE, RelativeLinkPolicy::Concatenate), None);
    }

    #[test]
    fn test_external_link() {
        let link = classify("https://www.rust-lang.org");
        assert_eq!(link.kind, LinkKind::External);
        assert_eq!(link.scope, LinkScope::External);
        assert_eq!(link.target.as_deref(), Some("https://www.rust-lang.org"));
    }

    #[test]
    fn test_fragment_link() {
        let link = classify("#section");
        assert_eq!(link.kind, LinkKind::Fragment);
        assert_eq!(link.scope, LinkScope::Internal);
        assert!(!link.is_checkable());
    }

    #[test]
    fn test_telephone_email_and_custom_schemes() {
        let tel = classify("tel:+123456");
        assert_eq!(tel.kind, LinkKind::Telephone);
        assert_eq!(tel.scope, LinkScope::External);

        let email = classify("mailto:someone@x.org");
        assert_eq!(email.kind, LinkKind::Email);
        assert_eq!(email.scope, LinkScope::External);

        let js = classify("javascript:void(0)");
        assert_eq!(js.kind, LinkKind::Scheme("javascript".to_string()));
        assert_eq!(js.scope, LinkScope::External);
        assert!(!js.is_checkable());
    }

    #[test]
    fn test_absolute_path_link() {
        let link = classify("/about");
        assert_eq!(link.kind, LinkKind::Absolute);
        assert_eq!(link.scope, LinkScope::Internal);
        assert_eq!(link.target.as_deref(), Some("https://x.org/about"));
    }

    #[test]
    fn test_absolute_path_keeps_port() {
        let link = classify_link("/a", "http://127.0.0.1:8080/x", RelativeLinkPolicy::Concatenate)
            .unwrap();
        assert_eq!(link.target.as_deref(), Some("http://127.0.0.1:8080/a"));
    }

    #[test]
    fn test_absolute_path_on_unparseable_page_is_invalid() {
        let link = classify_link("/about", "not a url", RelativeLinkPolicy::Concatenate).unwrap();
        assert_eq!(link.kind, LinkKind::Invalid);
        assert_eq!(link.scope, LinkScope::Internal);
        assert_eq!(link.status_code, 400);
        assert!(!link.is_checkable());
    }

    #[test]
    fn test_relative_link_is_concatenated() {
        let link = classify("contact");
        assert_eq!(link.kind, LinkKind::Relative);
        assert_eq!(link.scope, LinkScope::Internal);
        assert_eq!(link.target.as_deref(), Some("https://x.org/p/contact"));

        // No "../" handling on purpose
        let up = classify("../docs");
        assert_eq!(up.target.as_deref(), Some("https://x.org/p/../docs"));
    }

    #[test]
    fn test_relative_link_rfc3986() {
        let link = classify_link("../docs", "https://x.org/a/b", RelativeLinkPolicy::Rfc3986)
            .unwrap();
        assert_eq!(link.kind, LinkKind::Relative);
        assert_eq!(link.target.as_deref(), Some("https://x.org/docs"));
    }

    #[test]
    fn test_classification_is_idempotent() {
        for href in ["https://a.b", "#x", "tel:1", "mailto:a@b", "sms:1", "/a", "b", "../c"] {
            assert_eq!(classify(href), classify(href), "href: {}", href);
        }
    }
}
