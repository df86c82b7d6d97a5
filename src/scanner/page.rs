// src/scanner/page.rs
// =============================================================================
// The page scanner: one forward pass over the token stream that fills in a
// Report.
//
// What we look at:
// - <!DOCTYPE ...>   -> HTML version
// - <title>          -> page title (the token right after the tag)
// - <h1> .. <h6>     -> heading text
// - <a href>         -> links (text + classification)
// - <input>          -> password fields (login forms)
//
// We never go backwards and never build a tree. Headings and links may wrap
// their text in other tags (<h1><em>Big</em> news</h1>), so for those we
// skip forward to the first text token, counting how deep we are in nested
// tags so we notice when the element closes without any text.
//
// When the stream ends or errors we simply stop: whatever was filled in so
// far is the result. A truncated page still gives a valid report.
//
// Rust concepts:
// - Generic iterators: the scanner works on any Iterator<Item = HtmlToken>
// - ControlFlow: a tiny enum saying "keep going" or "stop now"
// - Closures: the caller decides what to do with each checkable link
// =============================================================================

use std::ops::ControlFlow;
use std::sync::Arc;

use log::debug;

use crate::config::RelativeLinkPolicy;
use crate::report::{InspectedLink, Report};
use crate::scanner::doctype::detect_html_version;
use crate::scanner::links::classify_link;
use crate::scanner::text::normalize_text;
use crate::scanner::tokens::{HtmlToken, TagToken};

// Result of looking for the first text inside an element
enum TextSearch {
    /// Found a text token (already normalized, may be empty)
    Found(String),
    /// The element closed before any text showed up
    Closed,
    /// The token stream ended or failed - scanning must stop
    Ended,
}

struct PageScanner<'r, I, F> {
    tokens: I,
    report: &'r mut Report,
    relative_links: RelativeLinkPolicy,
    on_checkable: F,
}

impl<I, F> PageScanner<'_, I, F>
where
    I: Iterator<Item = HtmlToken>,
    F: FnMut(&Arc<InspectedLink>),
{
    fn run(&mut self) {
        while let Some(token) = self.tokens.next() {
            let flow = match token {
                HtmlToken::Doctype(doctype) => {
                    self.report.html_version = detect_html_version(&doctype);
                    ControlFlow::Continue(())
                }
                HtmlToken::StartTag(tag) => self.start_tag(tag),
                // Void elements may be written <input ... /> - still an input
                HtmlToken::SelfClosingTag(tag) => {
                    if tag.name == "input" {
                        self.input_tag(&tag);
                    }
                    ControlFlow::Continue(())
                }
                HtmlToken::Error(message) => {
                    debug!("token stream failed, stopping scan: {}", message);
                    ControlFlow::Break(())
                }
                HtmlToken::EndTag(_) | HtmlToken::Text(_) | HtmlToken::Comment => {
                    ControlFlow::Continue(())
                }
            };

            if flow.is_break() {
                return;
            }
        }
    }

    fn start_tag(&mut self, tag: TagToken) -> ControlFlow<()> {
        match tag.name.as_str() {
            "title" => self.title(),
            "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => self.heading(tag.name),
            "a" => self.anchor(&tag),
            "input" => {
                self.input_tag(&tag);
                ControlFlow::Continue(())
            }
            _ => ControlFlow::Continue(()),
        }
    }

    // The title is the token right after <title>, whitespace-normalized
    //
    // Every <title> followed by non-empty text overwrites the previous one,
    // so the LAST title in the document wins. A title that is empty after
    // normalization is skipped and the earlier title stays.
    fn title(&mut self) -> ControlFlow<()> {
        match self.tokens.next() {
            Some(HtmlToken::Text(text)) => {
                let title = normalize_text(&text);
                if !title.is_empty() {
                    self.report.page_title = title;
                }
                ControlFlow::Continue(())
            }
            None | Some(HtmlToken::Error(_)) => ControlFlow::Break(()),
            Some(_) => ControlFlow::Continue(()),
        }
    }

    fn heading(&mut self, level: String) -> ControlFlow<()> {
        match self.next_text() {
            TextSearch::Found(text) => {
                if !text.is_empty() {
                    self.report.headings.entry(level).or_default().push(text);
                }
                ControlFlow::Continue(())
            }
            TextSearch::Closed => ControlFlow::Continue(()),
            TextSearch::Ended => ControlFlow::Break(()),
        }
    }

    fn anchor(&mut self, tag: &TagToken) -> ControlFlow<()> {
        let text = match self.next_text() {
            TextSearch::Found(text) => text,
            TextSearch::Closed => String::new(),
            TextSearch::Ended => return ControlFlow::Break(()),
        };

        let href = tag.attr("href").unwrap_or_default();
        let Some(classified) = classify_link(href, &self.report.url, self.relative_links) else {
            return ControlFlow::Continue(());
        };

        let link = InspectedLink::new(href, text, &classified);
        let link = self.report.push_link(link, classified.scope);

        if classified.is_checkable() {
            (self.on_checkable)(&link);
        }

        ControlFlow::Continue(())
    }

    // Counts <input type="password"> - once per tag, however many type
    // attributes a sloppy page repeats
    fn input_tag(&mut self, tag: &TagToken) {
        let is_password = tag.attrs.iter().any(|(key, value)| {
            key.eq_ignore_ascii_case("type") && value.eq_ignore_ascii_case("password")
        });

        if is_password {
            self.report.login_field_count += 1;
        }
    }

    // Skips forward to the first text token inside the current element
    //
    // depth = how many tags deep we are below the element. Start tags go one
    // level down, end tags one level up. Going above the element (depth < 0)
    // means it closed without text.
    fn next_text(&mut self) -> TextSearch {
        let mut depth: i32 = 0;

        loop {
            match self.tokens.next() {
                Some(HtmlToken::Text(text)) => return TextSearch::Found(normalize_text(&text)),
                Some(HtmlToken::StartTag(_)) => depth += 1,
                Some(HtmlToken::EndTag(_)) => {
                    depth -= 1;
                    if depth < 0 {
                        return TextSearch::Closed;
                    }
                }
                Some(HtmlToken::Error(_)) | None => return TextSearch::Ended,
                Some(_) => {}
            }
        }
    }
}

// Scans a page's tokens into `report`
//
// Parameters:
//   tokens: the page's tokens, in document order
//   report: the report to fill in (its URL is the base for relative links)
//   relative_links: how relative hrefs are resolved
//   on_checkable: called once for each link that should be probed, right
//                 after it is added to the report
pub fn scan_page<I, F>(
    tokens: I,
    report: &mut Report,
    relative_links: RelativeLinkPolicy,
    on_checkable: F,
) where
    I: IntoIterator<Item = HtmlToken>,
    F: FnMut(&Arc<InspectedLink>),
{
    let mut scanner = PageScanner {
        tokens: tokens.into_iter(),
        report,
        relative_links,
        on_checkable,
    };
    scanner.run();

    debug!(
        "scanned {}: {} link(s), {} heading level(s), {} login field(s)",
        scanner.report.url,
        scanner.report.links.len(),
        scanner.report.headings.len(),
        scanner.report.login_field_count
    );
}
