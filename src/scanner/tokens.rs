// src/scanner/tokens.rs
// =============================================================================
// A forward-only stream of HTML tokens read from any byte source.
//
// html5ever's tokenizer is "push" based: we feed it text and it calls a
// TokenSink for every token it recognises. The page scanner wants the
// opposite - to PULL one token at a time and sometimes look one token ahead
// (e.g. "is the token after <title> a text node?"). So we:
//   1. collect tokens into a queue inside our sink
//   2. read and feed the next chunk of bytes only when the queue runs dry
//
// No DOM is built: html5ever's tree builder is never involved.
//
// Rust concepts:
// - Traits: we implement html5ever's TokenSink trait for our queue
// - Iterator: TokenStream implements Iterator so the scanner can use next()
// - Generics: TokenStream<R: Read> works over files, sockets, byte slices...
// =============================================================================

use std::collections::VecDeque;
use std::io::{self, Read};

use html5ever::tendril::StrTendril;
use html5ever::tokenizer::states::RawKind;
use html5ever::tokenizer::{
    BufferQueue, Doctype, Tag, TagKind, Token, TokenSink, TokenSinkResult, Tokenizer,
    TokenizerOpts,
};
use log::trace;

// How many bytes we read from the source per refill
const DEFAULT_CHUNK_SIZE: usize = 8 * 1024;

/// A start tag (or self-closing tag) with its attributes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagToken {
    /// Lowercased tag name, e.g. "a"
    pub name: String,
    /// (name, value) pairs in source order; names are lowercased by the tokenizer
    pub attrs: Vec<(String, String)>,
}

impl TagToken {
    // Returns the value of the first attribute with this name
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

/// The simplified token kinds the page scanner understands
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HtmlToken {
    /// <!DOCTYPE ...> rebuilt as text: `html public "<id>" "<system id>"`
    Doctype(String),
    /// <tag ...>
    StartTag(TagToken),
    /// <tag ... />
    SelfClosingTag(TagToken),
    /// </tag>
    EndTag(String),
    /// A run of character data, entities already decoded
    Text(String),
    /// <!-- ... --> (contents are not needed)
    Comment,
    /// The byte source failed; nothing follows this token
    Error(String),
}

// Our TokenSink: html5ever pushes tokens in, TokenStream pops them out
#[derive(Default)]
struct TokenQueue {
    tokens: VecDeque<HtmlToken>,
}

impl TokenQueue {
    // Appends character data, merging with a text token that is still queued
    //
    // html5ever delivers text in pieces (around entities, at chunk
    // boundaries); the scanner expects one text token per text node.
    fn push_text(&mut self, text: &str) {
        if let Some(HtmlToken::Text(last)) = self.tokens.back_mut() {
            last.push_str(text);
        } else {
            self.tokens.push_back(HtmlToken::Text(text.to_string()));
        }
    }

    fn push_tag(&mut self, tag: Tag) -> TokenSinkResult<()> {
        let name = tag.name.to_string();

        if tag.kind == TagKind::EndTag {
            self.tokens.push_back(HtmlToken::EndTag(name));
            return TokenSinkResult::Continue;
        }

        let attrs = tag
            .attrs
            .iter()
            .map(|attr| (attr.name.local.to_string(), attr.value.to_string()))
            .collect();
        let token = TagToken { name, attrs };

        if tag.self_closing {
            self.tokens.push_back(HtmlToken::SelfClosingTag(token));
            return TokenSinkResult::Continue;
        }

        let next_state = raw_text_state(&token.name);
        self.tokens.push_back(HtmlToken::StartTag(token));
        next_state
    }
}

impl TokenSink for TokenQueue {
    type Handle = ();

    fn process_token(&mut self, token: Token, _line_number: u64) -> TokenSinkResult<()> {
        match token {
            Token::DoctypeToken(doctype) => {
                self.tokens.push_back(HtmlToken::Doctype(doctype_text(&doctype)));
            }
            Token::TagToken(tag) => return self.push_tag(tag),
            Token::CharacterTokens(text) => self.push_text(&text),
            Token::NullCharacterToken => self.push_text("\u{FFFD}"),
            Token::CommentToken(_) => self.tokens.push_back(HtmlToken::Comment),
            // Parse errors are recoverable; html5ever has already fixed up the token
            Token::ParseError(message) => trace!("html parse error: {}", message),
            Token::EOFToken => {}
        }

        TokenSinkResult::Continue
    }
}

// Elements whose content is not markup
//
// Without a tree builder nobody tells the tokenizer to switch state after
// <script> or <title>, so `if (a<b)` inside a script would turn into a tag.
// Returning RawData makes the tokenizer treat the body as text up to the
// matching end tag, the same way a browser does.
fn raw_text_state(tag_name: &str) -> TokenSinkResult<()> {
    match tag_name {
        "title" | "textarea" => TokenSinkResult::RawData(RawKind::Rcdata),
        "style" | "xmp" | "iframe" | "noembed" | "noframes" | "noscript" => {
            TokenSinkResult::RawData(RawKind::Rawtext)
        }
        "script" => TokenSinkResult::RawData(RawKind::ScriptData),
        "plaintext" => TokenSinkResult::Plaintext,
        _ => TokenSinkResult::Continue,
    }
}

// Rebuilds the text of a doctype declaration from its parsed parts
//
// <!DOCTYPE html PUBLIC "-//W3C//DTD HTML 4.01//EN" "http://...">
//   -> html public "-//W3C//DTD HTML 4.01//EN" "http://..."
fn doctype_text(doctype: &Doctype) -> String {
    let mut text = doctype
        .name
        .as_ref()
        .map(|name| name.to_string())
        .unwrap_or_default();

    if let Some(public_id) = &doctype.public_id {
        text.push_str(" public \"");
        text.push_str(public_id);
        text.push('"');
    }

    if let Some(system_id) = &doctype.system_id {
        if doctype.public_id.is_none() {
            text.push_str(" system");
        }
        text.push_str(" \"");
        text.push_str(system_id);
        text.push('"');
    }

    text
}

// Decodes as much of `pending` as is valid UTF-8
//
// An incomplete multi-byte sequence at the end stays in `pending` until the
// next chunk arrives; invalid bytes become U+FFFD.
fn take_decoded(pending: &mut Vec<u8>) -> String {
    let mut decoded = String::new();

    loop {
        match std::str::from_utf8(pending) {
            Ok(text) => {
                decoded.push_str(text);
                pending.clear();
                return decoded;
            }
            Err(err) => {
                let valid = err.valid_up_to();
                decoded.push_str(&String::from_utf8_lossy(&pending[..valid]));

                match err.error_len() {
                    None => {
                        pending.drain(..valid);
                        return decoded;
                    }
                    Some(invalid) => {
                        decoded.push('\u{FFFD}');
                        pending.drain(..valid + invalid);
                    }
                }
            }
        }
    }
}

/// Pull-based HTML token stream over a byte source
///
/// Yields tokens in document order and ends with `None` at end of input.
/// A read failure yields one `HtmlToken::Error` and then `None`.
pub struct TokenStream<R> {
    reader: R,
    tokenizer: Tokenizer<TokenQueue>,
    input: BufferQueue,
    // Bytes read but not yet decoded (a split UTF-8 sequence)
    pending: Vec<u8>,
    chunk: Vec<u8>,
    finished: bool,
}

impl<R: Read> TokenStream<R> {
    pub fn new(reader: R) -> Self {
        Self::with_chunk_size(reader, DEFAULT_CHUNK_SIZE)
    }

    // Same as new() but reads `chunk_size` bytes at a time (min 1)
    pub fn with_chunk_size(reader: R, chunk_size: usize) -> Self {
        TokenStream {
            reader,
            tokenizer: Tokenizer::new(TokenQueue::default(), TokenizerOpts::default()),
            input: BufferQueue::new(),
            pending: Vec::new(),
            chunk: vec![0; chunk_size.max(1)],
            finished: false,
        }
    }

    fn feed(&mut self, text: String) {
        if text.is_empty() {
            return;
        }
        self.input.push_back(StrTendril::from(text));
        // We never return Script from the sink, so feeding always runs to completion
        let _ = self.tokenizer.feed(&mut self.input);
    }

    // Reads one chunk from the source and tokenizes it
    fn fill(&mut self) {
        match self.reader.read(&mut self.chunk) {
            Ok(0) => {
                let rest = String::from_utf8_lossy(&self.pending).into_owned();
                self.pending.clear();
                self.feed(rest);
                self.tokenizer.end();
                self.finished = true;
            }
            Ok(read) => {
                self.pending.extend_from_slice(&self.chunk[..read]);
                let text = take_decoded(&mut self.pending);
                self.feed(text);
            }
            Err(err) if err.kind() == io::ErrorKind::Interrupted => {}
            Err(err) => {
                self.tokenizer
                    .sink
                    .tokens
                    .push_back(HtmlToken::Error(err.to_string()));
                self.finished = true;
            }
        }
    }
}

impl<R: Read> Iterator for TokenStream<R> {
    type Item = HtmlToken;

    fn next(&mut self) -> Option<HtmlToken> {
        loop {
            let queue = &self.tokenizer.sink.tokens;
            let ready = match queue.front() {
                None => false,
                // The text node may continue in the next chunk
                Some(HtmlToken::Text(_)) => queue.len() > 1 || self.finished,
                Some(_) => true,
            };

            if ready {
                return self.tokenizer.sink.tokens.pop_front();
            }
            if self.finished {
                return None;
            }

            self.fill();
        }
    }
}
