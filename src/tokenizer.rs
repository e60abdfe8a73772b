//! Incremental XML tokenizer for the text backend.
//!
//! Liefert lexikalische Tokens (XML-Deklaration, Start-, Leer- und
//! End-Tags, Text) aus einem eigenen Bytefenster. Ein Token, das vom
//! Fensterende abgeschnitten wird, ergibt [`Token::Incomplete`] ohne etwas
//! zu konsumieren; nach [`Tokenizer::rebuffer`] wird es vollständig gelesen.
//!
//! Kommentare, Processing Instructions und reiner Whitespace zwischen Tags
//! werden übersprungen. Elementnamen verlieren ihr Präfix, Attributnamen
//! bleiben unverändert (damit `xsi:type` gefunden wird). Vordefinierte
//! Entities werden mit `quick_xml::escape` aufgelöst.

use std::borrow::Cow;

use memchr::{memchr, memchr3, memmem};
use quick_xml::events::BytesStart;

/// A lexical token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token {
    /// `<?xml ...?>`
    XmlDecl,
    /// `<name ...>`
    StartTag,
    /// `<name .../>`
    EmptyTag,
    /// `</name>`
    EndTag,
    /// Zeichendaten zwischen Tags.
    Text,
    /// Token unvollständig, mehr Bytes nötig.
    Incomplete,
    /// Fehlerhaftes Markup.
    Invalid,
}

/// Source of lexical tokens for the XML driver.
pub trait Tokenizer {
    /// Liest das nächste Token.
    fn next_token(&mut self) -> Token;
    /// Lokaler Name des letzten Tags.
    fn name(&self) -> &str;
    /// Inhalt des letzten Text-Tokens.
    fn content(&self) -> &str;
    /// Attributwert des letzten Start- oder Leer-Tags.
    fn attribute(&self, name: &str) -> Option<&str>;
    /// Fehlermeldung zum letzten [`Token::Invalid`].
    fn error(&self) -> Option<&str>;
    /// Hängt Bytes an das Fenster an.
    fn rebuffer(&mut self, data: &[u8]);
}

/// Ergebnis eines Scans ab der aktuellen Position.
enum Scan {
    Skip(usize),
    Incomplete,
    Text { len: usize, text: String },
    Decl { len: usize },
    Tag { len: usize, token: Token, name: String, attributes: Vec<(String, String)> },
}

/// Tokenizer over an owned byte window.
#[derive(Debug, Clone, Default)]
pub struct XmlTokenizer {
    data: Vec<u8>,
    pos: usize,
    name: String,
    content: String,
    attributes: Vec<(String, String)>,
    error: Option<String>,
}

impl XmlTokenizer {
    /// Neuer Tokenizer über einer Kopie von `data`.
    pub fn new(data: &[u8]) -> Self {
        Self {
            data: data.to_vec(),
            ..Self::default()
        }
    }

    /// Noch nicht konsumierte Bytes.
    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    /// Attribute des letzten Start- oder Leer-Tags.
    pub fn attributes(&self) -> &[(String, String)] {
        &self.attributes
    }
}

impl Tokenizer for XmlTokenizer {
    fn next_token(&mut self) -> Token {
        loop {
            match scan(&self.data[self.pos..]) {
                Ok(Scan::Skip(len)) => self.pos += len,
                Ok(Scan::Incomplete) => return Token::Incomplete,
                Ok(Scan::Text { len, text }) => {
                    self.pos += len;
                    self.content = text;
                    return Token::Text;
                }
                Ok(Scan::Decl { len }) => {
                    self.pos += len;
                    return Token::XmlDecl;
                }
                Ok(Scan::Tag { len, token, name, attributes }) => {
                    self.pos += len;
                    self.name = name;
                    self.attributes = attributes;
                    return token;
                }
                Err(msg) => {
                    self.error = Some(msg);
                    return Token::Invalid;
                }
            }
        }
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn content(&self) -> &str {
        &self.content
    }

    fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    fn rebuffer(&mut self, data: &[u8]) {
        if self.pos > 0 {
            self.data.drain(..self.pos);
            self.pos = 0;
        }
        self.data.extend_from_slice(data);
    }
}

/// Lokaler Teil eines qualifizierten Namens.
pub fn local_name(name: &str) -> &str {
    name.rsplit_once(':').map_or(name, |(_, local)| local)
}

fn utf8(bytes: &[u8]) -> Result<&str, String> {
    std::str::from_utf8(bytes).map_err(|e| e.to_string())
}

fn unescape(raw: &str) -> Result<String, String> {
    quick_xml::escape::unescape(raw)
        .map(Cow::into_owned)
        .map_err(|e| e.to_string())
}

fn scan(rest: &[u8]) -> Result<Scan, String> {
    let Some(&first) = rest.first() else {
        return Ok(Scan::Incomplete);
    };
    if first != b'<' {
        // Text reicht bis zum nächsten Tag
        let Some(len) = memchr(b'<', rest) else {
            return Ok(Scan::Incomplete);
        };
        let raw = &rest[..len];
        if raw.iter().all(u8::is_ascii_whitespace) {
            return Ok(Scan::Skip(len));
        }
        let text = unescape(utf8(raw)?)?;
        return Ok(Scan::Text { len, text });
    }
    if rest.len() < 2 {
        return Ok(Scan::Incomplete);
    }
    match rest[1] {
        b'!' => {
            if rest.len() < 4 && b"<!--".starts_with(rest) {
                return Ok(Scan::Incomplete);
            }
            if !rest.starts_with(b"<!--") {
                return Err("DOCTYPE and CDATA sections are not supported".to_owned());
            }
            Ok(memmem::find(&rest[4..], b"-->").map_or(Scan::Incomplete, |i| Scan::Skip(4 + i + 3)))
        }
        b'?' => {
            let Some(i) = memmem::find(&rest[2..], b"?>") else {
                return Ok(Scan::Incomplete);
            };
            let len = 2 + i + 2;
            let body = &rest[2..2 + i];
            let target_len = body.iter().position(u8::is_ascii_whitespace).unwrap_or(body.len());
            if &body[..target_len] == b"xml" {
                Ok(Scan::Decl { len })
            } else {
                Ok(Scan::Skip(len))
            }
        }
        b'/' => {
            let Some(end) = memchr(b'>', rest) else {
                return Ok(Scan::Incomplete);
            };
            let name = utf8(&rest[2..end])?.trim();
            if name.is_empty() {
                return Err("empty end tag".to_owned());
            }
            Ok(Scan::Tag {
                len: end + 1,
                token: Token::EndTag,
                name: local_name(name).to_owned(),
                attributes: Vec::new(),
            })
        }
        _ => {
            let Some(end) = find_tag_end(rest) else {
                return Ok(Scan::Incomplete);
            };
            let mut inner = &rest[1..end];
            let empty = inner.last() == Some(&b'/');
            if empty {
                inner = &inner[..inner.len() - 1];
            }
            let inner = utf8(inner)?;
            let name_len = inner
                .find(|c: char| c.is_ascii_whitespace())
                .unwrap_or(inner.len());
            if name_len == 0 {
                return Err("missing element name".to_owned());
            }
            let start = BytesStart::from_content(inner, name_len);
            let mut attributes = Vec::new();
            for attr in start.attributes() {
                let attr = attr.map_err(|e| e.to_string())?;
                let key = utf8(attr.key.as_ref())?.to_owned();
                let value = unescape(utf8(&attr.value)?)?;
                attributes.push((key, value));
            }
            Ok(Scan::Tag {
                len: end + 1,
                token: if empty { Token::EmptyTag } else { Token::StartTag },
                name: local_name(&inner[..name_len]).to_owned(),
                attributes,
            })
        }
    }
}

/// Position des schließenden `>`, Quotes in Attributwerten beachtet.
fn find_tag_end(rest: &[u8]) -> Option<usize> {
    let mut i = 1;
    while let Some(off) = memchr3(b'>', b'"', b'\'', &rest[i..]) {
        let at = i + off;
        match rest[at] {
            b'>' => return Some(at),
            quote => {
                let close = memchr(quote, &rest[at + 1..])?;
                i = at + 1 + close + 1;
            }
        }
    }
    None
}
