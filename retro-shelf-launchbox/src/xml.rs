//! Element-at-a-time reader over quick-xml events.
//!
//! LaunchBox documents are a root element holding flat records of text
//! fields. Walking them as "next child / read its text / skip it" keeps the
//! record readers short.

use std::io::BufRead;
use std::path::{Path, PathBuf};

use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;

use crate::error::ProviderError;

pub(crate) struct ElementReader<R> {
    reader: Reader<R>,
    buf: Vec<u8>,
    /// The element last returned by `next_start` was self-closing, so it has
    /// no content and no end event to consume.
    empty_pending: bool,
    /// Elements entered and not yet closed.
    depth: usize,
    source: PathBuf,
}

impl<R: BufRead> ElementReader<R> {
    pub(crate) fn new(inner: R, source: &Path) -> Self {
        let mut reader = Reader::from_reader(inner);
        reader.config_mut().trim_text(true);
        Self {
            reader,
            buf: Vec::new(),
            empty_pending: false,
            depth: 0,
            source: source.to_path_buf(),
        }
    }

    fn truncated(&self) -> ProviderError {
        ProviderError::invalid_document(format!(
            "unexpected end of `{}`",
            self.source.display()
        ))
    }

    /// Advance to the next child element of the current element.
    ///
    /// Returns `None` once the current element ends (its end tag is consumed)
    /// or the document ends after its root. A document that ends with
    /// elements still open is an error.
    pub(crate) fn next_start(&mut self) -> Result<Option<String>, ProviderError> {
        if std::mem::take(&mut self.empty_pending) {
            return Ok(None);
        }
        loop {
            self.buf.clear();
            match self.reader.read_event_into(&mut self.buf)? {
                Event::Start(ref e) => {
                    self.depth += 1;
                    return Ok(Some(tag_name(e)));
                }
                Event::Empty(ref e) => {
                    let name = tag_name(e);
                    self.empty_pending = true;
                    return Ok(Some(name));
                }
                Event::End(_) => {
                    self.depth = self.depth.saturating_sub(1);
                    return Ok(None);
                }
                Event::Eof if self.depth > 0 => return Err(self.truncated()),
                Event::Eof => return Ok(None),
                _ => {}
            }
        }
    }

    /// Read the text content of the element just entered, trimmed.
    ///
    /// Nested elements are skipped; their text is not included.
    pub(crate) fn read_text(&mut self) -> Result<String, ProviderError> {
        if std::mem::take(&mut self.empty_pending) {
            return Ok(String::new());
        }
        let mut text = String::new();
        let level = self.depth;
        loop {
            self.buf.clear();
            match self.reader.read_event_into(&mut self.buf)? {
                Event::Text(ref e) if self.depth == level => text.push_str(&e.unescape()?),
                Event::CData(ref e) if self.depth == level => {
                    text.push_str(&String::from_utf8_lossy(e))
                }
                Event::Start(_) => self.depth += 1,
                Event::End(_) => {
                    self.depth = self.depth.saturating_sub(1);
                    if self.depth < level {
                        break;
                    }
                }
                Event::Eof => return Err(self.truncated()),
                _ => {}
            }
        }
        Ok(text.trim().to_string())
    }

    /// Skip the element just entered, including its whole subtree.
    pub(crate) fn skip(&mut self) -> Result<(), ProviderError> {
        if std::mem::take(&mut self.empty_pending) {
            return Ok(());
        }
        let level = self.depth;
        loop {
            self.buf.clear();
            match self.reader.read_event_into(&mut self.buf)? {
                Event::Start(_) => self.depth += 1,
                Event::End(_) => {
                    self.depth = self.depth.saturating_sub(1);
                    if self.depth < level {
                        return Ok(());
                    }
                }
                Event::Eof => return Err(self.truncated()),
                _ => {}
            }
        }
    }

    /// Enter the root element, failing if it is absent or not `expected`.
    pub(crate) fn expect_root(&mut self, expected: &str) -> Result<(), ProviderError> {
        match self.next_start()? {
            None => Err(ProviderError::invalid_document(format!(
                "could not parse `{}`",
                self.source.display()
            ))),
            Some(name) if name != expected => Err(ProviderError::invalid_document(format!(
                "`{}` does not have a `<{expected}>` root node",
                self.source.display()
            ))),
            Some(_) => Ok(()),
        }
    }
}

fn tag_name(e: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(e.name().as_ref()).to_string()
}
