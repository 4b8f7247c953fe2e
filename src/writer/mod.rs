//! RSS 2.0 serialization.
//!
//! Output is streamed: header, items in the order given, footer. Plain-text
//! fields are entity-escaped; item bodies are HTML and go into CDATA.

mod file;

pub use file::write_feed_file;

use std::borrow::Cow;
use std::io::Write;

use chrono::{DateTime, Utc};
use quick_xml::events::{BytesCData, BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use crate::app::Result;
use crate::domain::{FeedItem, PageContext};

pub const GENERATOR: &str = "runnel";

pub struct RssWriter<W: Write> {
    writer: Writer<W>,
}

impl<W: Write> RssWriter<W> {
    pub fn new(inner: W) -> Self {
        Self {
            writer: Writer::new(inner),
        }
    }

    pub fn write_header(&mut self, page: &PageContext) -> Result<()> {
        self.writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
        self.newline()?;
        self.writer.write_event(Event::Start(
            BytesStart::new("rss").with_attributes([("version", "2.0")]),
        ))?;
        self.writer
            .write_event(Event::Start(BytesStart::new("channel")))?;
        self.newline()?;

        self.text_element("title", &page.page_title)?;
        self.text_element("description", &page.page_description)?;
        self.text_element("link", &page.page_url)?;
        if let Some(dt) = page.most_recent {
            let date = rfc822(&dt);
            self.text_element("lastBuildDate", &date)?;
            self.text_element("pubDate", &date)?;
        }
        self.text_element("generator", GENERATOR)?;
        self.newline()
    }

    pub fn write_item(&mut self, item: &FeedItem) -> Result<()> {
        self.writer.write_event(Event::Start(BytesStart::new("item")))?;
        self.text_element("title", &item.title)?;

        self.writer
            .write_event(Event::Start(BytesStart::new("description")))?;
        self.cdata(&item.body)?;
        self.writer
            .write_event(Event::End(BytesEnd::new("description")))?;

        self.text_element("link", &item.link)?;

        let is_permalink = if item.guid_is_permalink() { "true" } else { "false" };
        self.writer.write_event(Event::Start(
            BytesStart::new("guid").with_attributes([("isPermaLink", is_permalink)]),
        ))?;
        self.writer
            .write_event(Event::Text(BytesText::new(&xml_safe(&item.guid))))?;
        self.writer.write_event(Event::End(BytesEnd::new("guid")))?;

        if let Some(dt) = item.timestamp {
            self.text_element("pubDate", &rfc822(&dt))?;
        }
        self.writer.write_event(Event::End(BytesEnd::new("item")))?;
        self.newline()
    }

    /// Close the document and hand back the destination.
    pub fn finish(mut self) -> Result<W> {
        self.writer
            .write_event(Event::End(BytesEnd::new("channel")))?;
        self.writer.write_event(Event::End(BytesEnd::new("rss")))?;
        self.newline()?;
        Ok(self.writer.into_inner())
    }

    fn text_element(&mut self, name: &str, text: &str) -> Result<()> {
        self.writer.write_event(Event::Start(BytesStart::new(name)))?;
        self.writer
            .write_event(Event::Text(BytesText::new(&xml_safe(text))))?;
        self.writer.write_event(Event::End(BytesEnd::new(name)))?;
        Ok(())
    }

    /// A literal `]]>` would end the section early, so it is split across
    /// two adjacent sections.
    fn cdata(&mut self, text: &str) -> Result<()> {
        let text = xml_safe(text);
        let mut parts = text.split("]]>").peekable();
        let mut prefix = "";
        while let Some(part) = parts.next() {
            let suffix = if parts.peek().is_some() { "]]" } else { "" };
            self.writer.write_event(Event::CData(BytesCData::new(format!(
                "{prefix}{part}{suffix}"
            ))))?;
            prefix = ">";
        }
        Ok(())
    }

    fn newline(&mut self) -> Result<()> {
        self.writer.get_mut().write_all(b"\n")?;
        Ok(())
    }
}

/// Serialize a whole feed into `inner`.
pub fn serialize<W: Write>(page: &PageContext, items: &[FeedItem], inner: W) -> Result<W> {
    let mut rss = RssWriter::new(inner);
    rss.write_header(page)?;
    for item in items {
        rss.write_item(item)?;
    }
    rss.finish()
}

/// RFC 822 date as RSS readers expect it: `Mon, 01 Jan 2024 00:00:00 GMT`.
pub fn rfc822(dt: &DateTime<Utc>) -> String {
    dt.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}

/// Drop characters XML 1.0 cannot represent at all.
fn xml_safe(s: &str) -> Cow<'_, str> {
    fn allowed(c: char) -> bool {
        matches!(c, '\t' | '\n' | '\r') || (c >= ' ' && c != '\u{FFFE}' && c != '\u{FFFF}')
    }

    if s.chars().all(allowed) {
        Cow::Borrowed(s)
    } else {
        Cow::Owned(s.chars().filter(|c| allowed(*c)).collect())
    }
}
