use std::io::Write;

use serde::Deserialize;
use time::macros::format_description;

use crate::error::FormatError;
use crate::record::Record;

const SEP: &[u8] = b" - ";

/// Turns a [`Record`] into bytes.
///
/// A formatter appends to the pooled buffer it is given and must not keep it:
/// the buffer goes back to the pool as soon as the record has been written.
/// Formatters only read the record and their own immutable settings.
///
/// Closures with the matching signature are formatters too:
///
/// ```
/// # use chainlog::{Config, SharedBuffer, Record, FormatError};
/// let out = SharedBuffer::new();
/// let logger = Config::new("app")
///     .sink(out.clone())
///     .formatter(|record: &Record, buf: &mut Vec<u8>| -> Result<(), FormatError> {
///         buf.extend_from_slice(record.message().as_bytes());
///         Ok(())
///     })
///     .build();
/// logger.print("bare");
/// assert_eq!(out.contents(), b"bare\n");
/// ```
pub trait Formatter: Send + Sync {
    fn format(&self, record: &Record, buf: &mut Vec<u8>) -> Result<(), FormatError>;
}

impl<F> Formatter for F
where
    F: Fn(&Record, &mut Vec<u8>) -> Result<(), FormatError> + Send + Sync,
{
    fn format(&self, record: &Record, buf: &mut Vec<u8>) -> Result<(), FormatError> {
        self(record, buf)
    }
}

/// Plain text layout:
///
/// `<domain> - <YYYY/MM/DD HH:MM:SS> - <severity> - [<tags> - ][<file:line> - ]<message>\n`
///
/// With colors enabled the message is painted according to its severity.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextFormatter {
    colors: bool,
}

impl TextFormatter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_colors(colors: bool) -> Self {
        Self { colors }
    }
}

impl Formatter for TextFormatter {
    fn format(&self, record: &Record, buf: &mut Vec<u8>) -> Result<(), FormatError> {
        buf.extend_from_slice(record.domain());
        buf.extend_from_slice(SEP);
        record.timestamp().format_into(
            buf,
            format_description!("[year]/[month]/[day] [hour]:[minute]:[second]"),
        )?;
        buf.extend_from_slice(SEP);
        buf.extend_from_slice(record.severity().as_bytes());
        buf.extend_from_slice(SEP);
        if !record.tags().is_empty() {
            record.tags().write_text(buf);
            buf.extend_from_slice(SEP);
        }
        if let Some(site) = record.call_site() {
            write!(buf, "{site}")?;
            buf.extend_from_slice(SEP);
        }

        let painted = if self.colors {
            record.severity().paint(record.message_line())
        } else {
            None
        };
        match painted {
            Some(painted) => writeln!(buf, "{painted}")?,
            None => buf.extend_from_slice(record.message().as_bytes()),
        }
        Ok(())
    }
}

/// Single-line JSON layout with the keys
/// `Domain, Priority, Timestamp, Tags, Message, File`.
///
/// `Tags` is always an array (`[]` when empty), `File` is empty unless
/// call-site info was requested, and `Message` carries the message without its
/// trailing newline. The object is followed by a newline.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonFormatter;

impl Formatter for JsonFormatter {
    fn format(&self, record: &Record, buf: &mut Vec<u8>) -> Result<(), FormatError> {
        buf.extend_from_slice(b"{\"Domain\":");
        serde_json::to_writer(&mut *buf, &String::from_utf8_lossy(record.domain()))?;
        buf.extend_from_slice(b",\"Priority\":");
        serde_json::to_writer(&mut *buf, record.severity().as_str())?;
        buf.extend_from_slice(b",\"Timestamp\":\"");
        record.timestamp().format_into(
            buf,
            format_description!(
                "[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond digits:9][offset_hour sign:mandatory]:[offset_minute]"
            ),
        )?;
        buf.extend_from_slice(b"\",\"Tags\":");
        record.tags().encode_json(buf)?;
        buf.extend_from_slice(b",\"Message\":");
        serde_json::to_writer(&mut *buf, record.message_line())?;
        buf.extend_from_slice(b",\"File\":");
        match record.call_site() {
            Some(site) => serde_json::to_writer(&mut *buf, site)?,
            None => buf.extend_from_slice(b"\"\""),
        }
        buf.extend_from_slice(b"}\n");
        Ok(())
    }
}

/// A record decoded from the [`JsonFormatter`] layout.
///
/// # Examples
///
/// ```
/// # use chainlog::JsonEntry;
/// let line = br#"{"Domain":"app","Priority":"info","Timestamp":"","Tags":["a"],"Message":"hi","File":""}"#;
/// let entry = JsonEntry::decode(line).unwrap();
/// assert_eq!(entry.priority, "info");
/// assert_eq!(entry.tags, vec!["a"]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct JsonEntry {
    pub domain: String,
    pub priority: String,
    pub timestamp: String,
    pub tags: Vec<String>,
    pub message: String,
    pub file: String,
}

impl JsonEntry {
    pub fn decode(line: &[u8]) -> serde_json::Result<JsonEntry> {
        serde_json::from_slice(line)
    }
}
