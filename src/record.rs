use std::fmt::{self, Write as _};
use std::panic::Location;

use serde::{Serialize, Serializer};
use time::{OffsetDateTime, UtcOffset};

use crate::severity::Severity;
use crate::tags::{Tags, DEFAULT_TAG_CAPACITY};

/// Domain used when a logger is created with an empty one.
pub const DEFAULT_DOMAIN: &str = "chainlog";

/// Source location of the call that emitted a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallSite {
    pub file: &'static str,
    pub line: u32,
    pub column: u32,
}

impl CallSite {
    pub fn new(file: &'static str, line: u32, column: u32) -> Self {
        Self { file, line, column }
    }

    /// Last two components of the file path, e.g. `tests/handle_tests.rs`.
    pub fn short_file(&self) -> &'static str {
        let file = self.file;
        let mut seen = 0;
        for (i, c) in file.char_indices().rev() {
            if c == '/' || c == '\\' {
                seen += 1;
                if seen == 2 {
                    return &file[i + 1..];
                }
            }
        }
        file
    }
}

impl From<&'static Location<'static>> for CallSite {
    fn from(location: &'static Location<'static>) -> Self {
        Self::new(location.file(), location.line(), location.column())
    }
}

/// Renders as `<short file>:<line>`.
impl fmt::Display for CallSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.short_file(), self.line)
    }
}

impl Serialize for CallSite {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// One log event, before formatting.
///
/// Records live in a logger's handle pool and are reused: the domain, tag and
/// message storage of a recycled record is cleared in place, never
/// reallocated. The UTC offset used to render timestamps is computed once when
/// the record is created for the pool.
#[derive(Debug, Clone)]
pub struct Record {
    domain: Vec<u8>,
    severity: Severity,
    timestamp: OffsetDateTime,
    tags: Tags,
    message: String,
    want_call_site: bool,
    call_site: Option<CallSite>,
    offset: UtcOffset,
}

impl Record {
    /// Creates a record for `domain`, falling back to [`DEFAULT_DOMAIN`] when
    /// `domain` is empty.
    pub fn new(domain: &[u8]) -> Self {
        let mut record = Self::empty();
        record.set_domain(domain);
        record.tags = Tags::with_capacity(DEFAULT_TAG_CAPACITY);
        record.offset = local_offset();
        record
    }

    /// A record holding no allocations, used as a placeholder while a real
    /// record is on its way back to the pool.
    pub(crate) fn empty() -> Self {
        Self {
            domain: Vec::new(),
            severity: Severity::Info,
            timestamp: OffsetDateTime::UNIX_EPOCH,
            tags: Tags::new(),
            message: String::new(),
            want_call_site: false,
            call_site: None,
            offset: UtcOffset::UTC,
        }
    }

    pub fn domain(&self) -> &[u8] {
        &self.domain
    }

    pub(crate) fn set_domain(&mut self, domain: &[u8]) {
        self.domain.clear();
        if domain.is_empty() {
            self.domain.extend_from_slice(DEFAULT_DOMAIN.as_bytes());
        } else {
            self.domain.extend_from_slice(domain);
        }
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    pub fn set_severity(&mut self, severity: Severity) {
        self.severity = severity;
    }

    /// Commit time of the record, in the offset cached at pool fill.
    pub fn timestamp(&self) -> OffsetDateTime {
        self.timestamp
    }

    pub fn offset(&self) -> UtcOffset {
        self.offset
    }

    /// Sets the timestamp to the current time.
    pub fn stamp(&mut self) {
        self.timestamp = OffsetDateTime::now_utc().to_offset(self.offset);
    }

    pub fn tags(&self) -> &Tags {
        &self.tags
    }

    pub fn tags_mut(&mut self) -> &mut Tags {
        &mut self.tags
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// The message without its trailing newline.
    pub fn message_line(&self) -> &str {
        self.message.strip_suffix('\n').unwrap_or(&self.message)
    }

    /// Replaces the message, reusing its storage.
    pub fn set_message(&mut self, args: fmt::Arguments<'_>) {
        self.message.clear();
        // Writing into a String cannot fail.
        let _ = self.message.write_fmt(args);
    }

    /// Makes sure the message ends with exactly one appended newline.
    pub fn terminate_message(&mut self) {
        if !self.message.ends_with('\n') {
            self.message.push('\n');
        }
    }

    pub fn wants_call_site(&self) -> bool {
        self.want_call_site
    }

    pub(crate) fn set_want_call_site(&mut self, want: bool) {
        self.want_call_site = want;
        if !want {
            self.call_site = None;
        }
    }

    /// Location of the emitting call, present only when call-site info was
    /// requested.
    pub fn call_site(&self) -> Option<&CallSite> {
        self.call_site.as_ref()
    }

    /// Records `site` if call-site info is wanted and none is resolved yet.
    pub fn resolve_call_site(&mut self, site: CallSite) {
        if self.want_call_site && self.call_site.is_none() {
            self.call_site = Some(site);
        }
    }

    /// Copies every field of `other` into `self`, reusing `self`'s storage.
    pub(crate) fn copy_from(&mut self, other: &Record) {
        self.domain.clear();
        self.domain.extend_from_slice(&other.domain);
        self.severity = other.severity;
        self.timestamp = other.timestamp;
        self.tags.copy_from(&other.tags);
        self.message.clear();
        self.message.push_str(&other.message);
        self.want_call_site = other.want_call_site;
        self.call_site = other.call_site;
        self.offset = other.offset;
    }

    /// Returns the record to its pooled state.
    pub(crate) fn reset(&mut self) {
        self.severity = Severity::Info;
        self.tags.clear();
        self.message.clear();
        self.want_call_site = false;
        self.call_site = None;
    }
}

/// Local UTC offset, or UTC when the platform cannot determine it safely.
pub fn local_offset() -> UtcOffset {
    UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC)
}
