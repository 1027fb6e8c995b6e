use std::borrow::Cow;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Initial tag capacity of a pooled record.
pub const DEFAULT_TAG_CAPACITY: usize = 5;

/// Ordered list of tags attached to a record.
///
/// Duplicates are allowed and insertion order is display order. Static tags
/// are stored borrowed, so tagging with literals does not allocate. A recycled
/// record keeps its tag storage: [`Tags::clear`] empties the list without
/// giving the capacity back.
///
/// # Examples
///
/// ```
/// # use chainlog::Tags;
/// let mut tags = Tags::new();
/// tags.add(["db", "slow"]);
/// assert!(tags.contains("slow"));
/// assert_eq!(tags.to_string(), "db slow");
///
/// let mut json = Vec::new();
/// tags.encode_json(&mut json).unwrap();
/// assert_eq!(json, br#"["db","slow"]"#);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Tags(Vec<Cow<'static, str>>);

impl Tags {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self(Vec::with_capacity(capacity))
    }

    /// Appends tags, keeping their order.
    pub fn add<I, T>(&mut self, tags: I)
    where
        I: IntoIterator<Item = T>,
        T: Into<Cow<'static, str>>,
    {
        self.0.extend(tags.into_iter().map(Into::into));
    }

    /// Replaces the current tags with `tags`, reusing the storage.
    pub fn replace<I, T>(&mut self, tags: I)
    where
        I: IntoIterator<Item = T>,
        T: Into<Cow<'static, str>>,
    {
        self.clear();
        self.add(tags);
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.0.iter().any(|t| t == tag)
    }

    /// Removes every tag, keeping the allocated capacity.
    pub fn clear(&mut self) {
        self.0.clear();
    }

    /// Makes `self` a copy of `other`, reusing `self`'s storage.
    pub fn copy_from(&mut self, other: &Tags) {
        self.0.clone_from(&other.0);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.0.capacity()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|t| t.as_ref())
    }

    /// Appends the space-separated form to `buf`.
    pub fn write_text(&self, buf: &mut Vec<u8>) {
        for (i, tag) in self.0.iter().enumerate() {
            if i > 0 {
                buf.push(b' ');
            }
            buf.extend_from_slice(tag.as_bytes());
        }
    }

    /// Appends the JSON array form to `buf`. An empty set encodes as `[]`.
    pub fn encode_json(&self, buf: &mut Vec<u8>) -> serde_json::Result<()> {
        serde_json::to_writer(buf, &self.0)
    }

    /// Decodes a JSON array of strings.
    pub fn decode_json(bytes: &[u8]) -> serde_json::Result<Tags> {
        serde_json::from_slice(bytes)
    }
}

impl fmt::Display for Tags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, tag) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            f.write_str(tag)?;
        }
        Ok(())
    }
}

impl<T: Into<Cow<'static, str>>> FromIterator<T> for Tags {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}
