//! Datastore keys
//!
//! Keys are slash-separated paths, always rooted at `/`. Construction cleans
//! the input like a filesystem path so that `a//b/` and `/a/b` name the
//! same entry.

use std::fmt;

use smol_str::SmolStr;

/// A cleaned datastore key such as `/blocks/CIQA...` or `/local/filesroot`
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Key(SmolStr);

impl Key {
    /// Build a key from any string, cleaning it into canonical form
    pub fn new(s: impl AsRef<str>) -> Self {
        let mut segments: Vec<&str> = Vec::new();
        for segment in s.as_ref().split('/') {
            match segment {
                "" | "." => {}
                ".." => {
                    segments.pop();
                }
                other => segments.push(other),
            }
        }

        if segments.is_empty() {
            return Self::root();
        }

        let mut out = String::with_capacity(s.as_ref().len() + 1);
        for segment in segments {
            out.push('/');
            out.push_str(segment);
        }
        Self(SmolStr::new(out))
    }

    /// The root key `/`
    pub fn root() -> Self {
        Self(SmolStr::new_static("/"))
    }

    /// Whether this is the root key
    pub fn is_root(&self) -> bool {
        self.0 == "/"
    }

    /// Key as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Path segments, excluding the leading root
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('/').filter(|s| !s.is_empty())
    }

    /// Whether `self` equals `ancestor` or lies beneath it
    pub fn is_descendant_or_equal(&self, ancestor: &Key) -> bool {
        let mut mine = self.segments();
        ancestor.segments().all(|theirs| mine.next() == Some(theirs))
    }

    /// Strip an ancestor prefix, yielding the remaining key
    ///
    /// Returns `None` when `ancestor` does not contain `self`.
    pub fn strip_ancestor(&self, ancestor: &Key) -> Option<Key> {
        if !self.is_descendant_or_equal(ancestor) {
            return None;
        }
        let rest: Vec<&str> = self.segments().skip(ancestor.segments().count()).collect();
        Some(Key::new(rest.join("/")))
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Key {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Key {
    fn from(s: &str) -> Self {
        Key::new(s)
    }
}

impl From<String> for Key {
    fn from(s: String) -> Self {
        Key::new(s)
    }
}
