//! # Qualified Keys
//!
//! A [`KeyPath`] locates an attribute inside an instance tree. It renders as
//! the qualified key used in validation reports: attribute segments are joined
//! with `.`, and an index attaches directly to the attribute it indexes.
//!
//! ```
//! use paramkit_core::KeyPath;
//!
//! let key = KeyPath::attr("sections").index(0).child("id");
//! assert_eq!(key.to_string(), "sections[0].id");
//! ```

use std::fmt;

/// One step of a [`KeyPath`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Segment {
    /// A named attribute.
    Attr(String),
    /// A position within a struct collection.
    Index(usize),
}

/// A path from a validation root to an attribute.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct KeyPath {
    segments: Vec<Segment>,
}

impl KeyPath {
    /// The empty path.
    pub fn root() -> Self {
        Self::default()
    }

    /// A single-attribute path.
    pub fn attr(name: impl Into<String>) -> Self {
        Self::root().child(name)
    }

    /// Append an attribute segment.
    pub fn child(mut self, name: impl Into<String>) -> Self {
        self.segments.push(Segment::Attr(name.into()));
        self
    }

    /// Append an index segment.
    pub fn index(mut self, i: usize) -> Self {
        self.segments.push(Segment::Index(i));
        self
    }

    /// Prefix this path onto an already-rendered child key.
    ///
    /// The child key is kept verbatim, so keys produced at deeper levels are
    /// not re-parsed.
    pub fn qualify(&self, child_key: &str) -> String {
        if self.segments.is_empty() {
            child_key.to_string()
        } else if child_key.is_empty() {
            self.to_string()
        } else {
            format!("{self}.{child_key}")
        }
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}

impl fmt::Display for KeyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, seg) in self.segments.iter().enumerate() {
            match seg {
                Segment::Attr(name) if i == 0 => f.write_str(name)?,
                Segment::Attr(name) => write!(f, ".{name}")?,
                Segment::Index(idx) => write!(f, "[{idx}]")?,
            }
        }
        Ok(())
    }
}
