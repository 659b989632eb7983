//! Error paths locating a failure inside a validated value.
//!
//! This module provides [`Path`] and [`PathSegment`]. Paths are built from the
//! inside out: a leaf reports an error with an empty path, and every enclosing
//! container prepends the segment through which it reached the child.

use std::collections::VecDeque;
use std::fmt::{self, Display};

use crate::value::Value;

/// A segment of an error path.
///
/// Segments are totally ordered so that aggregated errors sort
/// deterministically. The order is: `Index < Key < Step < ExtraKey <
/// ExtraValue`. Indices compare numerically and keys by [`Value`] ordering
/// (numbers before strings).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PathSegment {
    /// Position in an input sequence (e.g. `[0]`).
    Index(usize),
    /// Key of an input mapping (e.g. `name`).
    Key(Value),
    /// Position of a branch inside `AllOf` / `OneOf`.
    Step(usize),
    /// The key of an undeclared entry failed its key validator.
    ExtraKey,
    /// The value of an undeclared entry failed its value validator.
    ExtraValue,
}

impl PathSegment {
    /// Creates a new index segment.
    pub fn index(idx: usize) -> Self {
        PathSegment::Index(idx)
    }

    /// Creates a new key segment.
    pub fn key(key: impl Into<Value>) -> Self {
        PathSegment::Key(key.into())
    }

    /// Creates a new step segment.
    pub fn step(step: usize) -> Self {
        PathSegment::Step(step)
    }
}

/// The location of an error, outermost segment first.
///
/// # Example
///
/// ```rust
/// use vouch::{Path, PathSegment};
///
/// let mut path = Path::root();
/// path.push_front(PathSegment::key("email"));
/// path.push_front(PathSegment::index(0));
/// path.push_front(PathSegment::key("users"));
///
/// assert_eq!(path.to_string(), "users[0].email");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Path {
    segments: VecDeque<PathSegment>,
}

impl Path {
    /// Creates an empty path representing the root value.
    pub fn root() -> Self {
        Self::default()
    }

    /// Prepends a segment.
    pub fn push_front(&mut self, segment: PathSegment) {
        self.segments.push_front(segment);
    }

    /// Returns true if this is the root path (no segments).
    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Returns the number of segments in this path.
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Returns true if this path has no segments.
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Returns an iterator over the path segments, outermost first.
    pub fn segments(&self) -> impl Iterator<Item = &PathSegment> {
        self.segments.iter()
    }

    /// Returns the outermost segment, or None if this is root.
    pub fn first(&self) -> Option<&PathSegment> {
        self.segments.front()
    }

    /// Returns the innermost segment, or None if this is root.
    pub fn last(&self) -> Option<&PathSegment> {
        self.segments.back()
    }

    /// Copies the segments into a vector.
    pub fn to_vec(&self) -> Vec<PathSegment> {
        self.segments.iter().cloned().collect()
    }
}

impl From<Vec<PathSegment>> for Path {
    fn from(segments: Vec<PathSegment>) -> Self {
        Self {
            segments: segments.into(),
        }
    }
}

impl FromIterator<PathSegment> for Path {
    fn from_iter<I: IntoIterator<Item = PathSegment>>(iter: I) -> Self {
        Self {
            segments: iter.into_iter().collect(),
        }
    }
}

impl Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            match segment {
                PathSegment::Key(Value::Str(name)) => {
                    if i > 0 {
                        write!(f, ".")?;
                    }
                    write!(f, "{}", name)?;
                }
                PathSegment::Key(key) => write!(f, "[{}]", key)?,
                PathSegment::Index(idx) => write!(f, "[{}]", idx)?,
                PathSegment::Step(step) => write!(f, "<step {}>", step)?,
                PathSegment::ExtraKey => write!(f, "<key>")?,
                PathSegment::ExtraValue => write!(f, "<value>")?,
            }
        }
        Ok(())
    }
}
