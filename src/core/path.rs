//! Dot-separated state paths.
//!
//! Paths name states relative to the root of the state tree, so the root
//! itself never appears in a path: `ground.idle` is the `idle` child of the
//! top-level `ground` stage.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Path of a state in the hierarchy, e.g. `ground.idle`.
///
/// A path is only a sequence of names. Whether it resolves to an existing
/// node is checked when a [`StateMachine`](crate::machine::StateMachine) is
/// constructed.
///
/// # Example
///
/// ```rust
/// use sortie::core::StatePath;
///
/// let path = StatePath::from("ground.idle");
/// assert_eq!(path.segments(), ["ground", "idle"]);
/// assert!(path.ends_with(&StatePath::from("idle")));
/// assert_eq!(path.to_string(), "ground.idle");
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StatePath {
    segments: Vec<String>,
}

impl StatePath {
    /// The empty path, naming the root.
    pub fn root() -> Self {
        Self::default()
    }

    /// Build a path from individual names.
    pub fn from_segments<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            segments: segments.into_iter().map(Into::into).collect(),
        }
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Last segment, if any.
    pub fn leaf(&self) -> Option<&str> {
        self.segments.last().map(String::as_str)
    }

    /// True when any segment is empty (`ground..idle`, `.idle`).
    pub fn has_empty_segment(&self) -> bool {
        self.segments.iter().any(|s| s.trim().is_empty())
    }

    /// Check whether `suffix` equals the trailing segments of this path.
    ///
    /// The empty path is a suffix of nothing; a pattern must name at
    /// least one state.
    pub fn ends_with(&self, suffix: &StatePath) -> bool {
        !suffix.is_empty() && self.segments.ends_with(&suffix.segments)
    }

    /// Return a new path with `name` appended.
    pub fn child(&self, name: &str) -> Self {
        let mut segments = self.segments.clone();
        segments.push(name.to_string());
        Self { segments }
    }
}

impl From<&str> for StatePath {
    fn from(value: &str) -> Self {
        if value.is_empty() {
            return Self::root();
        }
        Self::from_segments(value.split('.'))
    }
}

impl From<String> for StatePath {
    fn from(value: String) -> Self {
        Self::from(value.as_str())
    }
}

impl fmt::Display for StatePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.segments.join("."))
    }
}
