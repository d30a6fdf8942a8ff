//! Ignore-path notation
//!
//! Paths are dot-delimited and rooted at [`ROOT`], e.g. `root.user.tags.0`.
//! Mapping keys and sequence indices are both plain segments, so the same
//! notation addresses a node whether it sits in a map or a sequence. A
//! bracketed index (`root.tags[0]`) is accepted as an alias for `root.tags.0`.

use std::fmt;

/// Token every path starts with
pub const ROOT: &str = "root";

/// A parsed ignore path, stored without its root token
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IgnorePath {
    segments: Vec<String>,
}

impl IgnorePath {
    /// Parse a path string. Returns `None` if it is not rooted at [`ROOT`].
    pub fn parse(raw: &str) -> Option<Self> {
        let mut segments = Vec::new();
        for part in raw.trim().split('.') {
            split_brackets(part, &mut segments);
        }

        let mut iter = segments.into_iter();
        if iter.next().as_deref() != Some(ROOT) {
            return None;
        }
        Some(Self {
            segments: iter.collect(),
        })
    }

    /// Segments below the root
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Whether this path addresses exactly the node at `segments`
    pub fn is_at(&self, segments: &[String]) -> bool {
        self.segments == segments
    }
}

impl fmt::Display for IgnorePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(ROOT)?;
        for segment in &self.segments {
            write!(f, ".{}", segment)?;
        }
        Ok(())
    }
}

/// `tags[0][1]` -> `tags`, `0`, `1`
fn split_brackets(part: &str, out: &mut Vec<String>) {
    let mut rest = part;
    if let Some(open) = rest.find('[') {
        if open > 0 {
            out.push(rest[..open].to_string());
        }
        rest = &rest[open..];
        while let Some(stripped) = rest.strip_prefix('[') {
            match stripped.find(']') {
                Some(close) => {
                    out.push(stripped[..close].to_string());
                    rest = &stripped[close + 1..];
                }
                None => {
                    out.push(stripped.to_string());
                    rest = "";
                }
            }
        }
        if !rest.is_empty() {
            out.push(rest.to_string());
        }
    } else {
        out.push(rest.to_string());
    }
}

/// Set of ignore paths belonging to one candidate record
#[derive(Debug, Clone, Default)]
pub struct IgnoreSet {
    paths: Vec<IgnorePath>,
}

impl IgnoreSet {
    /// Build a set from raw path strings. Unrooted entries are dropped.
    pub fn new<I, S>(raw: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let paths = raw
            .into_iter()
            .filter_map(|p| {
                let parsed = IgnorePath::parse(p.as_ref());
                if parsed.is_none() {
                    tracing::debug!(path = p.as_ref(), "ignore path is not rooted, skipping");
                }
                parsed
            })
            .collect();
        Self { paths }
    }

    /// Whether the node at `segments` (below the root) is ignored
    pub fn contains(&self, segments: &[String]) -> bool {
        self.paths.iter().any(|p| p.is_at(segments))
    }

    /// Number of usable paths
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    /// Whether the set ignores nothing
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Iterate over the parsed paths
    pub fn iter(&self) -> impl Iterator<Item = &IgnorePath> {
        self.paths.iter()
    }
}
