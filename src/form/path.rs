//! Property paths addressing leaves of the form state
//!
//! Paths use dot notation for object members and brackets for list ordinals:
//! `address.street`, `appIds[2]`, `contacts[0].email`. Validation rules may
//! also use the `[*]` wildcard to address every item of a list.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Segment of a property path
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PathSegment {
    /// Object member access: .fieldName
    Property(String),
    /// List ordinal access: [0], [1], etc.
    Index(usize),
    /// Any list ordinal: [*] (only meaningful in patterns)
    Wildcard,
}

/// Property path for nested access (e.g., "address.city" or "appIds[0]")
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PropertyPath {
    segments: Vec<PathSegment>,
}

impl PropertyPath {
    /// Create a root path (empty)
    pub fn root() -> Self {
        Self { segments: vec![] }
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn depth(&self) -> usize {
        self.segments.len()
    }

    /// Push a property segment
    pub fn push_property(&self, name: &str) -> Self {
        let mut new = self.clone();
        new.segments.push(PathSegment::Property(name.to_string()));
        new
    }

    /// Push a list ordinal segment
    pub fn push_index(&self, idx: usize) -> Self {
        let mut new = self.clone();
        new.segments.push(PathSegment::Index(idx));
        new
    }

    /// Push a wildcard segment (for validation patterns)
    pub fn push_wildcard(&self) -> Self {
        let mut new = self.clone();
        new.segments.push(PathSegment::Wildcard);
        new
    }

    pub fn segments(&self) -> impl Iterator<Item = &PathSegment> {
        self.segments.iter()
    }

    /// Segment-wise prefix test: `app` is not a prefix of `appIds`.
    pub fn starts_with(&self, prefix: &PropertyPath) -> bool {
        self.segments.len() >= prefix.segments.len()
            && self.segments[..prefix.segments.len()] == prefix.segments[..]
    }

    /// Swap `old_prefix` for `new_prefix`, or `None` if `old_prefix` does not apply.
    pub fn replace_prefix(&self, old_prefix: &PropertyPath, new_prefix: &PropertyPath) -> Option<Self> {
        if !self.starts_with(old_prefix) {
            return None;
        }
        let mut segments = new_prefix.segments.clone();
        segments.extend_from_slice(&self.segments[old_prefix.segments.len()..]);
        Some(Self { segments })
    }

    /// Match a concrete path against a pattern that may contain `[*]`.
    pub fn matches(&self, pattern: &PropertyPath) -> bool {
        self.segments.len() == pattern.segments.len()
            && self
                .segments
                .iter()
                .zip(pattern.segments.iter())
                .all(|(seg, pat)| match (seg, pat) {
                    (PathSegment::Index(_), PathSegment::Wildcard) => true,
                    _ => seg == pat,
                })
    }

    pub fn has_wildcard(&self) -> bool {
        self.segments.iter().any(|s| matches!(s, PathSegment::Wildcard))
    }

    /// Parse a path string into PropertyPath
    pub fn parse(s: &str) -> Self {
        let mut segments = Vec::new();
        let mut current = String::new();
        let mut chars = s.chars().peekable();

        while let Some(ch) = chars.next() {
            match ch {
                '.' => {
                    if !current.is_empty() {
                        segments.push(PathSegment::Property(std::mem::take(&mut current)));
                    }
                }
                '[' => {
                    if !current.is_empty() {
                        segments.push(PathSegment::Property(std::mem::take(&mut current)));
                    }
                    let mut index_str = String::new();
                    for c in chars.by_ref() {
                        if c == ']' {
                            break;
                        }
                        index_str.push(c);
                    }
                    if index_str == "*" {
                        segments.push(PathSegment::Wildcard);
                    } else if let Ok(idx) = index_str.parse::<usize>() {
                        segments.push(PathSegment::Index(idx));
                    }
                }
                _ => current.push(ch),
            }
        }

        if !current.is_empty() {
            segments.push(PathSegment::Property(current));
        }

        Self { segments }
    }
}

impl fmt::Display for PropertyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, seg) in self.segments.iter().enumerate() {
            match seg {
                PathSegment::Property(name) if i == 0 => write!(f, "{}", name)?,
                PathSegment::Property(name) => write!(f, ".{}", name)?,
                PathSegment::Index(idx) => write!(f, "[{}]", idx)?,
                PathSegment::Wildcard => write!(f, "[*]")?,
            }
        }
        Ok(())
    }
}

impl From<&str> for PropertyPath {
    fn from(s: &str) -> Self {
        Self::parse(s)
    }
}

impl Serialize for PropertyPath {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for PropertyPath {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(Self::parse(&s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_property_path_building() {
        let path = PropertyPath::root()
            .push_property("address")
            .push_property("city");

        assert_eq!(path.to_string(), "address.city");
        assert_eq!(path.depth(), 2);
    }

    #[test]
    fn test_property_path_with_index() {
        let path = PropertyPath::root()
            .push_property("contacts")
            .push_index(0)
            .push_property("email");

        assert_eq!(path.to_string(), "contacts[0].email");
    }

    #[test]
    fn test_property_path_parse() {
        let path = PropertyPath::parse("user.address[0].city");
        assert_eq!(path.depth(), 4);
        assert_eq!(path.to_string(), "user.address[0].city");
    }

    #[test]
    fn test_prefix_is_segment_aware() {
        let ids = PropertyPath::parse("appIds[0]");
        assert!(ids.starts_with(&PropertyPath::parse("appIds")));
        assert!(!ids.starts_with(&PropertyPath::parse("app")));
    }

    #[test]
    fn test_replace_prefix_shifts_ordinal() {
        let path = PropertyPath::parse("contacts[2].email");
        let moved = path
            .replace_prefix(&PropertyPath::parse("contacts[2]"), &PropertyPath::parse("contacts[1]"))
            .unwrap();
        assert_eq!(moved.to_string(), "contacts[1].email");
        assert!(path
            .replace_prefix(&PropertyPath::parse("contacts[0]"), &PropertyPath::root())
            .is_none());
    }

    #[test]
    fn test_wildcard_matching() {
        let pattern = PropertyPath::parse("appIds[*]");
        assert!(pattern.has_wildcard());
        assert!(PropertyPath::parse("appIds[3]").matches(&pattern));
        assert!(!PropertyPath::parse("appIds").matches(&pattern));
        assert!(!PropertyPath::parse("hosts[0]").matches(&pattern));
    }

    #[test]
    fn test_index_ordering_is_numeric() {
        assert!(PropertyPath::parse("appIds[2]") < PropertyPath::parse("appIds[10]"));
    }
}
