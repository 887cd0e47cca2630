//! Resolution-path helpers for path-aware rules.
//!
//! Every field resolves at a position in the request tree, and some rules
//! only make sense relative to that position: a group's cover photo is
//! publicly readable when reached through the group's own subtree, not when
//! dug up through an arbitrary selection. The position is captured as a
//! flat segment list, root first, and walked with an explicit hop budget.

/// How many segments an ancestor walk examines, current field included.
pub const DEFAULT_ANCESTOR_DEPTH: usize = 5;

/// One step of a resolution path.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PathSegment {
    /// A named field.
    Field(String),
    /// A list index.
    Index(usize),
}

/// A field's position in the request tree.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ResolvePath {
    segments: Vec<PathSegment>,
}

impl ResolvePath {
    /// Start a path at the request root.
    pub fn root() -> Self {
        Self::default()
    }

    /// Extend the path with a field segment.
    pub fn field(mut self, name: impl Into<String>) -> Self {
        self.segments.push(PathSegment::Field(name.into()));
        self
    }

    /// Extend the path with a list-index segment.
    pub fn index(mut self, index: usize) -> Self {
        self.segments.push(PathSegment::Index(index));
        self
    }
}

impl std::fmt::Display for ResolvePath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            match segment {
                PathSegment::Field(name) => f.write_str(name)?,
                PathSegment::Index(_) => f.write_str("INDEX")?,
            }
        }
        Ok(())
    }
}

/// Whether a field named `ancestor` appears within `max_depth` hops of the
/// path's tip, tip included.
///
/// Index segments consume a hop but never match. The bound is a counter,
/// not recursion depth, so deeply nested selections stay cheap; a match
/// sitting at or beyond the bound reads as absent.
pub fn has_ancestor(ancestor: &str, path: &ResolvePath, max_depth: usize) -> bool {
    for (hops, segment) in path.segments.iter().rev().enumerate() {
        if hops >= max_depth {
            return false;
        }
        if matches!(segment, PathSegment::Field(name) if name == ancestor) {
            return true;
        }
    }
    false
}

/// Whether the dot-rendered path contains `needle` anywhere.
///
/// List indices render as a fixed `INDEX` token, so a needle can span them
/// without knowing the concrete positions.
pub fn has_path(needle: &str, path: &ResolvePath) -> bool {
    path.to_string().contains(needle)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_ancestor_within_bound() {
        let path = ResolvePath::root().field("group").field("roles").index(2).field("name");
        assert!(has_ancestor("group", &path, DEFAULT_ANCESTOR_DEPTH));
        assert!(has_ancestor("roles", &path, DEFAULT_ANCESTOR_DEPTH));
    }

    #[test]
    fn tip_counts_as_hop_zero() {
        let path = ResolvePath::root().field("group");
        assert!(has_ancestor("group", &path, 1));
        assert!(!has_ancestor("group", &path, 0));
    }

    #[test]
    fn match_beyond_the_bound_reads_as_absent() {
        // "group" sits six hops up from the tip.
        let path = ResolvePath::root()
            .field("group")
            .field("feed")
            .index(0)
            .field("comments")
            .index(3)
            .field("images")
            .field("id");
        assert!(!has_ancestor("group", &path, DEFAULT_ANCESTOR_DEPTH));
        assert!(has_ancestor("group", &path, 7));
        // "feed" is exactly at the bound, one short of reachable.
        assert!(!has_ancestor("feed", &path, DEFAULT_ANCESTOR_DEPTH));
        assert!(has_ancestor("feed", &path, 6));
    }

    #[test]
    fn index_segments_spend_hops_without_matching() {
        let path = ResolvePath::root()
            .field("a")
            .index(0)
            .index(1)
            .index(2)
            .index(3)
            .field("tip");
        assert!(!has_ancestor("a", &path, DEFAULT_ANCESTOR_DEPTH));
        assert!(has_ancestor("a", &path, 6));
    }

    #[test]
    fn renders_indices_as_placeholder() {
        let path = ResolvePath::root().field("publicGroupsFeed").index(4).field("coverPhoto");
        assert_eq!(path.to_string(), "publicGroupsFeed.INDEX.coverPhoto");
        assert!(has_path("publicGroupsFeed.INDEX", &path));
        assert!(has_path("coverPhoto", &path));
        assert!(!has_path("proposal", &path));
    }

    #[test]
    fn empty_path_matches_nothing() {
        let path = ResolvePath::root();
        assert_eq!(path.to_string(), "");
        assert!(!has_ancestor("group", &path, DEFAULT_ANCESTOR_DEPTH));
        assert!(!has_path("group", &path));
    }
}
