//! Citation audit for generated articles
//!
//! The writer is told to number inline citations in source order, but the
//! model's output is returned untouched. This audit only reports how the
//! markers in an article line up with the source list.

use regex::Regex;
use serde::Serialize;
use std::collections::BTreeSet;
use std::sync::OnceLock;

fn marker_regex() -> &'static Regex {
    static MARKER: OnceLock<Regex> = OnceLock::new();
    MARKER.get_or_init(|| Regex::new(r"\[(\d{1,4})\]").expect("marker regex is valid"))
}

/// How an article's `[n]` markers relate to its sources
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CitationAudit {
    /// Distinct marker numbers found, ascending
    pub markers: Vec<usize>,

    /// Markers with no matching source (`[0]` or past the end)
    pub out_of_range: Vec<usize>,

    /// Source numbers never cited
    pub unused: Vec<usize>,
}

impl CitationAudit {
    /// True when every marker points at a source
    pub fn is_consistent(&self) -> bool {
        self.out_of_range.is_empty()
    }
}

/// Compare the markers in `article` against `source_count` sources
pub fn audit(article: &str, source_count: usize) -> CitationAudit {
    let markers: BTreeSet<usize> = marker_regex()
        .captures_iter(article)
        .filter_map(|caps| caps[1].parse().ok())
        .collect();

    let out_of_range = markers
        .iter()
        .copied()
        .filter(|n| *n == 0 || *n > source_count)
        .collect();

    let unused = (1..=source_count).filter(|n| !markers.contains(n)).collect();

    CitationAudit {
        markers: markers.into_iter().collect(),
        out_of_range,
        unused,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_markers_match() {
        let article = "<p>Debris is growing [1]. Fines exist [2][3].</p><p>Again [1].</p>";
        let result = audit(article, 3);
        assert_eq!(result.markers, vec![1, 2, 3]);
        assert!(result.out_of_range.is_empty());
        assert!(result.unused.is_empty());
        assert!(result.is_consistent());
    }

    #[test]
    fn test_out_of_range_and_unused() {
        let article = "<p>Claim [0]. Another [2]. Made up [7].</p>";
        let result = audit(article, 3);
        assert_eq!(result.markers, vec![0, 2, 7]);
        assert_eq!(result.out_of_range, vec![0, 7]);
        assert_eq!(result.unused, vec![1, 3]);
        assert!(!result.is_consistent());
    }

    #[test]
    fn test_no_markers() {
        let result = audit("<p>Uncited prose.</p>", 2);
        assert!(result.markers.is_empty());
        assert_eq!(result.unused, vec![1, 2]);
        assert!(result.is_consistent());
    }

    #[test]
    fn test_ignores_non_numeric_brackets() {
        let result = audit("<p>[citation needed] and [a]</p>", 1);
        assert!(result.markers.is_empty());
    }
}
