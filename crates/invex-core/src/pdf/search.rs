//! Exact-text search over assembled page lines.

use serde::Serialize;

use super::layout::TextLine;

/// A page-relative bounding region, in top-down coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Region {
    /// Left edge.
    pub x0: f32,
    /// Right edge.
    pub x1: f32,
    /// Top edge, measured from the top of the page.
    pub top: f32,
    /// Bottom edge, measured from the top of the page.
    pub bottom: f32,
}

/// Find every occurrence of `needle` in the page's lines.
///
/// Exact substring match, case-sensitive, no regex, no normalization. The
/// line is the search unit, so a value rendered across lines never matches;
/// no match yields an empty vec, never an error.
pub fn search_lines(lines: &[TextLine], needle: &str) -> Vec<Region> {
    if needle.is_empty() {
        return Vec::new();
    }

    let needle_chars = needle.chars().count();
    let mut regions = Vec::new();

    for line in lines {
        for (byte_offset, _) in line.text.match_indices(needle) {
            let start = line.text[..byte_offset].chars().count();
            let matched = &line.chars[start..start + needle_chars];
            regions.push(Region {
                x0: matched[0].x0,
                x1: matched[matched.len() - 1].x1,
                top: line.top,
                bottom: line.bottom,
            });
        }
    }

    regions
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdf::layout::CharBox;

    /// A line with uniform 6pt glyph cells starting at `x0`.
    fn make_line(text: &str, x0: f32, top: f32) -> TextLine {
        let chars = text
            .chars()
            .enumerate()
            .map(|(i, ch)| CharBox {
                ch,
                x0: x0 + i as f32 * 6.0,
                x1: x0 + (i + 1) as f32 * 6.0,
            })
            .collect();
        TextLine {
            text: text.to_string(),
            chars,
            top,
            bottom: top + 12.0,
        }
    }

    #[test]
    fn test_single_match_geometry() {
        let lines = vec![make_line("Vendor: V10000", 72.0, 80.0)];
        let regions = search_lines(&lines, "V10000");

        assert_eq!(regions.len(), 1);
        // "V10000" starts at char 8.
        assert_eq!(regions[0].x0, 72.0 + 8.0 * 6.0);
        assert_eq!(regions[0].x1, 72.0 + 14.0 * 6.0);
        assert_eq!(regions[0].top, 80.0);
        assert_eq!(regions[0].bottom, 92.0);
    }

    #[test]
    fn test_match_spanning_inserted_space() {
        let lines = vec![make_line("Bill to Acme Associates Ltd", 0.0, 0.0)];
        let regions = search_lines(&lines, "Acme Associates");
        assert_eq!(regions.len(), 1);
    }

    #[test]
    fn test_multiple_occurrences() {
        let lines = vec![
            make_line("total 50 of 50", 0.0, 0.0),
            make_line("50 again", 0.0, 20.0),
        ];
        assert_eq!(search_lines(&lines, "50").len(), 3);
    }

    #[test]
    fn test_case_sensitive() {
        let lines = vec![make_line("acme associates", 0.0, 0.0)];
        assert!(search_lines(&lines, "Acme").is_empty());
    }

    #[test]
    fn test_no_match_is_empty_not_error() {
        let lines = vec![make_line("nothing here", 0.0, 0.0)];
        assert!(search_lines(&lines, "A00001").is_empty());
    }

    #[test]
    fn test_empty_needle_matches_nothing() {
        let lines = vec![make_line("anything", 0.0, 0.0)];
        assert!(search_lines(&lines, "").is_empty());
    }
}
