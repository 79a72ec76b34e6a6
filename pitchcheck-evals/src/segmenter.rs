// Copyright 2025 Pitchcheck Contributors
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! Splits raw model output into bullet candidates.
//!
//! Scorer families classify lines differently (a 10 vs 20 character
//! threshold, bold-header exclusion, a fallback pass), so the rules are
//! parameters of one [`Segmenter`] rather than separate copies.

/// Glyphs recognized as bullet markers
pub const DEFAULT_GLYPHS: [char; 3] = ['•', '-', '*'];

/// Configurable line classifier
#[derive(Debug, Clone, PartialEq)]
pub struct Segmenter {
    /// Unmarked lines must be strictly longer than this (in chars)
    pub min_length: usize,

    /// Leading glyphs that mark a bullet regardless of length
    pub glyphs: Vec<char>,

    /// Reject unmarked lines ending in `:` (section headers)
    pub exclude_trailing_colon: bool,

    /// Reject unmarked lines starting with `**` (bold headers)
    pub exclude_bold_prefix: bool,

    /// When the primary pass finds nothing, take every line longer than
    /// `min_length`
    pub fallback_to_long_lines: bool,
}

impl Segmenter {
    /// 10-character threshold with fallback; used by the graded format
    /// scorer and the theme scorer
    pub fn lenient() -> Self {
        Self {
            min_length: 10,
            glyphs: DEFAULT_GLYPHS.to_vec(),
            exclude_trailing_colon: true,
            exclude_bold_prefix: false,
            fallback_to_long_lines: true,
        }
    }

    /// 20-character threshold, bold headers excluded, no fallback; used by
    /// the minimal scorer family
    pub fn strict() -> Self {
        Self {
            min_length: 20,
            glyphs: DEFAULT_GLYPHS.to_vec(),
            exclude_trailing_colon: true,
            exclude_bold_prefix: true,
            fallback_to_long_lines: false,
        }
    }

    pub fn with_min_length(mut self, min_length: usize) -> Self {
        self.min_length = min_length;
        self
    }

    pub fn with_glyphs(mut self, glyphs: Vec<char>) -> Self {
        self.glyphs = glyphs;
        self
    }

    pub fn with_fallback(mut self, enabled: bool) -> Self {
        self.fallback_to_long_lines = enabled;
        self
    }

    /// Ordered bullet candidates found in `text`
    pub fn segment(&self, text: &str) -> Vec<String> {
        let lines: Vec<&str> = text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect();

        let candidates: Vec<String> = lines
            .iter()
            .filter(|line| self.is_candidate(line))
            .map(|line| line.to_string())
            .collect();

        if candidates.is_empty() && self.fallback_to_long_lines {
            return lines
                .into_iter()
                .filter(|line| char_len(line) > self.min_length)
                .map(str::to_string)
                .collect();
        }

        candidates
    }

    fn is_candidate(&self, line: &str) -> bool {
        if self.starts_with_glyph(line) {
            return true;
        }

        char_len(line) > self.min_length
            && !(self.exclude_trailing_colon && line.ends_with(':'))
            && !(self.exclude_bold_prefix && line.starts_with("**"))
    }

    fn starts_with_glyph(&self, line: &str) -> bool {
        line.chars()
            .next()
            .is_some_and(|first| self.glyphs.contains(&first))
    }

    /// Remove one leading glyph and the whitespace after it. Used before
    /// counting characters.
    pub fn strip_leading_marker<'a>(&self, line: &'a str) -> &'a str {
        match line.chars().next() {
            Some(first) if self.glyphs.contains(&first) => {
                line[first.len_utf8()..].trim_start()
            }
            _ => line,
        }
    }

    /// Remove every glyph anywhere in the line, then trim. Display only:
    /// this also eats hyphens inside words.
    pub fn strip_all_markers(&self, line: &str) -> String {
        line.chars()
            .filter(|c| !self.glyphs.contains(c))
            .collect::<String>()
            .trim()
            .to_string()
    }
}

impl Default for Segmenter {
    fn default() -> Self {
        Self::lenient()
    }
}

/// Length in Unicode scalar values
pub fn char_len(text: &str) -> usize {
    text.chars().count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segment_marked_lines() {
        let text = "Investment thesis:\n\n• Unit one\n- Project two\n* Location three\n";
        let bullets = Segmenter::lenient().segment(text);
        assert_eq!(bullets, vec!["• Unit one", "- Project two", "* Location three"]);
    }

    #[test]
    fn test_segment_skips_headers_and_blank_lines() {
        let text = "  Here is the analysis for you:  \n\n   \nSpacious 2BR layout with open views\n";
        let bullets = Segmenter::lenient().segment(text);
        assert_eq!(bullets, vec!["Spacious 2BR layout with open views"]);
    }

    #[test]
    fn test_thresholds_classify_borderline_lines_differently() {
        // 15 chars: a candidate at threshold 10, not at 20
        let text = "Near MRT, 5 min";
        assert_eq!(Segmenter::lenient().segment(text).len(), 1);
        assert!(Segmenter::strict().segment(text).is_empty());
        assert!(Segmenter::lenient().with_fallback(false).segment(text).is_empty());
    }

    #[test]
    fn test_strict_excludes_bold_prefix() {
        let text = "**Unit Highlights** for the buyer\n- bullet";

        // '*' is itself a glyph, so with the default set a bold line is marked
        assert_eq!(Segmenter::strict().segment(text).len(), 2);

        let no_star = Segmenter::strict().with_glyphs(vec!['•', '-']);
        assert_eq!(no_star.segment(text), vec!["- bullet"]);

        let lenient_no_star = Segmenter::lenient().with_glyphs(vec!['•', '-']);
        assert_eq!(lenient_no_star.segment(text).len(), 2);
    }

    #[test]
    fn test_fallback_takes_long_lines() {
        // Every unmarked line ends with a colon, so the primary pass is empty
        let text = "Unit attributes worth noting:\nok:\nProject level amenities:";
        let lenient = Segmenter::lenient().segment(text);
        assert_eq!(
            lenient,
            vec!["Unit attributes worth noting:", "Project level amenities:"]
        );
        assert!(Segmenter::strict().segment(text).is_empty());
    }

    #[test]
    fn test_segment_empty_text() {
        assert!(Segmenter::lenient().segment("").is_empty());
        assert!(Segmenter::strict().segment("\n \n").is_empty());
    }

    #[test]
    fn test_strip_leading_marker_removes_one_glyph() {
        let seg = Segmenter::lenient();
        assert_eq!(seg.strip_leading_marker("•   Freehold"), "Freehold");
        assert_eq!(seg.strip_leading_marker("- - nested"), "- nested");
        assert_eq!(seg.strip_leading_marker("No marker - here"), "No marker - here");
    }

    #[test]
    fn test_strip_all_markers_removes_every_glyph() {
        let seg = Segmenter::lenient();
        assert_eq!(seg.strip_all_markers("• 99-year *lease*"), "99year lease");
        assert_ne!(
            seg.strip_all_markers("- 99-year lease"),
            seg.strip_leading_marker("- 99-year lease")
        );
    }

    #[test]
    fn test_char_len_counts_scalars() {
        assert_eq!(char_len("•"), 1);
        assert_eq!(char_len("café"), 4);
    }
}
