//! Literal matching shared by extraction and substitution
//!
//! Both sides use the same rule (literal, case-sensitive, left-to-right,
//! non-overlapping, never crossing a line break) so the set of redacted spans
//! always equals the set of indexed spans.

/// A match located on a single line. Line and columns are 1-based, columns
/// count characters and `column_end` is exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineMatch {
    pub line: usize,
    pub column_start: usize,
    pub column_end: usize,
}

fn is_matchable(needle: &str) -> bool {
    !needle.is_empty() && !needle.contains('\n')
}

/// Find every non-overlapping occurrence of `needle`, scanning line by line
pub fn find_in_lines(text: &str, needle: &str) -> Vec<LineMatch> {
    if !is_matchable(needle) {
        return Vec::new();
    }

    let needle_chars = needle.chars().count();
    let mut matches = Vec::new();

    for (index, line) in text.split('\n').enumerate() {
        // match_indices resumes after the end of each hit
        for (byte_offset, _) in line.match_indices(needle) {
            let column_start = line[..byte_offset].chars().count() + 1;
            matches.push(LineMatch {
                line: index + 1,
                column_start,
                column_end: column_start + needle_chars,
            });
        }
    }

    matches
}

/// Replace every occurrence of `from` with `to`, returning the new text and
/// the number of substitutions made
pub fn replace_all(text: &str, from: &str, to: &str) -> (String, usize) {
    if !is_matchable(from) {
        return (text.to_string(), 0);
    }

    let count = text.matches(from).count();
    if count == 0 {
        return (text.to_string(), 0);
    }

    (text.replace(from, to), count)
}
