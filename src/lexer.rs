//! Splitting of a single pipeline segment into an argument vector.

use crate::text::{count_segments, split_unquoted};

pub(crate) fn is_blank(ch: char) -> bool {
    matches!(ch, ' ' | '\t')
}

fn is_quote_or_blank(ch: char) -> bool {
    matches!(ch, '"' | '\'') || is_blank(ch)
}

/// Splits a command segment on runs of blanks that sit outside quotes.
///
/// Quote characters are kept verbatim in the arguments. An unmatched quote extends to the end
/// of the segment, so everything after it becomes one argument. A segment made only of quotes
/// and blanks yields an empty vector, which callers must treat as "no command".
///
/// # Examples
/// `ls  -l "my dir"` → `["ls", "-l", "\"my dir\""]`
pub fn split_into_args(segment: &str) -> Vec<String> {
    if segment.chars().all(is_quote_or_blank) {
        return Vec::new();
    }
    let mut args = Vec::with_capacity(count_segments(segment, ' '));
    args.extend(
        split_unquoted(segment, is_blank)
            .into_iter()
            .filter(|token| !token.is_empty())
            .map(str::to_owned),
    );
    args
}
