use crate::text::{QuoteState, split_unquoted};

/// A redirection-free command line cut into its stages.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Pipeline {
    /// Non-empty, trimmed command segments in execution order.
    pub segments: Vec<String>,
    /// Set by a trailing `&`: the shell does not wait for the stages.
    pub background: bool,
}

/// Strips a trailing unquoted `&` and the blanks before it.
fn strip_background(segment: &str) -> Option<&str> {
    let rest = segment.strip_suffix('&')?;
    if QuoteState::after(rest).is_quoted() {
        return None;
    }
    Some(rest.trim_end())
}

/// Splits `line` on unquoted `|` into command segments.
///
/// Leading and trailing pipes are ignored and segments that end up empty (`a | | b`) are
/// dropped. A trailing `&` on the last segment marks the pipeline as background. The result
/// may be empty, for example for a line that is only `&`.
pub fn split_pipeline(line: &str) -> Pipeline {
    let line = line.trim_matches(|c: char| c == '|' || c.is_whitespace());
    let mut segments: Vec<String> = split_unquoted(line, |c| c == '|')
        .into_iter()
        .map(|segment| segment.trim().to_owned())
        .collect();

    let mut background = false;
    if let Some(last) = segments.last_mut() {
        if let Some(rest) = strip_background(last).map(str::to_owned) {
            *last = rest;
            background = true;
        }
    }

    segments.retain(|segment| !segment.is_empty());
    Pipeline {
        segments,
        background,
    }
}
