//! Delimiter-aware scanning primitives shared by the tokenizer, the redirection scanner and the
//! pipeline splitter.

/// Quote state of a scan position.
///
/// A `"` opens a double-quoted run only outside of single quotes and vice versa, so `"it's"`
/// is one balanced run. Quotes are tracked, never stripped.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum QuoteState {
    #[default]
    Unquoted,
    Single,
    Double,
}

impl QuoteState {
    /// State after consuming `ch`.
    pub fn advance(self, ch: char) -> Self {
        match (self, ch) {
            (QuoteState::Unquoted, '"') => QuoteState::Double,
            (QuoteState::Unquoted, '\'') => QuoteState::Single,
            (QuoteState::Double, '"') | (QuoteState::Single, '\'') => QuoteState::Unquoted,
            (state, _) => state,
        }
    }

    /// State after consuming all of `s`, starting unquoted.
    pub fn after(s: &str) -> Self {
        s.chars().fold(QuoteState::Unquoted, QuoteState::advance)
    }

    pub fn is_quoted(self) -> bool {
        self != QuoteState::Unquoted
    }
}

/// Returns the byte index of the next `c` at or after byte offset `from`.
///
/// This is a plain search: quoting is the caller's business.
pub fn find_next(s: &str, c: char, from: usize) -> Option<usize> {
    s.get(from..)?.find(c).map(|i| i + from)
}

/// Removes leading and trailing runs of `c` and collapses internal runs to a single `c`.
pub fn strip(s: &str, c: char) -> String {
    let mut out = String::with_capacity(s.len());
    let mut previous_was_c = false;
    for ch in s.trim_matches(c).chars() {
        if ch == c && previous_was_c {
            continue;
        }
        previous_was_c = ch == c;
        out.push(ch);
    }
    out
}

/// Removes the `n` bytes starting at byte offset `from`, clamped to the end of `s`.
///
/// Both ends of the window must fall on char boundaries.
pub fn shift(s: &str, from: usize, n: usize) -> String {
    let from = from.min(s.len());
    let to = from.saturating_add(n).min(s.len());
    let mut out = String::with_capacity(s.len() - (to - from));
    out.push_str(&s[..from]);
    out.push_str(&s[to..]);
    out
}

/// Splits `s` at every char matching `is_delimiter` that sits outside quotes.
///
/// Empty pieces are kept; an unterminated quote runs to the end of `s`.
pub fn split_unquoted<P>(s: &str, is_delimiter: P) -> Vec<&str>
where
    P: Fn(char) -> bool,
{
    let mut pieces = Vec::new();
    let mut quote = QuoteState::default();
    let mut start = 0;
    for (i, ch) in s.char_indices() {
        if !quote.is_quoted() && is_delimiter(ch) {
            pieces.push(&s[start..i]);
            start = i + ch.len_utf8();
        } else {
            quote = quote.advance(ch);
        }
    }
    pieces.push(&s[start..]);
    pieces
}

/// Counts the `delimiter`-separated blocks of `s`.
///
/// Runs of delimiters count as one boundary and delimiters inside quotes do not split.
pub fn count_segments(s: &str, delimiter: char) -> usize {
    split_unquoted(s, |c| c == delimiter)
        .into_iter()
        .filter(|piece| !piece.is_empty())
        .count()
}
