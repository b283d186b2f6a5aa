//! Length-bounded reply text.
//!
//! Replies are cut at the last sentence end that fits, else at the last word
//! boundary, else hard at the limit. All lengths count `char`s.

/// Default reply limit in characters.
pub const DEFAULT_LIMIT: usize = 250;

const SENTENCE_MARKS: [char; 4] = ['.', '!', '?', '…'];
const WORD_TRAILERS: [char; 5] = [' ', ',', ';', ':', '-'];

/// Unicode whitespace plus the four information separators (U+001C..=U+001F),
/// which chat clients also treat as blank.
fn is_space(ch: char) -> bool {
    ch.is_whitespace() || ('\u{1c}'..='\u{1f}').contains(&ch)
}

/// Bound `text` to at most `limit` characters without cutting mid-sentence
/// or mid-word when a boundary is available.
///
/// Text whose trimmed length already fits is returned trimmed and otherwise
/// untouched. Only the last sentence mark inside the window is considered; if
/// it is not followed by whitespace the word-boundary fallback applies.
#[must_use]
pub fn truncate_smart(text: &str, limit: usize) -> String {
    let trimmed = text.trim_matches(is_space);
    let chars: Vec<char> = trimmed.chars().collect();
    if chars.len() <= limit {
        return trimmed.to_owned();
    }

    let window = &chars[..limit];

    if let Some(eos) = window.iter().rposition(|ch| SENTENCE_MARKS.contains(ch)) {
        let at_end = eos + 1 == chars.len();
        if at_end || chars.get(eos + 1).is_some_and(|&ch| is_space(ch)) {
            return chars[..=eos].iter().collect();
        }
    }

    if let Some(space) = window.iter().rposition(|&ch| ch == ' ') {
        let head: String = chars[..space].iter().collect();
        return head.trim_end_matches(WORD_TRAILERS).to_owned();
    }

    window.iter().collect()
}
