//! Greedy word wrap.
//!
//! Words are added to the current line until the next one would push the
//! measured width past `max_width`. A word wider than `max_width` on its own
//! is placed alone on a line; there is no hyphenation or truncation.

/// Wraps `text` into lines no wider than `max_width` according to `measure`.
///
/// Whitespace is normalised: runs collapse to single spaces and leading or
/// trailing whitespace is dropped. Empty input yields no lines.
pub fn wrap_text<F>(text: &str, measure: F, max_width: f32) -> Vec<String>
where
    F: Fn(&str) -> f32,
{
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        if current.is_empty() {
            current.push_str(word);
            continue;
        }

        let candidate = format!("{current} {word}");
        if measure(&candidate) > max_width {
            lines.push(std::mem::replace(&mut current, word.to_string()));
        } else {
            current = candidate;
        }
    }

    if !current.is_empty() {
        lines.push(current);
    }
    lines
}
