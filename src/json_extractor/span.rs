//! Locating a JSON-like value inside surrounding prose.
//!
//! All scanners track "inside a string literal" separately from nesting
//! depth, so braces and brackets inside quoted text do not affect the count.

use regex::Regex;
use std::sync::LazyLock;

static CODE_FENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)```[\w+.\-]*[ \t]*\r?\n?(.*?)(?:```|\z)").expect("valid code fence regex")
});

/// Depth and string state for a bracket scan
#[derive(Debug, Default)]
struct DepthScanner {
    depth: usize,
    quote: Option<char>,
    escape_next: bool,
}

impl DepthScanner {
    /// Process one character; returns true when the outermost structure closes.
    fn process_char(&mut self, ch: char, open: char, close: char) -> bool {
        if let Some(quote) = self.quote {
            if self.escape_next {
                self.escape_next = false;
            } else if ch == '\\' {
                self.escape_next = true;
            } else if ch == quote {
                self.quote = None;
            }
            return false;
        }

        match ch {
            '"' | '\'' => self.quote = Some(ch),
            c if c == open => self.depth += 1,
            c if c == close && self.depth > 0 => {
                self.depth -= 1;
                return self.depth == 0;
            }
            _ => {}
        }
        false
    }
}

/// Span from `start` (which must hold `open`) to its matching `close`, or to
/// end-of-input when the structure never closes.
fn balanced_span(text: &str, start: usize, open: char, close: char) -> &str {
    let mut scanner = DepthScanner::default();
    for (i, ch) in text[start..].char_indices() {
        if scanner.process_char(ch, open, close) {
            return &text[start..start + i + ch.len_utf8()];
        }
    }
    &text[start..]
}

/// Extract the first `{ ... }` object span.
///
/// Returns the text from the first `{` to its matching `}`, the text from the
/// first `{` to end-of-input if it never closes, or `""` if there is no `{`.
pub fn extract_json_object_string(text: &str) -> &str {
    match text.find('{') {
        Some(start) => balanced_span(text, start, '{', '}'),
        None => "",
    }
}

/// Extract the first `[ ... ]` array span, with the same rules as
/// [`extract_json_object_string`].
pub fn extract_json_array_string(text: &str) -> &str {
    match text.find('[') {
        Some(start) => balanced_span(text, start, '[', ']'),
        None => "",
    }
}

/// Extract the first JSON value of any type.
///
/// Scans left to right for an object, array, double-quoted string, `true`,
/// `false`, `null` or number, and returns its exact source span. Literals
/// must stand alone as words; numbers must not continue a word. Returns `""`
/// when nothing is found.
pub fn extract_json_string(text: &str) -> &str {
    let mut prev: Option<char> = None;
    for (i, ch) in text.char_indices() {
        let span = match ch {
            '{' => Some(balanced_span(text, i, '{', '}')),
            '[' => Some(balanced_span(text, i, '[', ']')),
            '"' => quoted_span(text, i),
            't' | 'f' | 'n' if !is_word_char(prev) => literal_span(text, i),
            '-' | '0'..='9' if !is_word_char(prev) && prev != Some('.') => number_span(text, i),
            _ => None,
        };
        if let Some(span) = span {
            return span;
        }
        prev = Some(ch);
    }
    ""
}

fn is_word_char(ch: Option<char>) -> bool {
    ch.is_some_and(|c| c.is_alphanumeric() || c == '_')
}

fn quoted_span(text: &str, start: usize) -> Option<&str> {
    let mut escape_next = false;
    for (i, ch) in text[start + 1..].char_indices() {
        if escape_next {
            escape_next = false;
        } else if ch == '\\' {
            escape_next = true;
        } else if ch == '"' {
            return Some(&text[start..start + 1 + i + 1]);
        }
    }
    None
}

fn literal_span(text: &str, start: usize) -> Option<&str> {
    let rest = &text[start..];
    ["true", "false", "null"].into_iter().find_map(|literal| {
        let after = rest.strip_prefix(literal)?;
        (!is_word_char(after.chars().next())).then(|| &rest[..literal.len()])
    })
}

fn number_span(text: &str, start: usize) -> Option<&str> {
    let bytes = text.as_bytes();
    let digits_from = |mut i: usize| {
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        i
    };

    let mut end = start;
    if bytes[end] == b'-' {
        end += 1;
    }
    let int_end = digits_from(end);
    if int_end == end {
        return None;
    }
    end = int_end;

    if end < bytes.len() && bytes[end] == b'.' {
        let frac_end = digits_from(end + 1);
        if frac_end > end + 1 {
            end = frac_end;
        }
    }

    if end < bytes.len() && matches!(bytes[end], b'e' | b'E') {
        let mut exp = end + 1;
        if exp < bytes.len() && matches!(bytes[exp], b'+' | b'-') {
            exp += 1;
        }
        let exp_end = digits_from(exp);
        if exp_end > exp {
            end = exp_end;
        }
    }

    Some(&text[start..end])
}

/// Content of the first markdown code fence, if any.
///
/// The optional language tag after the opening fence is dropped. A fence
/// that never closes runs to end-of-input.
pub fn strip_code_fence(text: &str) -> Option<&str> {
    CODE_FENCE
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Content of the first code fence when it can wrap the value.
///
/// A fence that opens after a `{` or `[` sits inside the value (usually in a
/// string field) and is ignored.
pub fn strip_wrapping_code_fence(text: &str) -> Option<&str> {
    let caps = CODE_FENCE.captures(text)?;
    let opener = caps.get(0)?.start();
    if text[..opener].contains(['{', '[']) {
        return None;
    }
    caps.get(1).map(|m| m.as_str())
}
