//! Text-level repairs that bring near-JSON closer to strict JSON.
//!
//! Each repair is a small scanner that rewrites only what it targets and
//! leaves everything else byte-for-byte intact.

/// Escape raw control characters inside double-quoted string literals.
///
/// Raw newlines, carriage returns and tabs become `\n`, `\r` and `\t`; other
/// characters below U+0020 become `\u00XX`. A control character directly
/// after a backslash is turned into the matching escape letter instead of
/// being doubled. Valid JSON is returned unchanged, and the function is
/// idempotent.
pub fn fix_json_string(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_string = false;
    let mut escape_next = false;

    for ch in text.chars() {
        if !in_string {
            if ch == '"' {
                in_string = true;
            }
            out.push(ch);
            continue;
        }

        if escape_next {
            escape_next = false;
            // The backslash is already in `out`.
            match escape_body(ch) {
                Some(body) => out.push_str(&body),
                None => out.push(ch),
            }
        } else if ch == '\\' {
            escape_next = true;
            out.push(ch);
        } else if ch == '"' {
            in_string = false;
            out.push(ch);
        } else if let Some(body) = escape_body(ch) {
            out.push('\\');
            out.push_str(&body);
        } else {
            out.push(ch);
        }
    }

    out
}

/// Escape sequence (without the backslash) for a raw control character.
fn escape_body(ch: char) -> Option<String> {
    let body = match ch {
        '\n' => "n".to_string(),
        '\r' => "r".to_string(),
        '\t' => "t".to_string(),
        '\u{0008}' => "b".to_string(),
        '\u{000C}' => "f".to_string(),
        c if (c as u32) < 0x20 => format!("u{:04x}", c as u32),
        _ => return None,
    };
    Some(body)
}

/// Remove commas that directly precede a closing `}` or `]`.
///
/// Commas inside single- or double-quoted strings are kept.
pub fn strip_trailing_commas(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut quote: Option<char> = None;
    let mut escape_next = false;

    for (i, ch) in text.char_indices() {
        if let Some(q) = quote {
            if escape_next {
                escape_next = false;
            } else if ch == '\\' {
                escape_next = true;
            } else if ch == q {
                quote = None;
            }
            out.push(ch);
            continue;
        }

        match ch {
            '"' | '\'' => quote = Some(ch),
            ',' => {
                let rest = text[i + 1..].trim_start();
                if rest.starts_with(['}', ']']) {
                    continue;
                }
            }
            _ => {}
        }
        out.push(ch);
    }

    out
}

/// Rewrite single-quoted strings as double-quoted ones.
///
/// Double quotes inside a single-quoted string are escaped and `\'` is
/// unescaped. Double-quoted strings, including apostrophes inside them, are
/// left alone.
pub fn normalize_quotes(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut quote: Option<char> = None;
    let mut escape_next = false;

    for ch in text.chars() {
        let Some(q) = quote else {
            match ch {
                '\'' => {
                    quote = Some('\'');
                    out.push('"');
                }
                '"' => {
                    quote = Some('"');
                    out.push('"');
                }
                _ => out.push(ch),
            }
            continue;
        };

        if escape_next {
            escape_next = false;
            if q == '\'' && ch == '\'' {
                out.pop();
            }
            out.push(ch);
        } else if ch == '\\' {
            escape_next = true;
            out.push(ch);
        } else if ch == q {
            quote = None;
            out.push('"');
        } else if q == '\'' && ch == '"' {
            out.push_str("\\\"");
        } else {
            out.push(ch);
        }
    }

    out
}
