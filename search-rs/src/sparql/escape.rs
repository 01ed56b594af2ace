//! Escaping of free-text filter values before query interpolation
//!
//! Every user-supplied string embedded in a query passes through one of
//! these functions. A value can land in two positions: inside a quoted
//! string literal, or inside a `regex()` pattern (which is itself a quoted
//! literal). The regex position needs both layers.

/// Escape a value for use inside a double-quoted SPARQL string literal.
pub fn escape_literal(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            _ => out.push(c),
        }
    }
    out
}

/// Escape a value for use as a `regex()` pattern so it matches the raw
/// text as a substring. Metacharacters are neutralized first, then the
/// result is literal-escaped for the surrounding quotes.
pub fn escape_regex(value: &str) -> String {
    let mut pattern = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(
            c,
            '.' | '^' | '$' | '*' | '+' | '?' | '(' | ')' | '[' | ']' | '{' | '}' | '|' | '\\'
        ) {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    escape_literal(&pattern)
}
