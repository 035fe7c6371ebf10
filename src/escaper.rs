//! Identifier and string-literal escaping.
//!
//! These are the only places a byte from a decoded request is written into the
//! generated SQL text without going through a typed rendering path. Get this wrong
//! and a crafted column name or string value breaks out of its quoting.

const RESERVED_WORDS: &[&str] = &[
    "select", "insert", "update", "delete", "from", "where", "join", "left", "right",
    "inner", "outer", "on", "and", "or", "not", "null", "true", "false", "limit",
    "offset", "as", "in", "is", "like", "between", "having", "union", "all", "distinct",
    "case", "when", "then", "else", "end", "create", "alter", "drop", "index", "key",
    "primary", "foreign", "references", "default", "constraint", "check", "group",
    "order", "table", "database", "schema", "values", "into", "set", "by",
];

/// Quote `s` as a backtick-delimited identifier, doubling any embedded backtick.
pub fn quote_identifier(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('`');
    for c in s.chars() {
        if c == '`' {
            out.push('`');
        }
        out.push(c);
    }
    out.push('`');
    out
}

/// Quote `s` as an identifier only if it isn't already a safe bare word.
///
/// A bare word matches `[A-Za-z_][A-Za-z0-9_]*` and is not a reserved word.
pub fn quote_identifier_if_needed(s: &str) -> String {
    let is_bare = !s.is_empty()
        && s.chars().next().is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && s.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
        && !RESERVED_WORDS.contains(&s.to_ascii_lowercase().as_str());

    if is_bare {
        s.to_string()
    } else {
        quote_identifier(s)
    }
}

/// Quote `s` as a single-quoted SQL string literal, escaping backslashes, single
/// quotes, and NUL bytes.
pub fn quote_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('\'');
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '\0' => out.push_str("\\0"),
            _ => out.push(c),
        }
    }
    out.push('\'');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_identifier() {
        assert_eq!(quote_identifier("col"), "`col`");
        assert_eq!(quote_identifier("a`b"), "`a``b`");
    }

    #[test]
    fn test_quote_identifier_if_needed_bare() {
        assert_eq!(quote_identifier_if_needed("users"), "users");
        assert_eq!(quote_identifier_if_needed("_id"), "_id");
    }

    #[test]
    fn test_quote_identifier_if_needed_reserved() {
        assert_eq!(quote_identifier_if_needed("order"), "`order`");
        assert_eq!(quote_identifier_if_needed("group"), "`group`");
    }

    #[test]
    fn test_quote_identifier_if_needed_special_chars() {
        assert_eq!(quote_identifier_if_needed("my col"), "`my col`");
        assert_eq!(quote_identifier_if_needed("1col"), "`1col`");
    }

    #[test]
    fn test_quote_string_escapes() {
        assert_eq!(quote_string("hi"), "'hi'");
        assert_eq!(quote_string("a'b"), "'a\\'b'");
        assert_eq!(quote_string("a\\b"), "'a\\\\b'");
        assert_eq!(quote_string("a\0b"), "'a\\0b'");
    }

    #[test]
    fn test_quote_string_cannot_escape_quote() {
        let evil = "x', (SELECT 1)); --";
        let quoted = quote_string(evil);
        assert_eq!(quoted, "'x\\', (SELECT 1)); --'");
    }
}
