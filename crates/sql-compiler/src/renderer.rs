//! The rendering context the compiler writes a `WHERE` clause into, and
//! literal escaping.

use crate::dialect::Dialect;

/// A trait for any fragment that can be rendered into SQL text.
pub trait Render {
    fn render(&self, renderer: &mut Renderer);
}

/// Accumulates the SQL text of one compilation, and gives access to the
/// dialect for function names.
pub struct Renderer<'a> {
    pub sql: String,
    pub dialect: &'a dyn Dialect,
}

impl<'a> Renderer<'a> {
    pub fn new(dialect: &'a dyn Dialect) -> Self {
        Self {
            sql: String::new(),
            dialect,
        }
    }

    /// Consumes the renderer and returns the SQL text.
    pub fn finish(self) -> String {
        self.sql
    }

    /// A fresh renderer for a sub-expression that is assembled before being
    /// written out.
    pub fn fork(&self) -> Renderer<'a> {
        Renderer::new(self.dialect)
    }

    /// `fn(column,'value',match_case)` with the dialect's membership function.
    pub fn push_array_contains(&mut self, column: &str, value: &str, match_case: bool) {
        let function = self.dialect.array_contains_fn();
        self.sql
            .push_str(&format!("{function}({column},{},{match_case})", quote(value)));
    }

    pub fn push_array_like(&mut self, column: &str, pattern: &str, match_case: bool) {
        let function = self.dialect.array_like_fn();
        self.sql
            .push_str(&format!("{function}({column},{},{match_case})", quote(pattern)));
    }

    /// Writes `parts` joined by `separator`.
    pub fn push_joined<I, S>(&mut self, parts: I, separator: &str)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for (i, part) in parts.into_iter().enumerate() {
            if i > 0 {
                self.sql.push_str(separator);
            }
            self.sql.push_str(part.as_ref());
        }
    }
}

/// Names the engine reserves; a column called so carries a trailing `_`.
const RESERVED_WORDS: &[&str] = &["date", "order", "format", "group"];

/// Column name as the table declares it, suffixing reserved words.
pub fn column_name(name: &str) -> String {
    if RESERVED_WORDS.contains(&name) {
        return format!("{name}_");
    }
    name.to_string()
}

/// Single-quoted string literal. Backslashes are doubled and embedded quotes
/// backslash-escaped, so the value cannot end the literal early.
pub fn quote(value: &str) -> String {
    format!("'{}'", value.replace('\\', "\\\\").replace('\'', "\\'"))
}

/// Literal for a pattern built by [`like_pattern`]. Its `\%` and `\_`
/// escapes are kept as written; any other backslash is doubled.
pub fn quote_pattern(pattern: &str) -> String {
    let mut out = String::with_capacity(pattern.len() + 2);
    out.push('\'');
    let mut chars = pattern.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' if matches!(chars.peek(), Some('%' | '_')) => out.push(c),
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            _ => out.push(c),
        }
    }
    out.push('\'');
    out
}

pub fn lower(expr: &str) -> String {
    format!("lower({expr})")
}

/// Translates a `*`/`?` wildcard pattern into a LIKE pattern. Literal
/// backslashes, `%` and `_` are escaped first.
pub fn like_pattern(wildcard: &str) -> String {
    wildcard
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
        .replace('*', "%")
        .replace('?', "_")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::{Hive, Spark};

    #[test]
    fn test_quote_escapes_apostrophes() {
        assert_eq!(quote("my 'pleasure'"), r"'my \'pleasure\''");
        assert_eq!(quote("plain"), "'plain'");
    }

    #[test]
    fn test_quote_escapes_backslashes() {
        assert_eq!(quote(r"a\' OR 1=1 OR 'x"), r"'a\\\' OR 1=1 OR \'x'");
        assert_eq!(quote(r"C:\temp"), r"'C:\\temp'");
    }

    #[test]
    fn test_like_pattern() {
        assert_eq!(like_pattern("v?l*ue_%"), r"v_l%ue\_\%");
        assert_eq!(like_pattern("value_*"), r"value\_%");
        assert_eq!(like_pattern(r"a\b"), r"a\\b");
    }

    #[test]
    fn test_quote_pattern() {
        assert_eq!(quote_pattern(&like_pattern("v?l*ue_%")), r"'v_l%ue\_\%'");
        assert_eq!(quote_pattern(&like_pattern(r"a\b")), r"'a\\\\b'");
        assert_eq!(quote_pattern(&like_pattern(r"\' OR 1=1")), r"'\\\\\' OR 1=1'");
    }

    #[test]
    fn test_reserved_column_names() {
        assert_eq!(column_name("group"), "group_");
        assert_eq!(column_name("order"), "order_");
        assert_eq!(column_name("groups"), "groups");
    }

    #[test]
    fn test_array_functions_follow_dialect() {
        let mut r = Renderer::new(&Hive);
        r.push_array_contains("issue", "ZERO_COORDINATE", true);
        assert_eq!(r.finish(), "stringArrayContains(issue,'ZERO_COORDINATE',true)");

        let mut r = Renderer::new(&Spark);
        r.push_array_contains("recordedby", "O'Shea", false);
        assert_eq!(r.finish(), r"array_contains(recordedby,'O\'Shea',false)");
    }

    #[test]
    fn test_push_joined() {
        let mut r = Renderer::new(&Hive);
        r.push_joined(["a", "b", "c"], " OR ");
        assert_eq!(r.finish(), "a OR b OR c");
    }
}
