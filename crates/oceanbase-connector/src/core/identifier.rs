//! Identifier validation, quoting and string literals for generated SQL.
//!
//! Identifiers cannot be bound as parameters, so every name that ends up in
//! DDL goes through [`validate_identifier`] and is quoted with the mode's quote
//! character, doubling any embedded quote.

use crate::error::{ConnectorError, Result};

/// Maximum identifier length accepted before quoting.
const MAX_IDENTIFIER_LENGTH: usize = 128;

/// Validate an identifier.
///
/// Rejects empty names, names containing a NUL byte and names longer than
/// 128 bytes.
pub fn validate_identifier(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(ConnectorError::InvalidValue(
            "Identifier cannot be empty".to_string(),
        ));
    }

    if name.contains('\0') {
        return Err(ConnectorError::InvalidValue(format!(
            "Identifier contains null byte: {:?}",
            name
        )));
    }

    if name.len() > MAX_IDENTIFIER_LENGTH {
        return Err(ConnectorError::InvalidValue(format!(
            "Identifier exceeds maximum length of {} bytes (got {} bytes): {:?}",
            MAX_IDENTIFIER_LENGTH,
            name.len(),
            name
        )));
    }

    Ok(())
}

/// Quote a MySQL-mode identifier with backticks.
///
/// ```ignore
/// assert_eq!(quote_mysql("users")?, "`users`");
/// assert_eq!(quote_mysql("table`name")?, "`table``name`");
/// ```
pub fn quote_mysql(name: &str) -> Result<String> {
    validate_identifier(name)?;
    Ok(format!("`{}`", name.replace('`', "``")))
}

/// Quote an Oracle-mode identifier with double quotes.
///
/// ```ignore
/// assert_eq!(quote_oracle("USERS")?, "\"USERS\"");
/// ```
pub fn quote_oracle(name: &str) -> Result<String> {
    validate_identifier(name)?;
    Ok(format!("\"{}\"", name.replace('"', "\"\"")))
}

/// SQL string literal with single quotes doubled.
pub fn varchar_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

/// MySQL-mode string literal. Backslash is an escape character there too.
pub fn mysql_varchar_literal(value: &str) -> String {
    format!("'{}'", value.replace('\\', "\\\\").replace('\'', "''"))
}

/// Escape `_` and `%` for a metadata LIKE pattern.
pub fn escape_name_pattern(name: &str, escape: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for ch in name.chars() {
        let is_escape = escape.starts_with(ch) && escape.len() == ch.len_utf8();
        if ch == '_' || ch == '%' || is_escape {
            out.push_str(escape);
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_mysql_normal() {
        assert_eq!(quote_mysql("users").unwrap(), "`users`");
    }

    #[test]
    fn test_quote_mysql_escapes_backtick() {
        assert_eq!(quote_mysql("table`name").unwrap(), "`table``name`");
    }

    #[test]
    fn test_quote_mysql_sql_injection_safely_quoted() {
        let quoted = quote_mysql("x`; DROP TABLE users; --").unwrap();
        assert_eq!(quoted, "`x``; DROP TABLE users; --`");
    }

    #[test]
    fn test_quote_oracle_escapes_double_quote() {
        assert_eq!(quote_oracle("A\"B").unwrap(), "\"A\"\"B\"");
    }

    #[test]
    fn test_quote_rejects_null_byte() {
        assert!(quote_mysql("bad\0name").is_err());
        assert!(quote_oracle("bad\0name").is_err());
    }

    #[test]
    fn test_validate_rejects_empty_and_long() {
        assert!(validate_identifier("").is_err());
        assert!(validate_identifier(&"x".repeat(129)).is_err());
        assert!(validate_identifier(&"x".repeat(128)).is_ok());
    }

    #[test]
    fn test_varchar_literals() {
        assert_eq!(varchar_literal("it's"), "'it''s'");
        assert_eq!(mysql_varchar_literal(r"a\b'c"), r"'a\\b''c'");
    }

    #[test]
    fn test_escape_name_pattern() {
        assert_eq!(escape_name_pattern("my_table%", "\\"), r"my\_table\%");
        assert_eq!(escape_name_pattern(r"a\b", "\\"), r"a\\b");
        assert_eq!(escape_name_pattern("plain", "\\"), "plain");
    }
}
