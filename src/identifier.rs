use crate::error::{Error, Result};

/// Longest accepted table, column or index name, in characters.
pub const MAX_IDENTIFIER_LEN: usize = 64;

/// Keywords that cannot be used as names. Compared case-insensitively.
pub const RESERVED_WORDS: &[&str] = &[
    "SELECT", "FROM", "WHERE", "INSERT", "UPDATE", "DELETE", "CREATE", "DROP", "TABLE", "INDEX",
    "INTO", "VALUES", "SET", "AND", "OR", "NOT", "NULL", "PRIMARY", "KEY", "UNIQUE", "INNER",
    "JOIN", "ON", "AS", "INTEGER", "INT", "VARCHAR", "TEXT", "BOOLEAN", "FLOAT", "REAL", "TRUE",
    "FALSE",
];

/// Validates a table, column or index name.
///
/// The rules are checked in order and the first failure is reported:
/// 1. not empty
/// 2. at most [MAX_IDENTIFIER_LEN] characters
/// 3. not a reserved word
/// 4. starts with an ASCII letter or `_`, continues with ASCII alphanumerics or `_`
pub fn validate_identifier(name: &str) -> Result<()> {
    let fail = |reason: &'static str| -> Result<()> {
        Err(Error::InvalidIdentifier {
            identifier: name.to_string(),
            reason,
        })
    };

    if name.is_empty() {
        return fail("identifier cannot be empty");
    }
    if name.chars().count() > MAX_IDENTIFIER_LEN {
        return fail("identifier too long (max 64 characters)");
    }
    if RESERVED_WORDS
        .iter()
        .any(|word| word.eq_ignore_ascii_case(name))
    {
        return fail("cannot use SQL reserved word");
    }

    let mut chars = name.chars();
    let starts_well = chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_');
    if !starts_well || !chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return fail(
            "must start with a letter or underscore and contain only letters, digits and underscores",
        );
    }

    Ok(())
}
