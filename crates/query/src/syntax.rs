//! Quoting for the store's query language
//!
//! Identifiers (attribute and domain names) are wrapped in backticks and
//! literals in single quotes. An embedded delimiter is escaped by doubling
//! it.

/// Quote an attribute or domain name
///
/// ```
/// use domainmap_query::syntax::quote_identifier;
///
/// assert_eq!(quote_identifier("age"), "`age`");
/// assert_eq!(quote_identifier("we`ird"), "`we``ird`");
/// ```
pub fn quote_identifier(name: &str) -> String {
    format!("`{}`", name.replace('`', "``"))
}

/// Quote an encoded value
///
/// ```
/// use domainmap_query::syntax::quote_literal;
///
/// assert_eq!(quote_literal("005"), "'005'");
/// assert_eq!(quote_literal("it's"), "'it''s'");
/// ```
pub fn quote_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}
