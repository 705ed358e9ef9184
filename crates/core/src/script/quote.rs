//! Identifier quoting for generated SQL

/// Quote an identifier with double quotes, doubling embedded quotes
pub fn quote_ident(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

/// Quote a possibly schema-qualified name (`schema.table`)
pub fn quote_qualified(schema: Option<&str>, name: &str) -> String {
    match schema {
        Some(schema) if !schema.is_empty() => {
            format!("{}.{}", quote_ident(schema), quote_ident(name))
        }
        _ => quote_ident(name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_ident() {
        assert_eq!(quote_ident("demo"), "\"demo\"");
        assert_eq!(quote_ident("we\"ird"), "\"we\"\"ird\"");
    }

    #[test]
    fn test_quote_qualified() {
        assert_eq!(quote_qualified(Some("faers"), "drug"), "\"faers\".\"drug\"");
        assert_eq!(quote_qualified(Some(""), "drug"), "\"drug\"");
        assert_eq!(quote_qualified(None, "drug"), "\"drug\"");
    }
}
