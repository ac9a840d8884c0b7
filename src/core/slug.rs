//! Slug normalization for company codes
//!
//! Company codes are derived from the company name once, at creation time.
//! Two names that normalize to the same slug collide; the store's unique key
//! decides which one wins (the first).

use crate::core::error::{BizResult, ValidationError};
use regex::Regex;
use std::sync::LazyLock;

static NON_SLUG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^a-z0-9]+").unwrap());

/// Convert a human-readable name into a URL-safe slug
///
/// Lowercases the input, collapses every run of characters outside
/// `[a-z0-9]` into one hyphen and trims hyphens from both ends. The result is
/// empty when the name has no ASCII letters or digits.
///
/// # Examples
///
/// ```
/// use biztime::core::slug::slugify;
///
/// assert_eq!(slugify("Microsoft"), "microsoft");
/// assert_eq!(slugify("  Acme, Inc. "), "acme-inc");
/// assert_eq!(slugify("AT&T"), "at-t");
/// ```
pub fn slugify(name: &str) -> String {
    let lowered = name.to_lowercase();
    NON_SLUG
        .replace_all(&lowered, "-")
        .trim_matches('-')
        .to_string()
}

/// Derive the primary key for a new company, rejecting names with no slug
pub fn company_code(name: &str) -> BizResult<String> {
    let code = slugify(name);
    if code.is_empty() {
        return Err(ValidationError::InvalidField {
            field: "name".to_string(),
            message: "must contain at least one letter or digit".to_string(),
        }
        .into());
    }
    Ok(code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lowercases() {
        assert_eq!(slugify("IBM"), "ibm");
        assert_eq!(slugify("Company2"), "company2");
    }

    #[test]
    fn test_collapses_whitespace_and_punctuation() {
        assert_eq!(slugify("Big   Blue"), "big-blue");
        assert_eq!(slugify("Foo -- Bar!!"), "foo-bar");
        assert_eq!(slugify("a.b_c/d"), "a-b-c-d");
    }

    #[test]
    fn test_trims_edges() {
        assert_eq!(slugify("  --Apple--  "), "apple");
        assert_eq!(slugify("(Apple)"), "apple");
    }

    #[test]
    fn test_non_ascii_letters_become_separators() {
        assert_eq!(slugify("Café Olé"), "caf-ol");
    }

    #[test]
    fn test_empty_when_nothing_survives() {
        assert_eq!(slugify(""), "");
        assert_eq!(slugify("!!! ???"), "");
    }

    #[test]
    fn test_company_code_requires_a_slug() {
        assert_eq!(company_code("Apple Computer").unwrap(), "apple-computer");
        let err = company_code("!!!").unwrap_err();
        assert!(matches!(
            err,
            crate::core::error::BizError::Validation(ValidationError::InvalidField { ref field, .. })
                if field == "name"
        ));
    }

    #[test]
    fn test_distinct_names_can_collide() {
        assert_eq!(slugify("Acme Inc"), slugify("ACME, inc."));
    }

    #[test]
    fn test_idempotent() {
        let once = slugify("Hello, World");
        assert_eq!(slugify(&once), once);
    }
}
