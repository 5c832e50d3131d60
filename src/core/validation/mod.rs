//! Validation shared by DTO descriptors and relation configuration

use regex::Regex;
use std::sync::LazyLock;

/// GraphQL name rule: `/[_A-Za-z][_0-9A-Za-z]*/`
pub static IDENTIFIER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("identifier pattern is valid")
});

/// Check a name against the GraphQL name rule
pub fn is_identifier(name: &str) -> bool {
    IDENTIFIER.is_match(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identifier() {
        assert!(is_identifier("relation"));
        assert!(is_identifier("_private"));
        assert!(is_identifier("TestRelationDTO2"));
        assert!(!is_identifier(""));
        assert!(!is_identifier("2fast"));
        assert!(!is_identifier("with-dash"));
    }
}
