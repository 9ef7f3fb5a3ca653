//! Text a cell must hold to read back unchanged

use once_cell::sync::Lazy;
use regex::Regex;

use super::sheets::LIST_SEPARATOR;

/// Names an employee may have: word characters and `&-./()'`, with inner spaces
pub static VALID_NAME_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[\w&\-./()'][\w&\-./()' ]*[\w&\-./()']?$").expect("valid name pattern")
});

/// Constraint on a text column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextRule {
    /// Any non-blank text: codes, names, flight numbers
    Required,
    /// Non-blank and free of the list separator, since it is joined into list cells
    ListItem,
    /// Matches [`VALID_NAME_PATTERN`]
    EmployeeName,
}

impl TextRule {
    /// Why `value` breaks the rule, or `None` if it holds
    pub fn violation(self, value: &str) -> Option<String> {
        match self {
            TextRule::Required | TextRule::ListItem if value.is_empty() => {
                Some("must not be blank".to_string())
            }
            TextRule::ListItem if value.contains(LIST_SEPARATOR) => Some(format!(
                "must not contain the list separator ({:?})",
                LIST_SEPARATOR
            )),
            TextRule::EmployeeName if !VALID_NAME_PATTERN.is_match(value) => Some(format!(
                "is not a valid employee name: it must match the regular expression ({})",
                VALID_NAME_PATTERN.as_str()
            )),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_name_pattern() {
        for name in ["Ann", "Jean-Luc O'Neil", "B. Smith (Jr)", "Zoë", "A&B/C", "X"] {
            assert!(VALID_NAME_PATTERN.is_match(name), "{name} should be valid");
        }
        for name in ["", " Ann", "Ann;", "Ann\tB", "Ann, Bob", "#1"] {
            assert!(!VALID_NAME_PATTERN.is_match(name), "{name} should be invalid");
        }
    }

    #[test]
    fn test_text_rules() {
        assert_eq!(TextRule::Required.violation("LHR"), None);
        assert!(TextRule::Required.violation("").is_some());
        assert_eq!(TextRule::ListItem.violation("Pilot, senior").unwrap(), "must not contain the list separator (\", \")");
        assert_eq!(TextRule::ListItem.violation("Pilot,senior"), None);
        assert!(TextRule::EmployeeName.violation("Ann;").is_some());
        assert!(TextRule::EmployeeName.violation("").is_some());
    }
}
