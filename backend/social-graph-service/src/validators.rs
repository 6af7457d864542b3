use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeSet;
use validator::ValidationError;

/// Input validation utilities shared by the request payloads

// Patterns are hardcoded, so a failed compile is a source bug
static USERNAME_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z0-9_]{3,20}$").expect("hardcoded username regex is invalid")
});

static MENTION_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"@(\w+)").expect("hardcoded mention regex is invalid"));

pub const USERNAME_MIN_LEN: usize = 3;
pub const USERNAME_MAX_LEN: usize = 20;

/// 3-20 characters, ASCII alphanumerics and underscore
pub fn validate_username(username: &str) -> bool {
    USERNAME_REGEX.is_match(username)
}

/// validator crate compatible custom validator for username shape
pub fn validate_username_shape(username: &str) -> Result<(), ValidationError> {
    if validate_username(username) {
        Ok(())
    } else {
        Err(ValidationError::new("invalid_username"))
    }
}

/// Rejects strings that are empty once trimmed
pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(ValidationError::new("blank"))
    } else {
        Ok(())
    }
}

/// Distinct `@handle` mentions in order of first appearance
pub fn extract_mentions(text: &str) -> Vec<String> {
    let mut seen = BTreeSet::new();
    MENTION_REGEX
        .captures_iter(text)
        .filter_map(|c| c.get(1).map(|m| m.as_str().to_string()))
        .filter(|m| seen.insert(m.clone()))
        .collect()
}

/// Turn an identity-provider nickname into a username base that satisfies
/// the username shape once a numeric suffix is appended.
pub fn normalize_username_base(nickname: &str) -> String {
    let mut base: String = nickname
        .to_lowercase()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();

    if base.trim_matches('_').is_empty() {
        base = "user".to_string();
    }
    while base.len() < USERNAME_MIN_LEN {
        base.push('_');
    }
    base.truncate(USERNAME_MAX_LEN);
    base
}

/// Candidate username for the given attempt; attempt 0 is the bare base.
pub fn username_candidate(base: &str, attempt: u32) -> String {
    if attempt == 0 {
        return base.to_string();
    }
    let suffix = attempt.to_string();
    let keep = USERNAME_MAX_LEN.saturating_sub(suffix.len()).min(base.len());
    format!("{}{}", &base[..keep], suffix)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_username_shape() {
        assert!(validate_username("abc"));
        assert!(validate_username("user_name_20_chars__"));
        assert!(!validate_username("ab"));
        assert!(!validate_username("user_name_21_chars___"));
        assert!(!validate_username("bad-name"));
        assert!(!validate_username("spa ce"));
    }

    #[test]
    fn test_not_blank() {
        assert!(validate_not_blank("hi").is_ok());
        assert!(validate_not_blank("   ").is_err());
    }

    #[test]
    fn test_extract_mentions_dedups_in_order() {
        let mentions = extract_mentions("hey @bob and @alice_1, also @bob!");
        assert_eq!(mentions, vec!["bob".to_string(), "alice_1".to_string()]);
        assert!(extract_mentions("no handles here").is_empty());
    }

    #[test]
    fn test_normalize_username_base() {
        assert_eq!(normalize_username_base("John.Doe"), "john_doe");
        assert_eq!(normalize_username_base("Al"), "al_");
        assert_eq!(normalize_username_base("..."), "user");
        assert_eq!(
            normalize_username_base("averyveryverylongnickname"),
            "averyveryverylongnic"
        );
        assert!(validate_username(&normalize_username_base("Émile")));
    }

    #[test]
    fn test_username_candidate_stays_within_limit() {
        assert_eq!(username_candidate("john", 0), "john");
        assert_eq!(username_candidate("john", 3), "john3");
        let base = "averyveryverylongnic";
        let candidate = username_candidate(base, 12);
        assert_eq!(candidate.len(), USERNAME_MAX_LEN);
        assert!(candidate.ends_with("12"));
        assert!(validate_username(&candidate));
    }
}
