use subtle::ConstantTimeEq;
use uuid::Uuid;

/// Constant-time string comparison to prevent timing attacks.
/// Use this for comparing CSRF tokens and other secret values.
pub fn constant_time_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.as_bytes().ct_eq(b.as_bytes()).into()
}

/// Fresh random token for session ids and CSRF protection.
pub fn random_token() -> String {
    Uuid::new_v4().simple().to_string()
}

/// Check a submitted CSRF token against the one stored in the session.
pub fn verify_csrf(expected: &str, submitted: Option<&str>) -> bool {
    match submitted {
        Some(token) if !expected.is_empty() => constant_time_compare(expected, token),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constant_time_compare() {
        assert!(constant_time_compare("secret123", "secret123"));
        assert!(!constant_time_compare("secret123", "secret124"));
        assert!(!constant_time_compare("secret123", "secret12"));
        assert!(!constant_time_compare("", "secret"));
    }

    #[test]
    fn test_random_token_shape() {
        let a = random_token();
        let b = random_token();
        assert_eq!(a.len(), 32);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(a, b);
    }

    #[test]
    fn test_verify_csrf() {
        assert!(verify_csrf("abc", Some("abc")));
        assert!(!verify_csrf("abc", Some("abd")));
        assert!(!verify_csrf("abc", None));
        assert!(!verify_csrf("", Some("")));
    }
}
