// src/services/codes.rs
// DOCUMENTATION: Short code and token generation
// PURPOSE: Random code generation, custom code validation and API token minting

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use rand::Rng;

/// URL-safe alphabet excluding ambiguous characters (0/O, 1/l/I)
pub const ALPHABET: &[u8] = b"23456789abcdefghjkmnpqrstuvwxyz";

pub const DEFAULT_CODE_LENGTH: usize = 7;

pub const CUSTOM_CODE_MIN_LENGTH: usize = 3;
pub const CUSTOM_CODE_MAX_LENGTH: usize = 20;

/// Top-level paths served by the application itself
const RESERVED_CODES: &[&str] = &[
    "api",
    "health",
    "admin",
    "accounts",
    "analytics",
    "dashboard",
    "shorten",
    "static",
];

const API_TOKEN_PREFIX: &str = "structo_";

/// Generate a short code of `length` characters
/// DOCUMENTATION: Draws from the thread-local CSPRNG
pub fn generate_short_code(length: usize) -> String {
    let mut rng = rand::rng();
    (0..length)
        .map(|_| ALPHABET[rng.random_range(0..ALPHABET.len())] as char)
        .collect()
}

/// Code lengths tried in order: attempt i uses base + i characters
pub fn candidate_lengths(base: usize, attempts: usize) -> impl Iterator<Item = usize> {
    (0..attempts).map(move |attempt| base + attempt)
}

/// Lowercase and trim a user-supplied code
pub fn normalize_custom_code(code: &str) -> String {
    code.trim().to_lowercase()
}

/// Validate a custom short code
///
/// Rules:
/// - 3-20 characters long
/// - Only lowercase ASCII letters, digits and hyphens (checked after lowercasing)
/// - Cannot start or end with a hyphen
pub fn is_valid_custom_code(code: &str) -> bool {
    let length = code.chars().count();
    if !(CUSTOM_CODE_MIN_LENGTH..=CUSTOM_CODE_MAX_LENGTH).contains(&length) {
        return false;
    }
    if code.starts_with('-') || code.ends_with('-') {
        return false;
    }
    code.to_lowercase()
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
}

pub fn is_reserved_code(code: &str) -> bool {
    RESERVED_CODES.contains(&code)
}

/// Generate a bearer token for an authenticated user
pub fn generate_api_token() -> String {
    let mut bytes = [0u8; 32];
    rand::rng().fill(&mut bytes);
    format!("{}{}", API_TOKEN_PREFIX, URL_SAFE_NO_PAD.encode(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_default_length() {
        assert_eq!(generate_short_code(DEFAULT_CODE_LENGTH).len(), 7);
    }

    #[test]
    fn test_custom_length() {
        assert_eq!(generate_short_code(10).len(), 10);
    }

    #[test]
    fn test_no_ambiguous_chars() {
        for _ in 0..100 {
            let code = generate_short_code(DEFAULT_CODE_LENGTH);
            for c in "0O1lI".chars() {
                assert!(!code.contains(c), "{} contains {}", code, c);
            }
            assert!(code.bytes().all(|b| ALPHABET.contains(&b)));
        }
    }

    #[test]
    fn test_uniqueness() {
        let codes: HashSet<String> = (0..1000)
            .map(|_| generate_short_code(DEFAULT_CODE_LENGTH))
            .collect();
        assert_eq!(codes.len(), 1000);
    }

    #[test]
    fn test_candidate_lengths_grow_per_attempt() {
        let lengths: Vec<usize> = candidate_lengths(7, 5).collect();
        assert_eq!(lengths, vec![7, 8, 9, 10, 11]);
        assert_eq!(candidate_lengths(7, 0).count(), 0);
    }

    #[test]
    fn test_valid_codes() {
        assert!(is_valid_custom_code("abc"));
        assert!(is_valid_custom_code("my-brand"));
        assert!(is_valid_custom_code("test123"));
        assert!(is_valid_custom_code("a-b-c"));
        assert!(is_valid_custom_code("MyBrand"));
    }

    #[test]
    fn test_too_short() {
        assert!(!is_valid_custom_code("ab"));
    }

    #[test]
    fn test_too_long() {
        assert!(is_valid_custom_code(&"a".repeat(20)));
        assert!(!is_valid_custom_code(&"a".repeat(21)));
    }

    #[test]
    fn test_hyphen_edges() {
        assert!(!is_valid_custom_code("-abc"));
        assert!(!is_valid_custom_code("abc-"));
    }

    #[test]
    fn test_special_chars() {
        assert!(!is_valid_custom_code("ab@c"));
        assert!(!is_valid_custom_code("ab c"));
        assert!(!is_valid_custom_code("ab_c"));
        assert!(!is_valid_custom_code("café"));
    }

    #[test]
    fn test_normalize_custom_code() {
        assert_eq!(normalize_custom_code("  My-Link "), "my-link");
    }

    #[test]
    fn test_reserved_codes() {
        assert!(is_reserved_code("api"));
        assert!(is_reserved_code("health"));
        assert!(!is_reserved_code("my-link"));
    }

    #[test]
    fn test_api_token_shape() {
        let token = generate_api_token();
        assert!(token.starts_with("structo_"));
        // 32 bytes -> 43 base64 chars without padding
        assert_eq!(token.len(), "structo_".len() + 43);
        assert_ne!(token, generate_api_token());
    }
}
