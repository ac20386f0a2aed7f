use super::*;

// =============================================================================
// bytes_to_hex / tokens
// =============================================================================

#[test]
fn bytes_to_hex_known_values() {
    assert_eq!(bytes_to_hex(&[]), "");
    assert_eq!(bytes_to_hex(&[0x0a]), "0a");
    assert_eq!(bytes_to_hex(&[0xde, 0xad, 0xbe, 0xef]), "deadbeef");
}

#[test]
fn generate_token_is_64_hex_chars() {
    let token = generate_token();
    assert_eq!(token.len(), 64);
    assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
}

#[test]
fn generate_token_two_calls_differ() {
    assert_ne!(generate_token(), generate_token());
}

// =============================================================================
// password hashing
// =============================================================================

#[test]
fn hash_password_round_trip() {
    let stored = hash_password("hunter2secret");
    assert!(verify_password("hunter2secret", &stored));
    assert!(!verify_password("wrong", &stored));
}

#[test]
fn hash_password_salts_differ_per_call() {
    let a = hash_password("same-password");
    let b = hash_password("same-password");
    assert_ne!(a, b);
    assert!(verify_password("same-password", &a));
    assert!(verify_password("same-password", &b));
}

#[test]
fn hash_password_format_is_salt_dollar_hash() {
    let stored = hash_password("pw-123456");
    let (salt, hash) = stored.split_once('$').expect("salt$hash format");
    assert_eq!(salt.len(), 32);
    assert_eq!(hash.len(), 64);
}

#[test]
fn verify_password_rejects_malformed_stored_value() {
    assert!(!verify_password("anything", "no-dollar-separator"));
    assert!(!verify_password("anything", ""));
}

// =============================================================================
// normalization
// =============================================================================

#[test]
fn normalize_email_lowercases_and_trims() {
    assert_eq!(normalize_email("  Alice@Example.COM "), Some("alice@example.com".into()));
}

#[test]
fn normalize_email_rejects_malformed() {
    assert_eq!(normalize_email("no-at-sign"), None);
    assert_eq!(normalize_email("@host"), None);
    assert_eq!(normalize_email("user@"), None);
    assert_eq!(normalize_email("a@b@c"), None);
    assert_eq!(normalize_email(""), None);
}

#[test]
fn normalize_username_enforces_charset_and_length() {
    assert_eq!(normalize_username("bob_42"), Some("bob_42".into()));
    assert_eq!(normalize_username("  carol  "), Some("carol".into()));
    assert_eq!(normalize_username("ab"), None);
    assert_eq!(normalize_username("has space"), None);
    assert_eq!(normalize_username("dash-ed"), None);
}
