use crate::{OpaqueSecret, hash_secret};

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;

#[test]
fn given_generated_secret_then_encodes_256_bits_url_safe() {
    let secret = OpaqueSecret::generate();

    let decoded = URL_SAFE_NO_PAD.decode(secret.as_str()).unwrap();
    assert_eq!(decoded.len(), 32);
    assert!(!secret.as_str().contains(['+', '/', '=']));
}

#[test]
fn given_two_generated_secrets_then_they_differ() {
    assert_ne!(OpaqueSecret::generate(), OpaqueSecret::generate());
}

#[test]
fn given_secret_when_hashed_then_sha256_hex_digest() {
    // sha256("abc")
    assert_eq!(
        hash_secret("abc"),
        "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
    );
    assert_eq!(OpaqueSecret::from_raw("abc").digest(), hash_secret("abc"));
}

#[test]
fn given_secret_when_debug_formatted_then_value_not_shown() {
    let secret = OpaqueSecret::from_raw("super-secret-value");

    assert!(!format!("{secret:?}").contains("super-secret-value"));
}
