//! Wallet login flow tests
//!
//! End-to-end exercises of the challenge/prepare/verify cycle with real
//! secp256k1 keys: the happy path, replay, expiry, domain binding, and the
//! failure ordering guarantees.

use chrono::{Duration, Utc};
use k256::ecdsa::SigningKey;

use lacra_server::auth::crypto::{ethereum_address, personal_sign_digest};
use lacra_server::auth::{AuthError, AuthService, Challenge};
use lacra_server::config::Config;

const HOST: &str = "lacra.example";

fn service() -> AuthService {
    AuthService::new(&Config::for_tests())
}

fn wallet() -> (SigningKey, String) {
    let key = SigningKey::random(&mut rand::thread_rng());
    let address = ethereum_address(key.verifying_key());
    (key, address)
}

/// Sign a message the way a wallet's `personal_sign` does.
fn sign(message: &str, key: &SigningKey) -> String {
    let digest = personal_sign_digest(message);
    let (signature, recovery_id) = key.sign_prehash_recoverable(&digest).unwrap();
    let mut raw = [0u8; 65];
    raw[..64].copy_from_slice(&signature.to_bytes());
    raw[64] = 27 + recovery_id.to_byte();
    format!("0x{}", hex::encode(raw))
}

// ============================================================================
// Happy path and replay
// ============================================================================

#[test]
fn test_correct_signature_verifies_once() {
    let svc = service();
    let (key, address) = wallet();

    let (message, challenge) = svc.prepare_message(&address, 1).unwrap();
    let text = message.to_string();
    let signature = sign(&text, &key);

    let recovered = svc
        .verify(&text, &signature, HOST, Some(&challenge))
        .unwrap();
    assert_eq!(recovered, address.to_lowercase());

    // The challenge cookie is cleared on success; a replay of the identical
    // message and signature finds no outstanding challenge
    let replay = svc.verify(&text, &signature, HOST, None);
    assert!(matches!(replay, Err(AuthError::MissingChallenge)));
}

#[test]
fn test_mixed_case_address_is_lowercased() {
    let svc = service();
    let (key, address) = wallet();

    // Claim the address in uppercase hex; recovery still matches
    let claimed = format!("0x{}", address[2..].to_uppercase());
    let (message, challenge) = svc.prepare_message(&claimed, 1).unwrap();
    let text = message.to_string();

    let recovered = svc
        .verify(&text, &sign(&text, &key), HOST, Some(&challenge))
        .unwrap();
    assert_eq!(recovered, address.to_lowercase());
}

// ============================================================================
// Wrong key
// ============================================================================

#[test]
fn test_wrong_key_fails_and_challenge_survives() {
    let svc = service();
    let (key, address) = wallet();
    let (other_key, _) = wallet();

    let (message, challenge) = svc.prepare_message(&address, 1).unwrap();
    let text = message.to_string();

    let result = svc.verify(&text, &sign(&text, &other_key), HOST, Some(&challenge));
    assert!(matches!(result, Err(AuthError::BadSignature)));

    // Failure consumes nothing; the same challenge still validates a
    // corrected signature
    let recovered = svc
        .verify(&text, &sign(&text, &key), HOST, Some(&challenge))
        .unwrap();
    assert_eq!(recovered, address.to_lowercase());
}

#[test]
fn test_tampered_message_fails() {
    let svc = service();
    let (key, address) = wallet();

    let (message, challenge) = svc.prepare_message(&address, 1).unwrap();
    let text = message.to_string();
    let signature = sign(&text, &key);

    // Signature over the original text no longer matches the edited text
    let tampered = text.replace("Chain ID: 1", "Chain ID: 5");
    let result = svc.verify(&tampered, &signature, HOST, Some(&challenge));
    assert!(matches!(result, Err(AuthError::BadSignature)));
}

// ============================================================================
// Expiry
// ============================================================================

#[test]
fn test_expired_challenge_fails_even_with_correct_signature() {
    let svc = service();
    let (key, address) = wallet();

    let (message, challenge) = svc.prepare_message(&address, 1).unwrap();
    let text = message.to_string();

    let expired = Challenge {
        nonce: challenge.nonce.clone(),
        issued_at: Utc::now() - Duration::seconds(700),
        expires_at: Utc::now() - Duration::seconds(100),
    };

    let result = svc.verify(&text, &sign(&text, &key), HOST, Some(&expired));
    assert!(matches!(result, Err(AuthError::NonceInvalidOrExpired)));
}

#[test]
fn test_nonce_mismatch_fails() {
    let svc = service();
    let (key, address) = wallet();

    let (message, _) = svc.prepare_message(&address, 1).unwrap();
    // A different challenge superseded the one embedded in the message
    let superseding = svc.issue_challenge().unwrap();

    let text = message.to_string();
    let result = svc.verify(&text, &sign(&text, &key), HOST, Some(&superseding));
    assert!(matches!(result, Err(AuthError::NonceInvalidOrExpired)));
}

// ============================================================================
// Missing challenge and domain binding
// ============================================================================

#[test]
fn test_verify_without_challenge_fails() {
    let svc = service();
    let (key, address) = wallet();

    let (message, _) = svc.prepare_message(&address, 1).unwrap();
    let text = message.to_string();

    let result = svc.verify(&text, &sign(&text, &key), HOST, None);
    assert!(matches!(result, Err(AuthError::MissingChallenge)));
}

#[test]
fn test_domain_mismatch_fails_regardless_of_signature() {
    let svc = service();
    let (key, address) = wallet();

    let (message, challenge) = svc.prepare_message(&address, 1).unwrap();
    let text = message.to_string();

    let result = svc.verify(&text, &sign(&text, &key), "evil.example", Some(&challenge));
    assert!(matches!(result, Err(AuthError::DomainMismatch)));
}

#[test]
fn test_domain_check_precedes_nonce_check() {
    let svc = service();
    let (key, address) = wallet();

    let (message, challenge) = svc.prepare_message(&address, 1).unwrap();
    let text = message.to_string();

    // Both the domain and the expiry are wrong; the domain failure wins
    let expired = Challenge {
        expires_at: Utc::now() - Duration::seconds(1),
        ..challenge
    };
    let result = svc.verify(&text, &sign(&text, &key), "evil.example", Some(&expired));
    assert!(matches!(result, Err(AuthError::DomainMismatch)));
}

// ============================================================================
// Malformed input
// ============================================================================

#[test]
fn test_malformed_message_fails() {
    let svc = service();
    let challenge = svc.issue_challenge().unwrap();

    let result = svc.verify("not a sign-in message", "0x00", HOST, Some(&challenge));
    assert!(matches!(result, Err(AuthError::MalformedMessage(_))));
}

#[test]
fn test_malformed_signature_fails() {
    let svc = service();
    let (_, address) = wallet();

    let (message, challenge) = svc.prepare_message(&address, 1).unwrap();
    let text = message.to_string();

    let result = svc.verify(&text, "0xdeadbeef", HOST, Some(&challenge));
    assert!(matches!(result, Err(AuthError::BadSignature)));
}

// ============================================================================
// Message construction
// ============================================================================

#[test]
fn test_prepared_message_round_trips() {
    use lacra_server::auth::SignInMessage;

    let svc = service();
    let (_, address) = wallet();

    let (message, _) = svc.prepare_message(&address, 8453).unwrap();
    let parsed: SignInMessage = message.to_string().parse().unwrap();
    assert_eq!(parsed, message);
}

#[test]
fn test_each_preparation_supersedes_the_previous() {
    let svc = service();
    let (key, address) = wallet();

    let (first, _first_challenge) = svc.prepare_message(&address, 1).unwrap();
    let (second, second_challenge) = svc.prepare_message(&address, 1).unwrap();
    assert_ne!(first.nonce, second.nonce);

    // Only the latest nonce is live: the first message no longer verifies
    // against the superseding challenge, the second does
    let first_text = first.to_string();
    let result = svc.verify(
        &first_text,
        &sign(&first_text, &key),
        HOST,
        Some(&second_challenge),
    );
    assert!(matches!(result, Err(AuthError::NonceInvalidOrExpired)));

    let second_text = second.to_string();
    let recovered = svc
        .verify(
            &second_text,
            &sign(&second_text, &key),
            HOST,
            Some(&second_challenge),
        )
        .unwrap();
    assert_eq!(recovered, address.to_lowercase());
}
