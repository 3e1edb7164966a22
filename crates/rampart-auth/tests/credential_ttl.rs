//! TTL derivation against credentials minted by a real JWT encoder.

use jsonwebtoken::{EncodingKey, Header, encode};
use rampart_auth::{TokenTtl, ttl_from_credential};
use serde_json::json;
use time::OffsetDateTime;

fn mint(claims: serde_json::Value) -> String {
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(b"upstream-secret"),
    )
    .expect("encode token")
}

#[test]
fn test_token_expiring_in_sixty_seconds() {
    let exp = OffsetDateTime::now_utc().unix_timestamp() + 60;
    let token = mint(json!({ "sub": "player-1", "exp": exp }));

    let secs = ttl_from_credential(&token).as_secs().expect("ttl");
    assert!((59..=60).contains(&secs), "ttl was {secs}");
}

#[test]
fn test_expired_token() {
    let exp = OffsetDateTime::now_utc().unix_timestamp() - 3600;
    let token = mint(json!({ "sub": "player-1", "exp": exp }));

    assert_eq!(ttl_from_credential(&token), TokenTtl::Expired);
    assert_eq!(ttl_from_credential(&token).as_secs(), Some(0));
}

#[test]
fn test_token_without_expiry() {
    let token = mint(json!({ "sub": "player-1", "scope": "lobby" }));

    let ttl = ttl_from_credential(&token);
    assert_eq!(ttl, TokenTtl::NoExpiry);
    assert_eq!(ttl.as_secs(), None);
    assert_eq!(ttl.cache_ttl(), None);
}

#[test]
fn test_signature_is_not_checked() {
    let exp = OffsetDateTime::now_utc().unix_timestamp() + 120;
    let token = mint(json!({ "exp": exp }));

    // Swap the signature for garbage; the TTL only depends on the payload.
    let (unsigned, _) = token.rsplit_once('.').expect("three segments");
    let tampered = format!("{unsigned}.AAAA");

    assert!(ttl_from_credential(&tampered).is_cacheable());
}
