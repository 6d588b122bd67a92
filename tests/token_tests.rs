use std::time::{Duration, SystemTime, UNIX_EPOCH};

use asc_build_number::{
    BearerToken, Credentials, SigningError,
    asc::{AUDIENCE, Claims},
    config::load_private_key,
};
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode, decode_header};

const KEY_ID: &str = "TESTKEY123";

fn fixture(name: &str) -> std::path::PathBuf {
    std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

fn credentials() -> Credentials {
    Credentials {
        issuer_id: "69a6de70-0000-47e3-e053-5b8c7c11a4d1".into(),
        key_id: KEY_ID.into(),
        p8_private_key_pem: load_private_key(&fixture("AuthKey_TESTKEY123.p8")).unwrap(),
    }
}

fn decode_claims(token: &str) -> Claims {
    let public = std::fs::read(fixture("AuthKey_TESTKEY123.pub.pem")).unwrap();
    let key = DecodingKey::from_ec_pem(&public).unwrap();
    let mut validation = Validation::new(Algorithm::ES256);
    validation.set_audience(&[AUDIENCE]);
    validation.validate_exp = false;
    decode::<Claims>(token, &key, &validation).unwrap().claims
}

#[test]
fn header_carries_algorithm_key_id_and_type() {
    let token = BearerToken::mint(&credentials(), SystemTime::now()).unwrap();
    let header = decode_header(token.as_str()).unwrap();
    assert_eq!(header.alg, Algorithm::ES256);
    assert_eq!(header.kid.as_deref(), Some(KEY_ID));
    assert_eq!(header.typ.as_deref(), Some("JWT"));
}

#[test]
fn claims_expire_sixty_seconds_after_minting() {
    let now = UNIX_EPOCH + Duration::from_secs(1_700_000_000);
    let token = BearerToken::mint(&credentials(), now).unwrap();
    let claims = decode_claims(token.as_str());
    assert_eq!(claims.iss, "69a6de70-0000-47e3-e053-5b8c7c11a4d1");
    assert_eq!(claims.aud, AUDIENCE);
    assert_eq!(claims.exp, 1_700_000_060);
    assert_eq!(token.expires_at(), now + Duration::from_secs(60));
}

#[test]
fn each_mint_produces_a_fresh_token() {
    let creds = credentials();
    let first_at = SystemTime::now();
    let second_at = first_at + Duration::from_secs(1);
    let first = BearerToken::mint(&creds, first_at).unwrap();
    let second = BearerToken::mint(&creds, second_at).unwrap();

    assert_ne!(first.as_str(), second.as_str());
    assert_eq!(
        decode_claims(second.as_str()).exp,
        decode_claims(first.as_str()).exp + 1
    );
}

#[test]
fn minted_token_is_currently_valid() {
    let token = BearerToken::mint(&credentials(), SystemTime::now()).unwrap();
    let public = std::fs::read(fixture("AuthKey_TESTKEY123.pub.pem")).unwrap();
    let key = DecodingKey::from_ec_pem(&public).unwrap();
    let mut validation = Validation::new(Algorithm::ES256);
    validation.set_audience(&[AUDIENCE]);
    assert!(decode::<Claims>(token.as_str(), &key, &validation).is_ok());
}

#[test]
fn bare_base64_key_body_is_accepted() {
    let pem = std::fs::read_to_string(fixture("AuthKey_TESTKEY123.p8")).unwrap();
    let body: String = pem.lines().filter(|l| !l.starts_with("-----")).collect();
    let creds = Credentials {
        p8_private_key_pem: asc_build_number::config::normalize_pem(&body),
        ..credentials()
    };
    assert!(BearerToken::mint(&creds, SystemTime::now()).is_ok());
}

#[test]
fn public_key_is_not_a_signing_key() {
    let creds = Credentials {
        p8_private_key_pem: std::fs::read_to_string(fixture("AuthKey_TESTKEY123.pub.pem")).unwrap(),
        ..credentials()
    };
    assert!(matches!(
        BearerToken::mint(&creds, SystemTime::now()),
        Err(SigningError::InvalidKey(_))
    ));
}
