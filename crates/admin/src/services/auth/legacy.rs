//! Werkzeug PBKDF2 digests written by earlier deployments.
//!
//! ```text
//! pbkdf2:sha256:<iterations>$<salt>$<hex digest>
//! ```
//!
//! The salt is used as its UTF-8 bytes and the digest is 32 bytes of
//! PBKDF2-HMAC-SHA256. These digests are only ever verified; a successful
//! login replaces them with Argon2id.

use pbkdf2::pbkdf2_hmac;
use sha2::Sha256;
use subtle::ConstantTimeEq;

const PREFIX: &str = "pbkdf2:sha256:";

const DIGEST_LEN: usize = 32;

/// Whether `hash` is a Werkzeug PBKDF2-SHA256 digest.
pub fn is_legacy_digest(hash: &str) -> bool {
    hash.starts_with(PREFIX)
}

/// Verify `password` against a Werkzeug digest. Malformed digests never
/// verify.
pub fn verify(hash: &str, password: &str) -> bool {
    let Some(rest) = hash.strip_prefix(PREFIX) else {
        return false;
    };
    let mut parts = rest.splitn(3, '$');
    let (Some(iterations), Some(salt), Some(expected)) = (parts.next(), parts.next(), parts.next())
    else {
        return false;
    };
    let Ok(iterations) = iterations.parse::<u32>() else {
        return false;
    };
    if iterations == 0 {
        return false;
    }
    let Ok(expected) = hex::decode(expected) else {
        return false;
    };

    let mut computed = [0u8; DIGEST_LEN];
    pbkdf2_hmac::<Sha256>(password.as_bytes(), salt.as_bytes(), iterations, &mut computed);

    computed[..].ct_eq(&expected[..]).into()
}
