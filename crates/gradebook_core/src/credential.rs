//! crates/gradebook_core/src/credential.rs
//!
//! Salted, iterated password hashing.
//!
//! The stored form is `salt || derived_key`: 32 random bytes of salt followed
//! by 32 bytes of PBKDF2-HMAC-SHA256 output at 100 000 iterations. Previously
//! stored credentials depend on this exact layout and parameter set; changing
//! either requires versioning the stored format.

use rand::{rngs::OsRng, RngCore};
use sha2::Sha256;
use std::fmt;

use crate::values::Password;

pub const SALT_LEN: usize = 32;
pub const KEY_LEN: usize = 32;
pub const CREDENTIAL_LEN: usize = SALT_LEN + KEY_LEN;

/// PBKDF2 work factor. Never lower this.
pub const KDF_ITERATIONS: u32 = 100_000;

/// The stored credential had a length other than [`CREDENTIAL_LEN`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Stored credential has length {actual}, expected {CREDENTIAL_LEN}")]
pub struct MalformedCredential {
    pub actual: usize,
}

#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    salt: [u8; SALT_LEN],
    key: [u8; KEY_LEN],
}

impl Credential {
    /// Derives a credential for `password` under a fresh random salt.
    pub fn derive(password: &Password<'_>) -> Self {
        let mut salt = [0u8; SALT_LEN];
        OsRng.fill_bytes(&mut salt);
        Self::derive_with_salt(password, salt)
    }

    pub fn derive_with_salt(password: &Password<'_>, salt: [u8; SALT_LEN]) -> Self {
        let key = stretch(password.as_bytes(), &salt);
        Self { salt, key }
    }

    /// An all-zero credential no password is expected to match. Verifying
    /// against it costs the same as verifying a real one.
    pub fn decoy() -> Self {
        Self {
            salt: [0u8; SALT_LEN],
            key: [0u8; KEY_LEN],
        }
    }

    /// Recomputes the key for `password` under the stored salt and compares
    /// the two in constant time.
    pub fn verify(&self, password: &str) -> bool {
        let candidate = stretch(password.as_bytes(), &self.salt);
        constant_time_eq(&candidate, &self.key)
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(CREDENTIAL_LEN);
        out.extend_from_slice(&self.salt);
        out.extend_from_slice(&self.key);
        out
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, MalformedCredential> {
        if bytes.len() != CREDENTIAL_LEN {
            return Err(MalformedCredential {
                actual: bytes.len(),
            });
        }
        let (salt_part, key_part) = bytes.split_at(SALT_LEN);
        let mut salt = [0u8; SALT_LEN];
        let mut key = [0u8; KEY_LEN];
        salt.copy_from_slice(salt_part);
        key.copy_from_slice(key_part);
        Ok(Self { salt, key })
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(<redacted>)")
    }
}

fn stretch(password: &[u8], salt: &[u8; SALT_LEN]) -> [u8; KEY_LEN] {
    let mut key = [0u8; KEY_LEN];
    pbkdf2::pbkdf2_hmac::<Sha256>(password, salt, KDF_ITERATIONS, &mut key);
    key
}

/// Constant-time byte comparison to prevent timing attacks.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut diff = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        diff |= x ^ y;
    }
    diff == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pw(raw: &str) -> Password<'_> {
        Password::parse(raw).unwrap()
    }

    #[test]
    fn stored_layout_is_salt_then_key() {
        let salt = [7u8; SALT_LEN];
        let credential = Credential::derive_with_salt(&pw("hunter22"), salt);
        let bytes = credential.to_bytes();

        assert_eq!(bytes.len(), CREDENTIAL_LEN);
        assert_eq!(&bytes[..SALT_LEN], &salt);
        assert_ne!(&bytes[SALT_LEN..], b"hunter22".as_slice());
    }

    #[test]
    fn derivation_is_deterministic_with_same_salt() {
        let salt = [1u8; SALT_LEN];
        let a = Credential::derive_with_salt(&pw("secret1"), salt);
        let b = Credential::derive_with_salt(&pw("secret1"), salt);
        assert_eq!(a, b);
    }

    #[test]
    fn derivation_differs_with_different_salt() {
        let a = Credential::derive_with_salt(&pw("secret1"), [1u8; SALT_LEN]);
        let b = Credential::derive_with_salt(&pw("secret1"), [2u8; SALT_LEN]);
        assert_ne!(a.to_bytes()[SALT_LEN..], b.to_bytes()[SALT_LEN..]);
    }

    #[test]
    fn fresh_salts_are_random() {
        let a = Credential::derive(&pw("secret1"));
        let b = Credential::derive(&pw("secret1"));
        assert_ne!(a.to_bytes(), b.to_bytes());
    }

    #[test]
    fn verify_accepts_only_the_derived_password() {
        let credential = Credential::derive(&pw("correct horse"));
        assert!(credential.verify("correct horse"));
        assert!(!credential.verify("correct horsf"));
        assert!(!credential.verify(""));
    }

    #[test]
    fn matches_reference_pbkdf2_output() {
        // PBKDF2-HMAC-SHA256("password", "salt", 1 iteration) is a published
        // test vector; check the primitive the stretcher builds on.
        let mut out = [0u8; 32];
        pbkdf2::pbkdf2_hmac::<Sha256>(b"password", b"salt", 1, &mut out);
        assert_eq!(&out[..4], &[0x12u8, 0x0f, 0xb6, 0xcf]);
    }

    #[test]
    fn bytes_round_trip_preserves_verification() {
        let credential = Credential::derive(&pw("round-trip"));
        let restored = Credential::from_bytes(&credential.to_bytes()).unwrap();
        assert!(restored.verify("round-trip"));
    }

    #[test]
    fn from_bytes_rejects_wrong_length() {
        assert_eq!(
            Credential::from_bytes(&[0u8; 63]),
            Err(MalformedCredential { actual: 63 })
        );
        assert!(Credential::from_bytes(&[]).is_err());
    }

    #[test]
    fn debug_output_is_redacted() {
        let credential = Credential::derive_with_salt(&pw("secret1"), [9u8; SALT_LEN]);
        assert_eq!(format!("{credential:?}"), "Credential(<redacted>)");
    }

    #[test]
    fn constant_time_eq_works() {
        assert!(constant_time_eq(b"hello", b"hello"));
        assert!(!constant_time_eq(b"hello", b"world"));
        assert!(!constant_time_eq(b"short", b"longer"));
    }
}
