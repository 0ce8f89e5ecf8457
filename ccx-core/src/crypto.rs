//! Credential obfuscation: AES-256-CBC with a machine-derived key.
//!
//! The key is hashed from stable machine identifiers, so records decrypt
//! on the machine/account that wrote them and nowhere else. This is
//! best-effort obfuscation of secrets at rest, not a hardware-backed
//! secret store; do not upgrade the model.

use aes::cipher::{block_padding::Pkcs7, BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use rand::RngCore;
use sha2::{Digest, Sha256};

type Aes256CbcEnc = cbc::Encryptor<aes::Aes256>;
type Aes256CbcDec = cbc::Decryptor<aes::Aes256>;

const KEY_SIZE: usize = 32;
const IV_SIZE: usize = 16;

/// Separates the hex IV from the hex ciphertext in a stored record.
const RECORD_DELIMITER: char = ':';

/// Domain-separation constant mixed into the key hash.
const APP_SALT: &[u8] = b"ccx-credential-v1";

/// Derive the per-machine key from {hostname, user, app constant}.
///
/// Deterministic and infallible: unknown identifiers fall back to fixed
/// strings rather than failing, so the same machine always derives the
/// same key.
pub fn derive_machine_key() -> [u8; KEY_SIZE] {
    let host = hostname::get()
        .map(|h| h.to_string_lossy().into_owned())
        .unwrap_or_else(|_| "localhost".to_string());
    let user = std::env::var("USER")
        .or_else(|_| std::env::var("USERNAME"))
        .unwrap_or_else(|_| "unknown".to_string());

    let mut hasher = Sha256::new();
    hasher.update(host.as_bytes());
    hasher.update([0u8]);
    hasher.update(user.as_bytes());
    hasher.update([0u8]);
    hasher.update(APP_SALT);
    hasher.finalize().into()
}

/// Symmetric cipher over one credential string.
#[derive(Clone)]
pub struct CredentialCipher {
    key: [u8; KEY_SIZE],
}

impl CredentialCipher {
    pub fn new() -> Self {
        Self {
            key: derive_machine_key(),
        }
    }

    /// Build a cipher over an explicit key (tests).
    pub fn with_key(key: [u8; KEY_SIZE]) -> Self {
        Self { key }
    }

    /// Encrypt `plaintext` into the stored record form `hex(iv):hex(cipher)`.
    ///
    /// A fresh random IV per call means the same plaintext never produces
    /// the same record twice.
    pub fn encrypt(&self, plaintext: &str) -> String {
        let mut iv = [0u8; IV_SIZE];
        rand::thread_rng().fill_bytes(&mut iv);

        let ciphertext = Aes256CbcEnc::new(&self.key.into(), &iv.into())
            .encrypt_padded_vec_mut::<Pkcs7>(plaintext.as_bytes());

        format!(
            "{}{}{}",
            hex::encode(iv),
            RECORD_DELIMITER,
            hex::encode(ciphertext)
        )
    }

    /// Decrypt a stored record back to the plaintext credential.
    ///
    /// On any failure (missing delimiter, bad hex, wrong IV length, key or
    /// padding mismatch) the input is returned unchanged. Legacy documents
    /// hold plaintext credentials and foreign documents hold records from
    /// another machine; both must survive a read untouched.
    pub fn decrypt(&self, record: &str) -> String {
        match self.try_decrypt(record) {
            Some(plaintext) => plaintext,
            None => {
                log::debug!("credential record not decryptable, passing through");
                record.to_string()
            }
        }
    }

    fn try_decrypt(&self, record: &str) -> Option<String> {
        let (iv_hex, cipher_hex) = record.split_once(RECORD_DELIMITER)?;
        let iv_bytes = hex::decode(iv_hex).ok()?;
        let iv: [u8; IV_SIZE] = iv_bytes.try_into().ok()?;
        let ciphertext = hex::decode(cipher_hex).ok()?;

        let plaintext = Aes256CbcDec::new(&self.key.into(), &iv.into())
            .decrypt_padded_vec_mut::<Pkcs7>(&ciphertext)
            .ok()?;
        String::from_utf8(plaintext).ok()
    }
}

impl Default for CredentialCipher {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_cipher() -> CredentialCipher {
        CredentialCipher::with_key([7u8; KEY_SIZE])
    }

    #[test]
    fn test_round_trip() {
        let cipher = test_cipher();
        let record = cipher.encrypt("sk-ant-abc123");
        assert_ne!(record, "sk-ant-abc123");
        assert!(record.contains(':'));
        assert_eq!(cipher.decrypt(&record), "sk-ant-abc123");
    }

    #[test]
    fn test_fresh_iv_per_call() {
        let cipher = test_cipher();
        let a = cipher.encrypt("same-secret");
        let b = cipher.encrypt("same-secret");
        assert_ne!(a, b);
        assert_eq!(cipher.decrypt(&a), "same-secret");
        assert_eq!(cipher.decrypt(&b), "same-secret");
    }

    #[test]
    fn test_empty_and_non_ascii_round_trip() {
        let cipher = test_cipher();
        for s in ["", "密钥-ключ-🔑", "sk-1'2"] {
            let record = cipher.encrypt(s);
            assert_eq!(cipher.decrypt(&record), s);
        }
    }

    #[test]
    fn test_malformed_record_passes_through() {
        let cipher = test_cipher();
        for junk in [
            "not-a-valid-record",
            "sk-plaintext-legacy-key",
            "",
            "zz:zz",
            "abcd:1234",
            ":",
        ] {
            assert_eq!(cipher.decrypt(junk), junk);
        }
    }

    #[test]
    fn test_wrong_key_passes_through() {
        let record = test_cipher().encrypt("secret");
        let other = CredentialCipher::with_key([9u8; KEY_SIZE]);
        // Wrong key either fails padding (falls back to the input) or
        // yields garbage; it never yields the plaintext.
        assert_ne!(other.decrypt(&record), "secret");
    }

    #[test]
    fn test_machine_key_is_stable() {
        assert_eq!(derive_machine_key(), derive_machine_key());
    }
}
