//! Passphrase sealing for the on-disk cycle history.
//!
//! Sealed layout: `salt (32) || nonce (12) || AES-256-GCM ciphertext`. The plaintext
//! is prefixed with [`HEADER`], which must be present after decryption. A failed tag
//! and a missing header both surface as [`CryptoError::Open`]; the two causes are
//! not distinguished.

use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Nonce,
};
use argon2::{Algorithm, Argon2, Params, Version};
use rand::{rngs::OsRng, RngCore};
use zeroize::Zeroizing;

const SALT_LEN: usize = 32;
const NONCE_LEN: usize = 12;
const KEY_LEN: usize = 32;
const HEADER: &[u8] = b"HERCYCLE_V1";

/// Argon2id cost: 64 MiB, 3 passes, single lane.
#[cfg(not(test))]
const KDF_MEMORY_KIB: u32 = 64 * 1024;
#[cfg(test)]
const KDF_MEMORY_KIB: u32 = 1024;
const KDF_PASSES: u32 = 3;
const KDF_LANES: u32 = 1;

#[derive(Debug, thiserror::Error)]
pub enum CryptoError {
    #[error("could not derive a key from the passphrase")]
    KeyDerivation,
    #[error("sealing failed")]
    Seal,
    #[error("wrong passphrase or damaged data")]
    Open,
    #[error("sealed data is truncated")]
    Truncated,
}

fn derive_key(passphrase: &str, salt: &[u8]) -> Result<Zeroizing<[u8; KEY_LEN]>, CryptoError> {
    let params = Params::new(KDF_MEMORY_KIB, KDF_PASSES, KDF_LANES, Some(KEY_LEN))
        .map_err(|_| CryptoError::KeyDerivation)?;
    let mut key = Zeroizing::new([0u8; KEY_LEN]);
    Argon2::new(Algorithm::Argon2id, Version::V0x13, params)
        .hash_password_into(passphrase.as_bytes(), salt, &mut key[..])
        .map_err(|_| CryptoError::KeyDerivation)?;
    Ok(key)
}

fn cipher_for(passphrase: &str, salt: &[u8]) -> Result<Aes256Gcm, CryptoError> {
    let key = derive_key(passphrase, salt)?;
    Aes256Gcm::new_from_slice(&key[..]).map_err(|_| CryptoError::KeyDerivation)
}

/// Encrypt `plaintext` under a fresh salt and nonce.
pub fn seal(passphrase: &str, plaintext: &[u8]) -> Result<Vec<u8>, CryptoError> {
    let mut salt = [0u8; SALT_LEN];
    let mut nonce = [0u8; NONCE_LEN];
    OsRng.fill_bytes(&mut salt);
    OsRng.fill_bytes(&mut nonce);

    let cipher = cipher_for(passphrase, &salt)?;

    let mut framed = Zeroizing::new(Vec::with_capacity(HEADER.len() + plaintext.len()));
    framed.extend_from_slice(HEADER);
    framed.extend_from_slice(plaintext);

    let ciphertext = cipher
        .encrypt(Nonce::from_slice(&nonce), framed.as_slice())
        .map_err(|_| CryptoError::Seal)?;

    let mut sealed = Vec::with_capacity(SALT_LEN + NONCE_LEN + ciphertext.len());
    sealed.extend_from_slice(&salt);
    sealed.extend_from_slice(&nonce);
    sealed.extend_from_slice(&ciphertext);
    Ok(sealed)
}

/// Reverse of [`seal`]. The returned buffer is wiped when dropped.
pub fn open(passphrase: &str, sealed: &[u8]) -> Result<Zeroizing<Vec<u8>>, CryptoError> {
    if sealed.len() < SALT_LEN + NONCE_LEN + HEADER.len() {
        return Err(CryptoError::Truncated);
    }
    let (salt, rest) = sealed.split_at(SALT_LEN);
    let (nonce, ciphertext) = rest.split_at(NONCE_LEN);

    let cipher = cipher_for(passphrase, salt)?;
    let framed = Zeroizing::new(
        cipher
            .decrypt(Nonce::from_slice(nonce), ciphertext)
            .map_err(|_| CryptoError::Open)?,
    );

    match framed.strip_prefix(HEADER) {
        Some(body) => Ok(Zeroizing::new(body.to_vec())),
        None => Err(CryptoError::Open),
    }
}
