//! Password hashing for new accounts.

use argon2::{password_hash::SaltString, Argon2, PasswordHash, PasswordVerifier};
use rand_core::OsRng;
use registrar_core::{Error, Result};

/// Turns a plaintext password into the string stored in `users.password`.
pub trait PasswordHasher {
  fn hash(&self, password: &str) -> Result<String>;
}

/// Argon2id with default parameters, producing a PHC string such as
/// `$argon2id$v=19$…`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Argon2Hasher;

impl PasswordHasher for Argon2Hasher {
  fn hash(&self, password: &str) -> Result<String> {
    use argon2::PasswordHasher as _;

    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
      .hash_password(password.as_bytes(), &salt)
      .map(|hash| hash.to_string())
      .map_err(|e| Error::Hash(e.to_string()))
  }
}

/// Check `password` against a stored PHC string.
pub fn verify(password: &str, phc: &str) -> Result<bool> {
  let parsed = PasswordHash::new(phc).map_err(|e| Error::Hash(e.to_string()))?;
  Ok(Argon2::default().verify_password(password.as_bytes(), &parsed).is_ok())
}
