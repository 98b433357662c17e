//! Password hashing and verification.

use sha2::{Digest, Sha256};

/// The well-known default password that triggers auto-provisioning for an
/// unknown username at login.
pub const DEFAULT_PASSWORD: &str = "123456";

/// Hash a plaintext password to the stored hex digest form.
pub fn hash_password(password: &str) -> String {
   format!("{:x}", Sha256::digest(password.as_bytes()))
}

/// Check a plaintext password against a stored digest.
pub fn verify_password(password: &str, hashed: &str) -> bool {
   hash_password(password) == hashed
}

#[cfg(test)]
mod tests {
   use super::*;

   #[test]
   fn hash_is_deterministic_hex() {
      let h = hash_password("admin123");
      assert_eq!(h.len(), 64);
      assert_eq!(h, hash_password("admin123"));
      assert!(h.chars().all(|c| c.is_ascii_hexdigit()));
   }

   #[test]
   fn verify_accepts_matching_and_rejects_other() {
      let h = hash_password(DEFAULT_PASSWORD);
      assert!(verify_password(DEFAULT_PASSWORD, &h));
      assert!(!verify_password("1234567", &h));
   }
}
