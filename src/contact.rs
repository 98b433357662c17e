//! Guardian-contact blob encoding.
//!
//! Contact details (email, address) live in the students table as a JSON
//! blob in the `family_info` column. Older records used `email|address`
//! delimiter encoding or a bare text value; decoding tolerates all three and
//! defaults to empty strings.

use serde::{Deserialize, Serialize};

/// Guardian contact details stored alongside a student.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuardianContact {
   #[serde(default)]
   pub email: String,
   #[serde(default)]
   pub address: String,
}

impl GuardianContact {
   pub fn new(email: impl Into<String>, address: impl Into<String>) -> Self {
      Self {
         email: email.into(),
         address: address.into(),
      }
   }

   /// Encode as the JSON blob stored in `family_info`.
   pub fn encode(&self) -> String {
      // Two plain string fields; serialization cannot fail.
      serde_json::to_string(self).unwrap_or_default()
   }

   /// Decode a `family_info` blob, falling back from JSON to the legacy
   /// `email|address` delimiter form, then to a bare-text heuristic
   /// (`@` means email, anything else is an address).
   pub fn decode(blob: &str) -> Self {
      if blob.is_empty() {
         return Self::default();
      }
      if let Ok(parsed) = serde_json::from_str::<GuardianContact>(blob) {
         return parsed;
      }
      if let Some((email, address)) = blob.split_once('|') {
         return Self::new(email, address);
      }
      if blob.contains('@') {
         Self::new(blob, "")
      } else {
         Self::new("", blob)
      }
   }
}

#[cfg(test)]
mod tests {
   use super::*;

   #[test]
   fn round_trips_through_json() {
      let contact = GuardianContact::new("a@b.example", "12 Main St");
      assert_eq!(GuardianContact::decode(&contact.encode()), contact);
   }

   #[test]
   fn empty_blob_decodes_to_defaults() {
      assert_eq!(GuardianContact::decode(""), GuardianContact::default());
   }

   #[test]
   fn legacy_delimiter_form_is_parsed() {
      let contact = GuardianContact::decode("a@b.example|12 Main St");
      assert_eq!(contact.email, "a@b.example");
      assert_eq!(contact.address, "12 Main St");
   }

   #[test]
   fn legacy_delimiter_splits_only_once() {
      let contact = GuardianContact::decode("a@b.example|12 Main St | Apt 3");
      assert_eq!(contact.email, "a@b.example");
      assert_eq!(contact.address, "12 Main St | Apt 3");
   }

   #[test]
   fn bare_text_with_at_sign_is_an_email() {
      let contact = GuardianContact::decode("someone@example.com");
      assert_eq!(contact.email, "someone@example.com");
      assert_eq!(contact.address, "");
   }

   #[test]
   fn bare_text_without_at_sign_is_an_address() {
      let contact = GuardianContact::decode("12 Main St");
      assert_eq!(contact.email, "");
      assert_eq!(contact.address, "12 Main St");
   }

   #[test]
   fn json_with_missing_fields_uses_defaults() {
      let contact = GuardianContact::decode("{}");
      assert_eq!(contact, GuardianContact::default());
   }
}
