//! Contact records stored in the table.

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const MAX_NAME_LEN: usize = 49;
pub const MAX_EMAIL_LEN: usize = 99;
pub const MAX_PHONE_LEN: usize = 14;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Name,
    Email,
    Phone,
}

impl Field {
    pub const fn max_len(self) -> usize {
        match self {
            Field::Name => MAX_NAME_LEN,
            Field::Email => MAX_EMAIL_LEN,
            Field::Phone => MAX_PHONE_LEN,
        }
    }
}

impl core::fmt::Display for Field {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(match self {
            Field::Name => "name",
            Field::Email => "email",
            Field::Phone => "phone",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordError {
    #[error("{field} is {len} bytes, at most {max} allowed", max = .field.max_len())]
    FieldTooLong { field: Field, len: usize },
}

/// The mutable part of a contact: everything except the key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawContactFields")]
pub struct ContactFields {
    name: String,
    email: String,
    phone: String,
}

// Deserialization goes through `ContactFields::new` so bounds are enforced.
#[derive(Deserialize)]
struct RawContactFields {
    name: String,
    email: String,
    phone: String,
}

impl TryFrom<RawContactFields> for ContactFields {
    type Error = RecordError;

    fn try_from(raw: RawContactFields) -> Result<Self, Self::Error> {
        ContactFields::new(raw.name, raw.email, raw.phone)
    }
}

impl ContactFields {
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        phone: impl Into<String>,
    ) -> Result<Self, RecordError> {
        let fields = Self {
            name: name.into(),
            email: email.into(),
            phone: phone.into(),
        };
        fields.check()?;
        Ok(fields)
    }

    fn check(&self) -> Result<(), RecordError> {
        for (field, text) in [
            (Field::Name, &self.name),
            (Field::Email, &self.email),
            (Field::Phone, &self.phone),
        ] {
            if text.len() > field.max_len() {
                return Err(RecordError::FieldTooLong {
                    field,
                    len: text.len(),
                });
            }
        }
        Ok(())
    }

    pub fn name(&self) -> &str {
        &self.name
    }
    pub fn email(&self) -> &str {
        &self.email
    }
    pub fn phone(&self) -> &str {
        &self.phone
    }
}

/// A contact keyed by an integer. The key is also the hash input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    key: i32,
    #[serde(flatten)]
    fields: ContactFields,
}

impl Record {
    pub fn new(
        key: i32,
        name: impl Into<String>,
        email: impl Into<String>,
        phone: impl Into<String>,
    ) -> Result<Self, RecordError> {
        Ok(Self::from_fields(key, ContactFields::new(name, email, phone)?))
    }

    pub fn from_fields(key: i32, fields: ContactFields) -> Self {
        Self { key, fields }
    }

    /// Builds a record whose key is derived from its name, the way bulk
    /// imports without explicit keys assign them.
    pub fn keyed_by_name(fields: ContactFields) -> Self {
        let key = key_from_name(fields.name());
        Self::from_fields(key, fields)
    }

    pub fn key(&self) -> i32 {
        self.key
    }
    pub fn name(&self) -> &str {
        self.fields.name()
    }
    pub fn email(&self) -> &str {
        self.fields.email()
    }
    pub fn phone(&self) -> &str {
        self.fields.phone()
    }
    pub fn fields(&self) -> &ContactFields {
        &self.fields
    }

    /// Replaces everything but the key; returns the previous fields.
    pub(crate) fn replace_fields(&mut self, fields: ContactFields) -> ContactFields {
        core::mem::replace(&mut self.fields, fields)
    }
}

/// Sum of the name's bytes, each read as a signed byte.
///
/// ASCII names sum to their code points. Bytes at or above 0x80 (any
/// non-ASCII UTF-8 sequence) count as negative, so keys assigned by the
/// existing contact files are reproduced.
pub fn key_from_name(name: &str) -> i32 {
    name.bytes()
        .fold(0i32, |acc, b| acc.wrapping_add(i32::from(b as i8)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_fields_at_their_limits() {
        let r = Record::new(
            1,
            "n".repeat(MAX_NAME_LEN),
            "e".repeat(MAX_EMAIL_LEN),
            "p".repeat(MAX_PHONE_LEN),
        )
        .unwrap();
        assert_eq!(r.key(), 1);
        assert_eq!(r.name().len(), MAX_NAME_LEN);
    }

    #[test]
    fn rejects_overlong_phone() {
        let err = Record::new(1, "Ana", "ana@example.com", "0".repeat(15)).unwrap_err();
        assert_eq!(
            err,
            RecordError::FieldTooLong {
                field: Field::Phone,
                len: 15
            }
        );
        assert_eq!(err.to_string(), "phone is 15 bytes, at most 14 allowed");
    }

    #[test]
    fn name_derived_key_is_byte_sum() {
        assert_eq!(key_from_name(""), 0);
        assert_eq!(key_from_name("Ana"), 65 + 110 + 97);
        let r = Record::keyed_by_name(ContactFields::new("Ana", "a@x", "1").unwrap());
        assert_eq!(r.key(), 272);
    }

    #[test]
    fn non_ascii_bytes_count_as_signed() {
        // "é" is 0xC3 0xA9 in UTF-8, i.e. -61 and -87 as signed bytes.
        assert_eq!(key_from_name("José"), 74 + 111 + 115 - 61 - 87);
        assert_eq!(key_from_name("José"), 152);
        assert!(key_from_name("ÉÉ") < 0);
    }

    #[test]
    fn replace_fields_keeps_key() {
        let mut r = Record::new(9, "Old", "old@x", "1").unwrap();
        let prev = r.replace_fields(ContactFields::new("New", "new@x", "2").unwrap());
        assert_eq!(prev.name(), "Old");
        assert_eq!(r.key(), 9);
        assert_eq!(r.name(), "New");
        assert_eq!(r.phone(), "2");
    }

    #[test]
    fn serializes_flat() {
        let r = Record::new(3, "Bo", "bo@x", "55").unwrap();
        let json = serde_json::to_value(&r).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "key": 3, "name": "Bo", "email": "bo@x", "phone": "55" })
        );
        let back: Record = serde_json::from_value(json).unwrap();
        assert_eq!(back, r);
    }

    #[test]
    fn deserialization_enforces_bounds() {
        let json = serde_json::json!({
            "key": 3,
            "name": "n".repeat(MAX_NAME_LEN + 1),
            "email": "e",
            "phone": "p",
        });
        assert!(serde_json::from_value::<Record>(json).is_err());
    }
}
