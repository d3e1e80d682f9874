//! # Unique Document Identifiers
//!
//! Every content and settings payload of a block is addressed by a UDI of the
//! form `umb://element/<32 hex digits>`. Layout entries reference payloads only
//! through these identifiers.

use crate::{ModelError, ModelResult};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

const SCHEME: &str = "umb://";

/// Entity type used for block content and settings payloads
pub const ELEMENT_ENTITY_TYPE: &str = "element";

/// Identifier of a single payload (`umb://<entity type>/<key>`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Udi {
    entity_type: String,
    key: Uuid,
}

impl Udi {
    /// Creates a fresh, globally unique element UDI.
    #[must_use]
    pub fn new_element() -> Self {
        Self::from_key(ELEMENT_ENTITY_TYPE, Uuid::new_v4())
    }

    #[must_use]
    pub fn from_key(entity_type: impl Into<String>, key: Uuid) -> Self {
        Self {
            entity_type: entity_type.into(),
            key,
        }
    }

    /// Parses a UDI string. The key part accepts both the simple and the
    /// hyphenated GUID form.
    pub fn parse(s: &str) -> ModelResult<Self> {
        let rest = s
            .strip_prefix(SCHEME)
            .ok_or_else(|| ModelError::InvalidUdi(s.to_string()))?;

        let (entity_type, key) = rest
            .split_once('/')
            .ok_or_else(|| ModelError::InvalidUdi(s.to_string()))?;

        if entity_type.is_empty() {
            return Err(ModelError::InvalidUdi(s.to_string()));
        }

        Ok(Self {
            entity_type: entity_type.to_string(),
            key: Uuid::parse_str(key)?,
        })
    }

    pub fn entity_type(&self) -> &str {
        &self.entity_type
    }

    /// The GUID part, used as the block's validation identity.
    pub fn key(&self) -> Uuid {
        self.key
    }
}

impl fmt::Display for Udi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}/{}", SCHEME, self.entity_type, self.key.simple())
    }
}

impl FromStr for Udi {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for Udi {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Udi {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Udi::parse(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_display() {
        let udi = Udi::parse("umb://element/1304e1ddac87439684fe8a399231cb3d").unwrap();
        assert_eq!(udi.entity_type(), "element");
        assert_eq!(
            udi.key(),
            Uuid::parse_str("1304E1DD-AC87-4396-84FE-8A399231CB3D").unwrap()
        );
        assert_eq!(udi.to_string(), "umb://element/1304e1ddac87439684fe8a399231cb3d");
    }

    #[test]
    fn test_parse_hyphenated_key() {
        let udi = Udi::parse("umb://element/1304e1dd-ac87-4396-84fe-8a399231cb3d").unwrap();
        assert_eq!(udi.to_string(), "umb://element/1304e1ddac87439684fe8a399231cb3d");
    }

    #[test]
    fn test_rejects_malformed() {
        assert!(Udi::parse("element/1304e1ddac87439684fe8a399231cb3d").is_err());
        assert!(Udi::parse("umb://element").is_err());
        assert!(Udi::parse("umb:///1304e1ddac87439684fe8a399231cb3d").is_err());
        assert!(Udi::parse("umb://element/not-a-guid").is_err());
    }

    #[test]
    fn test_new_elements_are_unique() {
        let a = Udi::new_element();
        let b = Udi::new_element();
        assert_ne!(a, b);
        assert_eq!(a.entity_type(), ELEMENT_ENTITY_TYPE);
    }

    #[test]
    fn test_serde_as_string() {
        let udi = Udi::parse("umb://element/1304e1ddac87439684fe8a399231cb3d").unwrap();
        let json = serde_json::to_string(&udi).unwrap();
        assert_eq!(json, "\"umb://element/1304e1ddac87439684fe8a399231cb3d\"");
        let back: Udi = serde_json::from_str(&json).unwrap();
        assert_eq!(back, udi);
    }
}
