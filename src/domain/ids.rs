//! UUID-backed identifiers for teams, members and invitations

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::storage::StorageKey;
use crate::domain::DomainError;

macro_rules! define_id_type {
    ($name:ident, $label:literal) => {
        #[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Generate a fresh random identifier
            pub fn generate() -> Self {
                Self(Uuid::new_v4().to_string())
            }

            /// Parse an identifier received from a client
            pub fn parse(value: &str) -> Result<Self, DomainError> {
                Uuid::parse_str(value)
                    .map(|uuid| Self(uuid.to_string()))
                    .map_err(|_| {
                        DomainError::invalid_id(format!("Invalid {} ID: '{}'", $label, value))
                    })
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.0
            }
        }

        impl StorageKey for $name {
            fn as_str(&self) -> &str {
                &self.0
            }
        }
    };
}

define_id_type!(TeamId, "team");
define_id_type!(MemberId, "member");
define_id_type!(InvitationId, "invitation");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_ids_are_unique() {
        assert_ne!(TeamId::generate(), TeamId::generate());
    }

    #[test]
    fn test_parse_round_trips_generated_id() {
        let id = MemberId::generate();
        let parsed = MemberId::parse(id.as_str()).unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn test_parse_normalizes_case() {
        let parsed = TeamId::parse("6F9619FF-8B86-D011-B42D-00C04FC964FF").unwrap();
        assert_eq!(parsed.as_str(), "6f9619ff-8b86-d011-b42d-00c04fc964ff");
    }

    #[test]
    fn test_parse_rejects_garbage() {
        let err = InvitationId::parse("42").unwrap_err();
        assert!(matches!(err, DomainError::InvalidId { .. }));
        assert_eq!(err.message(), "Invalid invitation ID: '42'");
    }
}
