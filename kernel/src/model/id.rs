use serde::{Deserialize, Serialize};
use std::fmt;

// Meetings are keyed by a transaction hash until deployment and by the
// contract address afterwards; users by their wallet address.
macro_rules! define_id {
    ($id_type: ident) => {
        #[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $id_type(String);

        impl $id_type {
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }

            pub fn is_empty(&self) -> bool {
                self.0.is_empty()
            }
        }

        impl fmt::Display for $id_type {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<String> for $id_type {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl From<&str> for $id_type {
            fn from(value: &str) -> Self {
                Self(value.to_owned())
            }
        }

        impl From<$id_type> for String {
            fn from(value: $id_type) -> Self {
                value.0
            }
        }
    };
}

define_id!(MeetingId);
define_id!(UserId);
