//! Typed row identifiers.
//!
//! Each table uses a `BIGSERIAL` key. Wrapping them keeps a `DocumentId`
//! from being passed where a `PlaybookId` is expected.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! row_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl $name {
            /// Raw database value.
            pub fn get(self) -> i64 {
                self.0
            }
        }

        impl From<i64> for $name {
            fn from(id: i64) -> Self {
                Self(id)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

row_id!(
    /// Identifier of a source document.
    DocumentId
);
row_id!(
    /// Identifier of an extracted playbook.
    PlaybookId
);
row_id!(
    /// Identifier of a feedback entry.
    FeedbackId
);
