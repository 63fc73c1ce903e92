use std::fmt;

use serde::{Deserialize, Serialize};

// New Type Pattern -- https://doc.rust-lang.org/rust-by-example/generics/new_types.html
/// Primary key of a person row, assigned by the store and never reused
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(transparent)]
pub struct PersonId(pub i64);

impl PersonId {
    pub fn to_number(self) -> i64 {
        self.0
    }
}

impl fmt::Display for PersonId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// Values
/// Upper bound of both name columns, mirrored by the `VARCHAR(30)` columns
pub const NAME_MAX_LENGTH: usize = 30;

/// Rows inserted into an empty store on startup, in insertion order
pub const SEED_PEOPLE: [(&str, &str); 3] = [
    ("Alice", "Smith"),
    ("Bob", "Johnson"),
    ("Charlie", "Brown"),
];
