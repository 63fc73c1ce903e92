use serde::{Deserialize, Serialize};

use crate::consts::consts::PersonId;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Person {
    pub id: PersonId,
    pub first_name: String,
    pub last_name: String,
}

impl Person {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// A person that has not been written yet, the store assigns the id
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct NewPerson {
    pub first_name: String,
    pub last_name: String,
}

impl NewPerson {
    pub fn new(first_name: impl Into<String>, last_name: impl Into<String>) -> Self {
        NewPerson {
            first_name: first_name.into(),
            last_name: last_name.into(),
        }
    }

    pub fn new_test() -> Self {
        NewPerson::new("Dana", "White")
    }

    pub fn with_id(self, id: PersonId) -> Person {
        Person {
            id,
            first_name: self.first_name,
            last_name: self.last_name,
        }
    }
}
