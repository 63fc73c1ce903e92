use serde::{Deserialize, Serialize};

use crate::consts::consts::PersonId;

use super::person::{NewPerson, Person};

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub enum Action {
    Add(NewPerson),
    Remove(PersonId),
    Get(PersonId),
    /// Returns every person in id order
    List,
}

impl Action {
    pub fn is_mutation(&self) -> bool {
        match self {
            Action::Add(_) | Action::Remove(_) => true,
            Action::Get(_) | Action::List => false,
        }
    }

    pub fn log_format(&self) -> String {
        match self {
            Action::Add(person) => {
                format!("Add [{} {}]", person.first_name, person.last_name)
            }
            Action::Remove(id) => format!("Remove [id: {}]", id),
            Action::Get(id) => format!("Get [id: {}]", id),
            Action::List => "List".to_string(),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub enum ActionResult {
    /// Used for database status messages
    SuccessStatus(String),
    Single(Person),
    Removed(PersonId),
    List(Vec<Person>),
}
