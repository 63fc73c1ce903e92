use std::{io, thread};

use flume::Receiver;
use rusqlite::{params, Connection, OptionalExtension};
use thiserror::Error;

use crate::{
    consts::consts::{PersonId, SEED_PEOPLE},
    database::request_manager::{DatabaseRequestAction, DatabaseResponseAction},
    model::{
        action::{Action, ActionResult},
        person::{NewPerson, Person},
    },
};

use super::{
    options::{DatabaseOptions, StorageEngine},
    request_manager::{DatabaseRequest, RequestManager},
};

#[derive(Error, Debug)]
pub enum ApplyError {
    #[error("Not found, record does not exist: {0}")]
    NotFound(PersonId),

    #[error("Store failure: {0}")]
    Store(#[from] rusqlite::Error),
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Unable to create the database directory: {0}")]
    UnableToCreateDirectory(io::Error),

    #[error("Unable to open the database: {0}")]
    UnableToOpen(rusqlite::Error),

    #[error("Unable to initialize the schema: {0}")]
    UnableToInitializeSchema(rusqlite::Error),

    #[error("Unable to seed the default people: {0}")]
    UnableToSeed(rusqlite::Error),
}

const CREATE_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS uzivatel (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        jmeno VARCHAR(30) NOT NULL,
        prijmeni VARCHAR(30) NOT NULL
    );
"#;

/// Record store for people, a single SQLite table
///
/// The connection is owned by whoever holds the `Database`. Once [`Database::run`] is called it moves
/// onto its own thread and is only reachable through the returned [`RequestManager`], so requests
/// are applied one at a time. Each mutation runs inside its own SQLite transaction.
pub struct Database {
    connection: Connection,
}

impl Database {
    /// Opens the store, creates the schema if absent and seeds an empty table
    pub fn new(options: DatabaseOptions) -> Result<Self, StorageError> {
        let connection = match &options.storage_engine {
            StorageEngine::File(path) => {
                if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                    std::fs::create_dir_all(parent)
                        .map_err(StorageError::UnableToCreateDirectory)?;
                }

                log::info!("Database Location: [{}]", path.display());

                Connection::open(path).map_err(StorageError::UnableToOpen)?
            }
            StorageEngine::Memory => {
                log::info!("Database Location: [in-memory]");

                Connection::open_in_memory().map_err(StorageError::UnableToOpen)?
            }
        };

        let mut database = Self { connection };

        database.init(options.seed)?;

        Ok(database)
    }

    // Called on start-up, idempotent
    fn init(&mut self, seed: bool) -> Result<(), StorageError> {
        self.connection
            .execute_batch(CREATE_TABLE)
            .map_err(StorageError::UnableToInitializeSchema)?;

        if !seed {
            return Ok(());
        }

        // Check-then-seed is not atomic across processes, startup is assumed to be single-process
        let count: i64 = self
            .connection
            .query_row("SELECT COUNT(*) FROM uzivatel", [], |row| row.get(0))
            .map_err(StorageError::UnableToSeed)?;

        if count > 0 {
            log::info!("📀 Data [Rows: {}]", count);
            return Ok(());
        }

        let transaction = self
            .connection
            .transaction()
            .map_err(StorageError::UnableToSeed)?;

        for (first_name, last_name) in SEED_PEOPLE {
            transaction
                .execute(
                    "INSERT INTO uzivatel (jmeno, prijmeni) VALUES (?1, ?2)",
                    params![first_name, last_name],
                )
                .map_err(StorageError::UnableToSeed)?;
        }

        transaction.commit().map_err(StorageError::UnableToSeed)?;

        log::info!("📀 Data [Rows: 0, Seeded: {}]", SEED_PEOPLE.len());

        Ok(())
    }

    /// Moves the database onto its own thread, returns the handle used to send it requests
    pub fn run(self) -> RequestManager {
        let (database_sender, database_receiver) = flume::unbounded::<DatabaseRequest>();

        thread::spawn(move || {
            let mut database = self;

            database.listen(database_receiver);
        });

        RequestManager::new(database_sender)
    }

    fn listen(&mut self, database_receiver: Receiver<DatabaseRequest>) {
        // Process incoming requests from the channel, stops once every sender is gone
        while let Ok(DatabaseRequest {
            action,
            response_sender,
        }) = database_receiver.recv()
        {
            log::debug!("Received request: {}", action.log_format());

            let action = match action {
                DatabaseRequestAction::Request(action) => action,
                DatabaseRequestAction::Shutdown => {
                    let _ = response_sender.send(DatabaseResponseAction::Response(
                        ActionResult::SuccessStatus("Successfully shutdown database".to_string()),
                    ));

                    return;
                }
            };

            let is_mutation = action.is_mutation();
            let log_format = action.log_format();

            let action_response = match self.process_action(action) {
                Ok(action_result) => {
                    if is_mutation {
                        log::info!("✅ Committed: {}", log_format);
                    }

                    DatabaseResponseAction::Response(action_result)
                }
                Err(err) => {
                    log::info!("⚠️  Rolled back: {} ({})", log_format, err);

                    DatabaseResponseAction::Rollback(err)
                }
            };

            // The caller may have timed out and dropped its receiver
            if response_sender.send(action_response).is_err() {
                log::warn!("Caller went away before receiving: {}", log_format);
            }
        }

        log::info!("Database channel closed, stopping");
    }

    pub fn process_action(&mut self, action: Action) -> Result<ActionResult, ApplyError> {
        match action {
            Action::Add(person) => self.insert(&person).map(ActionResult::Single),
            Action::Remove(id) => self.delete(id).map(|_| ActionResult::Removed(id)),
            Action::Get(id) => self.get(id).map(ActionResult::Single),
            Action::List => self.list_all().map(ActionResult::List),
        }
    }

    pub fn list_all(&self) -> Result<Vec<Person>, ApplyError> {
        let mut statement = self
            .connection
            .prepare_cached("SELECT id, jmeno, prijmeni FROM uzivatel ORDER BY id")?;

        let people = statement
            .query_map([], |row| {
                Ok(Person {
                    id: PersonId(row.get(0)?),
                    first_name: row.get(1)?,
                    last_name: row.get(2)?,
                })
            })?
            .collect::<Result<Vec<Person>, rusqlite::Error>>()?;

        Ok(people)
    }

    pub fn insert(&mut self, person: &NewPerson) -> Result<Person, ApplyError> {
        let transaction = self.connection.transaction()?;

        transaction.execute(
            "INSERT INTO uzivatel (jmeno, prijmeni) VALUES (?1, ?2)",
            params![person.first_name, person.last_name],
        )?;

        let id = PersonId(transaction.last_insert_rowid());

        transaction.commit()?;

        Ok(person.clone().with_id(id))
    }

    pub fn get(&self, id: PersonId) -> Result<Person, ApplyError> {
        self.connection
            .query_row(
                "SELECT id, jmeno, prijmeni FROM uzivatel WHERE id = ?1",
                params![id.to_number()],
                |row| {
                    Ok(Person {
                        id: PersonId(row.get(0)?),
                        first_name: row.get(1)?,
                        last_name: row.get(2)?,
                    })
                },
            )
            .optional()?
            .ok_or(ApplyError::NotFound(id))
    }

    pub fn delete(&mut self, id: PersonId) -> Result<(), ApplyError> {
        let transaction = self.connection.transaction()?;

        let removed = transaction.execute(
            "DELETE FROM uzivatel WHERE id = ?1",
            params![id.to_number()],
        )?;

        // Dropping the transaction without a commit rolls it back
        if removed == 0 {
            return Err(ApplyError::NotFound(id));
        }

        transaction.commit()?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        consts::consts::PersonId,
        database::options::DatabaseOptions,
        model::person::{NewPerson, Person},
    };

    use super::{ApplyError, Database};

    fn full_names(people: &[Person]) -> Vec<String> {
        people.iter().map(|person| person.full_name()).collect()
    }

    mod seed {
        use super::*;

        #[test_log::test]
        fn fresh_store_is_seeded_in_order() {
            let database = Database::new(DatabaseOptions::new_test()).unwrap();

            let people = database.list_all().unwrap();

            assert_eq!(
                full_names(&people),
                vec!["Alice Smith", "Bob Johnson", "Charlie Brown"]
            );
        }

        #[test_log::test]
        fn seeding_can_be_disabled() {
            let database = Database::new(DatabaseOptions::new_test().set_seed(false)).unwrap();

            assert!(database.list_all().unwrap().is_empty());
        }

        #[test_log::test]
        fn reopening_does_not_seed_twice() {
            let options = DatabaseOptions::new_test_file();

            {
                let mut database = Database::new(options.clone()).unwrap();
                database.insert(&NewPerson::new_test()).unwrap();
            }

            let database = Database::new(options).unwrap();

            assert_eq!(
                full_names(&database.list_all().unwrap()),
                vec!["Alice Smith", "Bob Johnson", "Charlie Brown", "Dana White"],
                "Existing rows should survive a restart without being seeded again"
            );
        }

        #[test_log::test]
        fn emptied_store_is_seeded_on_next_start() {
            let options = DatabaseOptions::new_test_file();

            {
                let mut database = Database::new(options.clone()).unwrap();
                for person in database.list_all().unwrap() {
                    database.delete(person.id).unwrap();
                }
            }

            let database = Database::new(options).unwrap();
            let people = database.list_all().unwrap();

            assert_eq!(people.len(), 3);
            assert_eq!(
                people.first().map(|person| person.id),
                Some(PersonId(4)),
                "Ids of deleted rows are not handed out again"
            );
        }
    }

    mod add {
        use super::*;

        #[test_log::test]
        fn add_happy_path() {
            let mut database = Database::new(DatabaseOptions::new_test()).unwrap();

            let person = database.insert(&NewPerson::new_test()).unwrap();

            assert_eq!(person.id, PersonId(4));
            assert_eq!(person.full_name(), "Dana White");
            assert_eq!(database.get(person.id).unwrap(), person);
        }

        #[test_log::test]
        fn ids_are_never_reused() {
            let mut database = Database::new(DatabaseOptions::new_test()).unwrap();

            let first = database.insert(&NewPerson::new("Eve", "Black")).unwrap();
            database.delete(first.id).unwrap();

            let second = database.insert(&NewPerson::new("Eve", "Black")).unwrap();

            assert!(
                second.id > first.id,
                "A deleted id should not be assigned again: {} <= {}",
                second.id,
                first.id
            );
        }
    }

    mod remove {
        use super::*;

        #[test_log::test]
        fn remove_happy_path() {
            let mut database = Database::new(DatabaseOptions::new_test()).unwrap();

            database.delete(PersonId(1)).unwrap();

            assert_eq!(
                full_names(&database.list_all().unwrap()),
                vec!["Bob Johnson", "Charlie Brown"]
            );
        }

        #[test_log::test]
        fn remove_missing() {
            let mut database = Database::new(DatabaseOptions::new_test()).unwrap();

            let result = database.delete(PersonId(99));

            assert!(matches!(result, Err(ApplyError::NotFound(PersonId(99)))));
            assert_eq!(database.list_all().unwrap().len(), 3);
        }

        #[test_log::test]
        fn remove_twice() {
            let mut database = Database::new(DatabaseOptions::new_test()).unwrap();

            database.delete(PersonId(2)).unwrap();

            assert!(matches!(
                database.delete(PersonId(2)),
                Err(ApplyError::NotFound(PersonId(2)))
            ));
        }
    }

    mod get {
        use super::*;

        #[test_log::test]
        fn get_missing() {
            let database = Database::new(DatabaseOptions::new_test()).unwrap();

            assert!(matches!(
                database.get(PersonId(42)),
                Err(ApplyError::NotFound(PersonId(42)))
            ));
        }
    }

    mod list {
        use super::*;

        #[test_log::test]
        fn listing_is_idempotent() {
            let database = Database::new(DatabaseOptions::new_test()).unwrap();

            assert_eq!(database.list_all().unwrap(), database.list_all().unwrap());
        }

        #[test_log::test]
        fn list_follows_insertion_order() {
            let mut database = Database::new(DatabaseOptions::new_test().set_seed(false)).unwrap();

            for (first_name, last_name) in [("Zed", "Adams"), ("Amy", "Zimmer")] {
                database
                    .insert(&NewPerson::new(first_name, last_name))
                    .unwrap();
            }

            assert_eq!(
                full_names(&database.list_all().unwrap()),
                vec!["Zed Adams", "Amy Zimmer"]
            );
        }
    }
}
