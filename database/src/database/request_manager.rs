use flume::Sender;
use thiserror::Error;

use crate::{
    consts::consts::PersonId,
    model::{
        action::{Action, ActionResult},
        person::{NewPerson, Person},
    },
};

use super::database::ApplyError;

pub enum DatabaseRequestAction {
    Request(Action),
    Shutdown,
}

impl DatabaseRequestAction {
    pub fn log_format(&self) -> String {
        match self {
            DatabaseRequestAction::Request(action) => action.log_format(),
            DatabaseRequestAction::Shutdown => "Shutdown".to_string(),
        }
    }
}

#[derive(Debug)]
pub enum DatabaseResponseAction {
    Response(ActionResult),
    Rollback(ApplyError),
}

pub struct DatabaseRequest {
    pub response_sender: oneshot::Sender<DatabaseResponseAction>,
    pub action: DatabaseRequestAction,
}

#[derive(Error, Debug)]
pub enum RequestManagerError {
    #[error("Database is not running")]
    DatabaseUnavailable,
    #[error(transparent)]
    Apply(#[from] ApplyError),
    #[error("Unexpected database response to: {0}")]
    UnexpectedResult(String),
}

/// Handle used by the rest of the application to talk to the database thread
///
/// Every call is a blocking round trip: the request is queued on the database channel and the caller
/// waits for the answer on a oneshot channel. Handles are cheap to clone, one per worker is fine.
#[derive(Clone)]
pub struct RequestManager {
    database_sender: Sender<DatabaseRequest>,
}

impl RequestManager {
    pub fn new(database_sender: Sender<DatabaseRequest>) -> Self {
        Self { database_sender }
    }

    pub fn send_add(&self, person: NewPerson) -> Result<Person, RequestManagerError> {
        let action = Action::Add(person);

        match self.send_single_action(action.clone())? {
            ActionResult::Single(person) => Ok(person),
            _ => Err(RequestManagerError::UnexpectedResult(action.log_format())),
        }
    }

    pub fn send_get(&self, id: PersonId) -> Result<Person, RequestManagerError> {
        let action = Action::Get(id);

        match self.send_single_action(action.clone())? {
            ActionResult::Single(person) => Ok(person),
            _ => Err(RequestManagerError::UnexpectedResult(action.log_format())),
        }
    }

    pub fn send_remove(&self, id: PersonId) -> Result<PersonId, RequestManagerError> {
        let action = Action::Remove(id);

        match self.send_single_action(action.clone())? {
            ActionResult::Removed(id) => Ok(id),
            _ => Err(RequestManagerError::UnexpectedResult(action.log_format())),
        }
    }

    pub fn send_list(&self) -> Result<Vec<Person>, RequestManagerError> {
        match self.send_single_action(Action::List)? {
            ActionResult::List(people) => Ok(people),
            _ => Err(RequestManagerError::UnexpectedResult(
                Action::List.log_format(),
            )),
        }
    }

    /// Sends a shutdown request to the database and returns the database's response
    pub fn send_shutdown_request(&self) -> Result<String, RequestManagerError> {
        match self.send_database_request(DatabaseRequestAction::Shutdown)? {
            ActionResult::SuccessStatus(status) => Ok(status),
            _ => Err(RequestManagerError::UnexpectedResult(
                "Shutdown".to_string(),
            )),
        }
    }

    /// Sends a single action to the database and returns a single action result
    pub fn send_single_action(&self, action: Action) -> Result<ActionResult, RequestManagerError> {
        self.send_database_request(DatabaseRequestAction::Request(action))
    }

    pub fn send_database_request(
        &self,
        database_request: DatabaseRequestAction,
    ) -> Result<ActionResult, RequestManagerError> {
        let (response_sender, response_receiver) = oneshot::channel::<DatabaseResponseAction>();

        let request = DatabaseRequest {
            response_sender,
            action: database_request,
        };

        // Sends the request to the database worker, database will respond
        //  on the response_receiver once it has finished processing the request
        self.database_sender
            .send(request)
            .map_err(|_| RequestManagerError::DatabaseUnavailable)?;

        // Waits without a deadline, a mutation stuck on a locked file still commits and the
        //  reply must say so
        match response_receiver.recv() {
            Ok(DatabaseResponseAction::Response(action_result)) => Ok(action_result),
            Ok(DatabaseResponseAction::Rollback(err)) => Err(RequestManagerError::Apply(err)),
            Err(oneshot::RecvError) => Err(RequestManagerError::DatabaseUnavailable),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{thread, time::Duration};

    use crate::database::{
        database::Database,
        options::{DatabaseOptions, StorageEngine},
    };

    use super::*;

    #[test_log::test]
    fn crud_round_trip() {
        let request_manager = Database::new(DatabaseOptions::new_test()).unwrap().run();

        let added = request_manager.send_add(NewPerson::new_test()).unwrap();

        assert_eq!(request_manager.send_get(added.id).unwrap(), added);
        assert_eq!(request_manager.send_list().unwrap().len(), 4);

        assert_eq!(request_manager.send_remove(added.id).unwrap(), added.id);
        assert_eq!(request_manager.send_list().unwrap().len(), 3);
    }

    #[test_log::test]
    fn missing_person_is_not_found() {
        let request_manager = Database::new(DatabaseOptions::new_test()).unwrap().run();

        let result = request_manager.send_remove(PersonId(404));

        assert!(
            matches!(
                result,
                Err(RequestManagerError::Apply(ApplyError::NotFound(PersonId(404))))
            ),
            "Removing an unknown id should surface NotFound, got {:?}",
            result
        );
    }

    #[test_log::test]
    fn requests_after_shutdown_fail() {
        let request_manager = Database::new(DatabaseOptions::new_test()).unwrap().run();

        assert_eq!(
            request_manager.send_shutdown_request().unwrap(),
            "Successfully shutdown database"
        );

        assert!(matches!(
            request_manager.send_list(),
            Err(RequestManagerError::DatabaseUnavailable)
        ));
    }

    #[test_log::test]
    fn add_waits_for_a_locked_file_and_reports_the_commit() {
        let options = DatabaseOptions::new_test_file();
        let path = match &options.storage_engine {
            StorageEngine::File(path) => path.clone(),
            StorageEngine::Memory => unreachable!(),
        };

        let request_manager = Database::new(options).unwrap().run();

        let other = rusqlite::Connection::open(&path).unwrap();
        other.execute_batch("BEGIN EXCLUSIVE").unwrap();

        let holder = thread::spawn(move || {
            thread::sleep(Duration::from_millis(2500));
            other.execute_batch("COMMIT").unwrap();
        });

        let added = request_manager
            .send_add(NewPerson::new("Eve", "Black"))
            .unwrap();

        holder.join().unwrap();

        assert_eq!(added.full_name(), "Eve Black");
        assert_eq!(
            request_manager.send_list().unwrap().last(),
            Some(&added)
        );
    }
}
