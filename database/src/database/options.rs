use std::path::PathBuf;

use uuid::Uuid;

#[derive(Debug, Clone, PartialEq)]
pub enum StorageEngine {
    /// SQLite file on disk, created if it does not exist
    File(PathBuf),
    /// Private in-memory SQLite database, discarded when the database thread stops
    Memory,
}

#[derive(Debug, Clone)]
pub struct DatabaseOptions {
    pub storage_engine: StorageEngine,
    pub seed: bool,
}

// Implements: https://rust-unofficial.github.io/patterns/patterns/creational/builder.html
impl DatabaseOptions {
    pub fn set_storage_engine(mut self, storage_engine: StorageEngine) -> Self {
        self.storage_engine = storage_engine;
        self
    }

    pub fn set_data_file(self, data_file: PathBuf) -> Self {
        self.set_storage_engine(StorageEngine::File(data_file))
    }

    /// Defines whether an empty table receives the default people on startup
    pub fn set_seed(mut self, seed: bool) -> Self {
        self.seed = seed;
        self
    }
}

impl Default for DatabaseOptions {
    fn default() -> Self {
        // Defaults to $CWD/database.db
        Self {
            storage_engine: StorageEngine::File(PathBuf::from("database.db")),
            seed: true,
        }
    }
}

impl DatabaseOptions {
    pub fn new_test() -> Self {
        DatabaseOptions::default().set_storage_engine(StorageEngine::Memory)
    }

    /// Unique file under the temp directory, for tests that reopen the same store
    pub fn new_test_file() -> Self {
        let database_file: PathBuf = std::env::temp_dir()
            .join("roster")
            .join(format!("{}.db", Uuid::new_v4()));

        DatabaseOptions::default().set_data_file(database_file)
    }
}
