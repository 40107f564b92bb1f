use crate::types::RedisValue;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// A single numbered database.
#[derive(Debug, Default)]
pub struct Database {
    data: HashMap<String, RedisValue>,
}

impl Database {
    pub fn new() -> Self {
        Database {
            data: HashMap::new(),
        }
    }

    pub fn get(&self, key: &str) -> Option<&RedisValue> {
        self.data.get(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut RedisValue> {
        self.data.get_mut(key)
    }

    /// Set a key-value pair, replacing any previous value.
    pub fn set(&mut self, key: String, value: RedisValue) {
        self.data.insert(key, value);
    }

    /// Delete a key. Returns true if it existed.
    pub fn del(&mut self, key: &str) -> bool {
        self.data.remove(key).is_some()
    }

    pub fn exists(&self, key: &str) -> bool {
        self.data.contains_key(key)
    }

    /// Get the type of a key.
    pub fn key_type(&self, key: &str) -> Option<&'static str> {
        self.get(key).map(|v| v.type_name())
    }

    pub fn dbsize(&self) -> usize {
        self.data.len()
    }

    pub fn flush(&mut self) {
        self.data.clear();
    }
}

/// The complete data store: every numbered database.
#[derive(Debug)]
pub struct DataStore {
    pub databases: Vec<Database>,
}

impl DataStore {
    pub fn new(num_databases: usize) -> Self {
        let mut databases = Vec::with_capacity(num_databases);
        for _ in 0..num_databases {
            databases.push(Database::new());
        }
        DataStore { databases }
    }

    pub fn db(&mut self, index: usize) -> &mut Database {
        &mut self.databases[index]
    }

    pub fn flush_all(&mut self) {
        for db in &mut self.databases {
            db.flush();
        }
    }
}

/// The store lock is the only synchronization the data structures get:
/// commands that mutate take the write guard, the rest take the read guard.
pub type SharedStore = Arc<RwLock<DataStore>>;

pub fn shared(num_databases: usize) -> SharedStore {
    Arc::new(RwLock::new(DataStore::new(num_databases)))
}
