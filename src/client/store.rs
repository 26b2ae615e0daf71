use std::{collections::HashMap, sync::{Arc, Mutex}};

pub const JWT_TOKEN_KEY: &str = "jwt_token";
pub const USER_EMAIL_KEY: &str = "user_email";

pub type DynKeyValueStore = Arc<dyn KeyValueStore + Send + Sync>;

///
/// Client-side persistent storage, the equivalent of a browser's local storage
/// 
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: String);
    fn remove(&self, key: &str);
}

#[derive(Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new_dyn() -> DynKeyValueStore {
        Arc::new(MemoryStore::default())
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        let values = self.values.lock().unwrap_or_else(|e| e.into_inner());
        values.get(key).cloned()
    }

    fn set(&self, key: &str, value: String) {
        let mut values = self.values.lock().unwrap_or_else(|e| e.into_inner());
        values.insert(key.to_string(), value);
    }

    fn remove(&self, key: &str) {
        let mut values = self.values.lock().unwrap_or_else(|e| e.into_inner());
        values.remove(key);
    }
}
