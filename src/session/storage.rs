//! Session-scoped key/value storage for the credential token

use std::collections::HashMap;
use std::sync::RwLock;

/// Key under which the API token is stored
pub const TOKEN_KEY: &str = "api_token";

/// Storage that lives exactly as long as the operator's session
pub trait SessionStorage: Send + Sync {
    /// Read a value
    fn get(&self, key: &str) -> Option<String>;
    /// Write a value; empty values are ignored
    fn set(&self, key: &str, value: &str);
    /// Delete a value
    fn remove(&self, key: &str);
}

/// In-memory storage; the process lifetime is the session
#[derive(Debug, Default)]
pub struct MemorySessionStorage {
    values: RwLock<HashMap<String, String>>,
}

impl MemorySessionStorage {
    /// Create empty storage
    pub fn new() -> Self {
        Self::default()
    }

    /// Create storage that already holds a token, as after a page reload
    pub fn with_token(token: &str) -> Self {
        let storage = Self::new();
        storage.set(TOKEN_KEY, token);
        storage
    }
}

impl SessionStorage for MemorySessionStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.values
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(key)
            .cloned()
    }

    fn set(&self, key: &str, value: &str) {
        if value.is_empty() {
            return;
        }
        self.values
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(key.to_string(), value.to_string());
    }

    fn remove(&self, key: &str) {
        self.values
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .remove(key);
    }
}
