//! In-process secret stores.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use super::SecretStore;
use crate::error::{Result, StoreError};

/// Process-local store. Clones share the same entries.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    entries: Arc<Mutex<HashMap<(String, String), String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored secrets.
    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<(String, String), String>>> {
        self.entries
            .lock()
            .map_err(|_| StoreError::Backend("memory store poisoned".to_string()).into())
    }
}

impl SecretStore for MemoryStore {
    fn get(&self, service: &str, user: &str) -> Result<Option<String>> {
        Ok(self
            .lock()?
            .get(&(service.to_string(), user.to_string()))
            .cloned())
    }

    fn set(&self, service: &str, user: &str, value: &str) -> Result<()> {
        self.lock()?
            .insert((service.to_string(), user.to_string()), value.to_string());
        Ok(())
    }

    fn delete(&self, service: &str, user: &str) -> Result<()> {
        self.lock()?
            .remove(&(service.to_string(), user.to_string()));
        Ok(())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}

/// A store that is never reachable. Keys fall back to the key file.
#[derive(Debug, Default, Clone, Copy)]
pub struct Disabled;

impl SecretStore for Disabled {
    fn get(&self, _service: &str, _user: &str) -> Result<Option<String>> {
        Err(StoreError::Unavailable("secret store disabled".to_string()).into())
    }

    fn set(&self, _service: &str, _user: &str, _value: &str) -> Result<()> {
        Err(StoreError::Unavailable("secret store disabled".to_string()).into())
    }

    fn delete(&self, _service: &str, _user: &str) -> Result<()> {
        Ok(())
    }

    fn name(&self) -> &'static str {
        "disabled"
    }
}
