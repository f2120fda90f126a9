use crate::models::AdminUser;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

pub const TOKEN_KEY: &str = "authToken";
pub const USER_KEY: &str = "user";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("storage write failed for `{key}`: {message}")]
pub struct StorageError {
    pub key: String,
    pub message: String,
}

/// String key/value persistence.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&self, key: &str);
}

/// The browser's `localStorage`. Missing storage (private mode, no window)
/// reads as empty and fails writes.
#[derive(Clone, Copy, Debug, Default)]
pub struct BrowserStorage;

impl BrowserStorage {
    fn storage() -> Option<web_sys::Storage> {
        web_sys::window().and_then(|w| w.local_storage().ok().flatten())
    }
}

impl KeyValueStore for BrowserStorage {
    fn get(&self, key: &str) -> Option<String> {
        Self::storage()?.get_item(key).ok().flatten()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let failed = |message: String| StorageError {
            key: key.to_string(),
            message,
        };
        let storage = Self::storage().ok_or_else(|| failed("localStorage unavailable".into()))?;
        storage
            .set_item(key, value)
            .map_err(|e| failed(format!("{e:?}")))
    }

    fn remove(&self, key: &str) {
        if let Some(storage) = Self::storage() {
            let _ = storage.remove_item(key);
        }
    }
}

/// Process-local store. Clones share the same map.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) {
        self.entries().remove(key);
    }
}

/// Persisted `(token, user)` pair.
///
/// Readers only ever see both values or neither: a half-written pair, or a
/// user blob that no longer parses, is wiped on load.
pub struct SessionStore {
    backend: Box<dyn KeyValueStore>,
}

impl SessionStore {
    pub fn new(backend: impl KeyValueStore + 'static) -> Self {
        Self {
            backend: Box::new(backend),
        }
    }

    pub fn load(&self) -> Option<(String, AdminUser)> {
        let token = self.backend.get(TOKEN_KEY).filter(|t| !t.trim().is_empty());
        let user_json = self.backend.get(USER_KEY);

        match (token, user_json) {
            (None, None) => None,
            (Some(token), Some(json)) => match serde_json::from_str::<AdminUser>(&json) {
                Ok(user) => Some((token, user)),
                Err(e) => {
                    tracing::warn!(error = %e, "stored user is unreadable; clearing session");
                    self.clear();
                    None
                }
            },
            _ => {
                tracing::warn!("stored session is incomplete; clearing session");
                self.clear();
                None
            }
        }
    }

    pub fn save(&self, token: &str, user: &AdminUser) -> Result<(), StorageError> {
        let json = serde_json::to_string(user).map_err(|e| StorageError {
            key: USER_KEY.to_string(),
            message: e.to_string(),
        })?;

        let written = self
            .backend
            .set(USER_KEY, &json)
            .and_then(|()| self.backend.set(TOKEN_KEY, token));
        if written.is_err() {
            self.clear();
        }
        written
    }

    pub fn clear(&self) {
        self.backend.remove(TOKEN_KEY);
        self.backend.remove(USER_KEY);
    }

    pub fn token(&self) -> Option<String> {
        self.load().map(|(token, _)| token)
    }
}


#[cfg(all(test, target_arch = "wasm32"))]
mod wasm_tests {
    use super::*;
    use crate::models::RecordId;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn local_storage_roundtrip() {
        let store = SessionStore::new(BrowserStorage);
        store.clear();
        assert!(store.load().is_none());

        let user = AdminUser {
            id: RecordId::Number(1),
            name: "Admin".into(),
            email: "a@b.com".into(),
            role: "admin".into(),
        };
        store.save("t1", &user).expect("localStorage should accept writes");
        assert_eq!(store.load(), Some(("t1".to_string(), user)));

        store.clear();
        assert!(BrowserStorage.get(TOKEN_KEY).is_none());
    }
}
