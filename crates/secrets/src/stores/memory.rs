//! In-memory secret store

use crate::{SecretError, SecretStore};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

/// Secret store backed by a map, for tests and local runs.
#[derive(Debug, Default)]
pub struct InMemorySecretStore {
    secrets: RwLock<HashMap<String, String>>,
}

impl InMemorySecretStore {
    /// Create an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    #[must_use]
    pub fn with_secret(self, secret_id: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(secret_id, value);
        self
    }

    /// Insert or replace a secret
    pub fn insert(&self, secret_id: impl Into<String>, value: impl Into<String>) {
        self.secrets
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(secret_id.into(), value.into());
    }
}

#[async_trait]
impl SecretStore for InMemorySecretStore {
    async fn get_secret(&self, secret_id: &str) -> Result<Option<String>, SecretError> {
        let secrets = self.secrets.read().map_err(|e| SecretError::Store {
            secret_id: secret_id.to_string(),
            message: format!("in-memory store poisoned: {e}"),
        })?;
        Ok(secrets.get(secret_id).cloned())
    }

    fn provider_name(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_get_inserted_secret() {
        let store = InMemorySecretStore::new().with_secret("token", "abc");
        assert_eq!(store.get_secret("token").await.unwrap(), Some("abc".to_string()));
    }

    #[tokio::test]
    async fn test_unknown_secret_is_none() {
        let store = InMemorySecretStore::new();
        assert_eq!(store.get_secret("token").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_insert_replaces_value() {
        let store = InMemorySecretStore::new().with_secret("token", "abc");
        store.insert("token", "def");
        assert_eq!(store.get_secret("token").await.unwrap(), Some("def".to_string()));
    }

    #[tokio::test]
    async fn test_insert_survives_poisoned_lock() {
        let store = std::sync::Arc::new(InMemorySecretStore::new());
        let poisoner = std::sync::Arc::clone(&store);
        let _ = std::thread::spawn(move || {
            let _guard = poisoner.secrets.write().unwrap();
            panic!("poison the lock");
        })
        .join();

        assert!(store.secrets.is_poisoned());
        store.insert("token", "abc");
        assert_eq!(
            store
                .secrets
                .read()
                .unwrap_or_else(PoisonError::into_inner)
                .get("token")
                .cloned(),
            Some("abc".to_string())
        );
    }
}
