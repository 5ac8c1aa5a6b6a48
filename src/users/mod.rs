//! Credential directory backed by a JSON snapshot file.

mod password;
mod store;

use std::path::PathBuf;

use thiserror::Error;
use tokio::sync::RwLock;

use store::{Records, Store, UserRecord};

#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("username and password are required")]
    InvalidInput,
    #[error("user already exists")]
    AlreadyExists,
    #[error("user not found")]
    NotFound,
    #[error("wrong password")]
    WrongPassword,
    #[error("user directory unavailable: {0}")]
    Internal(#[from] anyhow::Error),
}

pub struct UserDirectory {
    users: RwLock<Records>,
    store: Store,
}

impl UserDirectory {
    /// Loads the directory from `path`. A missing file is an empty directory.
    pub async fn open(path: impl Into<PathBuf>) -> anyhow::Result<Self> {
        let store = Store::JsonFile(path.into());
        let users = store.load().await?;
        tracing::info!(users = users.len(), "user directory loaded");

        Ok(Self { users: RwLock::new(users), store })
    }

    pub fn in_memory() -> Self {
        Self { users: RwLock::new(Records::new()), store: Store::Memory }
    }

    /// Registers a new user and rewrites the snapshot.
    ///
    /// The write lock is held across the duplicate check and the file write, so
    /// concurrent registrations of one name cannot both succeed. When the write
    /// fails the in-memory map is rolled back.
    pub async fn create(&self, username: &str, password: &str) -> Result<(), DirectoryError> {
        if username.is_empty() || password.is_empty() {
            return Err(DirectoryError::InvalidInput);
        }

        let mut users = self.users.write().await;
        if users.contains_key(username) {
            return Err(DirectoryError::AlreadyExists);
        }

        users.insert(
            username.to_owned(),
            UserRecord::new(password::hash_password(password)),
        );

        if let Err(e) = self.store.save(&users).await {
            users.remove(username);
            tracing::error!(error = ?e, username, "failed to persist user directory");
            return Err(DirectoryError::Internal(e));
        }

        tracing::info!(username, total = users.len(), "user registered");
        Ok(())
    }

    pub async fn verify(&self, username: &str, password: &str) -> Result<(), DirectoryError> {
        let users = self.users.read().await;
        let record = users.get(username).ok_or(DirectoryError::NotFound)?;

        if password::matches(password, &record.password_hash) {
            Ok(())
        } else {
            Err(DirectoryError::WrongPassword)
        }
    }

    pub async fn contains(&self, username: &str) -> bool {
        self.users.read().await.contains_key(username)
    }

    pub async fn len(&self) -> usize {
        self.users.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    #[tokio::test]
    async fn create_then_verify() {
        let users = UserDirectory::in_memory();
        users.create("alice", "pw1").await.unwrap();

        assert!(users.verify("alice", "pw1").await.is_ok());
        assert!(matches!(
            users.verify("alice", "nope").await,
            Err(DirectoryError::WrongPassword)
        ));
        assert!(matches!(
            users.verify("mallory", "pw1").await,
            Err(DirectoryError::NotFound)
        ));
    }

    #[tokio::test]
    async fn rejects_empty_fields() {
        let users = UserDirectory::in_memory();
        assert!(matches!(users.create("", "pw").await, Err(DirectoryError::InvalidInput)));
        assert!(matches!(users.create("dave", "").await, Err(DirectoryError::InvalidInput)));
        assert_eq!(users.len().await, 0);
    }

    #[tokio::test]
    async fn duplicate_leaves_first_record() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("users.json");
        let users = UserDirectory::open(&path).await.unwrap();

        users.create("bob", "pw2").await.unwrap();
        let after_first = std::fs::read_to_string(&path).unwrap();

        assert!(matches!(
            users.create("bob", "other").await,
            Err(DirectoryError::AlreadyExists)
        ));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), after_first);
        assert!(users.verify("bob", "pw2").await.is_ok());
        assert!(users.verify("bob", "other").await.is_err());
    }

    #[tokio::test]
    async fn reopen_sees_persisted_users() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("users.json");

        {
            let users = UserDirectory::open(&path).await.unwrap();
            users.create("alice", "pw1").await.unwrap();
            users.create("bob", "pw2").await.unwrap();
        }

        let users = UserDirectory::open(&path).await.unwrap();
        assert_eq!(users.len().await, 2);
        assert!(users.verify("bob", "pw2").await.is_ok());
    }

    #[tokio::test]
    async fn failed_write_rolls_back() {
        let dir = tempfile::tempdir().unwrap();
        let users = UserDirectory::open(dir.path().join("missing").join("users.json"))
            .await
            .unwrap();

        assert!(matches!(
            users.create("erin", "pw").await,
            Err(DirectoryError::Internal(_))
        ));
        assert!(!users.contains("erin").await);
        assert_eq!(users.len().await, 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_registration_has_one_winner() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("users.json");
        let users = Arc::new(UserDirectory::open(&path).await.unwrap());

        let a = tokio::spawn({
            let users = Arc::clone(&users);
            async move { users.create("carol", "first").await }
        });
        let b = tokio::spawn({
            let users = Arc::clone(&users);
            async move { users.create("carol", "second").await }
        });

        let results = [a.await.unwrap(), b.await.unwrap()];
        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
        assert_eq!(
            results
                .iter()
                .filter(|r| matches!(r, Err(DirectoryError::AlreadyExists)))
                .count(),
            1
        );

        let on_disk: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(on_disk.as_object().unwrap().len(), 1);
        assert!(on_disk.get("carol").is_some());
    }
}
