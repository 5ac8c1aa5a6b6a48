use std::{collections::HashMap, io::ErrorKind, path::PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct UserRecord {
    #[serde(rename = "password")]
    pub(crate) password_hash: String,
    // carried over from the legacy file format, never read here
    #[serde(default)]
    pub(crate) chats: Vec<serde_json::Value>,
}

impl UserRecord {
    pub(crate) fn new(password_hash: String) -> Self {
        Self { password_hash, chats: Vec::new() }
    }
}

pub(crate) type Records = HashMap<String, UserRecord>;

/// Where the directory snapshot lives. Every mutation rewrites the whole file.
#[derive(Debug, Clone)]
pub(crate) enum Store {
    Memory,
    JsonFile(PathBuf),
}

impl Store {
    pub(crate) async fn load(&self) -> anyhow::Result<Records> {
        let Store::JsonFile(path) = self else {
            return Ok(Records::new());
        };

        let bytes = match tokio::fs::read(path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Records::new()),
            Err(e) => return Err(e).with_context(|| format!("reading {}", path.display())),
        };

        serde_json::from_slice(&bytes).with_context(|| format!("parsing {}", path.display()))
    }

    pub(crate) async fn save(&self, records: &Records) -> anyhow::Result<()> {
        let Store::JsonFile(path) = self else {
            return Ok(());
        };

        let json = serde_json::to_vec_pretty(records)?;

        let mut tmp = path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        tokio::fs::write(&tmp, json)
            .await
            .with_context(|| format!("writing {}", tmp.display()))?;
        tokio::fs::rename(&tmp, path)
            .await
            .with_context(|| format!("replacing {}", path.display()))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::JsonFile(dir.path().join("users.json"));
        assert!(store.load().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn reads_legacy_layout() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("users.json");
        std::fs::write(
            &path,
            r#"{"alice": {"password": "abc123", "chats": ["room1"]}, "bob": {"password": "def456"}}"#,
        )
        .unwrap();

        let records = Store::JsonFile(path).load().await.unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records["alice"].password_hash, "abc123");
        assert_eq!(records["alice"].chats, vec![serde_json::json!("room1")]);
        assert!(records["bob"].chats.is_empty());
    }

    #[tokio::test]
    async fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::JsonFile(dir.path().join("users.json"));

        let mut records = Records::new();
        records.insert("carol".to_owned(), UserRecord::new("digest".to_owned()));
        store.save(&records).await.unwrap();

        assert_eq!(store.load().await.unwrap(), records);
        assert!(!dir.path().join("users.json.tmp").exists());
    }

    #[tokio::test]
    async fn garbage_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("users.json");
        std::fs::write(&path, "not json").unwrap();

        assert!(Store::JsonFile(path).load().await.is_err());
    }
}
