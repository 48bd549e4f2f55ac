//! Durable storage for the account record.
//!
//! The store holds `AccountProperties` rows keyed by `pk`. Inserting a row
//! with an existing key replaces it. Three backends are provided: a JSON
//! file in the data directory (default), the OS keychain, and memory.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use anyhow::{Context, Result};
use keyring::Entry;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::models::AccountProperties;

/// Keychain service name
const SERVICE_NAME: &str = "headlines";

/// Keychain user the account record is stored under
const KEYCHAIN_ACCOUNT: &str = "account-properties";

/// Account file name in the data directory
const ACCOUNT_FILE: &str = "account.json";

pub trait AccountStore: Send + Sync {
    /// Insert the record, replacing any existing record with the same `pk`.
    fn insert_account_properties(&self, properties: &AccountProperties) -> Result<()>;

    /// The stored account record, if any. With several rows the lowest `pk`
    /// wins.
    fn get_account_properties(&self) -> Result<Option<AccountProperties>>;

    /// Remove every stored record.
    fn clear(&self) -> Result<()>;
}

/// Where account records are kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CredentialBackend {
    #[default]
    File,
    Keychain,
    Memory,
}

/// Open the store for the configured backend.
pub fn open_store(backend: CredentialBackend, data_dir: &Path) -> Arc<dyn AccountStore> {
    debug!(?backend, "Opening credential store");
    match backend {
        CredentialBackend::File => Arc::new(FileAccountStore::new(data_dir)),
        CredentialBackend::Keychain => Arc::new(KeychainAccountStore),
        CredentialBackend::Memory => Arc::new(MemoryAccountStore::default()),
    }
}

// ============================================================================
// File backend
// ============================================================================

#[derive(Debug, Default, Serialize, Deserialize)]
struct AccountTable {
    rows: BTreeMap<i64, AccountProperties>,
}

/// Account table persisted as JSON.
pub struct FileAccountStore {
    path: PathBuf,
    // Serializes read-modify-write cycles within this process
    write_lock: Mutex<()>,
}

impl FileAccountStore {
    pub fn new(data_dir: &Path) -> Self {
        Self {
            path: data_dir.join(ACCOUNT_FILE),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load_table(&self) -> Result<AccountTable> {
        if !self.path.exists() {
            return Ok(AccountTable::default());
        }
        let contents = std::fs::read_to_string(&self.path)
            .context("Failed to read account file")?;
        serde_json::from_str(&contents).context("Failed to parse account file")
    }

    fn save_table(&self, table: &AccountTable) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create data directory")?;
        }
        let contents = serde_json::to_string_pretty(table)?;
        std::fs::write(&self.path, contents).context("Failed to write account file")?;
        Ok(())
    }
}

impl AccountStore for FileAccountStore {
    fn insert_account_properties(&self, properties: &AccountProperties) -> Result<()> {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut table = self.load_table()?;
        table.rows.insert(properties.pk, properties.clone());
        self.save_table(&table)
    }

    fn get_account_properties(&self) -> Result<Option<AccountProperties>> {
        let table = self.load_table()?;
        Ok(table.rows.into_values().next())
    }

    fn clear(&self) -> Result<()> {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        if self.path.exists() {
            std::fs::remove_file(&self.path).context("Failed to remove account file")?;
        }
        Ok(())
    }
}

// ============================================================================
// Keychain backend
// ============================================================================

/// Single account record stored as JSON in the OS keychain.
pub struct KeychainAccountStore;

impl KeychainAccountStore {
    fn entry() -> Result<Entry> {
        Entry::new(SERVICE_NAME, KEYCHAIN_ACCOUNT).context("Failed to create keyring entry")
    }
}

impl AccountStore for KeychainAccountStore {
    fn insert_account_properties(&self, properties: &AccountProperties) -> Result<()> {
        let contents = serde_json::to_string(properties)?;
        Self::entry()?
            .set_password(&contents)
            .context("Failed to store account in keychain")
    }

    fn get_account_properties(&self) -> Result<Option<AccountProperties>> {
        match Self::entry()?.get_password() {
            Ok(contents) => {
                let properties = serde_json::from_str(&contents)
                    .context("Failed to parse account from keychain")?;
                Ok(Some(properties))
            }
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(e).context("Failed to read account from keychain"),
        }
    }

    fn clear(&self) -> Result<()> {
        match Self::entry()?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(e).context("Failed to delete account from keychain"),
        }
    }
}

// ============================================================================
// Memory backend
// ============================================================================

/// Process-local store, selected with `credential_backend: "memory"` and used by tests.
#[derive(Default)]
pub struct MemoryAccountStore {
    rows: Mutex<BTreeMap<i64, AccountProperties>>,
}

impl MemoryAccountStore {
    pub fn len(&self) -> usize {
        self.rows.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl AccountStore for MemoryAccountStore {
    fn insert_account_properties(&self, properties: &AccountProperties) -> Result<()> {
        self.rows
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(properties.pk, properties.clone());
        Ok(())
    }

    fn get_account_properties(&self) -> Result<Option<AccountProperties>> {
        Ok(self
            .rows
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .next()
            .cloned())
    }

    fn clear(&self) -> Result<()> {
        self.rows.lock().unwrap_or_else(PoisonError::into_inner).clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_store_empty_returns_none() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = FileAccountStore::new(dir.path());
        assert_eq!(store.get_account_properties().expect("read"), None);
    }

    #[test]
    fn test_file_store_insert_or_replace() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = FileAccountStore::new(dir.path());

        store
            .insert_account_properties(&AccountProperties::new("first"))
            .expect("insert");
        store
            .insert_account_properties(&AccountProperties::new("second"))
            .expect("insert");

        let contents = std::fs::read_to_string(store.path()).expect("account file");
        let table: AccountTable = serde_json::from_str(&contents).expect("table json");
        assert_eq!(table.rows.len(), 1);
        assert_eq!(
            store.get_account_properties().expect("read").map(|p| p.token),
            Some("second".to_string())
        );
    }

    #[test]
    fn test_file_store_survives_reopen() {
        let dir = tempfile::tempdir().expect("tempdir");
        FileAccountStore::new(dir.path())
            .insert_account_properties(&AccountProperties::new("abc123").with_username("reader"))
            .expect("insert");

        let reopened = FileAccountStore::new(dir.path());
        let props = reopened.get_account_properties().expect("read").expect("stored row");
        assert_eq!(props.token, "abc123");
        assert_eq!(props.username.as_deref(), Some("reader"));
    }

    #[test]
    fn test_file_store_clear() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = FileAccountStore::new(dir.path());
        store
            .insert_account_properties(&AccountProperties::new("abc123"))
            .expect("insert");
        store.clear().expect("clear");
        store.clear().expect("clear twice");
        assert_eq!(store.get_account_properties().expect("read"), None);
    }

    #[test]
    fn test_file_store_corrupt_file_is_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = FileAccountStore::new(dir.path());
        std::fs::write(store.path(), "not json").expect("write");
        assert!(store.get_account_properties().is_err());
    }

    #[test]
    fn test_memory_store_lowest_pk_wins() {
        let store = MemoryAccountStore::default();
        let mut other = AccountProperties::new("other");
        other.pk = 7;
        store.insert_account_properties(&other).expect("insert");
        store
            .insert_account_properties(&AccountProperties::new("current"))
            .expect("insert");

        assert_eq!(store.len(), 2);
        assert_eq!(
            store.get_account_properties().expect("read").map(|p| p.token),
            Some("current".to_string())
        );
    }

    #[test]
    fn test_backend_serde_names() {
        let backend: CredentialBackend = serde_json::from_str("\"keychain\"").expect("backend");
        assert_eq!(backend, CredentialBackend::Keychain);
        assert_eq!(CredentialBackend::default(), CredentialBackend::File);
    }

    #[test]
    fn test_memory_backend_from_config_keeps_nothing_on_disk() {
        let dir = tempfile::tempdir().expect("tempdir");
        let backend: CredentialBackend = serde_json::from_str("\"memory\"").expect("backend");
        let store = open_store(backend, dir.path());

        store
            .insert_account_properties(&AccountProperties::new("abc123"))
            .expect("insert");

        assert_eq!(
            store.get_account_properties().expect("read").map(|p| p.token),
            Some("abc123".to_string())
        );
        assert!(!dir.path().join(ACCOUNT_FILE).exists());
    }
}
