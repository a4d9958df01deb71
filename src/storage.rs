//! Persistent storage for the last working WiFi credentials.
//!
//! The backing store is a namespaced string key-value store
//! ([`CredentialStore`]): the board uses a `sequential-storage` map on
//! internal flash, host tests use [`crate::mock::MemoryStore`].
//!
//! Storage layout:
//!   - namespace `wifi-creds`
//!   - key `ssid`     → SSID of the last successful connection
//!   - key `password` → its password (empty for open networks)
//!
//! One pair per namespace; a new successful connection overwrites it.

use heapless::String;

use crate::config::{KEY_PASSWORD, KEY_SSID, NAMESPACE_MAX_LEN, PASSWORD_MAX_LEN, SSID_MAX_LEN};
use crate::error::{Error, Result, StorageError};
use crate::wifi::CredentialPair;

/// Namespaced string key-value store.
///
/// A handle is opened for one load or save and closed right after.
pub trait CredentialStore {
    type Handle;

    fn open(&mut self, namespace: &str, read_only: bool) -> Result<Self::Handle, StorageError>;

    /// Value under `key`, or `default` when the key is absent.
    fn get_string<const N: usize>(
        &mut self,
        handle: &Self::Handle,
        key: &str,
        default: &str,
    ) -> Result<String<N>, StorageError>;

    fn put_string(&mut self, handle: &Self::Handle, key: &str, value: &str)
        -> Result<(), StorageError>;

    fn close(&mut self, handle: Self::Handle);
}

/// Cached view of the saved credential pair.
pub struct CredentialVault<S> {
    store: S,
    namespace: &'static str,
    /// Pair known to be in the store; `None` until a load or save.
    cached: Option<CredentialPair>,
}

impl<S: CredentialStore> CredentialVault<S> {
    pub fn new(store: S, namespace: &'static str) -> Self {
        debug_assert!(namespace.len() <= NAMESPACE_MAX_LEN);
        Self {
            store,
            namespace,
            cached: None,
        }
    }

    /// Saved pair, if any.
    ///
    /// An unreadable store counts as "nothing saved".
    pub fn load(&mut self) -> Option<CredentialPair> {
        match self.read() {
            Ok(Some(pair)) => {
                debug!("Saved credentials for {}", pair.ssid.as_str());
                self.cached = Some(pair.clone());
                Some(pair)
            }
            Ok(None) => {
                info!("No saved credentials found");
                None
            }
            Err(e) => {
                warn!("Saved credentials unreadable: {:?}", e);
                None
            }
        }
    }

    fn read(&mut self) -> Result<Option<CredentialPair>> {
        let handle = self.store.open(self.namespace, true)?;
        let ssid = self.store.get_string::<SSID_MAX_LEN>(&handle, KEY_SSID, "");
        let password = self
            .store
            .get_string::<PASSWORD_MAX_LEN>(&handle, KEY_PASSWORD, "");
        self.store.close(handle);

        let ssid = ssid?;
        if ssid.is_empty() {
            return Ok(None);
        }
        Ok(Some(CredentialPair {
            ssid,
            password: password?,
        }))
    }

    /// Persist `pair`. Returns `Ok(false)` when the store already holds it.
    pub fn save(&mut self, pair: &CredentialPair) -> Result<bool> {
        if self.cached.as_ref() == Some(pair) {
            debug!("Credentials for {} already saved", pair.ssid.as_str());
            return Ok(false);
        }

        let handle = self.store.open(self.namespace, false)?;
        let written = self
            .store
            .put_string(&handle, KEY_SSID, pair.ssid.as_str())
            .and_then(|_| {
                self.store
                    .put_string(&handle, KEY_PASSWORD, pair.password.as_str())
            });
        self.store.close(handle);
        written.map_err(Error::from)?;

        info!("Credentials saved: {}", pair.ssid.as_str());
        self.cached = Some(pair.clone());
        Ok(true)
    }

    /// Save, logging instead of failing. Used once a connection is up.
    pub fn ensure_saved(&mut self, pair: &CredentialPair) {
        if let Err(e) = self.save(pair) {
            warn!("Failed to save credentials: {:?}", e);
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CREDENTIALS_NAMESPACE;
    use crate::mock::MemoryStore;

    fn vault() -> CredentialVault<MemoryStore> {
        CredentialVault::new(MemoryStore::new(), CREDENTIALS_NAMESPACE)
    }

    #[test]
    fn empty_store_loads_nothing() {
        assert_eq!(vault().load(), None);
    }

    #[test]
    fn save_then_load() {
        let mut v = vault();
        let pair = CredentialPair::new("Home-5G", "hunter22");
        assert_eq!(v.save(&pair), Ok(true));

        let mut fresh = CredentialVault::new(v.store().clone(), CREDENTIALS_NAMESPACE);
        assert_eq!(fresh.load(), Some(pair));
    }

    #[test]
    fn saving_same_pair_twice_writes_once() {
        let mut v = vault();
        let pair = CredentialPair::new("Home", "pw");
        assert_eq!(v.save(&pair), Ok(true));
        let writes = v.store().writes;
        assert_eq!(v.save(&pair), Ok(false));
        assert_eq!(v.store().writes, writes);
    }

    #[test]
    fn loaded_pair_is_not_rewritten() {
        let mut store = MemoryStore::new();
        store.insert(CREDENTIALS_NAMESPACE, KEY_SSID, "Home");
        store.insert(CREDENTIALS_NAMESPACE, KEY_PASSWORD, "pw");
        let mut v = CredentialVault::new(store, CREDENTIALS_NAMESPACE);
        let pair = v.load().unwrap();
        assert_eq!(v.save(&pair), Ok(false));
        assert_eq!(v.store().writes, 0);
    }

    #[test]
    fn new_pair_overwrites_old() {
        let mut v = vault();
        v.save(&CredentialPair::new("Old", "a")).unwrap();
        v.save(&CredentialPair::new("New", "")).unwrap();
        let mut fresh = CredentialVault::new(v.store().clone(), CREDENTIALS_NAMESPACE);
        assert_eq!(fresh.load(), Some(CredentialPair::new("New", "")));
    }

    #[test]
    fn open_failure_reads_as_nothing_saved() {
        let mut store = MemoryStore::new();
        store.insert(CREDENTIALS_NAMESPACE, KEY_SSID, "Home");
        store.fail_open = true;
        let mut v = CredentialVault::new(store, CREDENTIALS_NAMESPACE);
        assert_eq!(v.load(), None);
    }

    #[test]
    fn read_errors_keep_their_cause() {
        let mut store = MemoryStore::new();
        store.insert(CREDENTIALS_NAMESPACE, KEY_SSID, "a network name well past the ssid limit");
        let mut v = CredentialVault::new(store, CREDENTIALS_NAMESPACE);
        assert_eq!(v.read(), Err(Error::Storage(StorageError::Corrupted)));
        assert_eq!(v.load(), None);

        v.store_mut().fail_open = true;
        assert_eq!(v.read(), Err(Error::Storage(StorageError::OpenFailed)));
    }

    #[test]
    fn write_failure_is_reported_and_not_cached() {
        let mut v = vault();
        v.store_mut().fail_write = true;
        let pair = CredentialPair::new("Home", "pw");
        assert_eq!(v.save(&pair), Err(Error::Storage(StorageError::Flash)));

        v.store_mut().fail_write = false;
        assert_eq!(v.save(&pair), Ok(true));
    }

    #[test]
    fn stores_are_closed_after_use() {
        let mut v = vault();
        v.save(&CredentialPair::new("Home", "pw")).unwrap();
        v.load();
        assert_eq!(v.store().open_handles, 0);
    }
}
