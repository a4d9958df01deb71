//! Credential store on internal flash.
//!
//! Uses a `sequential-storage` map over the NVS partition range. Each
//! `namespace/key` pair is hashed (FNV-1a) into a `u32` map key; values
//! are stored as `[len: u8][utf-8 bytes]`.

use core::ops::Range;

use embassy_embedded_hal::adapter::BlockingAsync;
use embassy_futures::block_on;
use embedded_storage::nor_flash::NorFlash;
use heapless::String;
use sequential_storage::cache::NoCache;
use sequential_storage::map::{fetch_item, store_item};

use crate::config::{NAMESPACE_MAX_LEN, PASSWORD_MAX_LEN, STORAGE_FLASH_END, STORAGE_FLASH_START};
use crate::error::StorageError;
use crate::storage::CredentialStore;

/// Work buffer: map key, item header and the longest value.
const RECORD_BUF_SIZE: usize = 128;

/// Handle returned by [`FlashStore::open`].
pub struct FlashHandle {
    namespace: String<NAMESPACE_MAX_LEN>,
    read_only: bool,
}

pub struct FlashStore<F> {
    flash: BlockingAsync<F>,
    range: Range<u32>,
}

impl<F: NorFlash> FlashStore<F> {
    pub fn new(flash: F) -> Self {
        Self {
            flash: BlockingAsync::new(flash),
            range: STORAGE_FLASH_START..STORAGE_FLASH_END,
        }
    }
}

/// FNV-1a over `namespace/key`.
fn slot(namespace: &str, key: &str) -> u32 {
    let mut hash: u32 = 0x811C_9DC5;
    let bytes = namespace.bytes().chain(core::iter::once(b'/')).chain(key.bytes());
    for b in bytes {
        hash ^= u32::from(b);
        hash = hash.wrapping_mul(0x0100_0193);
    }
    hash
}

fn decode<const N: usize>(data: &[u8]) -> Result<String<N>, StorageError> {
    let (&len, rest) = data.split_first().ok_or(StorageError::Corrupted)?;
    let bytes = rest.get(..len as usize).ok_or(StorageError::Corrupted)?;
    let text = core::str::from_utf8(bytes).map_err(|_| StorageError::Corrupted)?;
    String::try_from(text).map_err(|_| StorageError::Corrupted)
}

impl<F: NorFlash> CredentialStore for FlashStore<F> {
    type Handle = FlashHandle;

    fn open(&mut self, namespace: &str, read_only: bool) -> Result<FlashHandle, StorageError> {
        if namespace.is_empty() {
            return Err(StorageError::OpenFailed);
        }
        let namespace = String::try_from(namespace).map_err(|_| StorageError::OpenFailed)?;
        Ok(FlashHandle {
            namespace,
            read_only,
        })
    }

    fn get_string<const N: usize>(
        &mut self,
        handle: &FlashHandle,
        key: &str,
        default: &str,
    ) -> Result<String<N>, StorageError> {
        let mut buf = [0u8; RECORD_BUF_SIZE];
        let item = slot(handle.namespace.as_str(), key);

        match block_on(fetch_item::<u32, &[u8], _>(
            &mut self.flash,
            self.range.clone(),
            &mut NoCache::new(),
            &mut buf,
            &item,
        )) {
            Ok(Some(data)) => decode(data),
            Ok(None) => String::try_from(default).map_err(|_| StorageError::Corrupted),
            Err(e) => {
                error!("Flash read error: {:?}", defmt::Debug2Format(&e));
                Err(StorageError::Flash)
            }
        }
    }

    fn put_string(
        &mut self,
        handle: &FlashHandle,
        key: &str,
        value: &str,
    ) -> Result<(), StorageError> {
        if handle.read_only {
            return Err(StorageError::ReadOnly);
        }
        if value.len() > PASSWORD_MAX_LEN {
            return Err(StorageError::Corrupted);
        }

        let mut data = [0u8; PASSWORD_MAX_LEN + 1];
        data[0] = value.len() as u8;
        data[1..=value.len()].copy_from_slice(value.as_bytes());
        let data = &data[..=value.len()];

        let mut buf = [0u8; RECORD_BUF_SIZE];
        let item = slot(handle.namespace.as_str(), key);

        match block_on(store_item::<u32, &[u8], _>(
            &mut self.flash,
            self.range.clone(),
            &mut NoCache::new(),
            &mut buf,
            &item,
            &data,
        )) {
            Ok(()) => {
                debug!("Stored {} bytes under {}", data.len(), key);
                Ok(())
            }
            Err(e) => {
                error!("Flash write error: {:?}", defmt::Debug2Format(&e));
                Err(StorageError::Flash)
            }
        }
    }

    fn close(&mut self, _handle: FlashHandle) {}
}
