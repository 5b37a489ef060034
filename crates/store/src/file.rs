//! Directory-backed durable credential store.
//!
//! [`FileStore`] persists each record as one file inside a directory, so the
//! cache survives process restarts and can be shared by every application
//! with access to that directory.
//!
//! # Layout
//!
//! - **File name**: lowercase hex SHA-256 digest of the key plus a `.rec` extension. Names have a
//!   fixed length whatever the key length, so long cache keys stay under file-system name limits.
//! - **Contents**: a 4-byte big-endian key length, the full key, then the raw record bytes
//!
//! Digests do not preserve prefixes, so `enumerate` reads every record file
//! and filters on the key stored in its header.
//!
//! # Atomicity
//!
//! Writes go to a uniquely named temporary file in the same directory which is
//! then renamed over the target. Readers therefore observe either the old or
//! the new record, never a partial one. `enumerate` lists the directory and
//! reads each record file; a file removed between listing and reading is
//! skipped.

use std::{
    fs,
    io::{ErrorKind, Write},
    path::{Path, PathBuf},
    sync::atomic::{AtomicU64, Ordering},
};

use bytes::Bytes;
use sha2::{Digest, Sha256};

use crate::{
    error::{StoreError, StoreResult},
    size_limits::SizeLimits,
    store::CredentialStore,
    types::KeyValue,
};

/// Extension of committed record files.
const RECORD_EXTENSION: &str = "rec";

/// Suffix marking in-flight temporary files.
const TEMP_SUFFIX: &str = ".tmp";

/// Length of the key-length header at the start of every record file.
const HEADER_LEN: usize = 4;

/// File name holding `key`.
fn record_file_name(key: &[u8]) -> String {
    format!("{}.{RECORD_EXTENSION}", hex::encode(Sha256::digest(key)))
}

fn is_record_file_name(name: &str) -> bool {
    name.strip_suffix(RECORD_EXTENSION)
        .and_then(|stem| stem.strip_suffix('.'))
        .is_some_and(|digest| digest.len() == 64 && digest.bytes().all(|b| b.is_ascii_hexdigit()))
}

/// Lays out a record file: key length, key, record.
fn encode_entry(key: &[u8], record: &[u8]) -> StoreResult<Vec<u8>> {
    let key_len = u32::try_from(key.len())
        .map_err(|_| StoreError::internal("key length does not fit the record header"))?;
    let mut entry = Vec::with_capacity(HEADER_LEN + key.len() + record.len());
    entry.extend_from_slice(&key_len.to_be_bytes());
    entry.extend_from_slice(key);
    entry.extend_from_slice(record);
    Ok(entry)
}

/// Splits a record file into `(key, record)`.
fn decode_entry(path: &Path, contents: Vec<u8>) -> StoreResult<(Bytes, Bytes)> {
    let truncated = || StoreError::corrupted(format!("truncated record file {}", path.display()));

    let header: [u8; HEADER_LEN] = contents
        .get(..HEADER_LEN)
        .and_then(|header| header.try_into().ok())
        .ok_or_else(truncated)?;
    let key_len = usize::try_from(u32::from_be_bytes(header)).map_err(|_| truncated())?;
    let key_end = HEADER_LEN
        .checked_add(key_len)
        .filter(|end| *end <= contents.len())
        .ok_or_else(truncated)?;

    let mut key = Bytes::from(contents);
    let record = key.split_off(key_end);
    Ok((key.slice(HEADER_LEN..), record))
}

/// Durable credential store keeping one file per record.
#[derive(Debug)]
pub struct FileStore {
    root: PathBuf,
    limits: SizeLimits,
    temp_counter: AtomicU64,
}

impl FileStore {
    /// Opens (creating if needed) a store rooted at `root`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] or [`StoreError::PermissionDenied`] if the
    /// directory cannot be created.
    pub fn open(root: impl Into<PathBuf>) -> StoreResult<Self> {
        Self::open_with_limits(root, SizeLimits::default())
    }

    /// Opens a store rooted at `root` enforcing the given size limits.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub fn open_with_limits(root: impl Into<PathBuf>, limits: SizeLimits) -> StoreResult<Self> {
        let root = root.into();
        fs::create_dir_all(&root).map_err(|e| {
            StoreError::from_io(format!("create store directory {}", root.display()), e)
        })?;
        Ok(Self { root, limits, temp_counter: AtomicU64::new(0) })
    }

    /// Returns the directory holding the records.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &[u8]) -> PathBuf {
        self.root.join(record_file_name(key))
    }

    fn temp_path(&self, file_name: &str) -> PathBuf {
        let seq = self.temp_counter.fetch_add(1, Ordering::Relaxed);
        self.root.join(format!("{file_name}.{}.{seq}{TEMP_SUFFIX}", std::process::id()))
    }

    /// Reads and splits a record file, mapping a missing file to `None`.
    fn read_entry(path: &Path) -> StoreResult<Option<(Bytes, Bytes)>> {
        match fs::read(path) {
            Ok(contents) => decode_entry(path, contents).map(Some),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StoreError::from_io(format!("read {}", path.display()), e)),
        }
    }
}

impl CredentialStore for FileStore {
    #[tracing::instrument(skip(self, key), fields(key_len = key.len()))]
    fn get(&self, key: &[u8]) -> StoreResult<Option<Bytes>> {
        self.limits.check_key(key)?;

        let path = self.path_for(key);
        match Self::read_entry(&path)? {
            Some((stored, record)) if stored.as_ref() == key => Ok(Some(record)),
            Some(_) => Err(StoreError::corrupted(format!(
                "record file {} holds a different key",
                path.display()
            ))),
            None => Ok(None),
        }
    }

    #[tracing::instrument(
        skip(self, key, record),
        fields(key_len = key.len(), record_len = record.len())
    )]
    fn put(&self, key: Vec<u8>, record: Vec<u8>) -> StoreResult<()> {
        self.limits.check_write(&key, &record)?;

        let file_name = record_file_name(&key);
        let target = self.root.join(&file_name);
        let temp = self.temp_path(&file_name);
        let entry = encode_entry(&key, &record)?;

        let write_temp = || -> std::io::Result<()> {
            let mut file = fs::File::create(&temp)?;
            file.write_all(&entry)?;
            file.sync_all()
        };

        if let Err(e) = write_temp() {
            let _cleanup = fs::remove_file(&temp);
            return Err(StoreError::from_io(format!("write {}", temp.display()), e));
        }

        fs::rename(&temp, &target).map_err(|e| {
            let _cleanup = fs::remove_file(&temp);
            StoreError::from_io(format!("rename into {}", target.display()), e)
        })
    }

    #[tracing::instrument(skip(self, key), fields(key_len = key.len()))]
    fn delete(&self, key: &[u8]) -> StoreResult<()> {
        self.limits.check_key(key)?;

        let path = self.path_for(key);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StoreError::from_io(format!("delete {}", path.display()), e)),
        }
    }

    #[tracing::instrument(skip(self, prefix), fields(prefix_len = prefix.len()))]
    fn enumerate(&self, prefix: &[u8]) -> StoreResult<Vec<KeyValue>> {
        self.limits.check_key(prefix)?;

        let list_error = |e| StoreError::from_io(format!("list {}", self.root.display()), e);
        let mut results = Vec::new();
        for entry in fs::read_dir(&self.root).map_err(list_error)? {
            let entry = entry.map_err(list_error)?;
            let file_name = entry.file_name();
            if !file_name.to_str().is_some_and(is_record_file_name) {
                continue;
            }
            if let Some((key, record)) = Self::read_entry(&entry.path())?
                && key.starts_with(prefix)
            {
                results.push(KeyValue::new(key, record));
            }
        }
        results.sort_by(|a, b| a.key.cmp(&b.key));
        Ok(results)
    }
}
