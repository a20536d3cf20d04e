//! Key-value cache that keeps the auth token across sessions.
//!
//! Only one entry is ever written, under [`AUTH_TOKEN_KEY`], but the cache
//! is a plain string map so that it can be backed by whatever store a host
//! provides.

use std::{
    collections::HashMap,
    fs,
    io::Write,
    path::{Path, PathBuf},
    sync::Mutex,
};

#[cfg(unix)]
use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};

use crate::error::{Error, Result};

/// Cache key of the auth token.
pub const AUTH_TOKEN_KEY: &str = "authCode";

/// Files larger than this are refused rather than parsed.
const MAX_FILE_SIZE: u64 = 64 * 1024;

/// The cache holds a secret: owner read and write only.
#[cfg(unix)]
const FILE_MODE: u32 = 0o600;

/// A string key-value store.
pub trait Cache: Send + Sync {
    /// Returns the value stored under `key`, if any.
    ///
    /// # Errors
    ///
    /// Will return `Err` if the backing store cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Stores `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Will return `Err` if the backing store cannot be written.
    fn put(&self, key: &str, value: &str) -> Result<()>;
}

/// A cache persisted as a TOML table.
///
/// The file is read once on open and rewritten on every [`Cache::put`].
#[derive(Debug)]
pub struct FileCache {
    path: PathBuf,
    table: Mutex<toml::Table>,
}

impl FileCache {
    /// Opens the cache at `path`. A missing file is an empty cache.
    ///
    /// # Errors
    ///
    /// Will return `Err` if the file:
    /// - exists but cannot be read
    /// - is larger than 64 KiB
    /// - is not a valid TOML table
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        let table = match fs::metadata(&path) {
            Ok(attributes) => {
                // Prevent out-of-memory condition: the cache should be small.
                let file_size = attributes.len();
                if file_size > MAX_FILE_SIZE {
                    return Err(Error::failed_precondition(format!(
                        "{} is too large ({file_size} bytes)",
                        path.display()
                    )));
                }

                let contents = fs::read_to_string(&path)?;
                toml::from_str::<toml::Table>(&contents)?
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("{} does not exist yet", path.display());
                toml::Table::new()
            }
            Err(e) => return Err(e.into()),
        };

        Ok(Self {
            path,
            table: Mutex::new(table),
        })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Cache for FileCache {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let table = self.table.lock()?;
        match table.get(key) {
            Some(toml::Value::String(value)) => Ok(Some(value.clone())),
            Some(other) => Err(Error::data_loss(format!(
                "{key} in {} should be a string but is {}",
                self.path.display(),
                other.type_str()
            ))),
            None => Ok(None),
        }
    }

    fn put(&self, key: &str, value: &str) -> Result<()> {
        let mut table = self.table.lock()?;
        table.insert(key.to_owned(), toml::Value::String(value.to_owned()));

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let contents = toml::to_string(&*table)?;

        let mut options = fs::OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        options.mode(FILE_MODE);

        let mut file = options.open(&self.path)?;
        // `mode` only applies on creation; tighten files made elsewhere.
        #[cfg(unix)]
        file.set_permissions(fs::Permissions::from_mode(FILE_MODE))?;
        file.write_all(contents.as_bytes())?;
        trace!("wrote {key} to {}", self.path.display());

        Ok(())
    }
}

/// A cache that lives as long as the process.
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl Cache for MemoryCache {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let entries = self.entries.lock()?;
        Ok(entries.get(key).cloned())
    }

    fn put(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self.entries.lock()?;
        entries.insert(key.to_owned(), value.to_owned());
        Ok(())
    }
}
