use nix::fcntl::{flock, FlockArg};
use std::collections::BTreeMap;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::os::unix::io::AsRawFd;
use std::path::{Path, PathBuf};

use super::Store;
use crate::error::*;

type Table = BTreeMap<String, String>;

/// A [`Store`] persisted as a flat TOML table of strings.
///
/// Nothing is cached: every access re-reads the file, so state written by an
/// earlier process (or an earlier trigger) is always observed. Writes replace
/// the file through a rename and are serialized by an advisory lock on a
/// sibling `.lock` file.
#[derive(Clone, Debug)]
pub struct FileStore {
    path: PathBuf,
}

struct Lock(File);

impl Lock {
    fn acquire(path: &Path) -> Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .open(path)?;
        flock(file.as_raw_fd(), FlockArg::LockExclusive).map_err(io::Error::from)?;
        Ok(Lock(file))
    }
}

impl Drop for Lock {
    fn drop(&mut self) {
        let _ = flock(self.0.as_raw_fd(), FlockArg::Unlock);
    }
}

impl FileStore {
    pub fn new(path: &Path) -> Self {
        FileStore {
            path: path.to_owned(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn sibling(&self, ext: &str) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(ext);
        self.path.with_file_name(name)
    }

    fn lock(&self) -> Result<Lock> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir)?;
        }
        Lock::acquire(&self.sibling(".lock"))
    }

    fn load(&self) -> Result<Table> {
        match fs::read_to_string(&self.path) {
            Ok(content) => toml::from_str(&content).map_err(|err: toml::de::Error| {
                Error::new(
                    ErrorKind::StoreParse,
                    &format!("'{}': {}", self.path.display(), err),
                )
            }),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(Table::new()),
            Err(err) => Err(err.into()),
        }
    }

    fn save(&self, table: &Table) -> Result<()> {
        let content = toml::to_string(table)?;
        let tmp = self.sibling(".tmp");

        {
            let mut file = File::create(&tmp)?;
            file.write_all(content.as_bytes())?;
            file.sync_all()?;
        }

        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl Store for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.load()?.remove(key))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let _lock = self.lock()?;
        let mut table = self.load()?;
        table.insert(key.to_owned(), value.to_owned());
        self.save(&table)
    }

    fn compare_and_swap(&mut self, key: &str, expected: Option<&str>, new: &str) -> Result<bool> {
        let _lock = self.lock()?;
        let mut table = self.load()?;

        if table.get(key).map(String::as_str) != expected {
            return Ok(false);
        }

        table.insert(key.to_owned(), new.to_owned());
        self.save(&table)?;
        Ok(true)
    }
}
