pub mod file;

use std::collections::HashMap;

use crate::clock::Clock;
use crate::error::*;
use crate::month::MonthKey;

pub use file::FileStore;

pub const CURRENT_MONTH_KEY: &str = "widget_month_key";
pub const IMAGE_KEY_PREFIX: &str = "month_image_path_";
pub const FALLBACK_IMAGE_KEY: &str = "month_image_path";

pub fn image_key(month: &MonthKey) -> String {
    format!("{}{}", IMAGE_KEY_PREFIX, month)
}

/// String key-value persistence shared by every trigger invocation.
pub trait Store {
    fn get(&self, key: &str) -> Result<Option<String>>;

    fn set(&mut self, key: &str, value: &str) -> Result<()>;

    /// Writes `new` only if the stored value still equals `expected`.
    ///
    /// Returns whether the write happened. Implementations backed by storage
    /// shared between processes override this with a real atomic swap.
    fn compare_and_swap(&mut self, key: &str, expected: Option<&str>, new: &str) -> Result<bool> {
        if self.get(key)?.as_deref() != expected {
            return Ok(false);
        }
        self.set(key, new)?;
        Ok(true)
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct MemoryStore {
    values: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore::default()
    }

    pub fn with(mut self, key: &str, value: &str) -> Self {
        self.values.insert(key.to_owned(), value.to_owned());
        self
    }

    pub fn with_image(self, month: &str, path: &str) -> Self {
        let key = format!("{}{}", IMAGE_KEY_PREFIX, month);
        self.with(&key, path)
    }
}

impl Store for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.values.insert(key.to_owned(), value.to_owned());
        Ok(())
    }
}

/// Read access to the month specific images.
pub trait ImageMapping {
    fn image_for(&self, month: &MonthKey) -> Option<String>;
}

impl ImageMapping for HashMap<MonthKey, String> {
    fn image_for(&self, month: &MonthKey) -> Option<String> {
        self.get(month).cloned()
    }
}

/// Looks images up in a [`Store`] on demand.
pub struct StoreMapping<'s, S: Store + ?Sized> {
    store: &'s S,
}

impl<'s, S: Store + ?Sized> StoreMapping<'s, S> {
    pub fn new(store: &'s S) -> Self {
        StoreMapping { store }
    }
}

impl<'s, S: Store + ?Sized> ImageMapping for StoreMapping<'s, S> {
    fn image_for(&self, month: &MonthKey) -> Option<String> {
        read_or_absent(self.store, &image_key(month))
    }
}

/// Reads `key`, treating a failing store like a missing entry.
pub(crate) fn read_or_absent<S: Store + ?Sized>(store: &S, key: &str) -> Option<String> {
    store.get(key).unwrap_or_else(|err| {
        log::warn!("Could not read '{}' from store: {}", key, err);
        None
    })
}

/// Snapshot of the persisted widget state, taken once per invocation.
pub struct WidgetState<'s, S: Store + ?Sized> {
    pub current: MonthKey,
    pub mapping: StoreMapping<'s, S>,
    pub fallback: Option<String>,
}

impl<'s, S: Store + ?Sized> WidgetState<'s, S> {
    pub fn load(store: &'s S, clock: &dyn Clock) -> Self {
        let current = match read_or_absent(store, CURRENT_MONTH_KEY) {
            Some(raw) => MonthKey::parse_or_now(&raw, clock),
            None => MonthKey::now(clock),
        };

        WidgetState {
            current,
            mapping: StoreMapping::new(store),
            fallback: read_or_absent(store, FALLBACK_IMAGE_KEY),
        }
    }
}
