//! Persistent key-value preferences.
//!
//! The subscription flow remembers the last email a viewer subscribed with.
//! Storage is passed in explicitly so tests and non-browser hosts can use
//! [`MemoryPreferences`].

#[cfg(test)]
#[path = "prefs_test.rs"]
mod prefs_test;

use std::collections::HashMap;

/// Key the subscription email is stored under.
pub const EMAIL_KEY: &str = "reviewNotificationEmail";

pub trait PreferenceStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str);
    fn remove(&mut self, key: &str);
}

impl<P: PreferenceStore + ?Sized> PreferenceStore for &mut P {
    fn get(&self, key: &str) -> Option<String> {
        (**self).get(key)
    }
    fn set(&mut self, key: &str, value: &str) {
        (**self).set(key, value);
    }
    fn remove(&mut self, key: &str) {
        (**self).remove(key);
    }
}

/// In-process preference store.
#[derive(Debug, Clone, Default)]
pub struct MemoryPreferences {
    values: HashMap<String, String>,
}

impl MemoryPreferences {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, key: &str, value: &str) -> Self {
        self.values.insert(key.to_owned(), value.to_owned());
        self
    }
}

impl PreferenceStore for MemoryPreferences {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        self.values.insert(key.to_owned(), value.to_owned());
    }

    fn remove(&mut self, key: &str) {
        self.values.remove(key);
    }
}

/// `window.localStorage`. Reads of an unavailable storage yield `None`;
/// failed writes are logged.
#[cfg(feature = "web")]
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalStoragePreferences;

#[cfg(feature = "web")]
impl LocalStoragePreferences {
    fn storage() -> Option<web_sys::Storage> {
        match web_sys::window().map(|w| w.local_storage()) {
            Some(Ok(storage)) => storage,
            _ => None,
        }
    }
}

#[cfg(feature = "web")]
impl PreferenceStore for LocalStoragePreferences {
    fn get(&self, key: &str) -> Option<String> {
        match Self::storage()?.get_item(key) {
            Ok(value) => value,
            Err(_) => None,
        }
    }

    fn set(&mut self, key: &str, value: &str) {
        let Some(storage) = Self::storage() else {
            log::warn!("localStorage unavailable; {key} not saved");
            return;
        };
        if let Err(e) = storage.set_item(key, value) {
            log::warn!("failed to save {key}: {e:?}");
        }
    }

    fn remove(&mut self, key: &str) {
        if let Some(storage) = Self::storage() {
            if let Err(e) = storage.remove_item(key) {
                log::warn!("failed to remove {key}: {e:?}");
            }
        }
    }
}
