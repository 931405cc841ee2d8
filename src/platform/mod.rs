//! Platform abstraction layer
//!
//! Handles browser/native differences for:
//! - Wall-clock time
//! - Storage (LocalStorage on web)
//! - Haptics

#[cfg(target_arch = "wasm32")]
pub use web::{LocalStore, vibrate};

/// Milliseconds since the Unix epoch
#[cfg(target_arch = "wasm32")]
pub fn now_ms() -> i64 {
    js_sys::Date::now() as i64
}

/// Milliseconds since the Unix epoch
#[cfg(not(target_arch = "wasm32"))]
pub fn now_ms() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

#[cfg(target_arch = "wasm32")]
mod web {
    use crate::persistence::{KeyValueStore, StorageError};

    /// `window.localStorage`
    pub struct LocalStore {
        storage: web_sys::Storage,
    }

    impl LocalStore {
        /// Fails with `Unavailable` when storage is disabled (private mode,
        /// sandboxed iframe)
        pub fn open() -> Result<Self, StorageError> {
            let window = web_sys::window().ok_or(StorageError::Unavailable)?;
            let storage = window
                .local_storage()
                .map_err(backend)?
                .ok_or(StorageError::Unavailable)?;
            Ok(Self { storage })
        }
    }

    fn backend(e: wasm_bindgen::JsValue) -> StorageError {
        StorageError::Backend(format!("{:?}", e))
    }

    impl KeyValueStore for LocalStore {
        fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
            self.storage.get_item(key).map_err(backend)
        }

        fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
            self.storage.set_item(key, value).map_err(backend)
        }

        fn remove(&mut self, key: &str) -> Result<(), StorageError> {
            self.storage.remove_item(key).map_err(backend)
        }
    }

    /// Short haptic pulse; silently does nothing where unsupported
    pub fn vibrate(ms: u32) {
        if let Some(window) = web_sys::window() {
            let _ = window.navigator().vibrate_with_duration(ms);
        }
    }
}
