//! `window.localStorage` as [`DurableStorage`].
//!
//! TRADE-OFFS
//! ==========
//! Storage only exists in the browser. Outside `hydrate` every call reports
//! [`StorageError::Unavailable`], which the guard already treats as "nothing
//! stored", so server rendering stays deterministic.

#[cfg(test)]
#[path = "browser_storage_test.rs"]
mod browser_storage_test;

use crate::error::StorageError;
use crate::net::capability::DurableStorage;

#[derive(Clone, Copy, Debug, Default)]
pub struct BrowserStorage;

impl DurableStorage for BrowserStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        #[cfg(feature = "hydrate")]
        {
            local_storage()?.get_item(key).map_err(js_error)
        }
        #[cfg(not(feature = "hydrate"))]
        {
            let _ = key;
            Err(StorageError::Unavailable)
        }
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        #[cfg(feature = "hydrate")]
        {
            local_storage()?.set_item(key, value).map_err(js_error)
        }
        #[cfg(not(feature = "hydrate"))]
        {
            let _ = (key, value);
            Err(StorageError::Unavailable)
        }
    }
}

#[cfg(feature = "hydrate")]
fn local_storage() -> Result<web_sys::Storage, StorageError> {
    web_sys::window()
        .ok_or(StorageError::Unavailable)?
        .local_storage()
        .map_err(js_error)?
        .ok_or(StorageError::Unavailable)
}

#[cfg(feature = "hydrate")]
fn js_error(err: wasm_bindgen::JsValue) -> StorageError {
    StorageError::Io(err.as_string().unwrap_or_else(|| format!("{err:?}")))
}
