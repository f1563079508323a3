use flashcards::{KeyValueStore, StoreError};

/// `window.localStorage`. Reads degrade to "absent" when storage is blocked;
/// writes report the failure.
#[derive(Clone, Copy, Debug, Default)]
pub struct BrowserStore;

fn get_storage() -> Result<web_sys::Storage, StoreError> {
    let window =
        web_sys::window().ok_or_else(|| StoreError::Unavailable("Window unavailable".into()))?;
    window
        .local_storage()
        .map_err(|e| StoreError::Unavailable(format!("{:?}", e)))?
        .ok_or_else(|| StoreError::Unavailable("Local storage unavailable".into()))
}

impl KeyValueStore for BrowserStore {
    fn get(&self, key: &str) -> Option<String> {
        get_storage().ok()?.get_item(key).ok().flatten()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        get_storage()?
            .set_item(key, value)
            .map_err(|e| StoreError::Write {
                key: key.to_owned(),
                cause: format!("{:?}", e),
            })
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        get_storage()?
            .remove_item(key)
            .map_err(|e| StoreError::Write {
                key: key.to_owned(),
                cause: format!("{:?}", e),
            })
    }
}
