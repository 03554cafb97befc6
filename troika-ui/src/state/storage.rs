//! Browser `localStorage` session backend

use troika::{ClientError, ClientResult, SessionStorage};

/// Session keys stored in the window's `localStorage`
#[derive(Clone, Copy, Debug, Default)]
pub struct LocalStorage;

impl LocalStorage {
    fn storage(&self) -> Option<web_sys::Storage> {
        web_sys::window()?.local_storage().ok().flatten()
    }
}

impl SessionStorage for LocalStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.storage()?.get_item(key).ok().flatten()
    }

    fn set(&self, key: &str, value: &str) -> ClientResult<()> {
        let storage = self
            .storage()
            .ok_or_else(|| ClientError::Storage("localStorage unavailable".into()))?;
        storage
            .set_item(key, value)
            .map_err(|e| ClientError::Storage(format!("{:?}", e)))
    }

    fn remove(&self, key: &str) -> ClientResult<()> {
        let storage = self
            .storage()
            .ok_or_else(|| ClientError::Storage("localStorage unavailable".into()))?;
        storage
            .remove_item(key)
            .map_err(|e| ClientError::Storage(format!("{:?}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use troika::{Role, SessionStore};
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn test_logout_clears_local_storage() {
        let store = SessionStore::new(LocalStorage);
        store.set_session("abc", Role::Admin).unwrap();
        assert_eq!(LocalStorage.get("adminToken").as_deref(), Some("abc"));
        assert_eq!(LocalStorage.get("isAdmin").as_deref(), Some("true"));

        store.clear_session().unwrap();
        assert!(store.session().is_none());
        assert_eq!(LocalStorage.get("adminToken"), None);
    }
}
