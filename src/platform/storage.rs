//! Auth token storage
//!
//! The token is the only thing the game keeps across page loads. It is read
//! once at session start and never refreshed.

use crate::consts::TOKEN_STORAGE_KEY;

/// LocalStorage-backed token slot
pub struct TokenStore;

impl TokenStore {
    /// Treat blank and stringified-missing values as "no token"
    pub fn normalize(raw: &str) -> Option<String> {
        let token = raw.trim();
        match token {
            "" | "undefined" | "null" => None,
            _ => Some(token.to_string()),
        }
    }

    /// Load the token from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Option<String> {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten()?;
        let raw = storage.get_item(TOKEN_STORAGE_KEY).ok().flatten()?;
        let token = Self::normalize(&raw);
        if token.is_none() {
            log::warn!("Ignoring unusable stored token");
        }
        token
    }

    /// Save the token to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(token: &str) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            match storage.set_item(TOKEN_STORAGE_KEY, token) {
                Ok(()) => log::info!("User token stored"),
                Err(err) => log::error!("Failed to store user token: {:?}", err),
            }
        }
    }

    /// Native: `COSMIC_TAP_TOKEN` stands in for LocalStorage
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Option<String> {
        std::env::var(TOKEN_STORAGE_KEY_ENV)
            .ok()
            .and_then(|raw| Self::normalize(&raw))
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(_token: &str) {
        log::debug!("Native build does not persist {}", TOKEN_STORAGE_KEY);
    }
}

#[cfg(not(target_arch = "wasm32"))]
const TOKEN_STORAGE_KEY_ENV: &str = "COSMIC_TAP_TOKEN";
