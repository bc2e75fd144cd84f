//! Runtime settings
//!
//! Read from the page query string at startup (`?api=...&particles=off&seed=42`).
//! Nothing here is written back to storage; the auth token is the only
//! durable client state.

/// Where the collaborator services live unless overridden
pub const DEFAULT_API_BASE_URL: &str = match option_env!("COSMIC_TAP_API_BASE") {
    Some(url) => url,
    None => "http://localhost:5000",
};

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Base URL of the auth and game-state services
    pub api_base_url: String,
    /// Particle effects (bursts, power-up sparkles)
    pub particles: bool,
    /// Fixed RNG seed (otherwise seeded from the clock)
    pub seed: Option<u64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            particles: true,
            seed: None,
        }
    }
}

impl Settings {
    /// Defaults overridden by a query string (leading `?` optional)
    pub fn from_query(query: &str) -> Self {
        let mut settings = Self::default();
        settings.apply_query(query);
        settings
    }

    /// Apply raw `key=value` pairs. Values are taken as-is; the browser
    /// build decodes them with `UrlSearchParams` before they get here.
    pub fn apply_query(&mut self, query: &str) {
        let query = query.strip_prefix('?').unwrap_or(query);
        for pair in query.split('&').filter(|p| !p.is_empty()) {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            self.apply_param(key, value);
        }
    }

    /// Apply one decoded parameter; unknown keys and bad values are ignored
    pub fn apply_param(&mut self, key: &str, value: &str) {
        match key {
            "api" if !value.is_empty() => self.api_base_url = value.to_string(),
            "particles" => match parse_flag(value) {
                Some(enabled) => self.particles = enabled,
                None => log::warn!("Ignoring particles={}", value),
            },
            "seed" => match value.parse() {
                Ok(seed) => self.seed = Some(seed),
                Err(_) => log::warn!("Ignoring seed={}", value),
            },
            _ => {}
        }
    }

    /// Load settings from the page URL (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let mut settings = Self::default();
        let params = web_sys::window()
            .and_then(|w| w.location().search().ok())
            .and_then(|search| web_sys::UrlSearchParams::new_with_str(&search).ok());
        if let Some(params) = params {
            for key in ["api", "particles", "seed"] {
                if let Some(value) = params.get(key) {
                    settings.apply_param(key, &value);
                }
            }
        }
        log::info!("Using game service at {}", settings.api_base_url);
        settings
    }

    /// Native: defaults, with `COSMIC_TAP_SEED` honoured for reproducible runs
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        let mut settings = Self::default();
        if let Ok(seed) = std::env::var("COSMIC_TAP_SEED") {
            settings.apply_param("seed", &seed);
        }
        settings
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.to_lowercase().as_str() {
        "" | "1" | "on" | "true" | "yes" => Some(true),
        "0" | "off" | "false" | "no" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::from_query("");
        assert_eq!(settings, Settings::default());
        assert!(settings.particles);
        assert!(settings.seed.is_none());
    }

    #[test]
    fn test_query_overrides() {
        let settings =
            Settings::from_query("?api=https://game.example.com&particles=off&seed=42&x=1");
        assert_eq!(settings.api_base_url, "https://game.example.com");
        assert!(!settings.particles);
        assert_eq!(settings.seed, Some(42));
    }

    #[test]
    fn test_bad_values_are_ignored() {
        let settings = Settings::from_query("particles=maybe&seed=abc&api=");
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_apply_param() {
        let mut settings = Settings::default();
        settings.apply_param("particles", "");
        assert!(settings.particles);
        settings.apply_param("particles", "No");
        assert!(!settings.particles);
        settings.apply_param("seed", "-1");
        assert_eq!(settings.seed, None);
        settings.apply_param("api", "http://10.0.0.2:5000/");
        assert_eq!(settings.api_base_url, "http://10.0.0.2:5000/");
    }
}
