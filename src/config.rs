use anyhow::{Context, Result};

#[derive(Debug, Clone)]
pub struct Config {
    // Deployment
    pub context_path: String,
    pub port: u16,

    // Translation files
    pub i18n_origin: String,
    pub i18n_dir: String,
    pub fetch_timeout_secs: u64,

    // Preferences
    pub preferences_file: String,
    pub default_language: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let port: u16 = match std::env::var("PORT") {
            Ok(v) => v.parse().context("PORT must be a valid port number")?,
            Err(_) => 8080,
        };

        Ok(Self {
            // Deployment
            context_path: normalize_context_path(
                &std::env::var("APP_CONTEXT_PATH").unwrap_or_default(),
            ),
            port,

            // Translation files
            i18n_origin: std::env::var("I18N_ORIGIN")
                .map(|v| v.trim_end_matches('/').to_string())
                .unwrap_or_else(|_| format!("http://localhost:{}", port)),
            i18n_dir: std::env::var("I18N_DIR").unwrap_or_else(|_| "WebContent/i18n".to_string()),
            fetch_timeout_secs: std::env::var("FETCH_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(10),

            // Preferences
            preferences_file: std::env::var("PREFERENCES_FILE")
                .unwrap_or_else(|_| "preferences.json".to_string()),
            default_language: std::env::var("DEFAULT_LANGUAGE")
                .ok()
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| "en".to_string()),
        })
    }

    /// Base URL every translation file is resolved against, e.g.
    /// `http://localhost:8080/app/i18n`.
    pub fn i18n_base_url(&self) -> String {
        format!("{}{}/i18n", self.i18n_origin, self.context_path)
    }
}

/// Normalize a deployment prefix to `""` or `/segment[/segment...]`.
pub fn normalize_context_path(raw: &str) -> String {
    let trimmed = raw.trim().trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("/{}", trimmed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const VARS: &[&str] = &[
        "APP_CONTEXT_PATH",
        "PORT",
        "I18N_ORIGIN",
        "I18N_DIR",
        "FETCH_TIMEOUT_SECS",
        "PREFERENCES_FILE",
        "DEFAULT_LANGUAGE",
    ];

    fn clear_env() {
        for var in VARS {
            std::env::remove_var(var);
        }
    }

    // ==================== normalize_context_path Tests ====================

    #[test]
    fn test_normalize_context_path_empty() {
        assert_eq!(normalize_context_path(""), "");
        assert_eq!(normalize_context_path("/"), "");
        assert_eq!(normalize_context_path("   "), "");
    }

    #[test]
    fn test_normalize_context_path_adds_leading_slash() {
        assert_eq!(normalize_context_path("app"), "/app");
    }

    #[test]
    fn test_normalize_context_path_strips_trailing_slash() {
        assert_eq!(normalize_context_path("/app/"), "/app");
        assert_eq!(normalize_context_path("/shop/web/"), "/shop/web");
    }

    // ==================== from_env Tests ====================

    #[test]
    #[serial]
    fn test_from_env_defaults() {
        clear_env();

        let config = Config::from_env().expect("Defaults should load");
        assert_eq!(config.context_path, "");
        assert_eq!(config.port, 8080);
        assert_eq!(config.i18n_origin, "http://localhost:8080");
        assert_eq!(config.i18n_dir, "WebContent/i18n");
        assert_eq!(config.fetch_timeout_secs, 10);
        assert_eq!(config.preferences_file, "preferences.json");
        assert_eq!(config.default_language, "en");
        assert_eq!(config.i18n_base_url(), "http://localhost:8080/i18n");
    }

    #[test]
    #[serial]
    fn test_from_env_context_path_prefixes_base_url() {
        clear_env();
        std::env::set_var("APP_CONTEXT_PATH", "/myapp/");
        std::env::set_var("I18N_ORIGIN", "https://example.com/");

        let config = Config::from_env().expect("Should load");
        assert_eq!(config.context_path, "/myapp");
        assert_eq!(config.i18n_base_url(), "https://example.com/myapp/i18n");

        clear_env();
    }

    #[test]
    #[serial]
    fn test_from_env_origin_follows_port() {
        clear_env();
        std::env::set_var("PORT", "9090");

        let config = Config::from_env().expect("Should load");
        assert_eq!(config.i18n_origin, "http://localhost:9090");

        clear_env();
    }

    #[test]
    #[serial]
    fn test_from_env_invalid_port_is_error() {
        clear_env();
        std::env::set_var("PORT", "not-a-port");

        let result = Config::from_env();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("PORT"));

        clear_env();
    }

    #[test]
    #[serial]
    fn test_from_env_blank_default_language_falls_back_to_english() {
        clear_env();
        std::env::set_var("DEFAULT_LANGUAGE", "  ");

        let config = Config::from_env().expect("Should load");
        assert_eq!(config.default_language, "en");

        clear_env();
    }

    #[test]
    #[serial]
    fn test_from_env_invalid_timeout_uses_default() {
        clear_env();
        std::env::set_var("FETCH_TIMEOUT_SECS", "soon");

        let config = Config::from_env().expect("Should load");
        assert_eq!(config.fetch_timeout_secs, 10);

        clear_env();
    }
}
