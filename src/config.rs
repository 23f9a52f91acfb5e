//! Layered client configuration.
//!
//! Sources, lowest priority first: built-in defaults, a TOML file, `ALLURE_LITE_*`
//! environment variables, then command-line flags that were actually given.

use std::path::{Path, PathBuf};
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

use crate::core::refresh::DEFAULT_REFRESH_DELAY;

pub const ENV_PREFIX: &str = "ALLURE_LITE_";
pub const CONFIG_ENV: &str = "ALLURE_LITE_CONFIG";
pub const DEFAULT_CONFIG_FILE: &str = "allure-lite.toml";

/// Keys read verbatim from the environment. `Env` would turn a token like
/// `12345` or `007` into a number.
const TEXT_KEYS: [&str; 4] = ["server", "viewer", "token", "project"];
const ENV_IGNORED: [&str; 5] = ["config", "server", "viewer", "token", "project"];

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config file {} does not exist", .0.display())]
    MissingFile(PathBuf),
    #[error(transparent)]
    Figment(#[from] figment::Error),
    #[error("invalid {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Base URL of the report API.
    pub server: String,
    /// Base URL serving rendered reports. Defaults to `server`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub viewer: Option<String>,
    /// Bearer token for uploads and deletes.
    pub token: String,
    /// Project selected at startup.
    pub project: String,
    /// Projects offered by the selector.
    pub projects: Vec<String>,
    /// Delay before reloading after an accepted upload.
    pub refresh_delay_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_timeout_secs: Option<u64>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: "http://localhost:8081".to_string(),
            viewer: None,
            token: "devtoken".to_string(),
            project: "demo".to_string(),
            projects: vec!["demo".to_string()],
            refresh_delay_ms: DEFAULT_REFRESH_DELAY.as_millis() as u64,
            request_timeout_secs: None,
        }
    }
}

impl AppConfig {
    /// Load the configuration from every source.
    ///
    /// `overrides` is any serializable set of command-line values; fields it
    /// skips leave lower layers untouched.
    pub fn new<T: Serialize>(
        config_file: Option<&Path>,
        overrides: Option<&T>,
    ) -> Result<Self, ConfigError> {
        let file = resolve_config_file(config_file)?;
        Self::from_figment(Self::figment(file.as_deref(), overrides))
    }

    pub fn figment<T: Serialize>(config_file: Option<&Path>, overrides: Option<&T>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(AppConfig::default()));
        if let Some(path) = config_file {
            figment = figment.merge(Toml::file(path));
        }
        figment = figment.merge(Env::prefixed(ENV_PREFIX).ignore(&ENV_IGNORED));
        for key in TEXT_KEYS {
            let var = format!("{ENV_PREFIX}{}", key.to_ascii_uppercase());
            if let Ok(value) = std::env::var(&var) {
                figment = figment.merge(Serialized::default(key, value));
            }
        }
        if let Some(overrides) = overrides {
            figment = figment.merge(Serialized::defaults(overrides));
        }
        figment
    }

    pub fn from_figment(figment: Figment) -> Result<Self, ConfigError> {
        let mut config: AppConfig = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&mut self) -> Result<(), ConfigError> {
        check_url("server", &self.server)?;
        if let Some(viewer) = &self.viewer {
            check_url("viewer", viewer)?;
        }
        if self.project.trim().is_empty() {
            return Err(ConfigError::Invalid {
                field: "project",
                reason: "must not be empty".to_string(),
            });
        }
        if !self.projects.contains(&self.project) {
            self.projects.push(self.project.clone());
        }
        Ok(())
    }

    /// Base URL for rendered report pages.
    pub fn viewer_base(&self) -> &str {
        self.viewer.as_deref().unwrap_or(&self.server)
    }

    pub fn refresh_delay(&self) -> Duration {
        Duration::from_millis(self.refresh_delay_ms)
    }

    /// Copy suitable for printing.
    pub fn redacted(&self) -> Self {
        Self {
            token: "<redacted>".to_string(),
            ..self.clone()
        }
    }
}

/// Pick the config file: explicit path, then `$ALLURE_LITE_CONFIG`, then
/// `allure-lite.toml` in the working directory if it exists.
fn resolve_config_file(explicit: Option<&Path>) -> Result<Option<PathBuf>, ConfigError> {
    let chosen = explicit
        .map(Path::to_path_buf)
        .or_else(|| std::env::var_os(CONFIG_ENV).map(PathBuf::from));

    match chosen {
        Some(path) if path.exists() => Ok(Some(path)),
        Some(path) => Err(ConfigError::MissingFile(path)),
        None => {
            let local = PathBuf::from(DEFAULT_CONFIG_FILE);
            Ok(local.exists().then_some(local))
        }
    }
}

fn check_url(field: &'static str, value: &str) -> Result<(), ConfigError> {
    match reqwest::Url::parse(value) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => Ok(()),
        Ok(url) => Err(ConfigError::Invalid {
            field,
            reason: format!("unsupported scheme `{}`", url.scheme()),
        }),
        Err(e) => Err(ConfigError::Invalid {
            field,
            reason: format!("{value}: {e}"),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    #[derive(Serialize)]
    struct Flags {
        #[serde(skip_serializing_if = "Option::is_none")]
        project: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        token: Option<String>,
    }

    #[test]
    fn defaults_match_service_conventions() {
        Jail::expect_with(|_| {
            let config = AppConfig::new(None, None::<&Flags>).unwrap();
            assert_eq!(config, AppConfig::default());
            assert_eq!(config.refresh_delay(), Duration::from_millis(2000));
            assert_eq!(config.viewer_base(), "http://localhost:8081");
            Ok(())
        });
    }

    #[test]
    fn layers_override_in_order() {
        Jail::expect_with(|jail| {
            jail.create_file(
                DEFAULT_CONFIG_FILE,
                r#"
                server = "http://reports.internal:8081"
                token = "from-file"
                project = "web"
                projects = ["demo", "web"]
                "#,
            )?;
            jail.set_env("ALLURE_LITE_TOKEN", "from-env");

            let flags = Flags {
                project: Some("demo".to_string()),
                token: None,
            };
            let config = AppConfig::new(None, Some(&flags)).unwrap();

            assert_eq!(config.server, "http://reports.internal:8081");
            assert_eq!(config.token, "from-env");
            assert_eq!(config.project, "demo");
            assert_eq!(config.projects, ["demo", "web"]);
            Ok(())
        });
    }

    #[test]
    fn numeric_env_values_stay_text() {
        Jail::expect_with(|jail| {
            jail.set_env("ALLURE_LITE_TOKEN", "007");
            jail.set_env("ALLURE_LITE_PROJECT", "2024");
            jail.set_env("ALLURE_LITE_REFRESH_DELAY_MS", "500");

            let config = AppConfig::new(None, None::<&Flags>).unwrap();
            assert_eq!(config.token, "007");
            assert_eq!(config.project, "2024");
            assert_eq!(config.projects, ["demo", "2024"]);
            assert_eq!(config.refresh_delay_ms, 500);
            Ok(())
        });
    }

    #[test]
    fn cli_still_beats_verbatim_env() {
        Jail::expect_with(|jail| {
            jail.set_env("ALLURE_LITE_TOKEN", "12345");
            let flags = Flags {
                project: None,
                token: Some("from-cli".to_string()),
            };
            let config = AppConfig::new(None, Some(&flags)).unwrap();
            assert_eq!(config.token, "from-cli");
            Ok(())
        });
    }

    #[test]
    fn explicit_config_file_must_exist() {
        Jail::expect_with(|_| {
            let err = AppConfig::new(Some(Path::new("missing.toml")), None::<&Flags>).unwrap_err();
            assert!(matches!(err, ConfigError::MissingFile(_)));
            Ok(())
        });
    }

    #[test]
    fn active_project_joins_option_set() {
        Jail::expect_with(|jail| {
            jail.set_env("ALLURE_LITE_PROJECT", "mobile");
            let config = AppConfig::new(None, None::<&Flags>).unwrap();
            assert_eq!(config.projects, ["demo", "mobile"]);
            Ok(())
        });
    }

    #[test]
    fn rejects_bad_server_url() {
        Jail::expect_with(|_| {
            let figment = AppConfig::figment(None, None::<&Flags>)
                .merge(Serialized::default("server", "ftp://example.com"));
            let err = AppConfig::from_figment(figment).unwrap_err();
            assert!(matches!(err, ConfigError::Invalid { field: "server", .. }));
            Ok(())
        });
    }

    #[test]
    fn redacted_hides_token() {
        let config = AppConfig::default().redacted();
        assert_eq!(config.token, "<redacted>");
        assert_eq!(config.server, AppConfig::default().server);
    }
}
