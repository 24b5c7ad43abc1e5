//! Layered configuration.
//!
//! Sources are merged in order, later ones winning:
//!
//! 1. built-in defaults ([`Config::default`]),
//! 2. an optional config file (TOML, YAML or JSON, chosen by extension),
//! 3. environment variables prefixed `STATDATA_`, with `__` separating nested
//!    keys (`STATDATA_API__USERNAME`).
//!
//! Command-line overrides are applied by the binary on top of the result.

pub mod error;

use crate::error::{ErrorKind, Result};
use directories::ProjectDirs;
use figment::Figment;
use figment::providers::{Env, Format, Json, Serialized, Toml, Yaml};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const ENV_PREFIX: &str = "STATDATA_";
pub const DEFAULT_BASE_URL: &str = "https://api.swgoh.help";
pub const DEFAULT_LANGUAGE: &str = "eng_us";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Directory holding `gameData.json`, `dataVersion.json` and the
    /// per-collection `temp/` caches.
    pub data_dir: PathBuf,
    /// Fetch and transform everything, but never write to `data_dir`.
    #[serde(default)]
    pub dry_run: bool,
    pub api: ApiConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiConfig {
    pub base_url: String,
    pub language: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    pub client_id: String,
    pub client_secret: String,
}

impl Default for Config {
    fn default() -> Self {
        let data_dir = ProjectDirs::from("", "", "statdata")
            .map(|dirs| dirs.data_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from("statCalcData"));
        Self { data_dir, dry_run: false, api: ApiConfig::default() }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            language: DEFAULT_LANGUAGE.to_string(),
            username: None,
            password: None,
            // The public API's documented client pair.
            client_id: "abc".to_string(),
            client_secret: "123".to_string(),
        }
    }
}

impl Config {
    /// Build the layered [`Figment`] without extracting it.
    pub fn figment(file: Option<&Path>) -> Result<Figment> {
        let mut figment = Figment::from(Serialized::defaults(Config::default()));
        if let Some(file) = file {
            if !file.is_file() {
                exn::bail!(ErrorKind::NotFound(file.to_path_buf()));
            }
            figment = match file.extension().and_then(|ext| ext.to_str()) {
                Some("toml") => figment.merge(Toml::file(file)),
                Some("yaml" | "yml") => figment.merge(Yaml::file(file)),
                Some("json") => figment.merge(Json::file(file)),
                _ => exn::bail!(ErrorKind::UnsupportedFormat(file.to_path_buf())),
            };
        }
        Ok(figment.merge(Env::prefixed(ENV_PREFIX).split("__")))
    }

    /// Load and validate configuration from every source.
    pub fn load(file: Option<&Path>) -> Result<Self> {
        Self::from_figment(Self::figment(file)?)
    }

    pub fn from_figment(figment: Figment) -> Result<Self> {
        let config: Self = figment.extract().map_err(|e| ErrorKind::Invalid(e.to_string()))?;
        config.validate()?;
        tracing::debug!(data_dir = %config.data_dir.display(), base_url = %config.api.base_url, "Loaded configuration");
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.data_dir.as_os_str().is_empty() {
            exn::bail!(ErrorKind::Invalid("data_dir must not be empty".to_string()));
        }
        if !(self.api.base_url.starts_with("http://") || self.api.base_url.starts_with("https://")) {
            exn::bail!(ErrorKind::Invalid(format!("api.base_url is not an HTTP(S) URL: {}", self.api.base_url)));
        }
        if self.api.language.is_empty() {
            exn::bail!(ErrorKind::Invalid("api.language must not be empty".to_string()));
        }
        Ok(())
    }
}

impl ApiConfig {
    /// Username and password, which are only needed once a client is built.
    pub fn credentials(&self) -> Result<(&str, &str)> {
        match (self.username.as_deref(), self.password.as_deref()) {
            (Some(username), Some(password)) if !username.is_empty() && !password.is_empty() => {
                Ok((username, password))
            },
            _ => exn::bail!(ErrorKind::MissingCredentials),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;
    use rstest::rstest;

    /// Load `contents` as config file `name` from a jail with no
    /// `STATDATA_` variables but those in `env`.
    fn load_jailed(name: &'static str, contents: &'static str, env: &'static [(&str, &str)], check: fn(Result<Config>)) {
        Jail::expect_with(|jail| {
            jail.clear_env();
            jail.create_file(name, contents)?;
            for &(key, value) in env {
                jail.set_env(key, value);
            }
            check(Config::load(Some(Path::new(name))));
            Ok(())
        });
    }

    #[test]
    fn test_defaults_are_valid() {
        Jail::expect_with(|jail| {
            jail.clear_env();
            let config = Config::load(None).unwrap();
            assert_eq!(config, Config::default());
            assert_eq!(config.api.base_url, DEFAULT_BASE_URL);
            assert_eq!(config.api.language, DEFAULT_LANGUAGE);
            assert!(!config.dry_run);
            Ok(())
        });
    }

    #[rstest]
    #[case("config.toml", "data_dir = \"/srv/stats\"\n[api]\nusername = \"me\"\n")]
    #[case("config.yaml", "data_dir: /srv/stats\napi:\n  username: me\n")]
    #[case("config.yml", "data_dir: /srv/stats\napi:\n  username: me\n")]
    #[case("config.json", r#"{"data_dir": "/srv/stats", "api": {"username": "me"}}"#)]
    fn test_file_formats(#[case] name: &'static str, #[case] contents: &'static str) {
        load_jailed(name, contents, &[], |config| {
            let config = config.unwrap();
            assert_eq!(config.data_dir, Path::new("/srv/stats"));
            assert_eq!(config.api.username.as_deref(), Some("me"));
            // Untouched nested keys keep their defaults
            assert_eq!(config.api.base_url, DEFAULT_BASE_URL);
        });
    }

    #[test]
    fn test_environment_overrides_file() {
        let env = &[
            ("STATDATA_API__USERNAME", "from_env"),
            ("STATDATA_API__PASSWORD", "pw"),
            ("STATDATA_DRY_RUN", "true"),
        ];
        load_jailed("config.toml", "data_dir = \"/srv/stats\"\n[api]\nusername = \"me\"\n", env, |config| {
            let config = config.unwrap();
            assert_eq!(config.api.credentials().unwrap(), ("from_env", "pw"));
            assert!(config.dry_run);
            assert_eq!(config.data_dir, Path::new("/srv/stats"));
        });
    }

    #[test]
    fn test_unprefixed_environment_is_ignored() {
        load_jailed("config.toml", "", &[("API__USERNAME", "nope"), ("DRY_RUN", "true")], |config| {
            let config = config.unwrap();
            assert_eq!(config.api.username, None);
            assert!(!config.dry_run);
        });
    }

    #[rstest]
    #[case("data_dir = \"\"")]
    #[case("[api]\nbase_url = \"ftp://example.com\"")]
    #[case("[api]\nlanguage = \"\"")]
    fn test_validation(#[case] contents: &'static str) {
        load_jailed("config.toml", contents, &[], |config| {
            let err = config.unwrap_err();
            assert!(matches!(&*err, ErrorKind::Invalid(_)));
        });
    }

    #[test]
    fn test_invalid_environment_value() {
        load_jailed("config.toml", "", &[("STATDATA_DRY_RUN", "sometimes")], |config| {
            assert!(matches!(&*config.unwrap_err(), ErrorKind::Invalid(_)));
        });
    }

    #[test]
    fn test_missing_file() {
        let err = Config::figment(Some(Path::new("/definitely/not/here.toml"))).unwrap_err();
        assert!(matches!(&*err, ErrorKind::NotFound(_)));
    }

    #[test]
    fn test_unsupported_format() {
        load_jailed("config.ini", "data_dir=/srv", &[], |config| {
            assert!(matches!(&*config.unwrap_err(), ErrorKind::UnsupportedFormat(_)));
        });
    }

    #[test]
    fn test_credentials() {
        let mut api = ApiConfig::default();
        assert!(api.credentials().is_err());
        api.username = Some("me".to_string());
        assert!(api.credentials().is_err());
        api.password = Some("secret".to_string());
        assert_eq!(api.credentials().unwrap(), ("me", "secret"));
    }
}
