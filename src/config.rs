//! Configuration file handling for Billed.
//!
//! The configuration file is stored at `$BILLED_HOME/config.json` and holds the URL of the bills
//! API and the location of the session file.

use crate::{utils, Result};
use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use url::Url;

const APP_NAME: &str = "billed";
const CONFIG_VERSION: u8 = 1;
const CONFIG_JSON: &str = "config.json";
const SESSION_JSON: &str = "session.json";

/// The API the Billed back-end listens on during development.
pub const DEFAULT_API_URL: &str = "http://localhost:5678/";

/// The `Config` object represents the configuration of the app. You instantiate it by providing
/// the path to `$BILLED_HOME` and from there it loads `$BILLED_HOME/config.json`.
#[derive(Debug, Clone)]
pub struct Config {
    root: PathBuf,
    config_path: PathBuf,
    config_file: ConfigFile,
    api_url: Url,
}

impl Config {
    /// Creates the data directory and an initial `config.json` file pointing at `api_url`.
    ///
    /// # Errors
    /// - Returns an error if `api_url` is not a valid URL.
    /// - Returns an error if any file operations fail.
    pub async fn create(dir: impl Into<PathBuf>, api_url: &str) -> Result<Self> {
        let api_url = parse_api_url(api_url)?;
        let maybe_relative = dir.into();
        utils::make_dir(&maybe_relative)
            .await
            .context("Unable to create the billed home directory")?;
        let root = utils::canonicalize(&maybe_relative).await?;
        let config_path = root.join(CONFIG_JSON);

        let config_file = ConfigFile {
            api_url: api_url.to_string(),
            ..Default::default()
        };
        config_file.save(&config_path).await?;

        Ok(Self {
            root,
            config_path,
            config_file,
            api_url,
        })
    }

    /// This will
    /// - validate that `billed_home` and its config file exist
    /// - load and validate the config file
    /// - return the loaded configuration object
    pub async fn load(billed_home: impl Into<PathBuf>) -> Result<Self> {
        let maybe_relative = billed_home.into();
        if !maybe_relative.is_dir() {
            bail!(
                "Billed Home is missing '{}', run 'billed init' first",
                maybe_relative.display()
            )
        }
        let root = utils::canonicalize(&maybe_relative).await?;

        let config_path = root.join(CONFIG_JSON);
        if !config_path.is_file() {
            bail!("The config file is missing '{}'", config_path.display())
        }
        let config_file = ConfigFile::load(&config_path).await?;
        let api_url = parse_api_url(&config_file.api_url)?;

        Ok(Self {
            root,
            config_path,
            config_file,
            api_url,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn api_url(&self) -> &Url {
        &self.api_url
    }

    /// Returns the stored `session_path` if it is absolute, otherwise resolves it against the
    /// billed home directory.
    pub fn session_path(&self) -> PathBuf {
        let p = self.config_file.session_path();
        if p.is_absolute() {
            return p;
        }
        self.root.join(p)
    }
}

/// Parses `s` and makes sure the path ends with `/` so that endpoints can be joined onto it.
fn parse_api_url(s: &str) -> Result<Url> {
    let mut url = Url::parse(s).with_context(|| format!("Invalid API URL '{s}'"))?;
    if url.cannot_be_a_base() {
        bail!("The API URL '{s}' cannot be used as a base URL");
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

/// Represents the serialization and deserialization format of the configuration file.
///
/// Example configuration:
/// ```json
/// {
///   "app_name": "billed",
///   "config_version": 1,
///   "api_url": "http://localhost:5678/",
///   "session_path": "session.json"
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
struct ConfigFile {
    /// Application name, should always be "billed"
    app_name: String,

    /// Configuration file version
    config_version: u8,

    /// Base URL of the bills API
    api_url: String,

    /// Path to the session file (optional, relative to `$BILLED_HOME` or absolute)
    /// Defaults to $BILLED_HOME/session.json if not specified
    #[serde(skip_serializing_if = "Option::is_none")]
    session_path: Option<PathBuf>,
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            app_name: APP_NAME.to_string(),
            config_version: CONFIG_VERSION,
            api_url: DEFAULT_API_URL.to_string(),
            session_path: None,
        }
    }
}

impl ConfigFile {
    /// Loads a ConfigFile asynchronously from the specified path.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed, or if it is not a billed config.
    async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let config: ConfigFile = utils::deserialize(path).await?;
        anyhow::ensure!(
            config.app_name == APP_NAME,
            "Invalid app_name in config file: expected '{}', got '{}'",
            APP_NAME,
            config.app_name
        );
        Ok(config)
    }

    async fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let p = path.as_ref();
        let data = serde_json::to_string_pretty(self).context("Unable to serialize config")?;
        utils::write(p, data)
            .await
            .context("Unable to write config file")
    }

    fn session_path(&self) -> PathBuf {
        self.session_path
            .clone()
            .unwrap_or_else(|| PathBuf::from(SESSION_JSON))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_config_create_and_load() {
        let dir = TempDir::new().unwrap();
        let home_dir = dir.path().join("billed_home");

        let config = Config::create(&home_dir, "http://localhost:5678")
            .await
            .unwrap();
        assert_eq!("http://localhost:5678/", config.api_url().as_str());
        assert!(config.config_path().is_file());
        assert_eq!(config.root().join("session.json"), config.session_path());

        let loaded = Config::load(&home_dir).await.unwrap();
        assert_eq!(config.api_url(), loaded.api_url());
        assert_eq!(config.session_path(), loaded.session_path());
    }

    #[tokio::test]
    async fn test_config_load_missing_home() {
        let dir = TempDir::new().unwrap();
        let err = Config::load(dir.path().join("nope")).await.unwrap_err();
        assert!(err.to_string().contains("billed init"));
    }

    #[tokio::test]
    async fn test_config_load_wrong_app_name() {
        let dir = TempDir::new().unwrap();
        let content = r#"{"app_name": "expenses", "config_version": 1, "api_url": "http://x/"}"#;
        utils::write(dir.path().join(CONFIG_JSON), content)
            .await
            .unwrap();
        let err = Config::load(dir.path()).await.unwrap_err();
        assert!(format!("{err:#}").contains("Invalid app_name"));
    }

    #[test]
    fn test_parse_api_url() {
        assert_eq!(
            "https://api.billed.tld/v1/",
            parse_api_url("https://api.billed.tld/v1").unwrap().as_str()
        );
        assert!(parse_api_url("not a url").is_err());
        assert!(parse_api_url("mailto:a@a").is_err());
    }

    #[test]
    fn test_config_file_session_path() {
        let file = ConfigFile {
            session_path: Some(PathBuf::from("/tmp/session.json")),
            ..Default::default()
        };
        assert_eq!(PathBuf::from("/tmp/session.json"), file.session_path());
        assert_eq!(
            PathBuf::from(SESSION_JSON),
            ConfigFile::default().session_path()
        );
    }
}
