// Token persistence. The CLI keeps exactly one piece of state on disk: the
// bearer token, in `~/.pikarama/config.json`. Command handlers receive a
// `TokenStore` so tests can swap the file for memory.

use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{Error, Result};

const CONFIG_DIR_NAME: &str = ".pikarama";
const CONFIG_FILE_NAME: &str = "config.json";

/// Where users get an API token.
pub const TOKEN_URL: &str = "https://www.pikarama.com/settings";

/// Contents of the config file.
#[derive(Serialize, Deserialize, Debug, Default, Clone, PartialEq)]
pub struct CliConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

pub trait TokenStore {
    /// Read the stored config. A missing or unreadable file is an empty config.
    fn load(&self) -> Result<CliConfig>;

    fn save(&self, config: &CliConfig) -> Result<()>;

    /// Forget everything. Clearing an empty store is not an error.
    fn clear(&self) -> Result<()>;

    fn token(&self) -> Result<Option<String>> {
        Ok(self.load()?.token.filter(|t| !t.is_empty()))
    }

    fn set_token(&self, token: &str) -> Result<()> {
        let mut config = self.load()?;
        config.token = Some(token.to_string());
        self.save(&config)
    }
}

/// Return the stored token or fail before any request is attempted.
pub fn require_token(store: &dyn TokenStore) -> Result<String> {
    store.token()?.ok_or_else(|| {
        Error::cli("You must log in first. Run `pikarama login` and store your API token.")
    })
}

/// Default config directory: `$HOME/.pikarama`.
pub fn default_config_dir() -> PathBuf {
    let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
    home.join(CONFIG_DIR_NAME)
}

/// JSON file store with owner-only permissions.
pub struct FileTokenStore {
    dir: PathBuf,
}

impl FileTokenStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        FileTokenStore { dir: dir.into() }
    }

    pub fn path(&self) -> PathBuf {
        self.dir.join(CONFIG_FILE_NAME)
    }

    fn ensure_dir(&self) -> Result<()> {
        fs::create_dir_all(&self.dir)?;
        restrict(&self.dir, 0o700)
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> Result<CliConfig> {
        let path = self.path();
        let contents = match fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(CliConfig::default()),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "could not read config file");
                return Ok(CliConfig::default());
            }
        };
        match serde_json::from_str(&contents) {
            Ok(config) => Ok(config),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "ignoring corrupt config file");
                Ok(CliConfig::default())
            }
        }
    }

    fn save(&self, config: &CliConfig) -> Result<()> {
        self.ensure_dir()?;
        let path = self.path();
        fs::write(&path, serde_json::to_string_pretty(config)?)?;
        restrict(&path, 0o600)?;
        debug!(path = %path.display(), "config saved");
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        match fs::remove_file(self.path()) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(unix)]
fn restrict(path: &Path, mode: u32) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(mode))?;
    Ok(())
}

#[cfg(not(unix))]
fn restrict(_path: &Path, _mode: u32) -> Result<()> {
    Ok(())
}

/// In-memory store, for tests and embedding.
#[derive(Default)]
pub struct MemoryTokenStore {
    config: RefCell<CliConfig>,
}

impl MemoryTokenStore {
    pub fn with_token(token: &str) -> Self {
        MemoryTokenStore {
            config: RefCell::new(CliConfig {
                token: Some(token.to_string()),
            }),
        }
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> Result<CliConfig> {
        Ok(self.config.borrow().clone())
    }

    fn save(&self, config: &CliConfig) -> Result<()> {
        *self.config.borrow_mut() = config.clone();
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        *self.config.borrow_mut() = CliConfig::default();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn file_store_round_trips_token() {
        let dir = tempdir().unwrap();
        let store = FileTokenStore::new(dir.path().join("cfg"));
        assert_eq!(store.token().unwrap(), None);

        store.set_token("pk_abc").unwrap();
        assert_eq!(store.token().unwrap().as_deref(), Some("pk_abc"));

        let written = fs::read_to_string(store.path()).unwrap();
        assert!(written.contains("\"token\": \"pk_abc\""));

        store.clear().unwrap();
        assert_eq!(store.token().unwrap(), None);
        store.clear().unwrap();
    }

    #[cfg(unix)]
    #[test]
    fn file_store_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;
        let dir = tempdir().unwrap();
        let store = FileTokenStore::new(dir.path());
        store.set_token("pk_abc").unwrap();
        let mode = fs::metadata(store.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn corrupt_file_reads_as_logged_out() {
        let dir = tempdir().unwrap();
        let store = FileTokenStore::new(dir.path());
        fs::write(store.path(), "{not json").unwrap();
        assert_eq!(store.load().unwrap(), CliConfig::default());
    }

    #[test]
    fn require_token_fails_without_token() {
        let store = MemoryTokenStore::default();
        let err = require_token(&store).unwrap_err();
        assert!(matches!(err, Error::Cli(_)));
        assert!(err.to_string().contains("pikarama login"));

        store.set_token("pk_1").unwrap();
        assert_eq!(require_token(&store).unwrap(), "pk_1");
    }

    #[test]
    fn empty_token_counts_as_missing() {
        let store = MemoryTokenStore::with_token("");
        assert!(require_token(&store).is_err());
    }
}
