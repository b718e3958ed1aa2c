//! Configuration loading and root folder resolution

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Environment variable naming the root folder
pub const ROOT_FOLDER_ENV: &str = "NEXUS_ROOT_FOLDER";
/// Environment variable naming the listen port
pub const PORT_ENV: &str = "NEXUS_PORT";
/// Environment variable carrying the insight provider API key
pub const GEMINI_API_KEY_ENV: &str = "NEXUS_GEMINI_API_KEY";

/// Default listen port
pub const DEFAULT_PORT: u16 = 3001;

/// Optional TOML config file contents (`config.toml` in the per-OS config dir)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TomlConfig {
    pub root_folder: Option<String>,
    pub port: Option<u16>,
    pub gemini_api_key: Option<String>,
}

impl TomlConfig {
    /// Load the config file if one exists; missing or malformed files are
    /// not fatal (warning + defaults + startup)
    pub fn load() -> Self {
        let Ok(path) = config_file_path() else {
            return Self::default();
        };
        match std::fs::read_to_string(&path) {
            Ok(contents) => match toml::from_str::<TomlConfig>(&contents) {
                Ok(config) => config,
                Err(e) => {
                    warn!("Ignoring malformed config file {}: {}", path.display(), e);
                    Self::default()
                }
            },
            Err(e) => {
                warn!("Could not read config file {}: {}", path.display(), e);
                Self::default()
            }
        }
    }
}

/// Resolved service configuration
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub root_folder: PathBuf,
    pub port: u16,
    pub gemini_api_key: Option<String>,
}

impl ServiceConfig {
    /// Resolve configuration following the priority order:
    /// 1. Command-line argument (highest priority)
    /// 2. Environment variable
    /// 3. TOML config file
    /// 4. Compiled default (fallback)
    pub fn resolve(cli_root: Option<&str>, cli_port: Option<u16>) -> Self {
        let file = TomlConfig::load();

        let root_folder = resolve_root_folder(cli_root, &file);

        let port = cli_port
            .or_else(|| {
                std::env::var(PORT_ENV)
                    .ok()
                    .and_then(|v| v.parse::<u16>().ok())
            })
            .or(file.port)
            .unwrap_or(DEFAULT_PORT);

        let gemini_api_key = std::env::var(GEMINI_API_KEY_ENV)
            .ok()
            .filter(|k| !k.is_empty())
            .or(file.gemini_api_key);

        Self {
            root_folder,
            port,
            gemini_api_key,
        }
    }

    /// Path of the SQLite database inside the root folder
    pub fn database_path(&self) -> PathBuf {
        self.root_folder.join("nexus.db")
    }

    /// Create the root folder if it does not exist yet
    pub fn ensure_root_folder(&self) -> Result<()> {
        std::fs::create_dir_all(&self.root_folder)?;
        Ok(())
    }
}

/// Root folder resolution (CLI arg → env var → config file → OS default)
pub fn resolve_root_folder(cli_arg: Option<&str>, file: &TomlConfig) -> PathBuf {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return PathBuf::from(path);
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(ROOT_FOLDER_ENV) {
        if !path.is_empty() {
            return PathBuf::from(path);
        }
    }

    // Priority 3: TOML config file
    if let Some(path) = &file.root_folder {
        return PathBuf::from(path);
    }

    // Priority 4: OS-dependent compiled default
    get_default_root_folder()
}

/// Get the configuration file path for the platform
fn config_file_path() -> Result<PathBuf> {
    if cfg!(target_os = "linux") {
        // Try ~/.config/nexus-crm/config.toml first, then /etc/nexus-crm/config.toml
        if let Some(path) = dirs::config_dir().map(|d| d.join("nexus-crm").join("config.toml")) {
            if path.exists() {
                return Ok(path);
            }
        }
        let system_config = PathBuf::from("/etc/nexus-crm/config.toml");
        if system_config.exists() {
            return Ok(system_config);
        }
        Err(Error::Config("No config file found".to_string()))
    } else {
        let path = dirs::config_dir()
            .map(|d| d.join("nexus-crm").join("config.toml"))
            .ok_or_else(|| Error::Config("Could not determine config directory".to_string()))?;
        if path.exists() {
            Ok(path)
        } else {
            Err(Error::Config(format!("Config file not found: {:?}", path)))
        }
    }
}

/// Get OS-dependent default root folder path
fn get_default_root_folder() -> PathBuf {
    if cfg!(target_os = "windows") {
        dirs::data_local_dir()
            .map(|d| d.join("nexus-crm"))
            .unwrap_or_else(|| PathBuf::from("C:\\ProgramData\\nexus-crm"))
    } else if cfg!(target_os = "macos") {
        dirs::data_dir()
            .map(|d| d.join("nexus-crm"))
            .unwrap_or_else(|| PathBuf::from("/Library/Application Support/nexus-crm"))
    } else {
        // ~/.local/share/nexus-crm (or /var/lib/nexus-crm for system-wide)
        dirs::data_local_dir()
            .map(|d| d.join("nexus-crm"))
            .unwrap_or_else(|| PathBuf::from("/var/lib/nexus-crm"))
    }
}

/// Database path helper for callers holding only a root folder
pub fn database_path(root_folder: &Path) -> PathBuf {
    root_folder.join("nexus.db")
}
