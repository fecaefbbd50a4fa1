//! Configuration for the `taskboard` binary.
//!
//! Supports layered configuration with the following priority (highest first):
//! 1. CLI arguments
//! 2. Environment variables (via clap `env` attribute)
//! 3. TOML config file (`~/.config/taskboard/config.toml`)
//! 4. Compiled defaults
//!
//! Missing config file is not an error (defaults are used). An explicit
//! `--config` path that doesn't exist is an error.

use std::path::PathBuf;

use taskboard_proto::TaskRules;
use taskboard_proto::task::MAX_TASK_TITLE_LENGTH;

use crate::board::BoardSettings;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file.
    #[error("failed to read config file {path}: {source}")]
    ReadFile {
        /// Path that was attempted.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Failed to parse the TOML configuration.
    #[error("failed to parse config file: {0}")]
    ParseToml(#[from] toml::de::Error),

    /// A value parsed but is not usable.
    #[error("invalid config value for {key}: {reason}")]
    Invalid {
        /// Dotted key of the offending value.
        key: &'static str,
        /// What is wrong with it.
        reason: String,
    },
}

// ---------------------------------------------------------------------------
// TOML file structs (all fields Option for partial overrides)
// ---------------------------------------------------------------------------

/// Top-level TOML config file structure.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct ConfigFile {
    board: BoardFileConfig,
    contacts: ContactsFileConfig,
    logging: LoggingFileConfig,
}

/// `[board]` section of the config file.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct BoardFileConfig {
    max_title_len: Option<usize>,
    categories: Option<Vec<String>>,
}

/// `[contacts]` section of the config file.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct ContactsFileConfig {
    palette: Option<Vec<String>>,
}

/// `[logging]` section of the config file.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct LoggingFileConfig {
    level: Option<String>,
    file: Option<PathBuf>,
}

// ---------------------------------------------------------------------------
// Resolved configuration (concrete types, all fields populated)
// ---------------------------------------------------------------------------

/// Fully resolved client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    // -- Board --
    /// Maximum task title length in characters.
    pub max_title_len: usize,
    /// Allowed task categories. Empty accepts any non-empty category.
    pub categories: Vec<String>,

    // -- Contacts --
    /// Badge colors for new contacts.
    pub palette: Vec<String>,

    // -- Logging --
    /// Log filter directive (`info`, `taskboard=debug`, ...).
    pub log_level: String,
    /// Log file path. `None` means `$TMPDIR/taskboard.log`.
    pub log_file: Option<PathBuf>,

    // -- Run --
    /// JSON file the in-memory store is seeded from.
    pub seed: Option<PathBuf>,
    /// Only list cards matching this text.
    pub search: Option<String>,
    /// Print the report as JSON instead of text.
    pub json: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            max_title_len: MAX_TASK_TITLE_LENGTH,
            categories: vec!["Technical Task".to_string(), "User Story".to_string()],
            palette: BoardSettings::default().palette,
            log_level: "info".to_string(),
            log_file: None,
            seed: None,
            search: None,
            json: false,
        }
    }
}

impl ClientConfig {
    /// Load configuration by merging CLI args, env vars, and a TOML file.
    ///
    /// If `--config` is given and the file does not exist, returns an error.
    /// Otherwise the default path is tried and silently ignored if missing.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the config file cannot be read or parsed,
    /// or if a resolved value is unusable.
    pub fn load(cli: &CliArgs) -> Result<Self, ConfigError> {
        let file = load_config_file(cli.config.as_deref())?;
        let config = Self::resolve(cli, &file);
        config.check()?;
        Ok(config)
    }

    /// Resolve a `ClientConfig` from CLI args and a parsed config file.
    ///
    /// Priority: CLI > file > default.
    #[must_use]
    fn resolve(cli: &CliArgs, file: &ConfigFile) -> Self {
        let defaults = Self::default();

        Self {
            max_title_len: cli
                .max_title_len
                .or(file.board.max_title_len)
                .unwrap_or(defaults.max_title_len),
            categories: file
                .board
                .categories
                .clone()
                .unwrap_or(defaults.categories),
            palette: file.contacts.palette.clone().unwrap_or(defaults.palette),
            log_level: cli
                .log_level
                .clone()
                .or_else(|| file.logging.level.clone())
                .unwrap_or(defaults.log_level),
            log_file: cli
                .log_file
                .clone()
                .or_else(|| file.logging.file.clone()),
            seed: cli.seed.clone(),
            search: cli.search.clone(),
            json: cli.json,
        }
    }

    fn check(&self) -> Result<(), ConfigError> {
        if self.max_title_len == 0 {
            return Err(ConfigError::Invalid {
                key: "board.max_title_len",
                reason: "must be at least 1".to_string(),
            });
        }
        if let Some(color) = self.palette.iter().find(|c| !is_hex_color(c)) {
            return Err(ConfigError::Invalid {
                key: "contacts.palette",
                reason: format!("{color:?} is not a #rrggbb color"),
            });
        }
        Ok(())
    }

    /// Build the [`BoardSettings`] the coordinator validates against.
    #[must_use]
    pub fn to_board_settings(&self) -> BoardSettings {
        BoardSettings {
            rules: TaskRules {
                max_title_len: self.max_title_len,
                categories: self.categories.clone(),
            },
            palette: self.palette.clone(),
        }
    }
}

/// CLI arguments parsed by clap.
#[derive(clap::Parser, Debug, Default)]
#[command(version, about = "Sync a task board into memory and print its summary")]
pub struct CliArgs {
    /// Path to config file (default: `~/.config/taskboard/config.toml`).
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// JSON file with the tasks and contacts to load into the store.
    #[arg(long, env = "TASKBOARD_SEED")]
    pub seed: Option<PathBuf>,

    /// Maximum task title length in characters.
    #[arg(long)]
    pub max_title_len: Option<usize>,

    /// Only list cards whose title or description contains this text.
    #[arg(long)]
    pub search: Option<String>,

    /// Print the report as JSON.
    #[arg(long)]
    pub json: bool,

    /// Log level filter (trace, debug, info, warn, error).
    #[arg(long, env = "TASKBOARD_LOG")]
    pub log_level: Option<String>,

    /// Path to log file (default: `$TMPDIR/taskboard.log`).
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

fn is_hex_color(value: &str) -> bool {
    value.len() == 7
        && value.starts_with('#')
        && value[1..].chars().all(|c| c.is_ascii_hexdigit())
}

/// Load and parse a TOML config file.
///
/// If `explicit_path` is `Some`, the file must exist (error if not).
/// If `explicit_path` is `None`, the default path is tried and missing file
/// is treated as empty config.
fn load_config_file(explicit_path: Option<&std::path::Path>) -> Result<ConfigFile, ConfigError> {
    if let Some(p) = explicit_path {
        let contents = std::fs::read_to_string(p).map_err(|e| ConfigError::ReadFile {
            path: p.to_path_buf(),
            source: e,
        })?;
        return Ok(toml::from_str(&contents)?);
    }

    let Some(config_dir) = dirs::config_dir() else {
        return Ok(ConfigFile::default());
    };
    let path = config_dir.join("taskboard").join("config.toml");

    match std::fs::read_to_string(&path) {
        Ok(contents) => Ok(toml::from_str(&contents)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(ConfigFile::default()),
        Err(e) => Err(ConfigError::ReadFile { path, source: e }),
    }
}
