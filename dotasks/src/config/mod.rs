//! Configuration system for `doTasks`.
//!
//! Supports layered configuration with the following priority (highest first):
//! 1. CLI arguments
//! 2. Environment variables (via clap `env` attribute)
//! 3. TOML config file (`~/.config/dotasks/config.toml`)
//! 4. Compiled defaults
//!
//! Missing config file is not an error (defaults are used). An explicit
//! `--config` path that doesn't exist is an error.

use std::path::PathBuf;
use std::time::Duration;

use dotasks_proto::task::{MAX_TASK_TEXT_CHARS, MAX_TASKS};

use crate::tasks::StoreLimits;
use crate::theme::{Appearance, Palette, ThemeError};

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

    /// The configured status palette is unusable.
    #[error("invalid palette: {0}")]
    InvalidPalette(#[from] ThemeError),
}

// ---------------------------------------------------------------------------
// TOML file structs (all fields Option for partial overrides)
// ---------------------------------------------------------------------------

/// Top-level TOML config file structure.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct ConfigFile {
    storage: StorageFileConfig,
    tasks: TasksFileConfig,
    ui: UiFileConfig,
}

/// `[storage]` section of the config file.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct StorageFileConfig {
    data_dir: Option<PathBuf>,
    file_name: Option<String>,
    debounce_ms: Option<u64>,
    warning_buffer: Option<usize>,
}

/// `[tasks]` section of the config file.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct TasksFileConfig {
    max_tasks: Option<usize>,
    max_text_chars: Option<usize>,
    palette: Option<Vec<String>>,
    seed_examples: Option<bool>,
}

/// `[ui]` section of the config file.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct UiFileConfig {
    appearance: Option<Appearance>,
    color: Option<bool>,
}

// ---------------------------------------------------------------------------
// Resolved configuration (concrete types, all fields populated)
// ---------------------------------------------------------------------------

/// Fully resolved application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    // -- Storage --
    /// Directory holding the task document.
    pub data_dir: PathBuf,
    /// File name of the task document.
    pub file_name: String,
    /// Quiet period before a scheduled save is written.
    pub debounce: Duration,
    /// Capacity of the persistence warning channel.
    pub warning_buffer: usize,

    // -- Tasks --
    /// Maximum number of tasks.
    pub max_tasks: usize,
    /// Maximum task text length in characters.
    pub max_text_chars: usize,
    /// Status colors.
    pub palette: Palette,
    /// Write the two example tasks when no valid document exists.
    pub seed_examples: bool,

    // -- UI --
    /// Light or dark theme.
    pub appearance: Appearance,
    /// Emit ANSI colors when rendering.
    pub color: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            file_name: "tasks.json".to_string(),
            debounce: Duration::from_millis(1000),
            warning_buffer: 16,
            max_tasks: MAX_TASKS,
            max_text_chars: MAX_TASK_TEXT_CHARS,
            palette: Palette::default(),
            seed_examples: false,
            appearance: Appearance::Light,
            color: true,
        }
    }
}

impl AppConfig {
    /// Load configuration by merging CLI args, env vars, and a TOML file.
    ///
    /// If `--config` is given and the file does not exist, returns an
    /// error. Otherwise the default path (`~/.config/dotasks/config.toml`)
    /// is tried and silently ignored if missing.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the config file cannot be read or parsed,
    /// or if it names an invalid palette.
    pub fn load(cli: &CliArgs) -> Result<Self, ConfigError> {
        let file = load_config_file(cli.config.as_deref())?;
        Self::resolve(cli, &file)
    }

    /// Resolve an `AppConfig` from CLI args and a parsed config file.
    ///
    /// Priority: CLI > file > default.
    fn resolve(cli: &CliArgs, file: &ConfigFile) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let palette = match &file.tasks.palette {
            Some(colors) => Palette::new(colors.clone())?,
            None => defaults.palette,
        };

        Ok(Self {
            data_dir: cli
                .data_dir
                .clone()
                .or_else(|| file.storage.data_dir.clone())
                .unwrap_or(defaults.data_dir),
            file_name: file
                .storage
                .file_name
                .clone()
                .unwrap_or(defaults.file_name),
            debounce: file
                .storage
                .debounce_ms
                .map_or(defaults.debounce, Duration::from_millis),
            warning_buffer: file
                .storage
                .warning_buffer
                .unwrap_or(defaults.warning_buffer),
            max_tasks: file.tasks.max_tasks.unwrap_or(defaults.max_tasks),
            max_text_chars: file
                .tasks
                .max_text_chars
                .unwrap_or(defaults.max_text_chars),
            palette,
            seed_examples: cli.seed_examples
                || file.tasks.seed_examples.unwrap_or(defaults.seed_examples),
            appearance: cli
                .appearance
                .or(file.ui.appearance)
                .unwrap_or(defaults.appearance),
            color: !cli.plain && file.ui.color.unwrap_or(defaults.color),
        })
    }

    /// Store limits derived from this configuration.
    #[must_use]
    pub fn limits(&self) -> StoreLimits {
        StoreLimits::new(self.max_tasks, self.max_text_chars, self.palette.len())
    }

    /// Full path of the task document.
    #[must_use]
    pub fn document_path(&self) -> PathBuf {
        self.data_dir.join(&self.file_name)
    }
}

/// CLI arguments parsed by clap.
#[derive(clap::Parser, Debug, Default)]
#[command(version, about = "Single-list task keeper")]
pub struct CliArgs {
    /// Directory holding `tasks.json` (default: platform data dir).
    #[arg(long, env = "DOTASKS_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Path to config file (default: `~/.config/dotasks/config.toml`).
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Color theme.
    #[arg(long, value_enum)]
    pub appearance: Option<Appearance>,

    /// Seed two example tasks when no valid task list exists.
    #[arg(long)]
    pub seed_examples: bool,

    /// Disable ANSI colors.
    #[arg(long)]
    pub plain: bool,

    /// Log level filter (trace, debug, info, warn, error).
    #[arg(long, default_value = "info", env = "DOTASKS_LOG")]
    pub log_level: String,

    /// Path to log file (default: `$TMPDIR/dotasks.log`).
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("dotasks")
}

/// Load and parse a TOML config file.
///
/// If `explicit_path` is `Some`, the file must exist (error if not).
/// If `explicit_path` is `None`, the default path is tried and missing file
/// is treated as empty config.
fn load_config_file(explicit_path: Option<&std::path::Path>) -> Result<ConfigFile, ConfigError> {
    let path = if let Some(p) = explicit_path {
        let contents = std::fs::read_to_string(p).map_err(|e| ConfigError::ReadFile {
            path: p.to_path_buf(),
            source: e,
        })?;
        return Ok(toml::from_str(&contents)?);
    } else {
        let Some(config_dir) = dirs::config_dir() else {
            return Ok(ConfigFile::default());
        };
        config_dir.join("dotasks").join("config.toml")
    };

    match std::fs::read_to_string(&path) {
        Ok(contents) => Ok(toml::from_str(&contents)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(ConfigFile::default()),
        Err(e) => Err(ConfigError::ReadFile { path, source: e }),
    }
}
