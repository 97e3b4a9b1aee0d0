//! Engine configuration and model files.
//!
//! [`EngineConfig`] carries everything an [`Engine`](crate::Engine) needs
//! besides its models: the storage identifier, where the file lives, whether
//! to create tables, and whether to log statements. It is plain data,
//! serializable to YAML.
//!
//! A [`ModelFile`] bundles an optional engine section with a list of model
//! descriptions so a whole database can be declared in one file.
//!
//! # Example YAML
//!
//! ```yaml
//! engine:
//!   name: test
//!   directory: ./data
//!   migration: true
//!   log_statements: false
//! models:
//!   - name: ExampleTable
//!     fields:
//!       - { name: id, type: INTEGER, primary_key: true, auto_increment: true }
//!       - { name: name, type: TEXT }
//!       - { name: value, type: REAL }
//! ```

use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use coldorm_core::ModelDescription;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Environment variable that turns on statement logging.
pub const LOG_ENV_VAR: &str = "ORMLOG";

/// Returns `true` when [`LOG_ENV_VAR`] is set to `1`.
pub fn log_enabled_from_env() -> bool {
    std::env::var(LOG_ENV_VAR).is_ok_and(|v| v == "1")
}

fn default_directory() -> PathBuf {
    PathBuf::from(".")
}

/// Settings for opening an engine.
///
/// # Examples
///
/// ```
/// use coldorm_sqlite::EngineConfig;
///
/// let config = EngineConfig::new("test").with_migration(true);
/// assert!(config.migration);
/// assert!(!config.log_statements);
/// assert_eq!(config.db_path(), std::path::Path::new("./test.db"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Storage identifier; the database file is `<name>.db`.
    pub name: String,
    /// Directory holding the database file.
    #[serde(default = "default_directory")]
    pub directory: PathBuf,
    /// Create every registered table when the engine opens.
    #[serde(default)]
    pub migration: bool,
    /// Log every statement and its parameters at `info` level.
    #[serde(default)]
    pub log_statements: bool,
}

impl EngineConfig {
    /// Creates a configuration with defaults: current directory, no
    /// migration, no statement logging.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            directory: default_directory(),
            migration: false,
            log_statements: false,
        }
    }

    pub fn with_directory(mut self, directory: impl Into<PathBuf>) -> Self {
        self.directory = directory.into();
        self
    }

    pub fn with_migration(mut self, migration: bool) -> Self {
        self.migration = migration;
        self
    }

    pub fn with_log_statements(mut self, log_statements: bool) -> Self {
        self.log_statements = log_statements;
        self
    }

    /// Turns statement logging on if `ORMLOG=1` is set; never turns it off.
    pub fn with_env_overrides(mut self) -> Self {
        if log_enabled_from_env() {
            self.log_statements = true;
        }
        self
    }

    /// Path of the database file.
    pub fn db_path(&self) -> PathBuf {
        self.directory.join(format!("{}.db", self.name))
    }

    /// Loads a configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`IoError`](crate::OrmError::IoError) if the file cannot be
    /// read, or [`YamlError`](crate::OrmError::YamlError) if parsing fails.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        let config = serde_yaml::from_reader(BufReader::new(file))?;
        Ok(config)
    }

    /// Saves the configuration as YAML.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let file = std::fs::File::create(path)?;
        serde_yaml::to_writer(BufWriter::new(file), self)?;
        Ok(())
    }
}

/// Engine settings plus model descriptions, loaded from one file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelFile {
    /// Engine section; callers fall back to their own defaults when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub engine: Option<EngineConfig>,
    /// Models in registration order.
    pub models: Vec<ModelDescription>,
}

impl ModelFile {
    /// Loads a model file. `.json` files are read as JSON, anything else as
    /// YAML.
    ///
    /// # Errors
    ///
    /// Returns [`IoError`](crate::OrmError::IoError),
    /// [`JsonError`](crate::OrmError::JsonError) or
    /// [`YamlError`](crate::OrmError::YamlError).
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let reader = BufReader::new(std::fs::File::open(path)?);
        if is_json(path) {
            Ok(serde_json::from_reader(reader)?)
        } else {
            Ok(serde_yaml::from_reader(reader)?)
        }
    }

    /// Saves the model file, choosing the format from the extension.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let writer = BufWriter::new(std::fs::File::create(path)?);
        if is_json(path) {
            serde_json::to_writer_pretty(writer, self)?;
        } else {
            serde_yaml::to_writer(writer, self)?;
        }
        Ok(())
    }
}

fn is_json(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
}
