//! Configuration file parsing for brainpix.toml.

use crate::alphabet::Instruction;
use crate::codec::{DeltaTable, DeltaTableError, DeltaVector};
use crate::interpreter::{EngineConfig, EofPolicy, UnderflowPolicy};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Config file names searched for, in order
const CONFIG_NAMES: &[&str] = &["brainpix.toml", ".brainpix.toml"];

/// Default pixel the program stream starts at; pixel 0 anchors it
pub const DEFAULT_ORIGIN: usize = 1;

/// Default debugger snapshot budget (256 MiB)
pub const DEFAULT_SNAPSHOT_LIMIT: usize = 256 * 1024 * 1024;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse {}", .path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("invalid [[deltas]] table")]
    DeltaTable(#[from] DeltaTableError),
}

/// Main configuration structure.
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    /// Execution limits and policies
    #[serde(default)]
    pub engine: EngineSection,

    /// Embedding settings
    #[serde(default)]
    pub codec: CodecSection,

    /// Time-travel debugger settings
    #[serde(default)]
    pub debugger: DebuggerSection,

    /// Custom delta table; empty means the standard table
    #[serde(default)]
    pub deltas: Vec<DeltaEntry>,
}

#[derive(Debug, Default, Deserialize)]
pub struct EngineSection {
    pub step_limit: Option<u64>,

    pub max_tape_len: Option<usize>,

    #[serde(default)]
    pub underflow: UnderflowPolicy,

    #[serde(default)]
    pub eof: EofPolicy,
}

impl EngineSection {
    pub fn to_engine_config(&self) -> EngineConfig {
        EngineConfig {
            step_limit: self.step_limit,
            max_tape_len: self.max_tape_len,
            underflow: self.underflow,
            eof: self.eof,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CodecSection {
    /// First pixel (row-major index) of the embedded stream
    #[serde(default = "default_origin")]
    pub origin: usize,
}

impl Default for CodecSection {
    fn default() -> Self {
        Self {
            origin: DEFAULT_ORIGIN,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct DebuggerSection {
    /// Memory budget for recorded snapshots, in bytes
    #[serde(default = "default_snapshot_limit")]
    pub snapshot_limit: usize,
}

impl Default for DebuggerSection {
    fn default() -> Self {
        Self {
            snapshot_limit: DEFAULT_SNAPSHOT_LIMIT,
        }
    }
}

/// One `[[deltas]]` entry
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct DeltaEntry {
    pub instruction: Instruction,
    pub vector: [i8; 4],
}

fn default_origin() -> usize {
    DEFAULT_ORIGIN
}

fn default_snapshot_limit() -> usize {
    DEFAULT_SNAPSHOT_LIMIT
}

impl Config {
    /// Parse configuration from TOML text.
    pub fn from_toml(content: &str, path: &Path) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// The delta table selected by this configuration.
    pub fn delta_table(&self) -> Result<DeltaTable, ConfigError> {
        if self.deltas.is_empty() {
            return Ok(DeltaTable::standard());
        }
        let entries: Vec<(Instruction, DeltaVector)> = self
            .deltas
            .iter()
            .map(|entry| (entry.instruction, DeltaVector(entry.vector)))
            .collect();
        Ok(DeltaTable::new(&entries)?)
    }
}

/// Load configuration from a file or search for default config files.
///
/// An explicit `path` must exist; a searched-for file is optional.
pub fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    let config_path = match path.map(PathBuf::from).or_else(find_config_file) {
        Some(path) => path,
        None => return Ok(Config::default()),
    };

    let content = std::fs::read_to_string(&config_path).map_err(|source| ConfigError::Read {
        path: config_path.clone(),
        source,
    })?;
    debug!(path = %config_path.display(), "loaded config");
    Config::from_toml(&content, &config_path)
}

/// Search for a configuration file in the current directory and parent directories.
fn find_config_file() -> Option<PathBuf> {
    let cwd = std::env::current_dir().ok()?;

    let mut dir = Some(cwd.as_path());
    while let Some(current) = dir {
        for name in CONFIG_NAMES {
            let path = current.join(name);
            if path.exists() {
                return Some(path);
            }
        }
        dir = current.parent();
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = Config::from_toml("", Path::new("brainpix.toml")).unwrap();
        assert_eq!(config.codec.origin, DEFAULT_ORIGIN);
        assert_eq!(config.debugger.snapshot_limit, DEFAULT_SNAPSHOT_LIMIT);
        assert_eq!(config.engine.to_engine_config(), EngineConfig::default());
        assert!(config.deltas.is_empty());
    }

    #[test]
    fn test_engine_section() {
        let config = Config::from_toml(
            r#"
            [engine]
            step_limit = 500
            underflow = "clamp"
            eof = "halt"
            "#,
            Path::new("brainpix.toml"),
        )
        .unwrap();

        let engine = config.engine.to_engine_config();
        assert_eq!(engine.step_limit, Some(500));
        assert_eq!(engine.max_tape_len, None);
        assert_eq!(engine.underflow, UnderflowPolicy::Clamp);
        assert_eq!(engine.eof, EofPolicy::Halt);
    }

    #[test]
    fn test_unknown_policy_is_a_parse_error() {
        let result = Config::from_toml("[engine]\neof = \"explode\"", Path::new("x.toml"));
        assert!(matches!(result, Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn test_custom_delta_table() {
        let mut toml = String::new();
        for (i, instruction) in [
            "move_right",
            "move_left",
            "increment",
            "decrement",
            "output",
            "input",
            "loop_open",
            "loop_close",
            "end_of_program",
        ]
        .iter()
        .enumerate()
        {
            toml.push_str(&format!(
                "[[deltas]]\ninstruction = \"{}\"\nvector = [{}, 0, 0, 0]\n",
                instruction,
                20 + i
            ));
        }

        let config = Config::from_toml(&toml, Path::new("brainpix.toml")).unwrap();
        let table = config.delta_table().unwrap();
        assert_eq!(
            table.vector_for(Instruction::EndOfProgram),
            DeltaVector([28, 0, 0, 0])
        );
    }

    #[test]
    fn test_missing_explicit_config_reports_path_once() {
        let err = load_config(Some(Path::new("no/such/brainpix.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
        assert_eq!(err.to_string(), "failed to read no/such/brainpix.toml");
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_incomplete_delta_table_is_rejected() {
        let config = Config::from_toml(
            "[[deltas]]\ninstruction = \"increment\"\nvector = [1, 2, 3, 4]\n",
            Path::new("brainpix.toml"),
        )
        .unwrap();
        assert!(matches!(
            config.delta_table(),
            Err(ConfigError::DeltaTable(DeltaTableError::Missing(_)))
        ));
    }
}
