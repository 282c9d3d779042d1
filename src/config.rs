//! Workspace and emulator configuration.

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// How the local emulator executable is launched and recognised as ready.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmulatorConfig {
    /// Executable to spawn.
    pub program: String,
    /// Arguments passed to the executable.
    pub args: Vec<String>,
    /// Stdout line fragment that marks the emulator as accepting requests.
    pub ready_marker: String,
}

impl Default for EmulatorConfig {
    fn default() -> Self {
        Self {
            program: "flow".to_string(),
            args: vec!["emulator".to_string(), "start".to_string()],
            ready_marker: "Starting HTTP server".to_string(),
        }
    }
}

/// Top-level harness configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HarnessConfig {
    /// Directory the engine resolves contract/transaction/script files from.
    pub base_path: PathBuf,
    #[serde(default)]
    pub emulator: EmulatorConfig,
}

impl HarnessConfig {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
            emulator: EmulatorConfig::default(),
        }
    }

    /// Load configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> crate::Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        toml::from_str(&raw)
            .with_context(|| format!("failed to parse config file {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn emulator_defaults_match_the_flow_cli() {
        let config = EmulatorConfig::default();
        assert_eq!(config.program, "flow");
        assert_eq!(config.args, ["emulator", "start"]);
        assert_eq!(config.ready_marker, "Starting HTTP server");
    }

    #[test]
    fn config_loads_from_toml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
base_path = "./cadence"

[emulator]
program = "flow"
args = ["emulator", "start", "--port", "3570"]
ready_marker = "Starting HTTP server"
"#
        )
        .unwrap();

        let config = HarnessConfig::from_file(file.path()).unwrap();
        assert_eq!(config.base_path, PathBuf::from("./cadence"));
        assert_eq!(config.emulator.args.last().map(String::as_str), Some("3570"));
    }

    #[test]
    fn missing_emulator_table_falls_back_to_defaults() {
        let config: HarnessConfig = toml::from_str(r#"base_path = "./cadence""#).unwrap();
        assert_eq!(config.emulator, EmulatorConfig::default());
    }
}
