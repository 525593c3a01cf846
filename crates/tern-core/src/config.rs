use crate::error::Error;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tern_parser::ParserOptions;

/// Project configuration file looked up in the working directory.
pub const CONFIG_FILE: &str = "tern.json";

/// Runtime configuration for the tern CLI.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Current working directory.
    pub cwd: PathBuf,

    /// Whether to emit JSON logs.
    pub json_logs: bool,

    /// Verbosity level (0 = INFO, 1 = DEBUG, 2+ = TRACE).
    pub verbosity: u8,

    /// Options handed to the parser.
    pub parser: ParserOptions,
}

/// Contents of `tern.json`. Every field is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ConfigFile {
    parser: ParserOptions,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cwd: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            json_logs: false,
            verbosity: 0,
            parser: ParserOptions::default(),
        }
    }
}

impl Config {
    /// Create a new config with the given working directory.
    #[must_use]
    pub fn new(cwd: PathBuf) -> Self {
        Self {
            cwd,
            ..Default::default()
        }
    }

    /// Load `tern.json` from `cwd` if there is one, defaults otherwise.
    pub fn load(cwd: PathBuf) -> Result<Self, Error> {
        let path = cwd.join(CONFIG_FILE);
        let mut config = Self::new(cwd);

        if !path.is_file() {
            return Ok(config);
        }

        let file = read_config_file(&path)?;
        config.parser = file.parser;
        Ok(config)
    }

    /// Set verbosity level.
    #[must_use]
    pub fn with_verbosity(mut self, verbosity: u8) -> Self {
        self.verbosity = verbosity;
        self
    }

    /// Set JSON log output.
    #[must_use]
    pub fn with_json_logs(mut self, json: bool) -> Self {
        self.json_logs = json;
        self
    }

    /// Set parser options.
    #[must_use]
    pub fn with_parser(mut self, parser: ParserOptions) -> Self {
        self.parser = parser;
        self
    }
}

fn read_config_file(path: &Path) -> Result<ConfigFile, Error> {
    let text = std::fs::read_to_string(path).map_err(|source| Error::ConfigRead {
        path: path.to_path_buf(),
        source,
    })?;

    serde_json::from_str(&text).map_err(|source| Error::ConfigParse {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_builders() {
        let config = Config::new(PathBuf::from("/tmp"))
            .with_verbosity(2)
            .with_json_logs(true)
            .with_parser(ParserOptions { max_depth: 16 });

        assert_eq!(config.cwd, PathBuf::from("/tmp"));
        assert_eq!(config.verbosity, 2);
        assert!(config.json_logs);
        assert_eq!(config.parser.max_depth, 16);
    }

    #[test]
    fn test_load_without_file_uses_defaults() {
        let dir = TempDir::new().unwrap();
        let config = Config::load(dir.path().to_path_buf()).unwrap();
        assert_eq!(config.parser, ParserOptions::default());
    }

    #[test]
    fn test_load_reads_parser_options() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE), r#"{ "parser": { "max_depth": 50 } }"#)
            .unwrap();

        let config = Config::load(dir.path().to_path_buf()).unwrap();
        assert_eq!(config.parser.max_depth, 50);
    }

    #[test]
    fn test_load_rejects_bad_json() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE), "{ parser: }").unwrap();

        let err = Config::load(dir.path().to_path_buf()).unwrap_err();
        assert!(matches!(err, Error::ConfigParse { .. }));
        assert!(err.to_string().contains(CONFIG_FILE));
    }

    #[test]
    fn test_load_rejects_unknown_fields() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE), r#"{ "parsr": {} }"#).unwrap();

        assert!(Config::load(dir.path().to_path_buf()).is_err());
    }
}
