//! Typed configuration loading helpers.

use std::fs;
use std::io;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use dev_console::ConsoleOptions;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::error::{ReplError, ReplResult};

/// Config file looked up in the working directory when no `--config` is given.
pub const DEFAULT_CONFIG_FILE: &str = "console.toml";

/// Top-level host configuration file.
///
/// ```toml
/// [console]
/// start_opened = true
/// history_size = 50
/// ```
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ReplConfig {
    /// Console behavior.
    pub console: ConsoleOptions,
}

/// Generic TOML-backed config loader.
///
/// `ConfigLoader<T>` handles only filesystem access and TOML deserialization.
#[derive(Clone, Debug)]
pub struct ConfigLoader<T> {
    path: PathBuf,
    _marker: PhantomData<T>,
}

impl<T> ConfigLoader<T>
where
    T: DeserializeOwned,
{
    /// Create a loader for the given path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            _marker: PhantomData,
        }
    }

    /// Load and deserialize the configuration file.
    pub fn load(&self) -> ReplResult<T> {
        let body = fs::read_to_string(&self.path).map_err(|source| ReplError::ConfigRead {
            path: self.path.clone(),
            source,
        })?;
        toml::from_str(&body).map_err(|source| ReplError::ConfigParse {
            path: self.path.clone(),
            source,
        })
    }

    /// Like [`ConfigLoader::load`], but a missing file yields `T::default()`.
    pub fn load_or_default(&self) -> ReplResult<T>
    where
        T: Default,
    {
        match self.load() {
            Err(ReplError::ConfigRead { source, .. })
                if source.kind() == io::ErrorKind::NotFound =>
            {
                Ok(T::default())
            }
            other => other,
        }
    }
}

/// Resolves host configuration: an explicit path must exist, the default file may be absent.
pub fn load_config(explicit: Option<&Path>) -> ReplResult<ReplConfig> {
    match explicit {
        Some(path) => ConfigLoader::<ReplConfig>::new(path).load(),
        None => ConfigLoader::<ReplConfig>::new(DEFAULT_CONFIG_FILE).load_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn unique_test_root() -> PathBuf {
        std::env::temp_dir().join(format!(
            "console-repl-config-test-{}",
            SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .expect("time")
                .as_nanos()
        ))
    }

    #[test]
    fn load_reads_console_table() {
        let root = unique_test_root();
        fs::create_dir_all(&root).expect("create temp root");
        let path = root.join("console.toml");
        fs::write(&path, "[console]\nstart_opened = true\nhistory_size = 5\n")
            .expect("write config");

        let loaded = load_config(Some(&path)).expect("load config");
        assert_eq!(
            loaded.console,
            ConsoleOptions {
                start_opened: true,
                history_size: 5,
                ..ConsoleOptions::default()
            }
        );

        let _ = fs::remove_dir_all(root);
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let root = unique_test_root();
        let path = root.join("missing.toml");
        let err = load_config(Some(&path)).expect_err("missing config should fail");
        assert!(matches!(err, ReplError::ConfigRead { .. }));
        assert!(err.to_string().contains("missing.toml"));
    }

    #[test]
    fn missing_default_file_falls_back_to_defaults() {
        let root = unique_test_root();
        let loader = ConfigLoader::<ReplConfig>::new(root.join(DEFAULT_CONFIG_FILE));
        assert_eq!(loader.load_or_default().expect("defaults"), ReplConfig::default());
    }

    #[test]
    fn invalid_toml_is_a_parse_error() {
        let root = unique_test_root();
        fs::create_dir_all(&root).expect("create temp root");
        let path = root.join("broken.toml");
        fs::write(&path, "[console\n").expect("write broken config");

        let err = ConfigLoader::<ReplConfig>::new(&path)
            .load_or_default()
            .expect_err("broken config should fail");
        assert!(matches!(err, ReplError::ConfigParse { .. }));
        assert!(err.to_string().contains("broken.toml"));

        let _ = fs::remove_dir_all(root);
    }
}
