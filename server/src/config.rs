//! Layered server configuration.
//!
//! Priority, lowest to highest:
//! 1. Built-in defaults (`127.0.0.1:3000`, in-memory store, `info` logging)
//! 2. `todo-server.toml` in the working directory, or an explicit `--config` file
//! 3. `PORT`
//! 4. `TODO_HOST`, `TODO_PORT`, `TODO_DATA_FILE`, `TODO_LOG`
//!
//! Command-line flags are applied on top by the binary.

use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

pub const DEFAULT_CONFIG_FILE: &str = "todo-server.toml";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub host: String,
    pub port: u16,
    /// JSON snapshot backing the store. `None` keeps todos in memory only.
    pub data_file: Option<PathBuf>,
    /// `tracing-subscriber` filter directive, used when `RUST_LOG` is unset.
    pub log: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            data_file: None,
            log: "info".to_string(),
        }
    }
}

impl Config {
    /// Defaults merged with a single TOML file, ignoring the environment.
    pub fn file_figment(path: &Path) -> Figment {
        Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(path))
    }

    /// Every source in priority order. A missing config file is skipped.
    pub fn figment(config_path: Option<&Path>) -> Figment {
        let path = config_path.unwrap_or(Path::new(DEFAULT_CONFIG_FILE));
        Self::file_figment(path)
            .merge(Env::raw().only(&["PORT"]))
            .merge(Env::prefixed("TODO_"))
    }

    pub fn load(config_path: Option<&Path>) -> Result<Self, Box<figment::Error>> {
        Self::figment(config_path).extract().map_err(Box::new)
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
