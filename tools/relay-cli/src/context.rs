//! CLI execution context.

use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};
use relay_core::RelayConfig;

use crate::output::Output;

/// Config file names, in lookup order.
pub const CONFIG_NAMES: [&str; 3] = ["relay.toml", ".relay.toml", "relay.json"];

/// Execution context for CLI commands.
pub struct Context {
    /// Effective configuration.
    pub config: RelayConfig,
    /// File the configuration came from, if any.
    pub config_path: Option<PathBuf>,
    /// Output handler.
    pub output: Output,
    /// Working directory.
    pub cwd: PathBuf,
}

impl Context {
    /// Load context from an explicit config file or the nearest one found.
    pub fn load(config_path: Option<&str>, output: Output) -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to get current directory")?;

        let (config, config_path) = if let Some(path) = config_path {
            let path = resolve_path(&cwd, path);
            let config = RelayConfig::load(&path)
                .with_context(|| format!("Failed to load config from {}", path.display()))?;
            (config, Some(path))
        } else {
            match find_config(&cwd) {
                Some(path) => {
                    let config = RelayConfig::load(&path)
                        .with_context(|| format!("Failed to load config from {}", path.display()))?;
                    (config, Some(path))
                }
                None => (RelayConfig::default(), None),
            }
        };

        output.debug(&match &config_path {
            Some(path) => format!("Using config {}", path.display()),
            None => "No config file found, using defaults".to_string(),
        });

        Ok(Self {
            config,
            config_path,
            output,
            cwd,
        })
    }
}

/// Find the nearest config file walking up from `start`.
pub fn find_config(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .flat_map(|dir| CONFIG_NAMES.iter().map(move |name| dir.join(name)))
        .find(|path| path.is_file())
}

/// Resolve a path relative to the working directory.
pub fn resolve_path(cwd: &Path, path: &str) -> PathBuf {
    let path = PathBuf::from(path);
    if path.is_absolute() {
        path
    } else {
        cwd.join(path)
    }
}
