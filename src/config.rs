use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::branches::{default_branches, BranchList};
use crate::error::{Result, RotatorError};

/// File name looked up in the working directory and the user config directory.
pub const CONFIG_FILE_NAME: &str = "branch-rotator.toml";

pub const ENV_CONFIG: &str = "BRANCH_ROTATOR_CONFIG";
pub const ENV_CHECKOUT_PATH: &str = "BRANCH_ROTATOR_CHECKOUT_PATH";
pub const ENV_SETTLE_DELAY_MS: &str = "BRANCH_ROTATOR_SETTLE_DELAY_MS";
pub const ENV_PUBLISH_COMMAND: &str = "BRANCH_ROTATOR_PUBLISH_COMMAND";
pub const ENV_GIT_PROGRAM: &str = "BRANCH_ROTATOR_GIT";

/// Pause between the branch switch and the publish step.
pub const DEFAULT_SETTLE_DELAY_MS: u64 = 100;

/// Represents the complete configuration for branch-rotator.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Config {
    /// Checkout the rotator operates in.
    #[serde(default)]
    pub checkout_path: Option<PathBuf>,

    #[serde(default = "default_branches")]
    pub branches: Vec<String>,

    #[serde(default)]
    pub publish: PublishConfig,

    #[serde(default)]
    pub git: GitConfig,
}

fn default_publish_command() -> String {
    "./publish.sh".to_string()
}

fn default_settle_delay_ms() -> u64 {
    DEFAULT_SETTLE_DELAY_MS
}

/// Configuration for the publish step.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct PublishConfig {
    /// Executable run after the switch. Relative paths resolve against the checkout.
    #[serde(default = "default_publish_command")]
    pub command: String,

    #[serde(default = "default_settle_delay_ms")]
    pub settle_delay_ms: u64,
}

impl Default for PublishConfig {
    fn default() -> Self {
        PublishConfig {
            command: default_publish_command(),
            settle_delay_ms: default_settle_delay_ms(),
        }
    }
}

/// How the branch switch is carried out.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum GitBackend {
    /// Spawn the git client.
    #[default]
    Cli,
    /// Check out in-process through libgit2.
    Libgit2,
}

fn default_git_program() -> String {
    "git".to_string()
}

/// Configuration for the version-control step.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct GitConfig {
    #[serde(default)]
    pub backend: GitBackend,

    #[serde(default = "default_git_program")]
    pub program: String,
}

impl Default for GitConfig {
    fn default() -> Self {
        GitConfig {
            backend: GitBackend::default(),
            program: default_git_program(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            checkout_path: None,
            branches: default_branches(),
            publish: PublishConfig::default(),
            git: GitConfig::default(),
        }
    }
}

impl Config {
    /// Parses a TOML document.
    pub fn from_toml(source: &str) -> Result<Config> {
        Ok(toml::from_str(source)?)
    }

    /// Applies overrides from `lookup`, normally the process environment.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = lookup(ENV_CHECKOUT_PATH).filter(|v| !v.is_empty()) {
            self.checkout_path = Some(PathBuf::from(path));
        }

        if let Some(delay) = lookup(ENV_SETTLE_DELAY_MS).filter(|v| !v.is_empty()) {
            self.publish.settle_delay_ms = delay.trim().parse().map_err(|_| {
                RotatorError::config(format!(
                    "{} must be a whole number of milliseconds, got '{}'",
                    ENV_SETTLE_DELAY_MS, delay
                ))
            })?;
        }

        if let Some(command) = lookup(ENV_PUBLISH_COMMAND).filter(|v| !v.is_empty()) {
            self.publish.command = command;
        }

        if let Some(program) = lookup(ENV_GIT_PROGRAM).filter(|v| !v.is_empty()) {
            self.git.program = program;
        }

        Ok(())
    }

    /// Checks everything that must hold before any side effect.
    pub fn validate(&self) -> Result<()> {
        self.branch_list()?;
        self.checkout_path()?;
        if self.publish.command.trim().is_empty() {
            return Err(RotatorError::config("publish command is empty"));
        }
        Ok(())
    }

    pub fn branch_list(&self) -> Result<BranchList> {
        BranchList::new(self.branches.clone())
    }

    /// The configured checkout path, or a configuration error if unset.
    pub fn checkout_path(&self) -> Result<&Path> {
        match self.checkout_path.as_deref() {
            Some(path) if !path.as_os_str().is_empty() => Ok(path),
            _ => Err(RotatorError::config(format!(
                "checkout path is not set; add `checkout_path` to {} or set {}",
                CONFIG_FILE_NAME, ENV_CHECKOUT_PATH
            ))),
        }
    }

    /// The checkout path made absolute against the current directory.
    ///
    /// The path is not required to exist yet; entering it is the rotator's
    /// first side effect and reports its own error.
    pub fn resolved_checkout_path(&self) -> Result<PathBuf> {
        let path = self.checkout_path()?;
        if path.is_absolute() {
            Ok(path.to_path_buf())
        } else {
            Ok(std::env::current_dir()?.join(path))
        }
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.publish.settle_delay_ms)
    }
}

/// Loads configuration from file or returns defaults, then applies
/// environment overrides.
///
/// Attempts to load configuration in the following order:
/// 1. Custom path provided as parameter
/// 2. Path in `BRANCH_ROTATOR_CONFIG`
/// 3. `branch-rotator.toml` in current directory
/// 4. `branch-rotator.toml` in the user config directory
/// 5. Default configuration if no file found
pub fn load_config(config_path: Option<&Path>) -> Result<Config> {
    let mut config = match locate_config(config_path) {
        Some(path) => {
            log::debug!("loading configuration from {}", path.display());
            let source = fs::read_to_string(&path).map_err(|e| {
                RotatorError::config(format!("cannot read {}: {}", path.display(), e))
            })?;
            Config::from_toml(&source)?
        }
        None => {
            log::debug!("no configuration file found, using defaults");
            Config::default()
        }
    };

    config.apply_overrides(|key| std::env::var(key).ok())?;
    Ok(config)
}

fn locate_config(config_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = config_path {
        return Some(path.to_path_buf());
    }

    if let Some(path) = std::env::var_os(ENV_CONFIG).filter(|v| !v.is_empty()) {
        return Some(PathBuf::from(path));
    }

    let local = Path::new(".").join(CONFIG_FILE_NAME);
    if local.exists() {
        return Some(local);
    }

    dirs::config_dir()
        .map(|dir| dir.join(CONFIG_FILE_NAME))
        .filter(|path| path.exists())
}
