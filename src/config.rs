use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::grpcurl::command::DEFAULT_MAX_MSG_MIB;
use crate::grpcurl::DEFAULT_REFLECT_TIMEOUT_SECS;

/// Persisted user defaults. Every CLI flag wins over its config value.
#[derive(Debug, Serialize, Deserialize)]
pub struct Config {
    /// `host:port` used when no `--host`/`--proto` is given.
    pub default_host: Option<String>,
    /// Base directory for resolving proto imports in file mode.
    pub default_import_path: Option<String>,
    #[serde(default)]
    pub plaintext: bool,
    /// Run grpcurl through the fullstorydev/grpcurl container.
    #[serde(default)]
    pub use_docker: bool,
    #[serde(default = "default_max_msg_size")]
    pub max_msg_size_mib: u64,
    /// `-max-time` bound passed to reflection describes.
    #[serde(default = "default_reflect_timeout")]
    pub reflect_timeout_secs: u64,
}

fn default_max_msg_size() -> u64 {
    DEFAULT_MAX_MSG_MIB
}

fn default_reflect_timeout() -> u64 {
    DEFAULT_REFLECT_TIMEOUT_SECS
}

impl Default for Config {
    fn default() -> Self {
        Config {
            default_host: None,
            default_import_path: None,
            plaintext: false,
            use_docker: false,
            max_msg_size_mib: default_max_msg_size(),
            reflect_timeout_secs: default_reflect_timeout(),
        }
    }
}

pub fn load_config() -> Result<Config> {
    let cfg: Config = confy::load("grpclick", None).context("failed to load config")?;
    Ok(cfg)
}

pub fn save_config(cfg: &Config) -> Result<()> {
    confy::store("grpclick", None, cfg).context("failed to save config")?;
    Ok(())
}
