use anyhow::Result;
use clap::Args;

use crate::config::{load_config, save_config, Config};

#[derive(Args)]
pub struct ConfigCmd {
    /// Show the current configuration
    #[arg(long)]
    pub show: bool,

    /// Set the default host:port
    #[arg(long)]
    pub set_host: Option<String>,

    /// Set the default proto import path
    #[arg(long)]
    pub set_import_path: Option<String>,

    /// Always connect without TLS: true | false
    #[arg(long)]
    pub plaintext: Option<bool>,

    /// Always run grpcurl through docker: true | false
    #[arg(long)]
    pub docker: Option<bool>,

    /// Default maximum response size in MiB
    #[arg(long)]
    pub max_msg_size: Option<u64>,

    /// -max-time bound for reflection describes, in seconds
    #[arg(long)]
    pub reflect_timeout: Option<u64>,
}

pub fn handle_config(cmd: ConfigCmd) -> Result<()> {
    let mut cfg: Config = load_config().unwrap_or_default();

    let show_mode = cmd.show
        || (cmd.set_host.is_none()
            && cmd.set_import_path.is_none()
            && cmd.plaintext.is_none()
            && cmd.docker.is_none()
            && cmd.max_msg_size.is_none()
            && cmd.reflect_timeout.is_none());

    if show_mode {
        println!("Host: {}", cfg.default_host.as_deref().unwrap_or("(unset)"));
        println!(
            "Import_path: {}",
            cfg.default_import_path.as_deref().unwrap_or("(unset, default /)")
        );
        println!("Plaintext: {}", cfg.plaintext);
        println!("Docker: {}", cfg.use_docker);
        println!("Max_msg_size_mib: {}", cfg.max_msg_size_mib);
        println!("Reflect_timeout_secs: {}", cfg.reflect_timeout_secs);
        return Ok(());
    }

    let mut changed = false;

    if let Some(host) = cmd.set_host.as_deref() {
        let h = host.trim();
        if h.is_empty() {
            anyhow::bail!("host cannot be empty");
        }
        cfg.default_host = Some(h.to_string());
        changed = true;
    }
    if let Some(path) = cmd.set_import_path.as_deref() {
        let p = path.trim();
        if p.is_empty() {
            anyhow::bail!("import path cannot be empty");
        }
        cfg.default_import_path = Some(p.to_string());
        changed = true;
    }
    if let Some(plaintext) = cmd.plaintext {
        cfg.plaintext = plaintext;
        changed = true;
    }
    if let Some(docker) = cmd.docker {
        cfg.use_docker = docker;
        changed = true;
    }
    if let Some(size) = cmd.max_msg_size {
        if size == 0 {
            anyhow::bail!("max message size must be at least 1 MiB");
        }
        cfg.max_msg_size_mib = size;
        changed = true;
    }
    if let Some(secs) = cmd.reflect_timeout {
        if secs == 0 {
            anyhow::bail!("reflect timeout must be at least 1 second");
        }
        cfg.reflect_timeout_secs = secs;
        changed = true;
    }

    if changed {
        save_config(&cfg)?;
        println!("Saved.");
    }
    Ok(())
}
