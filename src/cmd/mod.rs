pub mod call;
pub mod check;
pub mod config;
pub mod describe;
pub mod services;

use anyhow::Result;
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

use crate::config::Config;
use crate::grpcurl::model::SchemaSource;

/// Schema-source flags shared by every command that talks to grpcurl.
#[derive(Args, Clone, Debug)]
pub struct SourceArgs {
    /// Path to a .proto file to describe
    #[arg(long)]
    pub proto: Option<String>,

    /// Base directory for resolving proto imports (default "/")
    #[arg(long)]
    pub import_path: Option<String>,

    /// host:port of a reflection-enabled server
    #[arg(long)]
    pub host: Option<String>,

    /// Disable TLS for the target
    #[arg(long)]
    pub plaintext: bool,

    /// Run grpcurl inside the fullstorydev/grpcurl container
    #[arg(long)]
    pub docker: bool,
}

impl SourceArgs {
    /// A proto file wins over a host; config defaults fill the gaps.
    pub fn resolve(&self, cfg: &Config) -> Result<SchemaSource> {
        if let Some(path) = &self.proto {
            let import_path = self
                .import_path
                .clone()
                .or_else(|| cfg.default_import_path.clone())
                .unwrap_or_else(|| "/".to_string());
            return Ok(SchemaSource::file(path.clone(), import_path));
        }
        let host = self
            .host
            .clone()
            .or_else(|| cfg.default_host.clone())
            .ok_or_else(|| {
                anyhow::anyhow!(
                    "no schema source: pass --proto <file> or --host <host:port>, \
                     or set a default with `grpclick config --set-host`"
                )
            })?;
        Ok(SchemaSource::server(host, self.plaintext || cfg.plaintext))
    }

    pub fn docker(&self, cfg: &Config) -> bool {
        self.docker || cfg.use_docker
    }
}

/// Spinner shown while grpcurl runs; cleared before anything is printed.
pub fn spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::with_template("{spinner} {msg}").expect("spinner template"));
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}
