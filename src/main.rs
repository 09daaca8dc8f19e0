mod cmd;
mod config;
mod grpcurl;
mod util;

use anyhow::Result;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "grpclick", version, about = "Browse gRPC schemas and call methods through grpcurl", long_about = None, disable_help_subcommand = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Verify that grpcurl (and docker) are available
    Check,
    /// List services and calls from a proto file or reflection server
    Services {
        #[command(flatten)]
        source: cmd::SourceArgs,
        /// Log synthesized commands to .grpclick.log
        #[arg(long)]
        debug: bool,
    },
    /// Describe a message or enum by its fully qualified tag
    Describe {
        /// Tag to describe, e.g. .pb.v1.StringMes
        tag: String,
        #[command(flatten)]
        source: cmd::SourceArgs,
        /// Expand referenced message types one level
        #[arg(long)]
        expand: bool,
        /// Log synthesized commands to .grpclick.log
        #[arg(long)]
        debug: bool,
    },
    /// Call a method with a JSON payload
    Call {
        /// Fully qualified method, e.g. pb.v1.Constructions.EmptyCall
        method: String,
        /// Request payload as inline JSON
        #[arg(short = 'd', long)]
        data: Option<String>,
        /// Read the request payload from a file
        #[arg(long)]
        data_file: Option<String>,
        /// Metadata header "key: value"; repeatable
        #[arg(short = 'H', long = "header")]
        headers: Vec<String>,
        /// Target host:port when the schema comes from a proto file
        #[arg(long)]
        target: Option<String>,
        /// Ask grpcurl to emit unset fields with default values
        #[arg(long)]
        emit_defaults: bool,
        /// Maximum response size in MiB (flag omitted at the default of 4)
        #[arg(long)]
        max_msg_size: Option<u64>,
        #[command(flatten)]
        source: cmd::SourceArgs,
        /// Log synthesized commands and responses to .grpclick.log
        #[arg(long)]
        debug: bool,
    },
    /// Show or update persisted defaults
    Config(cmd::config::ConfigCmd),
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Check => cmd::check::handle_check(),
        Commands::Services { source, debug } => cmd::services::handle_services(source, debug),
        Commands::Describe { tag, source, expand, debug } => {
            cmd::describe::handle_describe(tag, source, expand, debug)
        }
        Commands::Call {
            method,
            data,
            data_file,
            headers,
            target,
            emit_defaults,
            max_msg_size,
            source,
            debug,
        } => cmd::call::handle_call(cmd::call::CallArgs {
            method,
            data,
            data_file,
            headers,
            target,
            emit_defaults,
            max_msg_size,
            source,
            debug,
        }),
        Commands::Config(config_cmd) => cmd::config::handle_config(config_cmd),
    }
}
