use anyhow::{Context, Result};

use crate::cmd::{spinner, SourceArgs};
use crate::config::load_config;
use crate::grpcurl::model::{CallRequest, Response, SchemaSource};
use crate::grpcurl::Grpcurl;
use crate::util::{color_enabled_stdout, debug_log, fmt_elapsed, init_debug_log, paint_code};

pub struct CallArgs {
    pub method: String,
    pub data: Option<String>,
    pub data_file: Option<String>,
    pub headers: Vec<String>,
    pub target: Option<String>,
    pub emit_defaults: bool,
    pub max_msg_size: Option<u64>,
    pub source: SourceArgs,
    pub debug: bool,
}

/// Invoke one method and print the classified outcome.
pub fn handle_call(args: CallArgs) -> Result<()> {
    let cfg = load_config().unwrap_or_default();
    let schema = args.source.resolve(&cfg)?;
    let grpcurl =
        Grpcurl::new(args.source.docker(&cfg)).reflect_timeout(cfg.reflect_timeout_secs);
    let log = init_debug_log(args.debug);

    let payload = match (&args.data, &args.data_file) {
        (Some(data), _) => data.clone(),
        (None, Some(path)) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read payload from {path}"))?,
        (None, None) => anyhow::bail!("missing request payload: pass -d <json> or --data-file <path>"),
    };

    // For file-backed schemas the endpoint comes from --target (or the
    // configured default); a server source is its own target.
    let target = match &schema {
        SchemaSource::Server { .. } => None,
        SchemaSource::File { .. } => Some(
            args.target
                .clone()
                .or_else(|| cfg.default_host.clone())
                .ok_or_else(|| anyhow::anyhow!("file-backed calls need --target <host:port>"))?,
        ),
    };

    let request = CallRequest {
        source: schema,
        target,
        plaintext: args.source.plaintext || cfg.plaintext,
        method: args.method.clone(),
        payload,
        headers: args.headers.clone(),
        max_msg_size_mib: args.max_msg_size.unwrap_or(cfg.max_msg_size_mib),
        emit_defaults: args.emit_defaults,
    };
    if let Ok(command) = grpcurl.send_command(&request) {
        debug_log(&log, &format!("[call] {command}"));
    }

    let pb = spinner(&format!("calling {}...", args.method));
    let sent = grpcurl.send(&request);
    pb.finish_and_clear();

    let response = sent.context("call failed before execution")?;
    debug_log(
        &log,
        &format!("[call] code={} elapsed={}", response.code, fmt_elapsed(response.elapsed)),
    );
    debug_log(&log, &response.body);
    print_response(&response);
    Ok(())
}

fn print_response(response: &Response) {
    let color = color_enabled_stdout();
    println!(
        "{}  {}  {}",
        paint_code(&response.code, color),
        fmt_elapsed(response.elapsed),
        response.timestamp.format("%Y-%m-%d %H:%M:%S UTC")
    );
    println!("{}", render_body(&response.body));
}

/// Pretty-print JSON bodies; anything else passes through untouched.
fn render_body(body: &str) -> String {
    match serde_json::from_str::<serde_json::Value>(body) {
        Ok(value) => serde_json::to_string_pretty(&value).unwrap_or_else(|_| body.to_string()),
        Err(_) => body.to_string(),
    }
}
