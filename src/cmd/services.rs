use anyhow::{Context, Result};
use owo_colors::OwoColorize;

use crate::cmd::{spinner, SourceArgs};
use crate::config::load_config;
use crate::grpcurl::model::{Call, Proto};
use crate::grpcurl::Grpcurl;
use crate::util::{color_enabled_stdout, debug_log, init_debug_log};

/// List every service and call the source describes.
pub fn handle_services(source: SourceArgs, debug: bool) -> Result<()> {
    let cfg = load_config().unwrap_or_default();
    let schema = source.resolve(&cfg)?;
    let grpcurl = Grpcurl::new(source.docker(&cfg)).reflect_timeout(cfg.reflect_timeout_secs);
    let log = init_debug_log(debug);
    if let Ok(command) = grpcurl.proto_command(&schema) {
        debug_log(&log, &format!("[services] {command}"));
    }

    let pb = spinner("describing schema...");
    let described = grpcurl.proto(&schema);
    pb.finish_and_clear();

    let proto = described.context("describe failed")?;
    debug_log(&log, &format!("[services] {} services", proto.services.len()));
    print_proto(&proto);
    Ok(())
}

fn print_proto(proto: &Proto) {
    let color = color_enabled_stdout();
    if proto.services.is_empty() {
        println!("no services found");
        return;
    }
    for service in &proto.services {
        if color {
            println!("{}  {}", service.name.bold(), service.tag.dimmed());
        } else {
            println!("{}  {}", service.name, service.tag);
        }
        if let Some(description) = &service.description {
            for line in description.lines() {
                println!("  // {line}");
            }
        }
        for call in &service.calls {
            println!("  {}", render_call(call));
        }
        println!();
    }
}

fn render_call(call: &Call) -> String {
    let input = stream_tag(call.input_stream, &call.input_message_tag);
    let output = stream_tag(call.output_stream, &call.output_message_tag);
    format!("rpc {} ({input}) returns ({output})", call.name)
}

fn stream_tag(stream: bool, tag: &str) -> String {
    if stream {
        format!("stream {tag}")
    } else {
        tag.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn calls_render_with_stream_markers() {
        let call = Call {
            name: "Pull".to_string(),
            input_stream: true,
            output_stream: false,
            input_message_tag: ".pb.v1.Chunk".to_string(),
            output_message_tag: ".pb.v1.Ack".to_string(),
            ..Call::default()
        };
        assert_eq!(
            render_call(&call),
            "rpc Pull (stream .pb.v1.Chunk) returns (.pb.v1.Ack)"
        );
    }
}
