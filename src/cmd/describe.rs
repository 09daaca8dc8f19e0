use anyhow::{Context, Result};
use owo_colors::OwoColorize;

use crate::cmd::{spinner, SourceArgs};
use crate::config::load_config;
use crate::grpcurl::model::{Field, Message};
use crate::grpcurl::Grpcurl;
use crate::util::{color_enabled_stdout, debug_log, init_debug_log};

/// Describe one message or enum by its fully qualified tag. `--expand`
/// resolves referenced types one level deeper; anything beyond that is
/// another `describe` away, which also keeps self-referential schemas from
/// recursing forever.
pub fn handle_describe(tag: String, source: SourceArgs, expand: bool, debug: bool) -> Result<()> {
    let cfg = load_config().unwrap_or_default();
    let schema = source.resolve(&cfg)?;
    let grpcurl = Grpcurl::new(source.docker(&cfg)).reflect_timeout(cfg.reflect_timeout_secs);
    let log = init_debug_log(debug);
    if let Ok(command) = grpcurl.message_command(&schema, &tag) {
        debug_log(&log, &format!("[describe] {command}"));
    }

    let pb = spinner("describing message...");
    let described = grpcurl.message(&schema, &tag);
    pb.finish_and_clear();
    let message = described.with_context(|| format!("describe failed for {tag}"))?;

    print_message(&message);
    if expand {
        for field in fields_with_inner_tags(&message) {
            let inner_tag = field.inner_message_tag.as_deref().unwrap_or_default();
            debug_log(&log, &format!("[describe] expanding {inner_tag}"));
            let pb = spinner("expanding...");
            let inner = grpcurl.message(&schema, inner_tag);
            pb.finish_and_clear();
            match inner {
                Ok(inner) => print_inner(inner_tag, &inner),
                Err(err) => println!("  {inner_tag}: {err}"),
            }
        }
    }
    Ok(())
}

fn fields_with_inner_tags(message: &Message) -> Vec<&Field> {
    message
        .fields
        .iter()
        .flat_map(|f| match &f.fields {
            Some(group) if f.datatype == "oneof" => group.iter().collect::<Vec<_>>(),
            _ => vec![f],
        })
        .filter(|f| f.inner_message_tag.is_some())
        .collect()
}

fn print_message(message: &Message) {
    let color = color_enabled_stdout();
    if color {
        println!("{}  {}", message.name.bold(), message.tag.dimmed());
    } else {
        println!("{}  {}", message.name, message.tag);
    }
    if let Some(description) = &message.description {
        for line in description.lines() {
            println!("// {line}");
        }
    }
    for field in &message.fields {
        print_field(field, 1);
    }
    if let Some(template) = &message.template {
        println!();
        println!("template:");
        print!("{template}");
    }
}

fn print_field(field: &Field, depth: usize) {
    let pad = "  ".repeat(depth);
    if let Some(description) = &field.description {
        for line in description.lines() {
            println!("{pad}// {line}");
        }
    }
    let datatype = if field.datatype.is_empty() {
        String::new()
    } else {
        format!("{} ", field.datatype)
    };
    println!("{pad}{datatype}{}", field.name);
    if field.datatype == "oneof" {
        for alternative in field.fields.iter().flatten() {
            print_field(alternative, depth + 1);
        }
    }
}

fn print_inner(tag: &str, message: &Message) {
    println!();
    println!("{tag}:");
    for field in &message.fields {
        print_field(field, 1);
    }
}
