//! Line-oriented parser for grpcurl's human-readable describe dumps.
//!
//! The recognized substrings are the wire contract with grpcurl and are
//! brittle to any format change in it: `" is a service:"`, `" is a
//! message:"`, `"an enum:"`, `"Message template:\n"`, `"  rpc "`,
//! `"  oneof"`, `"service "`, `"message "`, `"enum "`, a line equal to `"}"`
//! and any line ending in `";"`.

use once_cell::sync::Lazy;
use regex::Regex;

use super::error::GrpcurlError;
use super::model::{last_dot_segment, Call, Field, Message, Proto, Service};

const SERVICE_SUFFIX: &str = " is a service:";
const MESSAGE_SUFFIX: &str = " is a message:";
const ENUM_SUFFIX: &str = "an enum:";
const TEMPLATE_MARKER: &str = "Message template:\n";
const ONEOF_DATATYPE: &str = "oneof";

// Shape of an rpc line once every `stream ` occurrence is stripped. The
// captures line up with the historical fixed token positions (1, 3, 7), so
// well-formed input parses identically; anything else is a typed error.
static RPC_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^rpc (\S+) \( (\S+) \) returns \( (\S+) \);$").expect("rpc regex"));

// `{datatype} {name} = {value};` where the datatype may be empty (enum
// values) or multi-word (`repeated int32`).
static FIELD_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:(.+) )?(\S+) = (\S+);$").expect("field regex"));

/// Per-parse cursor state: consecutive comment lines accumulate here until
/// the next named construct consumes them.
#[derive(Default)]
struct PendingComment(Option<String>);

impl PendingComment {
    fn push(&mut self, line: &str) {
        let text = line.replacen("//", "", 1).trim().to_string();
        let buf = self.0.get_or_insert_with(String::new);
        buf.push_str(&text);
        buf.push('\n');
    }

    fn take(&mut self) -> Option<String> {
        self.0
            .take()
            .map(|c| c.strip_suffix('\n').unwrap_or(&c).to_string())
    }
}

/// Parse the full text of one `describe` invocation into services and calls.
pub fn parse_proto(input: &str) -> Result<Proto, GrpcurlError> {
    let mut proto = Proto::default();
    let mut comment = PendingComment::default();
    let mut current: Option<Service> = None;

    for line in input.lines() {
        if line.contains("//") {
            comment.push(line);
            continue;
        }
        if line.trim_end().ends_with(SERVICE_SUFFIX) {
            let tag = line.replacen(SERVICE_SUFFIX, "", 1).trim().to_string();
            current = Some(Service {
                name: last_dot_segment(&tag),
                tag,
                ..Service::default()
            });
            continue;
        }
        if line.starts_with("service ") {
            let svc = current
                .as_mut()
                .ok_or_else(|| GrpcurlError::malformed(line, "service body before its header"))?;
            if let Some(text) = comment.take() {
                svc.description = Some(text);
            }
            svc.name = line
                .split_whitespace()
                .nth(1)
                .ok_or_else(|| GrpcurlError::malformed(line, "service line without a name"))?
                .to_string();
            continue;
        }
        if line == "}" {
            let svc = current
                .take()
                .ok_or_else(|| GrpcurlError::malformed(line, "unmatched closing brace"))?;
            proto.services.push(svc);
            continue;
        }
        if line.contains("  rpc ") {
            let mut call = parse_rpc(line)?;
            if let Some(text) = comment.take() {
                call.description = Some(text);
            }
            current
                .as_mut()
                .ok_or_else(|| GrpcurlError::malformed(line, "rpc outside of a service block"))?
                .calls
                .push(call);
            continue;
        }
    }
    if current.is_some() {
        return Err(GrpcurlError::malformed("<eof>", "unterminated service block"));
    }
    Ok(proto)
}

/// Parse one rpc declaration, e.g.
/// `  rpc Pull ( stream .pb.v1.Chunk ) returns ( .pb.v1.Ack );`.
fn parse_rpc(line: &str) -> Result<Call, GrpcurlError> {
    let input_stream = line
        .split_once('(')
        .is_some_and(|(_, rest)| rest.starts_with(" stream "));
    let closing: Vec<&str> = line.split(')').collect();
    let output_stream = closing.len() >= 2
        && closing[closing.len() - 2].starts_with(" returns ( stream ");

    let stripped = line.replace("stream ", "");
    let caps = RPC_LINE
        .captures(stripped.trim())
        .ok_or_else(|| GrpcurlError::malformed(line, "rpc line does not match the describe shape"))?;
    Ok(Call {
        name: caps[1].to_string(),
        description: None,
        input_stream,
        output_stream,
        input_message_tag: caps[2].to_string(),
        output_message_tag: caps[3].to_string(),
    })
}

/// Parse one message or enum describe dump, including the optional
/// `-msg-template` JSON example.
pub fn parse_message(input: &str) -> Result<Message, GrpcurlError> {
    // Everything after the marker is the example payload, not line-structured
    // schema text; split it off before walking lines.
    let (schema, template) = match input.split_once(TEMPLATE_MARKER) {
        Some((head, tail)) => (head, Some(tail.to_string())),
        None => (input, None),
    };
    let first = schema.lines().next().unwrap_or("");
    if first.ends_with(ENUM_SUFFIX) {
        return parse_enum(schema);
    }

    let mut msg = Message {
        template,
        ..Message::default()
    };
    let mut comment = PendingComment::default();
    let mut oneof: Option<Field> = None;

    for line in schema.lines() {
        if line.starts_with("  oneof") {
            let mut group = Field {
                datatype: ONEOF_DATATYPE.to_string(),
                fields: Some(Vec::new()),
                ..Field::default()
            };
            if let Some(text) = comment.take() {
                group.description = Some(text);
            }
            group.name = line
                .replacen("  oneof ", "", 1)
                .replacen(" {", "", 1)
                .to_string();
            oneof = Some(group);
            continue;
        }
        if line.ends_with('}') {
            if let Some(group) = oneof.take() {
                msg.fields.push(group);
                continue;
            }
        }
        if line.starts_with("message ") {
            if let Some(text) = comment.take() {
                msg.description = Some(text);
            }
            msg.name = line
                .split_whitespace()
                .nth(1)
                .ok_or_else(|| GrpcurlError::malformed(line, "message line without a name"))?
                .to_string();
            continue;
        }
        if line.trim_end().ends_with(MESSAGE_SUFFIX) {
            msg.tag = line.split(' ').next().unwrap_or("").to_string();
            continue;
        }
        if line.contains("//") {
            comment.push(line);
            continue;
        }
        if line.ends_with(';') {
            let mut field = parse_field(line)?;
            field.description = comment.take();
            match oneof.as_mut() {
                Some(group) => group.fields.get_or_insert_with(Vec::new).push(field),
                None => msg.fields.push(field),
            }
            continue;
        }
    }
    if oneof.is_some() {
        return Err(GrpcurlError::malformed("<eof>", "unterminated oneof group"));
    }
    Ok(msg)
}

fn parse_enum(schema: &str) -> Result<Message, GrpcurlError> {
    let first = schema.lines().next().unwrap_or("");
    let tag = first
        .split_whitespace()
        .next()
        .ok_or_else(|| GrpcurlError::malformed(first, "enum header without a tag"))?
        .to_string();
    let mut msg = Message {
        name: last_dot_segment(&tag),
        tag,
        template: None,
        ..Message::default()
    };
    let mut comment = PendingComment::default();

    for line in schema.lines() {
        if line.contains("//") {
            comment.push(line);
            continue;
        }
        if line.starts_with("enum ") {
            if let Some(text) = comment.take() {
                msg.description = Some(text);
            }
        }
        if line.ends_with(';') {
            let mut value = parse_field(line)?;
            value.description = comment.take();
            msg.fields.push(value);
        }
    }
    Ok(msg)
}

/// Parse one field or enum-value line ending in `;`.
fn parse_field(line: &str) -> Result<Field, GrpcurlError> {
    let trimmed = line.trim();
    let caps = FIELD_LINE.captures(trimmed).ok_or_else(|| {
        GrpcurlError::malformed(line, "field line does not match '<type> <name> = <value>;'")
    })?;
    let mut field = Field {
        datatype: caps.get(1).map(|m| m.as_str()).unwrap_or("").to_string(),
        name: caps[2].to_string(),
        ..Field::default()
    };
    if trimmed.contains('.') {
        field.fields = Some(Vec::new());
        for token in trimmed.split(' ') {
            if token.contains('.') {
                field.inner_message_tag = Some(token.replacen('>', "", 1));
            }
        }
    }
    if trimmed.starts_with("map<") {
        let mut tokens = trimmed.split(' ');
        field.datatype = match (tokens.next(), tokens.next()) {
            (Some(k), Some(v)) => format!("{k} {v}"),
            _ => field.datatype,
        };
    }
    Ok(field)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const SERVICES_DUMP: &str = "\
pb.v1.Constructions is a service:
// Handles construction of test structures.
// Spans several lines.
service Constructions {
  rpc EmptyCall ( .pb.v1.EmptyMes ) returns ( .pb.v1.EmptyMes );
  // Echoes a string back.
  rpc StringCall ( .pb.v1.StringMes ) returns ( .pb.v1.StringMes );
  rpc Upload ( stream .pb.v1.Chunk ) returns ( .pb.v1.Ack );
  rpc Watch ( .pb.v1.Query ) returns ( stream .pb.v1.Event );
}
pb.v1.Health is a service:
service Health {
  rpc Ping ( .pb.v1.EmptyMes ) returns ( .pb.v1.EmptyMes );
}
";

    #[test]
    fn services_parse_in_source_order() {
        let proto = parse_proto(SERVICES_DUMP).unwrap();
        assert_eq!(proto.services.len(), 2);
        let first = &proto.services[0];
        assert_eq!(first.name, "Constructions");
        assert_eq!(first.tag, "pb.v1.Constructions");
        assert_eq!(
            first.description.as_deref(),
            Some("Handles construction of test structures.\nSpans several lines.")
        );
        assert_eq!(first.calls.len(), 4);
        let second = &proto.services[1];
        assert_eq!(second.name, "Health");
        assert_eq!(second.description, None);
        assert_eq!(second.calls.len(), 1);
    }

    #[test]
    fn call_comments_attach_to_the_next_call_only() {
        let proto = parse_proto(SERVICES_DUMP).unwrap();
        let calls = &proto.services[0].calls;
        assert_eq!(calls[0].description, None);
        assert_eq!(calls[1].description.as_deref(), Some("Echoes a string back."));
        assert_eq!(calls[2].description, None);
    }

    #[test]
    fn rpc_stream_markers_are_detected() {
        let proto = parse_proto(SERVICES_DUMP).unwrap();
        let calls = &proto.services[0].calls;
        assert!(!calls[0].input_stream && !calls[0].output_stream);
        assert!(calls[2].input_stream && !calls[2].output_stream);
        assert!(!calls[3].input_stream && calls[3].output_stream);
        assert_eq!(calls[2].input_message_tag, ".pb.v1.Chunk");
        assert_eq!(calls[2].output_message_tag, ".pb.v1.Ack");
        assert_eq!(calls[0].name, "EmptyCall");
    }

    #[test]
    fn bidirectional_stream() {
        let proto = parse_proto(
            "pb.v1.Chat is a service:\nservice Chat {\n  rpc Talk ( stream .pb.v1.Say ) returns ( stream .pb.v1.Say );\n}\n",
        )
        .unwrap();
        let call = &proto.services[0].calls[0];
        assert!(call.input_stream && call.output_stream);
        assert_eq!(call.input_message_tag, ".pb.v1.Say");
    }

    #[test]
    fn malformed_rpc_line_is_a_typed_error() {
        let err = parse_proto(
            "pb.v1.X is a service:\nservice X {\n  rpc Broken ( .pb.v1.A returns .pb.v1.B;\n}\n",
        )
        .unwrap_err();
        assert!(matches!(err, GrpcurlError::MalformedDescribeOutput { .. }));
    }

    #[test]
    fn rpc_outside_a_service_is_rejected() {
        let err =
            parse_proto("  rpc Lost ( .pb.v1.A ) returns ( .pb.v1.B );\n").unwrap_err();
        assert!(matches!(err, GrpcurlError::MalformedDescribeOutput { .. }));
    }

    #[test]
    fn unterminated_service_is_rejected() {
        let err = parse_proto("pb.v1.X is a service:\nservice X {\n").unwrap_err();
        assert!(matches!(err, GrpcurlError::MalformedDescribeOutput { .. }));
    }

    const MESSAGE_DUMP: &str = "\
pb.v1.TestMes is a message:
// A message with a bit of everything.
message TestMes {
  // Display name.
  string name = 1;
  repeated int32 values = 2;
  map<string, string> labels = 3;
  .pb.v1.Inner inner = 4;
  oneof choice {
    string text = 5;
    int32 number = 6;
  }
}
Message template:
{
  \"name\": \"\"
}
";

    #[test]
    fn message_metadata_and_template() {
        let msg = parse_message(MESSAGE_DUMP).unwrap();
        assert_eq!(msg.name, "TestMes");
        assert_eq!(msg.tag, "pb.v1.TestMes");
        assert_eq!(
            msg.description.as_deref(),
            Some("A message with a bit of everything.")
        );
        assert_eq!(msg.template.as_deref(), Some("{\n  \"name\": \"\"\n}\n"));
    }

    #[test]
    fn field_shapes() {
        let msg = parse_message(MESSAGE_DUMP).unwrap();
        assert_eq!(msg.fields.len(), 5);

        let name = &msg.fields[0];
        assert_eq!(name.name, "name");
        assert_eq!(name.datatype, "string");
        assert_eq!(name.description.as_deref(), Some("Display name."));
        assert_eq!(name.inner_message_tag, None);
        assert_eq!(name.fields, None);

        let values = &msg.fields[1];
        assert_eq!(values.name, "values");
        assert_eq!(values.datatype, "repeated int32");

        let labels = &msg.fields[2];
        assert_eq!(labels.name, "labels");
        assert_eq!(labels.datatype, "map<string, string>");

        let inner = &msg.fields[3];
        assert_eq!(inner.name, "inner");
        assert_eq!(inner.datatype, ".pb.v1.Inner");
        assert_eq!(inner.inner_message_tag.as_deref(), Some(".pb.v1.Inner"));
        assert_eq!(inner.fields, Some(Vec::new()));
    }

    #[test]
    fn oneof_groups_do_not_leak_into_top_level_fields() {
        let msg = parse_message(MESSAGE_DUMP).unwrap();
        let choice = &msg.fields[4];
        assert_eq!(choice.name, "choice");
        assert_eq!(choice.datatype, "oneof");
        let alternatives = choice.fields.as_ref().unwrap();
        assert_eq!(alternatives.len(), 2);
        assert_eq!(alternatives[0].name, "text");
        assert_eq!(alternatives[1].name, "number");
        assert!(msg.fields.iter().all(|f| f.name != "text" && f.name != "number"));
    }

    #[test]
    fn message_without_template() {
        let msg =
            parse_message("pb.v1.EmptyMes is a message:\nmessage EmptyMes {\n}\n").unwrap();
        assert_eq!(msg.name, "EmptyMes");
        assert_eq!(msg.template, None);
        assert!(msg.fields.is_empty());
    }

    #[test]
    fn enum_values_with_comments() {
        let msg = parse_message(
            "\
pb.v1.Kind is an enum:
// What kind of thing this is.
enum Kind {
  // Default.
  KIND_UNSPECIFIED = 0;
  KIND_A = 1;
}
",
        )
        .unwrap();
        assert_eq!(msg.name, "Kind");
        assert_eq!(msg.tag, "pb.v1.Kind");
        assert_eq!(msg.description.as_deref(), Some("What kind of thing this is."));
        assert_eq!(msg.template, None);
        assert_eq!(msg.fields.len(), 2);
        assert_eq!(msg.fields[0].name, "KIND_UNSPECIFIED");
        assert_eq!(msg.fields[0].datatype, "");
        assert_eq!(msg.fields[0].description.as_deref(), Some("Default."));
        assert_eq!(msg.fields[1].name, "KIND_A");
        assert_eq!(msg.fields[1].description, None);
    }

    #[test]
    fn qualified_type_inside_a_map_value() {
        let msg = parse_message(
            "pb.v1.Holder is a message:\nmessage Holder {\n  map<string, .pb.v1.Item> items = 1;\n}\n",
        )
        .unwrap();
        let items = &msg.fields[0];
        assert_eq!(items.name, "items");
        assert_eq!(items.datatype, "map<string, .pb.v1.Item>");
        assert_eq!(items.inner_message_tag.as_deref(), Some(".pb.v1.Item"));
    }

    #[test]
    fn malformed_field_line_is_a_typed_error() {
        let err = parse_message(
            "pb.v1.Bad is a message:\nmessage Bad {\n  string name;\n}\n",
        )
        .unwrap_err();
        assert!(matches!(err, GrpcurlError::MalformedDescribeOutput { .. }));
    }
}
