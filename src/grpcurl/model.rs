use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Root of a parsed schema dump: the services one describe invocation listed,
/// in source order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Proto {
    pub services: Vec<Service>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Service {
    /// Short name, the last dot-segment of `tag`.
    pub name: String,
    /// Fully qualified dotted path, e.g. `pb.v1.Constructions`.
    pub tag: String,
    pub description: Option<String>,
    pub calls: Vec<Call>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Call {
    pub name: String,
    pub description: Option<String>,
    pub input_stream: bool,
    pub output_stream: bool,
    pub input_message_tag: String,
    pub output_message_tag: String,
}

/// A message or enum. An enum is structurally a message whose fields are the
/// named values and which carries no template.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub name: String,
    pub tag: String,
    pub description: Option<String>,
    /// Example JSON payload emitted by `-msg-template`, captured verbatim.
    pub template: Option<String>,
    pub fields: Vec<Field>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    /// Free-form type text, possibly multi-word (`repeated int32`).
    pub datatype: String,
    pub description: Option<String>,
    /// Tag of a referenced message/enum. Resolution is lazy: the caller runs
    /// another describe against this tag to expand it, and is responsible for
    /// bounding recursion on self-referential types.
    pub inner_message_tag: Option<String>,
    /// `Some` marks the field expandable; a `oneof` group stores its
    /// alternatives here with datatype `"oneof"`.
    pub fields: Option<Vec<Field>>,
}

/// Where a schema comes from: a local proto file or a reflection-enabled
/// server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaSource {
    File { path: String, import_path: String },
    Server { host: String, plaintext: bool },
}

impl SchemaSource {
    pub fn file(path: impl Into<String>, import_path: impl Into<String>) -> Self {
        SchemaSource::File {
            path: path.into(),
            import_path: import_path.into(),
        }
    }

    pub fn server(host: impl Into<String>, plaintext: bool) -> Self {
        SchemaSource::Server {
            host: host.into(),
            plaintext,
        }
    }
}

/// One method invocation. For a `Server` source the reflection host doubles
/// as the call target; a `File` source needs `target` set.
#[derive(Debug, Clone)]
pub struct CallRequest {
    pub source: SchemaSource,
    /// Endpoint for file-backed schemas, ignored for server sources.
    pub target: Option<String>,
    /// Plaintext toggle for the file-backed target.
    pub plaintext: bool,
    /// Fully qualified method, e.g. `pb.v1.Constructions.EmptyCall`.
    pub method: String,
    /// Raw JSON payload text; validated and canonicalized before use.
    pub payload: String,
    /// `"key: value"` metadata strings, passed in order.
    pub headers: Vec<String>,
    pub max_msg_size_mib: u64,
    pub emit_defaults: bool,
}

/// Classified outcome of one invocation. `timestamp` and `elapsed` are
/// stamped around the execution boundary, not by the classifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Response {
    pub code: String,
    pub body: String,
    pub timestamp: DateTime<Utc>,
    pub elapsed: Duration,
}

pub(crate) fn last_dot_segment(tag: &str) -> String {
    tag.rsplit('.').next().unwrap_or(tag).to_string()
}
