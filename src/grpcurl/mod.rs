//! Adapter around the external `grpcurl` tool: command synthesis, describe
//! parsing and response classification, glued together behind an injectable
//! executor.

pub mod caller;
pub mod command;
pub mod error;
pub mod model;
pub mod parser;
pub mod response;

use std::time::Instant;

use caller::{Executor, ShellExecutor};
use command::{RequestForm, ShellDialect};
use error::GrpcurlError;
use model::{CallRequest, Message, Proto, Response, SchemaSource};

pub const DEFAULT_REFLECT_TIMEOUT_SECS: u64 = 10;

/// Facade over one grpcurl installation. Pure command building and parsing
/// live in the submodules; this type only wires them to an executor and
/// stamps timing onto call outcomes.
pub struct Grpcurl<E = ShellExecutor> {
    executor: E,
    dialect: ShellDialect,
    docker: bool,
    reflect_timeout_secs: u64,
}

impl Grpcurl<ShellExecutor> {
    pub fn new(docker: bool) -> Self {
        Grpcurl::with_executor(ShellExecutor, ShellDialect::host(), docker)
    }
}

impl<E: Executor> Grpcurl<E> {
    pub fn with_executor(executor: E, dialect: ShellDialect, docker: bool) -> Self {
        Grpcurl {
            executor,
            dialect,
            docker,
            reflect_timeout_secs: DEFAULT_REFLECT_TIMEOUT_SECS,
        }
    }

    pub fn reflect_timeout(mut self, secs: u64) -> Self {
        self.reflect_timeout_secs = secs;
        self
    }

    /// True when the tool this facade shells out to is on the PATH.
    pub fn installed(&self) -> bool {
        let tool = if self.docker { "docker" } else { "grpcurl" };
        which::which(tool).is_ok()
    }

    /// Describe a schema source and parse the listed services.
    pub fn proto(&self, source: &SchemaSource) -> Result<Proto, GrpcurlError> {
        let text = self.executor.execute(&self.proto_command(source)?)?;
        parser::parse_proto(&text)
    }

    pub fn proto_command(&self, source: &SchemaSource) -> Result<String, GrpcurlError> {
        let template = match source {
            SchemaSource::File { .. } => "grpcurl %src describe".to_string(),
            SchemaSource::Server { .. } => format!(
                "grpcurl -max-time {} %src describe",
                self.reflect_timeout_secs
            ),
        };
        command::synthesize(&self.form(template, Vec::new(), source))
    }

    /// Describe one message or enum by tag, with its JSON template.
    pub fn message(&self, source: &SchemaSource, tag: &str) -> Result<Message, GrpcurlError> {
        let text = self.executor.execute(&self.message_command(source, tag)?)?;
        parser::parse_message(&text)
    }

    pub fn message_command(
        &self,
        source: &SchemaSource,
        tag: &str,
    ) -> Result<String, GrpcurlError> {
        let template = match source {
            SchemaSource::File { .. } => "grpcurl -msg-template %src describe %s".to_string(),
            SchemaSource::Server { .. } => format!(
                "grpcurl -msg-template -max-time {} %src describe %s",
                self.reflect_timeout_secs
            ),
        };
        command::synthesize(&self.form(template, vec![tag.to_string()], source))
    }

    /// Invoke a method and classify whatever comes back. Payload validation
    /// failures abort before anything is spawned; execution failures are
    /// classified rather than propagated, so the caller always gets a coded
    /// outcome with timing attached.
    pub fn send(&self, request: &CallRequest) -> Result<Response, GrpcurlError> {
        let command = self.send_command(request)?;
        let started = Instant::now();
        let raw = self.executor.execute(&command);
        let elapsed = started.elapsed();
        let verdict = match raw {
            Ok(text) => response::classify(&text),
            Err(err) => response::classify(&err.text),
        };
        Ok(Response {
            code: verdict.code,
            body: verdict.body,
            timestamp: chrono::Utc::now(),
            elapsed,
        })
    }

    pub fn send_command(&self, request: &CallRequest) -> Result<String, GrpcurlError> {
        let meta = command::header_flags(self.dialect, &request.headers);
        let size = command::max_msg_size_flag(request.max_msg_size_mib);
        let emit = if request.emit_defaults {
            "-emit-defaults".to_string()
        } else {
            String::new()
        };
        let payload = command::json_payload(self.dialect, &request.payload)?;

        let (template, args) = match &request.source {
            SchemaSource::Server { .. } => (
                "grpcurl %s %s %s -d %s %src %s".to_string(),
                vec![meta, size, emit, payload, request.method.clone()],
            ),
            SchemaSource::File { .. } => {
                let target = request
                    .target
                    .clone()
                    .ok_or(GrpcurlError::MissingTarget)?;
                let plaintext = if request.plaintext { "-plaintext" } else { "" };
                (
                    "grpcurl %s %s %s %src -d %s %s %s %s".to_string(),
                    vec![
                        meta,
                        size,
                        emit,
                        payload,
                        plaintext.to_string(),
                        target,
                        request.method.clone(),
                    ],
                )
            }
        };
        command::synthesize(&self.form(template, args, &request.source))
    }

    fn form(&self, template: String, args: Vec<String>, source: &SchemaSource) -> RequestForm {
        match source {
            SchemaSource::File { path, import_path } => RequestForm {
                template,
                source: path.clone(),
                server: false,
                plaintext: false,
                docker: self.docker,
                import_path: import_path.clone(),
                args,
            },
            SchemaSource::Server { host, plaintext } => RequestForm {
                template,
                source: host.clone(),
                server: true,
                plaintext: *plaintext,
                docker: self.docker,
                import_path: String::new(),
                args,
            },
        }
    }
}
