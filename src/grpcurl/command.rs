//! Command synthesis: turns an abstract request description into the exact
//! grpcurl command line, including shell quoting and the container rewrite.

use super::error::GrpcurlError;

pub const DOCKER_IMAGE: &str = "fullstorydev/grpcurl";
pub const DEFAULT_MAX_MSG_MIB: u64 = 4;
const MIB: u64 = 1_048_576;
const SOURCE_SLOT: &str = "%src";
const ARG_SLOT: &str = "%s";

/// Quoting policy, injected once by the caller instead of probed from the
/// environment at every call site.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShellDialect {
    Posix,
    Windows,
}

impl ShellDialect {
    /// Dialect of the shell this binary was built for.
    pub fn host() -> Self {
        if cfg!(windows) {
            ShellDialect::Windows
        } else {
            ShellDialect::Posix
        }
    }

    /// Wrap a raw argument so the shell passes it through unchanged.
    pub fn quote(&self, raw: &str) -> String {
        match self {
            ShellDialect::Windows => format!("\"{}\"", raw.replace('"', "\\\"")),
            ShellDialect::Posix => format!("'{raw}'"),
        }
    }
}

/// Abstract request the synthesizer consumes. The template carries one
/// `%src` slot for the source clause and ordered `%s` slots filled from
/// `args`; the args are expected to be pre-quoted where they need to be.
#[derive(Debug, Clone)]
pub struct RequestForm {
    pub template: String,
    /// File path or `host:port`, depending on `server`.
    pub source: String,
    pub server: bool,
    pub plaintext: bool,
    pub docker: bool,
    pub import_path: String,
    pub args: Vec<String>,
}

/// Build the complete command line for a form.
pub fn synthesize(form: &RequestForm) -> Result<String, GrpcurlError> {
    if !form.template.contains(SOURCE_SLOT) {
        return Err(GrpcurlError::MissingSourceSlot);
    }
    // The source slot must go first: `%src` itself contains `%s`.
    let template = form.template.replacen(SOURCE_SLOT, &source_clause(form), 1);
    let filled = fill_slots(&template, &form.args)?;
    if form.docker {
        return Ok(dockerize(&filled));
    }
    Ok(filled)
}

fn source_clause(form: &RequestForm) -> String {
    let prefix = if form.plaintext { "-plaintext " } else { "" };
    if form.server {
        format!("{prefix}{}", form.source)
    } else {
        format!("{prefix}-import-path {} -proto {}", form.import_path, form.source)
    }
}

fn fill_slots(template: &str, args: &[String]) -> Result<String, GrpcurlError> {
    let parts: Vec<&str> = template.split(ARG_SLOT).collect();
    let slots = parts.len() - 1;
    if slots != args.len() {
        return Err(GrpcurlError::TemplateArity {
            slots,
            args: args.len(),
        });
    }
    let mut out = String::with_capacity(template.len());
    for (i, part) in parts.iter().enumerate() {
        out.push_str(part);
        if i < args.len() {
            out.push_str(&args[i]);
        }
    }
    Ok(out)
}

/// Rewrite a complete command to run inside the grpcurl container. A
/// referenced proto file is volume-mounted; a Windows-style path is mounted
/// from its original location but referenced inside the container without
/// the drive prefix.
pub fn dockerize(command: &str) -> String {
    if !command.contains("-proto ") {
        return command.replacen("grpcurl ", &format!("docker run {DOCKER_IMAGE} "), 1);
    }
    let path = proto_path(command);
    if let Some(colon) = path.find(':') {
        let container = path[colon + 1..].to_string();
        let rewritten = command.replace(&path, &container);
        return rewritten.replacen(
            "grpcurl ",
            &format!("docker run -v {path}:{container} {DOCKER_IMAGE} "),
            1,
        );
    }
    command.replacen(
        "grpcurl ",
        &format!("docker run -v {path}:{path} {DOCKER_IMAGE} "),
        1,
    )
}

fn proto_path(command: &str) -> String {
    command
        .split_once("-proto ")
        .map(|(_, rest)| rest.split(' ').next().unwrap_or(""))
        .unwrap_or("")
        .to_string()
}

/// Wrap one `"key: value"` metadata string as a `-H` flag. Each flag emits a
/// trailing space so multiple headers concatenate without a separator.
pub fn header_flag(dialect: ShellDialect, header: &str) -> String {
    format!("-H {} ", dialect.quote(header))
}

pub fn header_flags(dialect: ShellDialect, headers: &[String]) -> String {
    headers.iter().map(|h| header_flag(dialect, h)).collect()
}

/// Validate and canonicalize a JSON payload, then quote it for the shell.
/// Parsing doubles as the syntax check: bad payloads abort synthesis before
/// anything is spawned.
pub fn json_payload(dialect: ShellDialect, raw: &str) -> Result<String, GrpcurlError> {
    let value: serde_json::Value = serde_json::from_str(raw)?;
    Ok(dialect.quote(&value.to_string()))
}

/// `-max-msg-sz` with the size in bytes, or nothing when the requested size
/// is the tool's own default.
pub fn max_msg_size_flag(mib: u64) -> String {
    if mib == DEFAULT_MAX_MSG_MIB {
        return String::new();
    }
    format!("-max-msg-sz {}", mib * MIB)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn form(template: &str, args: &[&str]) -> RequestForm {
        RequestForm {
            template: template.to_string(),
            source: "docs/api.proto".to_string(),
            server: false,
            plaintext: false,
            docker: false,
            import_path: "/".to_string(),
            args: args.iter().map(|a| a.to_string()).collect(),
        }
    }

    #[test]
    fn file_source_clause() {
        let cmd = synthesize(&form("grpcurl %src describe", &[])).unwrap();
        assert_eq!(cmd, "grpcurl -import-path / -proto docs/api.proto describe");
    }

    #[test]
    fn server_source_clause_with_plaintext() {
        let mut f = form("grpcurl %src describe %s", &[".pb.v1.StringMes"]);
        f.source = "localhost:12201".to_string();
        f.server = true;
        f.plaintext = true;
        let cmd = synthesize(&f).unwrap();
        assert_eq!(
            cmd,
            "grpcurl -plaintext localhost:12201 describe .pb.v1.StringMes"
        );
    }

    #[test]
    fn plaintext_prefix_applies_to_file_mode_too() {
        let mut f = form("grpcurl %src describe", &[]);
        f.plaintext = true;
        let cmd = synthesize(&f).unwrap();
        assert_eq!(
            cmd,
            "grpcurl -plaintext -import-path / -proto docs/api.proto describe"
        );
    }

    #[test]
    fn slot_arity_is_checked() {
        let err = synthesize(&form("grpcurl %src describe %s", &[])).unwrap_err();
        assert!(matches!(
            err,
            GrpcurlError::TemplateArity { slots: 1, args: 0 }
        ));
    }

    #[test]
    fn missing_source_slot_is_rejected() {
        let err = synthesize(&form("grpcurl describe", &[])).unwrap_err();
        assert!(matches!(err, GrpcurlError::MissingSourceSlot));
    }

    #[test]
    fn dockerize_mounts_posix_proto_path() {
        let cmd = dockerize("grpcurl -import-path / -proto /a/b.proto describe");
        assert_eq!(
            cmd,
            "docker run -v /a/b.proto:/a/b.proto fullstorydev/grpcurl \
             -import-path / -proto /a/b.proto describe"
        );
    }

    #[test]
    fn dockerize_translates_windows_proto_path() {
        let cmd = dockerize(r"grpcurl -import-path / -proto C:\x\api.proto describe");
        assert_eq!(
            cmd,
            r"docker run -v C:\x\api.proto:\x\api.proto fullstorydev/grpcurl -import-path / -proto \x\api.proto describe"
        );
    }

    #[test]
    fn dockerize_without_proto_only_swaps_the_tool() {
        let cmd = dockerize("grpcurl -plaintext localhost:12201 describe");
        assert_eq!(
            cmd,
            "docker run fullstorydev/grpcurl -plaintext localhost:12201 describe"
        );
    }

    #[test]
    fn headers_round_trip_inside_quotes() {
        assert_eq!(
            header_flag(ShellDialect::Posix, "username: user"),
            "-H 'username: user' "
        );
        assert_eq!(
            header_flag(ShellDialect::Windows, "username: user"),
            "-H \"username: user\" "
        );
    }

    #[test]
    fn headers_concatenate_in_order() {
        let flags = header_flags(
            ShellDialect::Posix,
            &["a: 1".to_string(), "b: 2".to_string()],
        );
        assert_eq!(flags, "-H 'a: 1' -H 'b: 2' ");
        assert_eq!(header_flags(ShellDialect::Posix, &[]), "");
    }

    #[test]
    fn json_payload_is_canonicalized_and_quoted() {
        let posix = json_payload(ShellDialect::Posix, "{ \"a\" : 1 }").unwrap();
        assert_eq!(posix, "'{\"a\":1}'");
        let windows = json_payload(ShellDialect::Windows, "{ \"a\" : 1 }").unwrap();
        assert_eq!(windows, "\"{\\\"a\\\":1}\"");
    }

    #[test]
    fn invalid_json_payload_aborts_synthesis() {
        let err = json_payload(ShellDialect::Posix, "{nope").unwrap_err();
        assert!(matches!(err, GrpcurlError::PayloadEncoding(_)));
    }

    #[test]
    fn default_message_size_emits_no_flag() {
        assert_eq!(max_msg_size_flag(4), "");
        assert_eq!(max_msg_size_flag(2_000_000), "-max-msg-sz 2097152000000");
    }
}
