use thiserror::Error;

/// Failures produced by the grpcurl adapter layer.
///
/// Parse and synthesis failures are local and recoverable; nothing in this
/// layer retries. `Exec` carries the raw failure text so the response
/// classifier can still inspect it.
#[derive(Debug, Error)]
pub enum GrpcurlError {
    #[error("malformed describe output at {line:?}: {reason}")]
    MalformedDescribeOutput { line: String, reason: String },

    #[error("request payload is not valid JSON: {0}")]
    PayloadEncoding(#[from] serde_json::Error),

    #[error("command template has {slots} positional slots but {args} arguments were given")]
    TemplateArity { slots: usize, args: usize },

    #[error("command template is missing the %src source-clause slot")]
    MissingSourceSlot,

    #[error("a file-backed call needs a target endpoint")]
    MissingTarget,

    #[error("{0}")]
    Exec(String),
}

impl GrpcurlError {
    pub(crate) fn malformed(line: &str, reason: &str) -> Self {
        GrpcurlError::MalformedDescribeOutput {
            line: line.to_string(),
            reason: reason.to_string(),
        }
    }
}
