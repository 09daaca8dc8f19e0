//! Classification of raw grpcurl output into a coded outcome.

pub const CODE_OK: &str = "OK";
pub const CODE_CONNECTION_ERROR: &str = "ConnectionError";
pub const CODE_UNKNOWN_ERROR: &str = "UnknownError";

const DIAL_MARKER: &str = "Failed to dial target host ";
const ERROR_MARKER: &str = "ERROR:";
const CODE_MARKER: &str = "  Code: ";
const MESSAGE_MARKER: &str = "  Message: ";
const FAILED_MARKER: &str = "Command failed";

/// Coded outcome of one invocation, before the caller stamps timing onto it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    pub code: String,
    pub body: String,
}

/// Map the combined output of one invocation (or the executor's failure
/// text) to a coded outcome. First match wins; anything unrecognized is
/// treated as success, which keeps grpcurl's own JSON output untouched but
/// can mislabel unexpected failures.
pub fn classify(text: &str) -> Verdict {
    if text.contains(DIAL_MARKER) {
        return Verdict {
            code: CODE_CONNECTION_ERROR.to_string(),
            body: text.to_string(),
        };
    }
    if text.contains(ERROR_MARKER) {
        // grpcurl renders RPC failures as indented `Code:` / `Message:`
        // lines; either may be absent when the text deviates.
        let mut verdict = Verdict {
            code: String::new(),
            body: String::new(),
        };
        for line in text.lines() {
            if let Some(rest) = line.split_once(CODE_MARKER) {
                verdict.code = rest.1.to_string();
            }
            if let Some(rest) = line.split_once(MESSAGE_MARKER) {
                verdict.body = rest.1.to_string();
            }
        }
        return verdict;
    }
    if text.contains(FAILED_MARKER) {
        return Verdict {
            code: CODE_UNKNOWN_ERROR.to_string(),
            body: text.to_string(),
        };
    }
    Verdict {
        code: CODE_OK.to_string(),
        body: text.to_string(),
    }
}
