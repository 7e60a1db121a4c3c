// Error types shared by the library. Every fallible operation returns
// `crate::Result<T>`; the binary converts these into a printed message and
// an exit code in one place (see `report` below and `main.rs`).

use serde_json::Value;
use thiserror::Error;

/// HTTP status the service uses when a vote (or other action) was already
/// recorded for the caller.
pub const STATUS_CONFLICT: u16 = 409;

#[derive(Error, Debug)]
pub enum Error {
    /// The service answered with a non-success status. `body` holds the
    /// parsed JSON body when it parsed, otherwise the raw text as a string.
    #[error("API error ({status}): {message}")]
    Api {
        status: u16,
        message: String,
        body: Value,
    },

    /// A local precondition failed (missing token, missing argument, ...).
    #[error("{0}")]
    Cli(String),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// The user backed out of a prompt. Not a failure.
    #[error("Cancelled")]
    Cancelled,
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn cli(message: impl Into<String>) -> Self {
        Error::Cli(message.into())
    }

    /// Status code of an API error, if this is one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_conflict(&self) -> bool {
        self.status() == Some(STATUS_CONFLICT)
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Error::Cancelled)
    }

    /// Short human message used inside interactive flows ("Failed: ...").
    pub fn summary(&self) -> String {
        match self {
            Error::Api { body: Value::String(text), status, .. } if !text.is_empty() => {
                format!("{status} {text}")
            }
            Error::Api { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}

/// Render an error the way the top-level handler prints it to stderr.
pub fn report(error: &Error) -> String {
    match error {
        Error::Api { status, message, body } => {
            let headline = match body {
                Value::String(text) if !text.is_empty() => text.as_str(),
                _ => message.as_str(),
            };
            let mut out = format!("API error ({status}): {headline}");
            if body.is_object() || body.is_array() {
                if let Ok(pretty) = serde_json::to_string_pretty(body) {
                    out.push('\n');
                    out.push_str(&pretty);
                }
            }
            out
        }
        other => format!("Error: {other}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn report_prints_string_body_as_headline() {
        let err = Error::Api {
            status: 500,
            message: "500 Internal Server Error".into(),
            body: json!("boom"),
        };
        assert_eq!(report(&err), "API error (500): boom");
    }

    #[test]
    fn report_appends_json_body() {
        let err = Error::Api {
            status: 422,
            message: "422 Unprocessable Entity".into(),
            body: json!({ "error": "name required" }),
        };
        let text = report(&err);
        assert!(text.starts_with("API error (422): 422 Unprocessable Entity\n"));
        assert!(text.contains("\"error\": \"name required\""));
    }

    #[test]
    fn report_prefixes_local_errors() {
        assert_eq!(report(&Error::cli("no token")), "Error: no token");
    }

    #[test]
    fn conflict_is_detected_by_status() {
        let err = Error::Api {
            status: 409,
            message: "409 Conflict".into(),
            body: Value::Null,
        };
        assert!(err.is_conflict());
        assert!(!Error::Cancelled.is_conflict());
    }
}
