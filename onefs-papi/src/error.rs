// SPDX-License-Identifier: GPL-3.0-only

//! Error type for OneFS API calls

use thiserror::Error;

/// Errors surfaced by the OneFS API client.
#[derive(Debug, Error)]
pub enum PapiError {
    /// The request never produced a response (DNS, TLS, timeout, refused)
    #[error("connection error: {0}")]
    Transport(String),

    /// The array answered with a non-success status
    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    /// The response arrived but did not match the expected shape
    #[error("unexpected response body: {0}")]
    UnexpectedBody(String),

    /// The client could not be built from the connection parameters
    #[error("invalid connection configuration: {0}")]
    Config(String),
}

impl PapiError {
    pub(crate) fn transport(err: reqwest::Error) -> Self {
        PapiError::Transport(err.to_string())
    }

    /// Whether this error is the array reporting that a resource does not
    /// exist. Tasks treat 404 as "absent", never as a failure.
    pub fn is_not_found(&self) -> bool {
        matches!(self, PapiError::Api { status: 404, .. })
    }
}

pub type Result<T> = std::result::Result<T, PapiError>;

/// Collapse newlines, double quotes and runs of spaces in an API error body
/// into single spaces so the message stays on one line in reports.
pub fn scrub_body(body: &str) -> String {
    let mut out = String::with_capacity(body.len());
    let mut in_gap = false;
    for c in body.chars() {
        if c == '\n' || c == '"' || c == ' ' {
            if !in_gap {
                out.push(' ');
                in_gap = true;
            }
        } else {
            out.push(c);
            in_gap = false;
        }
    }
    out.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scrub_body_collapses_noise() {
        let body = "{\n\"errors\" : [\n{\n\"message\" : \"Zone not  found\"\n}\n]\n}";
        assert_eq!(scrub_body(body), "{ errors : [ { message : Zone not found } ] }");
    }

    #[test]
    fn test_scrub_body_plain_text_unchanged() {
        assert_eq!(scrub_body("bad request"), "bad request");
    }

    #[test]
    fn test_is_not_found() {
        let err = PapiError::Api { status: 404, message: "gone".into() };
        assert!(err.is_not_found());

        let err = PapiError::Api { status: 500, message: "boom".into() };
        assert!(!err.is_not_found());

        assert!(!PapiError::Transport("timed out".into()).is_not_found());
    }

    #[test]
    fn test_api_error_display() {
        let err = PapiError::Api { status: 400, message: "invalid path".into() };
        assert_eq!(err.to_string(), "API error (status 400): invalid path");
    }
}
