//! Response definitions
//!
//! Replies are plain text; the status is implied by the text itself, so the
//! client recovers it with [`Status::classify`].

use super::{DELETED, ERROR, RENAMED, RENAME_ERROR, SUCCESS, UNKNOWN_COMMAND};

/// Response status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Ok,
    Error,
}

/// Openings of every error sentence the server sends. Listings carry
/// arbitrary file names, so a bare `Error` or `ERROR` prefix is not enough.
const ERROR_PREFIXES: [&str; 3] = ["Error: ", "Error al ", "ERROR: "];

impl Status {
    /// Recover the status of a reply received off the wire
    pub fn classify(text: &str) -> Status {
        let text = text.trim();
        let is_token = text == ERROR || text == RENAME_ERROR || text == UNKNOWN_COMMAND;
        if is_token || ERROR_PREFIXES.iter().any(|p| text.starts_with(p)) {
            Status::Error
        } else {
            Status::Ok
        }
    }
}

/// A reply to a one-shot command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    /// Status code
    pub status: Status,

    /// Text sent verbatim to the client
    pub text: String,
}

impl Response {
    /// Create an OK response
    pub fn ok(text: impl Into<String>) -> Self {
        Self {
            status: Status::Ok,
            text: text.into(),
        }
    }

    /// Create an ERROR response
    pub fn error(text: impl Into<String>) -> Self {
        Self {
            status: Status::Error,
            text: text.into(),
        }
    }

    /// Parse a reply received by the client
    pub fn from_wire(bytes: &[u8]) -> Self {
        let text = String::from_utf8_lossy(bytes).into_owned();
        Self {
            status: Status::classify(&text),
            text,
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status == Status::Ok
    }

    /// True for `SUCCESS: ...`, `DELETED` and `RENAMED`
    pub fn is_success_marker(&self) -> bool {
        let text = self.text.trim();
        text.starts_with(SUCCESS) || text == DELETED || text == RENAMED
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.text.as_bytes()
    }
}
