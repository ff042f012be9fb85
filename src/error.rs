use std::fmt;

use thiserror::Error;

/// Pinpoints a single nonconforming field discovered during schema validation.
///
/// The `path` uses dotted/indexed notation rooted at the payload being checked,
/// such as `choices[0].message.content`, so a caller can log exactly which part
/// of a request or response violated the wire contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// Location of the offending field within the payload.
    pub path: String,
    /// Human-readable description of the mismatch.
    pub problem: String,
}

impl Violation {
    /// Creates a violation from a path and a problem description.
    pub fn new(path: impl Into<String>, problem: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            problem: problem.into(),
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.problem)
    }
}

/// Aggregates every failure mode exposed by the completions client.
///
/// The taxonomy is deliberately two-headed: data that does not conform to the
/// expected shape is a [`ClientError::Validation`], while anything that went
/// wrong at the network layer, including non-success status codes and bodies
/// that are not decodable JSON, is a [`ClientError::Transport`]. The two are
/// never conflated, so callers can distinguish "fix the input / distrust the
/// server payload" from "the call itself failed".
#[derive(Debug, Error)]
pub enum ClientError {
    /// Data to be sent, or data received, does not conform to the schema.
    ///
    /// Carries one [`Violation`] per offending field; the list is never empty.
    #[error("validation failed: {}", render_violations(.violations))]
    Validation { violations: Vec<Violation> },
    /// The network call could not complete or returned a non-success status.
    #[error("transport failure{}: {}", render_status(.status), .message)]
    Transport {
        /// HTTP status code, when the failure happened after a response arrived.
        status: Option<u16>,
        /// Underlying connectivity cause or raw error body.
        message: String,
    },
}

impl ClientError {
    /// Creates a [`ClientError::Transport`] for a connection-level failure.
    ///
    /// # Examples
    ///
    /// ```
    /// use kaiwa::error::ClientError;
    ///
    /// let err = ClientError::transport("dns lookup failed");
    /// assert!(matches!(err, ClientError::Transport { status: None, .. }));
    /// ```
    pub fn transport<T: Into<String>>(message: T) -> Self {
        Self::Transport {
            status: None,
            message: message.into(),
        }
    }

    /// Creates a [`ClientError::Transport`] carrying a non-success status code.
    ///
    /// # Examples
    ///
    /// ```
    /// use kaiwa::error::ClientError;
    ///
    /// let err = ClientError::status(404, "not found");
    /// assert!(matches!(err, ClientError::Transport { status: Some(404), .. }));
    /// ```
    pub fn status<T: Into<String>>(status: u16, message: T) -> Self {
        Self::Transport {
            status: Some(status),
            message: message.into(),
        }
    }

    /// Creates a [`ClientError::Validation`] from the collected violations.
    pub fn validation(violations: Vec<Violation>) -> Self {
        Self::Validation { violations }
    }

    /// Shorthand for a validation error with a single offending field.
    pub fn invalid_field(path: impl Into<String>, problem: impl Into<String>) -> Self {
        Self::Validation {
            violations: vec![Violation::new(path, problem)],
        }
    }
}

fn render_violations(violations: &[Violation]) -> String {
    violations
        .iter()
        .map(Violation::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

fn render_status(status: &Option<u16>) -> String {
    match status {
        Some(code) => format!(" (status {code})"),
        None => String::new(),
    }
}
