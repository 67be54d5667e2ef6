use std::fmt;

use thiserror::Error;

/// Result type alias for meterwise operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Byte range within the input string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

/// All errors produced by meterwise.
///
/// Evaluation itself never fails; these come from turning source records
/// into rules and from loading meter files.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// A time-of-day field could not be read.
    #[error("{message}")]
    Time {
        message: String,
        span: Span,
        input: String,
    },

    /// A record parsed but does not describe a usable rule.
    #[error("{message}")]
    Rule { message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[cfg(feature = "serde")]
    #[error("invalid meter data: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub fn time(message: impl Into<String>, span: Span, input: impl Into<String>) -> Self {
        Self::Time {
            message: message.into(),
            span,
            input: input.into(),
        }
    }

    pub fn rule(message: impl Into<String>) -> Self {
        Self::Rule {
            message: message.into(),
        }
    }

    /// Format a rich error with the offending range underlined.
    pub fn display_rich(&self) -> String {
        match self {
            Self::Time {
                message,
                span,
                input,
            } => format_span_error("error", message, span, input),
            other => format!("error: {other}"),
        }
    }
}

fn format_span_error(prefix: &str, message: &str, span: &Span, input: &str) -> String {
    let mut out = format!("{prefix}: {message}\n");
    out.push_str(&format!("  {input}\n"));
    let padding = " ".repeat(span.start + 2);
    let underline = "^".repeat(span.end.saturating_sub(span.start).max(1));
    out.push_str(&padding);
    out.push_str(&underline);
    out
}
