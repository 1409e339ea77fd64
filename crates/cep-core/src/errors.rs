/// Failure taxonomy for client operations. Connection failures are
/// fatal to the session; everything else is scoped to the operation
/// that raised it. Nothing in this crate retries automatically.
#[derive(Clone, Debug, thiserror::Error)]
pub enum ClientError {
    // Fatal to the session
    #[error("connection error: {0}")]
    Connection(String),
    #[error("not connected")]
    NotConnected,

    // Scoped to one operation
    #[error("send error: {0}")]
    Send(String),
    #[error("rule rejected: {0}")]
    Parse(#[from] ParseError),
    #[error("argument error: {0}")]
    Argument(String),
}

impl ClientError {
    /// True when the session this error came from is unusable.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Connection(_) | Self::NotConnected)
    }

    /// Short classification string for logging.
    pub fn error_kind(&self) -> &'static str {
        match self {
            Self::Connection(_) => "connection",
            Self::NotConnected => "not_connected",
            Self::Send(_) => "send",
            Self::Parse(_) => "parse",
            Self::Argument(_) => "argument",
        }
    }
}

/// What the rule-parser seam can report about rejected rule text. The
/// grammar itself lives outside this crate.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("rule text is empty")]
    Empty,
    #[error("syntax error at line {line}: {message}")]
    Syntax { line: usize, message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fatal_classification() {
        assert!(ClientError::Connection("refused".into()).is_fatal());
        assert!(ClientError::NotConnected.is_fatal());
    }

    #[test]
    fn operation_scoped_errors_are_not_fatal() {
        assert!(!ClientError::Send("broken pipe".into()).is_fatal());
        assert!(!ClientError::Parse(ParseError::Empty).is_fatal());
        assert!(!ClientError::Argument("bad pairs".into()).is_fatal());
    }

    #[test]
    fn error_kind_strings() {
        assert_eq!(ClientError::NotConnected.error_kind(), "not_connected");
        assert_eq!(ClientError::Send("x".into()).error_kind(), "send");
        assert_eq!(
            ClientError::Parse(ParseError::Empty).error_kind(),
            "parse"
        );
    }

    #[test]
    fn parse_error_converts() {
        let err: ClientError = ParseError::Syntax {
            line: 3,
            message: "unexpected token".into(),
        }
        .into();
        assert_eq!(err.error_kind(), "parse");
        assert!(err.to_string().contains("line 3"));
    }
}
