use std::time::Duration;

/// Failure of a single engine call.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("engine server error: {0}")]
    Server(String),

    #[error("unexpected engine response: {0}")]
    UnexpectedResponse(String),

    #[error("engine call timed out after {}s", .0.as_secs())]
    Timeout(Duration),

    #[error("engine I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("no such object: {0}")]
    NotFound(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("engine request failed: {0}")]
    Request(String),
}

impl EngineError {
    /// Whether the call may succeed if simply repeated.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::Server(_) | Self::UnexpectedResponse(_) | Self::Timeout(_) | Self::Io(_)
        )
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict(_))
    }

    /// Classify the stderr of a failed `docker` invocation.
    pub fn from_stderr(stderr: &str) -> Self {
        let message = stderr.trim().to_string();
        let lower = message.to_ascii_lowercase();

        // Only the daemon's own "No such ..." replies; build steps and
        // pulls print "not found" for unrelated reasons.
        if lower.contains("no such container")
            || lower.contains("no such image")
            || lower.contains("no such object")
        {
            Self::NotFound(message)
        } else if lower.contains("conflict") || lower.contains("already in use") {
            Self::Conflict(message)
        } else if lower.contains("cannot connect to the docker daemon")
            || lower.contains("error during connect")
            || lower.contains("connection refused")
            || lower.contains("broken pipe")
            || lower.contains("connection reset")
        {
            Self::Io(std::io::Error::new(std::io::ErrorKind::ConnectionRefused, message))
        } else if lower.contains("internal server error")
            || lower.contains("bad gateway")
            || lower.contains("service unavailable")
            || lower.contains("status code 5")
        {
            Self::Server(message)
        } else if lower.contains("timeout") || lower.contains("timed out") {
            Self::Io(std::io::Error::new(std::io::ErrorKind::TimedOut, message))
        } else {
            Self::Request(message)
        }
    }
}
