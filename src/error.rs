use thiserror::Error;

/// Rejected before anything is sent.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Please enter a query or select a demo scenario!")]
    EmptyQuery,
}

/// Failure classes a request can end in. Exactly one applies per failed request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Timeout,
    Server,
    Network,
    Unknown,
}

impl ErrorKind {
    /// Short guidance shown under the error message.
    pub fn hint(self) -> &'static str {
        match self {
            ErrorKind::Timeout => "The request may still be processing; try again in a moment.",
            ErrorKind::Server => "The server rejected the request; review your query and retry.",
            ErrorKind::Network => "Check that the backend server is running and reachable.",
            ErrorKind::Unknown => "Unexpected failure; you can submit again.",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    #[error("Request timed out. The backend is still processing. Please try again.")]
    Timeout { timeout_ms: u64 },

    #[error("Server error: {detail}")]
    Server { status_code: u16, detail: String },

    #[error("Cannot connect to backend at {base_url}. Make sure the analysis server is running.")]
    Network { base_url: String, message: String },

    #[error("Error: {message}")]
    Unknown { message: String },
}

impl GatewayError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            GatewayError::Timeout { .. } => ErrorKind::Timeout,
            GatewayError::Server { .. } => ErrorKind::Server,
            GatewayError::Network { .. } => ErrorKind::Network,
            GatewayError::Unknown { .. } => ErrorKind::Unknown,
        }
    }
}
