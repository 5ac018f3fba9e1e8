//! Error taxonomy for remote service calls.

use std::time::Duration;

use thiserror::Error;

/// Failure of a single remote service call.
///
/// `Network` and `Timeout` mean no usable response came back; `Server`
/// carries the backend's own explanation; `Decode` means a 2xx response
/// whose body did not match the expected shape.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServiceError {
    #[error("{0}")]
    Network(String),

    #[error("timeout of {}ms exceeded", .0.as_millis())]
    Timeout(Duration),

    #[error("{detail}")]
    Server { status: u16, detail: String },

    #[error("invalid response: {0}")]
    Decode(String),
}

impl ServiceError {
    /// Builds a server error, falling back to a status-code message when
    /// the response carried no `detail`.
    pub fn server(status: u16, detail: Option<String>) -> Self {
        let detail = match detail {
            Some(d) if !d.trim().is_empty() => d,
            _ => format!("Request failed with status code {}", status),
        };
        ServiceError::Server { status, detail }
    }

    /// The best-available message to show a user, verbatim.
    pub fn user_message(&self) -> String {
        self.to_string()
    }

    /// True when the request never produced a response.
    pub fn is_network(&self) -> bool {
        matches!(self, ServiceError::Network(_) | ServiceError::Timeout(_))
    }
}
