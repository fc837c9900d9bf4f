//! # Error Handling
//!
//! Centralized error types for restmap core.
//! Uses `thiserror` for ergonomic error definitions.

use thiserror::Error;

/// Result type alias for restmap operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error types for the restmap runtime
#[derive(Error, Debug)]
pub enum Error {
    /// Server failed to bind to the specified address
    #[error("Failed to bind server to {address}: {source}")]
    BindError {
        /// The address we tried to bind to
        address: String,
        /// The underlying IO error
        #[source]
        source: std::io::Error,
    },

    /// No registered route accepts the method and path
    #[error("No route found for {method} {path}")]
    RouteNotFound {
        /// Request method as received
        method: String,
        /// The path that wasn't matched
        path: String,
    },

    /// Request content type is not `application/json`
    #[error("Unsupported content type: {content_type:?}")]
    UnsupportedContentType {
        /// Effective content type of the request
        content_type: String,
    },

    /// Request body is present but is not valid JSON
    #[error("Malformed JSON body: {reason}")]
    MalformedBody {
        /// Parser error message
        reason: String,
    },

    /// A matched route could not bind its template against the request
    #[error("Route {pattern} cannot bind request segments")]
    ExtractionMismatch {
        /// The template that failed to bind
        pattern: String,
    },

    /// Invalid route pattern provided
    #[error("Invalid route pattern: {pattern}: {reason}")]
    InvalidRoutePattern {
        /// The invalid pattern
        pattern: String,
        /// Reason for invalidity
        reason: String,
    },

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Request payload too large
    #[error("Payload too large: limit={limit} bytes")]
    PayloadTooLarge {
        /// Max allowed size
        limit: usize,
    },

    /// Request body stream failed before it was fully read
    #[error("Failed to read request body: {reason}")]
    BodyRead {
        /// Transport error message
        reason: String,
    },
}

impl Error {
    /// HTTP status code answered when this error ends a request
    #[must_use]
    pub const fn status(&self) -> u16 {
        match self {
            Self::RouteNotFound { .. } => 404,
            Self::UnsupportedContentType { .. } => 415,
            Self::MalformedBody { .. } | Self::BodyRead { .. } => 400,
            Self::PayloadTooLarge { .. } => 413,
            _ => 500,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_not_found_error() {
        let err = Error::RouteNotFound {
            method: "GET".to_string(),
            path: "/unknown".to_string(),
        };
        assert!(err.to_string().contains("/unknown"));
        assert_eq!(err.status(), 404);
    }

    #[test]
    fn test_bind_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::AddrInUse, "address in use");
        let err = Error::BindError {
            address: "0.0.0.0:8000".to_string(),
            source: io_err,
        };
        assert!(err.to_string().contains("0.0.0.0:8000"));
        assert_eq!(err.status(), 500);
    }

    #[test]
    fn test_dispatch_statuses() {
        let unsupported = Error::UnsupportedContentType {
            content_type: "text/plain".to_string(),
        };
        assert_eq!(unsupported.status(), 415);
        assert!(unsupported.to_string().contains("text/plain"));

        let malformed = Error::MalformedBody {
            reason: "eof".to_string(),
        };
        assert_eq!(malformed.status(), 400);

        let truncated = Error::BodyRead {
            reason: "connection reset".to_string(),
        };
        assert_eq!(truncated.status(), 400);
        assert_eq!(Error::PayloadTooLarge { limit: 16 }.status(), 413);

        let mismatch = Error::ExtractionMismatch {
            pattern: "/users/{id}".to_string(),
        };
        assert_eq!(mismatch.status(), 500);
    }
}
