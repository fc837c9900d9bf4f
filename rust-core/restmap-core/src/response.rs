//! # HTTP Response
//!
//! Status, headers and optional body produced by one dispatch.

use crate::error::Result;
use crate::json::to_json;
use crate::reply::Reply;
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::StatusCode;

/// JSON media type, the only one accepted and produced
pub const APPLICATION_JSON: &str = "application/json";

/// Cache policy sent with every JSON body
pub const NO_CACHE: &str = "no-cache, must-revalidate";

/// Response data handed back to the transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    /// HTTP status code
    pub status: u16,
    /// Response headers in emission order
    pub headers: Vec<(String, String)>,
    /// Response body, if any
    pub body: Option<String>,
}

impl Response {
    /// Status line only: no headers, no body
    #[must_use]
    pub const fn status_only(status: u16) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: None,
        }
    }

    /// JSON body with the standard content and cache headers
    #[must_use]
    pub fn json(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            headers: vec![
                ("Content-Type".to_string(), APPLICATION_JSON.to_string()),
                ("Cache-Control".to_string(), NO_CACHE.to_string()),
            ],
            body: Some(body.into()),
        }
    }

    /// Serialize a handler reply
    ///
    /// A reply without payload becomes a bare status.
    ///
    /// # Errors
    ///
    /// Returns `Error::Json` if the payload cannot be serialized
    pub fn from_reply(reply: &Reply) -> Result<Self> {
        match &reply.payload {
            Some(payload) => Ok(Self::json(reply.status, to_json(payload)?)),
            None => Ok(Self::status_only(reply.status)),
        }
    }

    /// Get a header value by name (case-insensitive)
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Convert to hyper Response
    pub(crate) fn into_hyper(self) -> hyper::Response<Full<Bytes>> {
        let status = StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let mut response = hyper::Response::new(Full::new(Bytes::from(self.body.unwrap_or_default())));
        *response.status_mut() = status;

        let headers = response.headers_mut();
        for (k, v) in &self.headers {
            if let (Ok(name), Ok(value)) = (
                hyper::header::HeaderName::from_bytes(k.as_bytes()),
                hyper::header::HeaderValue::from_str(v),
            ) {
                headers.append(name, value);
            }
        }
        response
    }
}
