//! # HTTP Request
//!
//! Transport-neutral view of an incoming request: the method token, the
//! `Content-Type` header, the path and the raw body bytes. Nothing else
//! about the request is consulted by dispatch.

use crate::error::{Error, Result};
use http_body_util::{BodyExt, LengthLimitError, Limited};
use hyper::body::{Body, Bytes};
use hyper::header::{CONTENT_LENGTH, CONTENT_TYPE};

/// Request data handed to the dispatcher
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    /// HTTP method token as received (e.g. "GET")
    pub method: String,
    /// `Content-Type` header value, if any
    pub content_type: Option<String>,
    /// Request path (without query string)
    pub path: String,
    /// Raw request body
    pub body: Bytes,
}

impl Request {
    /// Create a request with no content type and an empty body
    ///
    /// Anything after `?` in `path` is dropped.
    pub fn new(method: impl Into<String>, path: impl AsRef<str>) -> Self {
        let path = path.as_ref();
        let path = path.split_once('?').map_or(path, |(p, _)| p);

        Self {
            method: method.into(),
            content_type: None,
            path: path.to_string(),
            body: Bytes::new(),
        }
    }

    /// Set the `Content-Type` header value
    #[must_use]
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// Set the body
    #[must_use]
    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    /// Create from a hyper request, rejecting bodies over `max_body_size`
    ///
    /// The declared `Content-Length` is checked before reading; the body
    /// itself is read through a length limit, so reading stops as soon as
    /// it grows past `max_body_size`.
    ///
    /// # Errors
    ///
    /// Returns `Error::PayloadTooLarge` if the body exceeds the limit, or
    /// `Error::BodyRead` if the body stream fails.
    pub async fn from_hyper_with_limit<B>(
        req: hyper::Request<B>,
        max_body_size: usize,
    ) -> Result<Self>
    where
        B: Body,
        B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        let declared = req
            .headers()
            .get(CONTENT_LENGTH)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<usize>().ok());
        if declared.is_some_and(|len| len > max_body_size) {
            return Err(Error::PayloadTooLarge {
                limit: max_body_size,
            });
        }

        let method = req.method().as_str().to_string();
        let path = req.uri().path().to_string();
        let content_type = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(String::from);

        let body = Limited::new(req.into_body(), max_body_size)
            .collect()
            .await
            .map_err(|err| {
                if err.is::<LengthLimitError>() {
                    Error::PayloadTooLarge {
                        limit: max_body_size,
                    }
                } else {
                    Error::BodyRead {
                        reason: err.to_string(),
                    }
                }
            })?
            .to_bytes();

        Ok(Self {
            method,
            content_type,
            path,
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::Full;
    use hyper::body::Frame;
    use std::pin::Pin;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::task::{Context, Poll};

    /// Body that fails on its first frame, like a reset connection
    struct ResetBody;

    impl Body for ResetBody {
        type Data = Bytes;
        type Error = std::io::Error;

        fn poll_frame(
            self: Pin<&mut Self>,
            _cx: &mut Context<'_>,
        ) -> Poll<Option<std::result::Result<Frame<Self::Data>, Self::Error>>> {
            Poll::Ready(Some(Err(std::io::Error::new(
                std::io::ErrorKind::ConnectionReset,
                "connection reset by peer",
            ))))
        }
    }

    /// Chunked body without a declared length that counts frames served
    struct ChunkedBody {
        remaining: usize,
        served: Arc<AtomicUsize>,
    }

    impl Body for ChunkedBody {
        type Data = Bytes;
        type Error = std::convert::Infallible;

        fn poll_frame(
            mut self: Pin<&mut Self>,
            _cx: &mut Context<'_>,
        ) -> Poll<Option<std::result::Result<Frame<Self::Data>, Self::Error>>> {
            if self.remaining == 0 {
                return Poll::Ready(None);
            }
            self.remaining -= 1;
            self.served.fetch_add(1, Ordering::SeqCst);
            Poll::Ready(Some(Ok(Frame::data(Bytes::from_static(b"abcd")))))
        }
    }

    #[test]
    fn test_new_strips_query() {
        let req = Request::new("GET", "/users/1?verbose=true");
        assert_eq!(req.path, "/users/1");
        assert!(req.body.is_empty());
        assert_eq!(req.content_type, None);
    }

    #[test]
    fn test_builders() {
        let req = Request::new("POST", "/users")
            .with_content_type("application/json")
            .with_body(r#"{"id":5}"#);
        assert_eq!(req.content_type.as_deref(), Some("application/json"));
        assert_eq!(&req.body[..], br#"{"id":5}"#);
    }

    #[test]
    fn test_from_hyper() {
        let hyper_req = hyper::Request::builder()
            .method("POST")
            .uri("/users/?x=1")
            .header("content-type", "application/json")
            .body(Full::new(Bytes::from_static(b"{}")))
            .unwrap();

        let req = tokio_test::block_on(Request::from_hyper_with_limit(hyper_req, 1024)).unwrap();
        assert_eq!(req.method, "POST");
        assert_eq!(req.path, "/users/");
        assert_eq!(req.content_type.as_deref(), Some("application/json"));
        assert_eq!(&req.body[..], b"{}");
    }

    #[test]
    fn test_from_hyper_too_large() {
        let hyper_req = hyper::Request::builder()
            .method("POST")
            .uri("/")
            .body(Full::new(Bytes::from_static(b"0123456789")))
            .unwrap();

        let err = tokio_test::block_on(Request::from_hyper_with_limit(hyper_req, 4)).unwrap_err();
        assert!(matches!(err, Error::PayloadTooLarge { limit: 4 }));
    }

    #[test]
    fn test_from_hyper_chunked_body_stops_at_limit() {
        let served = Arc::new(AtomicUsize::new(0));
        let hyper_req = hyper::Request::builder()
            .method("POST")
            .uri("/")
            .body(ChunkedBody {
                remaining: 1000,
                served: Arc::clone(&served),
            })
            .unwrap();

        let err = tokio_test::block_on(Request::from_hyper_with_limit(hyper_req, 10)).unwrap_err();
        assert!(matches!(err, Error::PayloadTooLarge { limit: 10 }));
        assert_eq!(err.status(), 413);
        // two 4-byte frames fit, the third crosses the limit
        assert_eq!(served.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_from_hyper_body_stream_error() {
        let hyper_req = hyper::Request::builder()
            .method("POST")
            .uri("/users/")
            .header("content-type", "application/json")
            .body(ResetBody)
            .unwrap();

        let err =
            tokio_test::block_on(Request::from_hyper_with_limit(hyper_req, 1024)).unwrap_err();
        assert!(matches!(err, Error::BodyRead { ref reason } if reason.contains("reset")));
        assert_eq!(err.status(), 400);
    }

    #[test]
    fn test_from_hyper_declared_length_too_large() {
        let hyper_req = hyper::Request::builder()
            .method("POST")
            .uri("/")
            .header("content-length", "100")
            .body(Full::new(Bytes::new()))
            .unwrap();

        let err = tokio_test::block_on(Request::from_hyper_with_limit(hyper_req, 10)).unwrap_err();
        assert!(matches!(err, Error::PayloadTooLarge { limit: 10 }));
    }
}
