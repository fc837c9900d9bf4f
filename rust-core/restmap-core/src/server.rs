//! # HTTP Server
//!
//! HTTP/1.1 transport built on Hyper and Tokio. Each request is collected,
//! handed to a shared [`Dispatcher`] and the resulting response written
//! back.
//!
//! ## Key Features
//!
//! - One task per connection, keep-alive configurable
//! - Request body size limit (413)
//! - Handler panics answered with 500 instead of dropping the connection
//! - Graceful shutdown on Ctrl-C or a cancellation token

use crate::dispatcher::Dispatcher;
use crate::error::{Error, Result};
use crate::request::Request;
use crate::response::Response;
use http_body_util::Full;
use hyper::body::{Body, Bytes};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use std::convert::Infallible;
use std::io::ErrorKind;
use std::net::SocketAddr;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::{TcpListener, TcpSocket};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

/// Pause after an accept error that is not tied to a single connection
const ACCEPT_BACKOFF: Duration = Duration::from_millis(100);

/// HTTP Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind the server to
    pub address: SocketAddr,
    /// Enable keep-alive connections
    pub keep_alive: bool,
    /// Shutdown timeout for graceful shutdown (default: 30 seconds)
    pub shutdown_timeout: Duration,
    /// Max request body size in bytes
    pub max_body_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: ([127, 0, 0, 1], 8000).into(),
            keep_alive: true,
            shutdown_timeout: Duration::from_secs(30),
            max_body_size: 1024 * 1024,
        }
    }
}

/// HTTP server for one dispatcher
pub struct Server {
    config: ServerConfig,
    dispatcher: Arc<Dispatcher>,
    shutdown: CancellationToken,
}

impl Server {
    /// Create a server with the default configuration
    #[must_use]
    pub fn new(dispatcher: Dispatcher) -> Self {
        Self {
            config: ServerConfig::default(),
            dispatcher: Arc::new(dispatcher),
            shutdown: CancellationToken::new(),
        }
    }

    /// Replace the configuration
    #[must_use]
    pub fn with_config(mut self, config: ServerConfig) -> Self {
        self.config = config;
        self
    }

    /// Active configuration
    #[must_use]
    pub const fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Token that stops [`Server::serve`] when cancelled
    #[must_use]
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    /// Bind the configured address and serve until shutdown
    ///
    /// # Errors
    ///
    /// Returns `Error::BindError` if the address cannot be bound, or
    /// `Error::Io` if the socket cannot be created.
    pub async fn serve(&self) -> Result<()> {
        let addr = self.config.address;
        let bind_error = |source: std::io::Error| Error::BindError {
            address: addr.to_string(),
            source,
        };

        let socket = if addr.is_ipv4() {
            TcpSocket::new_v4()?
        } else {
            TcpSocket::new_v6()?
        };
        socket.set_reuseaddr(true)?;
        socket.bind(addr).map_err(bind_error)?;
        let listener = socket.listen(1024).map_err(bind_error)?;

        self.serve_on(listener).await
    }

    /// Serve connections from an already bound listener until shutdown
    ///
    /// Failed accepts are logged and the loop keeps going; only shutdown
    /// ends it.
    ///
    /// # Errors
    ///
    /// Returns `Error::Io` if the listener's local address is unavailable.
    pub async fn serve_on(&self, listener: TcpListener) -> Result<()> {
        info!(
            "Server listening on http://{} (base path {})",
            listener.local_addr()?,
            self.dispatcher.base_path()
        );

        let active = Arc::new(AtomicUsize::new(0));
        let max_body_size = self.config.max_body_size;
        let keep_alive = self.config.keep_alive;

        let shutdown = shutdown_signal(self.shutdown.clone());
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                accept_result = listener.accept() => {
                    let (stream, remote_addr) = match accept_result {
                        Ok(stream_and_addr) => stream_and_addr,
                        Err(err) => {
                            error!("Failed to accept connection: {}", err);
                            if let Some(pause) = accept_backoff(&err) {
                                tokio::time::sleep(pause).await;
                            }
                            continue;
                        }
                    };
                    let io = TokioIo::new(stream);

                    let dispatcher = Arc::clone(&self.dispatcher);
                    let active = Arc::clone(&active);
                    active.fetch_add(1, Ordering::Relaxed);

                    tokio::task::spawn(async move {
                        let service = service_fn(move |req: hyper::Request<hyper::body::Incoming>| {
                            let dispatcher = Arc::clone(&dispatcher);
                            async move {
                                let method = req.method().clone();
                                let path = req.uri().path().to_string();
                                let version = req.version();

                                let response = handle_request(req, &dispatcher, max_body_size).await;
                                info!(
                                    "    {} - \"{} {} {:?}\" {}",
                                    remote_addr,
                                    method,
                                    path,
                                    version,
                                    response.status()
                                );
                                Ok::<_, Infallible>(response)
                            }
                        });

                        if let Err(err) = http1::Builder::new()
                            .keep_alive(keep_alive)
                            .serve_connection(io, service)
                            .await
                        {
                            error!("Error serving connection: {:?}", err);
                        }
                        active.fetch_sub(1, Ordering::Relaxed);
                    });
                }
                () = &mut shutdown => {
                    info!("Shutdown signal received, stopping server...");
                    break;
                }
            }
        }

        let drain = async {
            while active.load(Ordering::Relaxed) > 0 {
                tokio::time::sleep(Duration::from_millis(50)).await;
            }
        };
        if tokio::time::timeout(self.config.shutdown_timeout, drain)
            .await
            .is_err()
        {
            warn!(
                "Shutdown timeout elapsed with {} connection(s) still open",
                active.load(Ordering::Relaxed)
            );
        }
        Ok(())
    }
}

/// Delay before the next accept, `None` when only one connection failed
///
/// Anything else (out of file descriptors, out of buffers) tends to repeat
/// immediately, so the loop pauses instead of spinning.
fn accept_backoff(err: &std::io::Error) -> Option<Duration> {
    match err.kind() {
        ErrorKind::ConnectionAborted | ErrorKind::ConnectionReset | ErrorKind::Interrupted => {
            None
        }
        _ => Some(ACCEPT_BACKOFF),
    }
}

/// Resolve when Ctrl-C arrives or `token` is cancelled
async fn shutdown_signal(token: CancellationToken) {
    tokio::select! {
        result = tokio::signal::ctrl_c() => {
            if let Err(err) = result {
                error!("Failed to install Ctrl-C handler: {}", err);
                token.cancelled().await;
            }
        }
        () = token.cancelled() => {}
    }
}

/// Collect, dispatch and convert one hyper request
///
/// Never fails: oversized bodies answer 413, a body stream that breaks
/// off answers 400 and a panicking handler answers 500.
pub async fn handle_request<B>(
    req: hyper::Request<B>,
    dispatcher: &Dispatcher,
    max_body_size: usize,
) -> hyper::Response<Full<Bytes>>
where
    B: Body,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let request = match Request::from_hyper_with_limit(req, max_body_size).await {
        Ok(r) => r,
        Err(err) => {
            warn!("Failed to read request: {}", err);
            return Response::status_only(err.status()).into_hyper();
        }
    };

    let response = catch_unwind(AssertUnwindSafe(|| dispatcher.dispatch(&request)))
        .unwrap_or_else(|payload| {
            let msg = payload
                .downcast_ref::<&str>()
                .map(ToString::to_string)
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "Unknown panic".to_string());
            error!(
                "Handler panicked on {} {}: {}",
                request.method, request.path, msg
            );
            Response::status_only(500)
        });

    response.into_hyper()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::args::Args;
    use crate::route::{get, post};
    use http_body_util::BodyExt;
    use serde_json::{json, Value};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    fn dispatcher() -> Dispatcher {
        Dispatcher::mount(
            "/users",
            vec![
                get("/{id}", |args: &Args| {
                    if args.get("id") == Some("boom") {
                        panic!("handler exploded");
                    }
                    json!({ "id": args.get("id") })
                }),
                post("/", |_: &Args, body: &Value| body.clone()),
            ],
        )
        .unwrap()
    }

    fn body_text(resp: hyper::Response<Full<Bytes>>) -> String {
        let bytes = tokio_test::block_on(resp.into_body().collect())
            .unwrap()
            .to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[test]
    fn test_server_config_default() {
        let config = ServerConfig::default();
        assert_eq!(config.address.port(), 8000);
        assert!(config.keep_alive);
        assert_eq!(config.max_body_size, 1024 * 1024);
    }

    #[test]
    fn test_server_with_config() {
        let server = Server::new(dispatcher()).with_config(ServerConfig {
            address: ([0, 0, 0, 0], 9000).into(),
            max_body_size: 16,
            ..ServerConfig::default()
        });
        assert_eq!(server.config().address.port(), 9000);
        assert_eq!(server.config().max_body_size, 16);
    }

    #[test]
    fn test_accept_backoff() {
        let aborted = std::io::Error::from(ErrorKind::ConnectionAborted);
        assert_eq!(accept_backoff(&aborted), None);

        // EMFILE surfaces as an uncategorized OS error
        let exhausted = std::io::Error::from_raw_os_error(24);
        assert_eq!(accept_backoff(&exhausted), Some(ACCEPT_BACKOFF));
        let out_of_memory = std::io::Error::from(ErrorKind::OutOfMemory);
        assert_eq!(accept_backoff(&out_of_memory), Some(ACCEPT_BACKOFF));
    }

    #[test]
    fn test_handle_request_ok() {
        let req = hyper::Request::builder()
            .method("GET")
            .uri("/users/7")
            .body(Full::new(Bytes::new()))
            .unwrap();
        let resp = tokio_test::block_on(handle_request(req, &dispatcher(), 1024));
        assert_eq!(resp.status(), 200);
        assert_eq!(resp.headers()["content-type"], "application/json");
        assert_eq!(body_text(resp), r#"{"id":"7"}"#);
    }

    #[test]
    fn test_handle_request_payload_too_large() {
        let req = hyper::Request::builder()
            .method("POST")
            .uri("/users/")
            .header("content-type", "application/json")
            .body(Full::new(Bytes::from_static(br#"{"id": 123456}"#)))
            .unwrap();
        let resp = tokio_test::block_on(handle_request(req, &dispatcher(), 4));
        assert_eq!(resp.status(), 413);
        assert_eq!(body_text(resp), "");
    }

    #[test]
    fn test_handle_request_panic_is_500() {
        let req = hyper::Request::builder()
            .method("GET")
            .uri("/users/boom")
            .body(Full::new(Bytes::new()))
            .unwrap();
        let resp = tokio_test::block_on(handle_request(req, &dispatcher(), 1024));
        assert_eq!(resp.status(), 500);
    }

    #[tokio::test]
    async fn test_serve_on_round_trip() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = Server::new(dispatcher());
        let token = server.shutdown_token();
        let handle = tokio::spawn(async move { server.serve_on(listener).await });

        let mut stream = tokio::net::TcpStream::connect(addr).await.unwrap();
        stream
            .write_all(b"GET /users/1 HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n")
            .await
            .unwrap();
        let mut raw = Vec::new();
        stream.read_to_end(&mut raw).await.unwrap();
        let text = String::from_utf8(raw).unwrap();

        assert!(text.starts_with("HTTP/1.1 200 OK"));
        assert!(text.contains("cache-control: no-cache, must-revalidate"));
        assert!(text.ends_with(r#"{"id":"1"}"#));

        token.cancel();
        handle.await.unwrap().unwrap();
    }
}
