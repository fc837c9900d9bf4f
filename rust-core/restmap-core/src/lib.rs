//! # restmap Core
//!
//! Minimal REST request dispatch: path templates, request mappings and a
//! JSON-only dispatcher, plus a small HTTP/1.1 transport to host them.
//!
//! ## Request flow
//!
//! A [`Request`] reaches [`Dispatcher::dispatch`], which checks the content
//! type, decodes the body, splits the path into segments and hands the
//! request to the first [`Route`] whose method and segment count fit. The
//! handler's [`Outcome`] becomes a [`Reply`] and then a [`Response`].
//!
//! ```ignore
//! use restmap_core::{created, get, post, Args, Dispatcher, Request};
//! use serde_json::{json, Value};
//!
//! let dispatcher = Dispatcher::mount("/users", vec![
//!     get("/{id}", |args: &Args| json!({ "id": args.get("id") })),
//!     post("/", |_: &Args, body: &Value| created(body.clone())),
//! ])?;
//! let response = dispatcher.dispatch(&Request::new("GET", "/users/1"));
//! assert_eq!(response.status, 200);
//! ```
//!
//! ## Modules
//!
//! - `template` - Path template parsing, path splitting and segment decoding
//! - `matcher` - Placeholder extraction
//! - `args` - Extracted path arguments
//! - `route` - Methods, handlers and the registration functions
//! - `reply` - Handler outcomes and status helpers
//! - `dispatcher` - Ordered route table and dispatch
//! - `request` / `response` - Transport boundary types
//! - `json` - JSON codec (simd-json parsing, serde_json output)
//! - `server` - HTTP server built on Hyper
//! - `error` - Error types and handling

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod args;
pub mod dispatcher;
pub mod error;
pub mod json;
pub mod matcher;
pub mod reply;
pub mod request;
pub mod response;
pub mod route;
pub mod server;
pub mod template;

pub use args::Args;
pub use dispatcher::Dispatcher;
pub use error::{Error, Result};
pub use json::{parse_body, parse_json_bytes, to_json};
pub use reply::{conflict, created, no_content, not_found, ok, payload, Outcome, Reply};
pub use request::Request;
pub use response::Response;
pub use route::{delete, get, patch, post, put, Handler, Method, Route};
pub use server::{Server, ServerConfig};
pub use template::{PathTemplate, Segment};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
