//! # Request Mappings
//!
//! A route pairs an HTTP method and a path template with a handler.
//! Routes are built with the [`get`], [`post`], [`put`], [`patch`] and
//! [`delete`] functions and never change after registration.

use crate::args::Args;
use crate::error::{Error, Result};
use crate::matcher::extract;
use crate::reply::{Outcome, Reply};
use crate::template::PathTemplate;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// HTTP methods a route can be registered for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    /// HTTP GET
    Get,
    /// HTTP POST
    Post,
    /// HTTP PUT
    Put,
    /// HTTP PATCH
    Patch,
    /// HTTP DELETE
    Delete,
}

impl Method {
    /// Parse a request method token
    ///
    /// Tokens are case-sensitive, as in HTTP. Anything outside the five
    /// supported methods yields `None`.
    #[must_use]
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "GET" => Some(Self::Get),
            "POST" => Some(Self::Post),
            "PUT" => Some(Self::Put),
            "PATCH" => Some(Self::Patch),
            "DELETE" => Some(Self::Delete),
            _ => None,
        }
    }

    /// Method token as sent on the wire
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
        }
    }

    /// Status answered when a handler returns a bare payload
    #[must_use]
    pub const fn default_status(self) -> u16 {
        match self {
            Self::Post => 201,
            Self::Get | Self::Put | Self::Patch | Self::Delete => 200,
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

type ArgsFn = dyn Fn(&Args) -> Outcome + Send + Sync;
type ArgsBodyFn = dyn Fn(&Args, &Value) -> Outcome + Send + Sync;

/// Handler shape, chosen by the registration function
#[derive(Clone)]
pub enum Handler {
    /// Called with path arguments only
    WithoutBody(Arc<ArgsFn>),
    /// Called with path arguments and the decoded request body
    WithBody(Arc<ArgsBodyFn>),
}

impl Handler {
    fn call(&self, args: &Args, body: &Value) -> Outcome {
        match self {
            Self::WithoutBody(f) => f(args),
            Self::WithBody(f) => f(args, body),
        }
    }
}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WithoutBody(_) => f.write_str("Handler::WithoutBody"),
            Self::WithBody(_) => f.write_str("Handler::WithBody"),
        }
    }
}

/// A registered (method, template, handler) triple
#[derive(Debug, Clone)]
pub struct Route {
    method: Method,
    template: PathTemplate,
    handler: Handler,
    default_status: u16,
}

impl Route {
    /// Create a route for `method` on `path`
    ///
    /// The default success status is taken from the method.
    #[must_use]
    pub fn new(method: Method, path: &str, handler: Handler) -> Self {
        Self {
            method,
            template: PathTemplate::parse(path),
            handler,
            default_status: method.default_status(),
        }
    }

    /// Override the status used for bare payloads
    #[must_use]
    pub const fn with_default_status(mut self, status: u16) -> Self {
        self.default_status = status;
        self
    }

    /// Registered method
    #[must_use]
    pub const fn method(&self) -> Method {
        self.method
    }

    /// Parsed path template
    #[must_use]
    pub const fn template(&self) -> &PathTemplate {
        &self.template
    }

    /// Status used for bare payloads
    #[must_use]
    pub const fn default_status(&self) -> u16 {
        self.default_status
    }

    /// Check if the handler receives the request body
    #[must_use]
    pub const fn accepts_body(&self) -> bool {
        matches!(self.handler, Handler::WithBody(_))
    }

    /// Check if this route takes the request
    ///
    /// Only the method and the number of segments are compared; segment
    /// text is not looked at.
    #[must_use]
    pub fn is_supported(&self, method: Method, segments: &[&str]) -> bool {
        self.method == method && self.template.len() == segments.len()
    }

    /// Extract arguments and run the handler
    ///
    /// # Errors
    ///
    /// Returns `Error::ExtractionMismatch` if the template cannot bind the
    /// segments. Dispatch only calls this after [`Route::is_supported`] on a
    /// validated route, so this signals a programming error.
    pub fn handle(&self, segments: &[&str], body: &Value) -> Result<Reply> {
        let args = extract(&self.template, segments).ok_or_else(|| Error::ExtractionMismatch {
            pattern: self.template.pattern().to_string(),
        })?;

        Ok(self
            .handler
            .call(&args, body)
            .into_reply(self.default_status))
    }
}

/// Register a GET handler; it receives path arguments only
pub fn get<F, O>(path: &str, handler: F) -> Route
where
    F: Fn(&Args) -> O + Send + Sync + 'static,
    O: Into<Outcome>,
{
    Route::new(Method::Get, path, without_body(handler))
}

/// Register a DELETE handler; it receives path arguments only
pub fn delete<F, O>(path: &str, handler: F) -> Route
where
    F: Fn(&Args) -> O + Send + Sync + 'static,
    O: Into<Outcome>,
{
    Route::new(Method::Delete, path, without_body(handler))
}

/// Register a POST handler; it receives path arguments and the body
pub fn post<F, O>(path: &str, handler: F) -> Route
where
    F: Fn(&Args, &Value) -> O + Send + Sync + 'static,
    O: Into<Outcome>,
{
    Route::new(Method::Post, path, with_body(handler))
}

/// Register a PUT handler; it receives path arguments and the body
pub fn put<F, O>(path: &str, handler: F) -> Route
where
    F: Fn(&Args, &Value) -> O + Send + Sync + 'static,
    O: Into<Outcome>,
{
    Route::new(Method::Put, path, with_body(handler))
}

/// Register a PATCH handler; it receives path arguments and the body
pub fn patch<F, O>(path: &str, handler: F) -> Route
where
    F: Fn(&Args, &Value) -> O + Send + Sync + 'static,
    O: Into<Outcome>,
{
    Route::new(Method::Patch, path, with_body(handler))
}

fn without_body<F, O>(handler: F) -> Handler
where
    F: Fn(&Args) -> O + Send + Sync + 'static,
    O: Into<Outcome>,
{
    Handler::WithoutBody(Arc::new(move |args: &Args| -> Outcome { handler(args).into() }))
}

fn with_body<F, O>(handler: F) -> Handler
where
    F: Fn(&Args, &Value) -> O + Send + Sync + 'static,
    O: Into<Outcome>,
{
    Handler::WithBody(Arc::new(move |args: &Args, body: &Value| -> Outcome {
        handler(args, body).into()
    }))
}
