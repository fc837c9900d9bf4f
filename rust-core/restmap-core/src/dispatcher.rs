//! # Dispatcher
//!
//! Holds the registered routes in order and turns one [`Request`] into one
//! [`Response`]. The first route whose method and segment count fit the
//! request handles it; registration order is the only precedence rule.
//!
//! Only `application/json` requests are routed. GET requests carry no body
//! and are always treated as JSON.

use crate::error::{Error, Result};
use crate::json::parse_body;
use crate::request::Request;
use crate::response::{Response, APPLICATION_JSON};
use crate::route::{Method, Route};
use crate::template::{decode_segment, split_path};
use std::borrow::Cow;
use tracing::{debug, error, warn};

/// Ordered, immutable route table
///
/// Share it between transport tasks with `Arc<Dispatcher>`.
#[derive(Debug)]
pub struct Dispatcher {
    base: Vec<String>,
    routes: Vec<Route>,
}

impl Dispatcher {
    /// Register routes at the root path
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidRoutePattern` if a template contains a literal
    /// segment or repeats a placeholder name.
    pub fn new(routes: Vec<Route>) -> Result<Self> {
        Self::mount("/", routes)
    }

    /// Register routes below `base`
    ///
    /// Request paths must start with the segments of `base`; those segments
    /// are removed before matching. A resource at `/users` registers `/{id}`
    /// and answers `GET /users/1`.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidRoutePattern` if a template contains a literal
    /// segment or repeats a placeholder name.
    pub fn mount(base: &str, routes: Vec<Route>) -> Result<Self> {
        for route in &routes {
            validate(route)?;
        }

        Ok(Self {
            base: split_path(base).into_iter().map(String::from).collect(),
            routes,
        })
    }

    /// Registered routes in precedence order
    #[must_use]
    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    /// Base path the routes are mounted under
    #[must_use]
    pub fn base_path(&self) -> String {
        format!("/{}", self.base.join("/"))
    }

    /// Handle one request
    ///
    /// Failures become bare status responses: 415 for a non-JSON content
    /// type, 400 for a malformed body, 404 when no route matches and 500 for
    /// internal errors.
    #[must_use]
    pub fn dispatch(&self, req: &Request) -> Response {
        match self.try_dispatch(req) {
            Ok(response) => response,
            Err(err) => {
                match &err {
                    Error::RouteNotFound { .. } => debug!("{err}"),
                    Error::UnsupportedContentType { .. } | Error::MalformedBody { .. } => {
                        warn!("Rejected {} {}: {err}", req.method, req.path);
                    }
                    _ => error!("Failed to handle {} {}: {err}", req.method, req.path),
                }
                Response::status_only(err.status())
            }
        }
    }

    /// Handle one request, reporting failures as errors
    ///
    /// # Errors
    ///
    /// - `Error::UnsupportedContentType` if a non-GET request is not JSON
    /// - `Error::MalformedBody` if the body is not valid JSON
    /// - `Error::RouteNotFound` if no route accepts the method and path
    /// - `Error::ExtractionMismatch` or `Error::Json` on internal failures
    pub fn try_dispatch(&self, req: &Request) -> Result<Response> {
        let content_type = effective_content_type(req);
        if content_type != APPLICATION_JSON {
            return Err(Error::UnsupportedContentType {
                content_type: content_type.to_string(),
            });
        }

        let body = parse_body(&req.body)?;
        let not_found = || Error::RouteNotFound {
            method: req.method.clone(),
            path: req.path.clone(),
        };

        let method = Method::from_token(&req.method).ok_or_else(not_found)?;
        let decoded: Vec<Cow<'_, str>> = self
            .relative_segments(&req.path)
            .ok_or_else(not_found)?
            .into_iter()
            .map(decode_segment)
            .collect();
        let segments: Vec<&str> = decoded.iter().map(AsRef::<str>::as_ref).collect();

        let route = self
            .routes
            .iter()
            .find(|route| route.is_supported(method, &segments))
            .ok_or_else(not_found)?;

        debug!(
            "{} {} -> {} {}",
            req.method,
            req.path,
            route.method(),
            route.template()
        );

        let reply = route.handle(&segments, &body)?;
        Response::from_reply(&reply)
    }

    fn relative_segments<'a>(&self, path: &'a str) -> Option<Vec<&'a str>> {
        let segments = split_path(path);
        if segments.len() < self.base.len()
            || self.base.iter().zip(&segments).any(|(b, s)| b != s)
        {
            return None;
        }
        Some(segments[self.base.len()..].to_vec())
    }
}

/// GET is always JSON; other methods use the header, or "" without one
fn effective_content_type(req: &Request) -> &str {
    if req.method == "GET" {
        APPLICATION_JSON
    } else {
        req.content_type.as_deref().unwrap_or_default()
    }
}

fn validate(route: &Route) -> Result<()> {
    let template = route.template();
    if let Some(literal) = template.segments().iter().find(|s| s.is_literal()) {
        return Err(Error::InvalidRoutePattern {
            pattern: template.pattern().to_string(),
            reason: format!(
                "literal segment '{literal}' cannot bind a value; mount the resource under a base path instead"
            ),
        });
    }
    if let Some(name) = template.duplicate_placeholder() {
        return Err(Error::InvalidRoutePattern {
            pattern: template.pattern().to_string(),
            reason: format!("placeholder '{name}' appears more than once"),
        });
    }
    Ok(())
}
