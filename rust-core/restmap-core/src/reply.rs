//! # Handler Replies
//!
//! What a handler hands back to the dispatcher: either a bare payload that
//! takes the route's default status, or a [`Reply`] with an explicit one.

use serde::Serialize;
use serde_json::Value;
use tracing::error;

/// Payload and status code produced for one request
#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    /// JSON body, or `None` for a status-only response
    pub payload: Option<Value>,
    /// HTTP status code
    pub status: u16,
}

impl Reply {
    /// Create a reply with an explicit status
    #[must_use]
    pub const fn new(payload: Option<Value>, status: u16) -> Self {
        Self { payload, status }
    }

    /// Attach a JSON body
    #[must_use]
    pub fn with_payload(mut self, payload: impl Into<Value>) -> Self {
        self.payload = Some(payload.into());
        self
    }
}

/// 200 OK with a body
pub fn ok(payload: impl Into<Value>) -> Reply {
    Reply::new(Some(payload.into()), 200)
}

/// 201 Created with a body
pub fn created(payload: impl Into<Value>) -> Reply {
    Reply::new(Some(payload.into()), 201)
}

/// 404 Not Found, no body
#[must_use]
pub const fn not_found() -> Reply {
    Reply::new(None, 404)
}

/// 409 Conflict, no body
#[must_use]
pub const fn conflict() -> Reply {
    Reply::new(None, 409)
}

/// 204 No Content
#[must_use]
pub const fn no_content() -> Reply {
    Reply::new(None, 204)
}

/// Bare payload from any serializable value
///
/// A value that cannot be represented as JSON answers 500 without a body.
pub fn payload<T: Serialize>(value: &T) -> Outcome {
    match serde_json::to_value(value) {
        Ok(value) => Outcome::Payload(value),
        Err(err) => {
            error!("Failed to serialize payload: {err}");
            Outcome::Explicit(Reply::new(None, 500))
        }
    }
}

/// Handler return value
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Bare payload; status comes from the route
    Payload(Value),
    /// Pre-built reply; status is used as is
    Explicit(Reply),
}

impl Outcome {
    /// Resolve against a route's default success status
    ///
    /// A bare `null` payload means "nothing found" and becomes a 404 without
    /// a body.
    #[must_use]
    pub fn into_reply(self, default_status: u16) -> Reply {
        match self {
            Self::Payload(Value::Null) => not_found(),
            Self::Payload(payload) => Reply::new(Some(payload), default_status),
            Self::Explicit(reply) => reply,
        }
    }
}

impl From<Value> for Outcome {
    fn from(value: Value) -> Self {
        Self::Payload(value)
    }
}

impl From<Option<Value>> for Outcome {
    fn from(value: Option<Value>) -> Self {
        Self::Payload(value.unwrap_or(Value::Null))
    }
}

impl From<Reply> for Outcome {
    fn from(reply: Reply) -> Self {
        Self::Explicit(reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_helpers() {
        assert_eq!(ok(json!({"a": 1})).status, 200);
        assert_eq!(created(json!({"id": 5})).payload, Some(json!({"id": 5})));
        assert_eq!(created(json!({"id": 5})).status, 201);
        assert_eq!(not_found(), Reply::new(None, 404));
        assert_eq!(conflict(), Reply::new(None, 409));
        assert_eq!(no_content(), Reply::new(None, 204));
    }

    #[test]
    fn test_with_payload() {
        let reply = conflict().with_payload(json!({"error": "exists"}));
        assert_eq!(reply.status, 409);
        assert_eq!(reply.payload, Some(json!({"error": "exists"})));
    }

    #[test]
    fn test_payload_takes_default_status() {
        let reply = Outcome::from(json!([1, 2])).into_reply(201);
        assert_eq!(reply, Reply::new(Some(json!([1, 2])), 201));
    }

    #[test]
    fn test_null_payload_is_not_found() {
        assert_eq!(Outcome::from(Value::Null).into_reply(200), not_found());
        assert_eq!(Outcome::from(None::<Value>).into_reply(200), not_found());
    }

    #[test]
    fn test_payload_from_serialize() {
        #[derive(Serialize)]
        struct User {
            id: u64,
            name: &'static str,
        }

        let outcome = payload(&User { id: 1, name: "John Doe" });
        assert_eq!(outcome, Outcome::Payload(json!({"id": 1, "name": "John Doe"})));
        assert_eq!(payload(&None::<User>).into_reply(200), not_found());
    }

    #[test]
    fn test_payload_unrepresentable_is_500() {
        use std::collections::HashMap;

        let map: HashMap<(u8, u8), u8> = HashMap::from([((1, 2), 3)]);
        assert_eq!(payload(&map).into_reply(200), Reply::new(None, 500));
    }

    #[test]
    fn test_explicit_wins() {
        let reply = Outcome::from(ok(json!("x"))).into_reply(201);
        assert_eq!(reply.status, 200);
    }
}
