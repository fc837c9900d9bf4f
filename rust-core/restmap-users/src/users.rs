//! In-memory users resource.

use restmap_core::{
    conflict, created, delete, get, no_content, not_found, payload, post, Args, Reply, Route,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};
use tracing::info;

/// A stored user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Unique id, also the path argument
    pub id: u64,
    /// Display name
    #[serde(default)]
    pub name: String,
    /// Age in years
    #[serde(default)]
    pub age: u32,
}

/// Shared user table
#[derive(Debug, Clone, Default)]
pub struct UserStore {
    users: Arc<RwLock<BTreeMap<u64, User>>>,
}

impl UserStore {
    /// Store seeded with the two sample users
    #[must_use]
    pub fn seeded() -> Self {
        let store = Self::default();
        store.insert(User {
            id: 1,
            name: "John Doe".to_string(),
            age: 21,
        });
        store.insert(User {
            id: 2,
            name: "Jane Doe".to_string(),
            age: 23,
        });
        store
    }

    /// Look up a user by id
    #[must_use]
    pub fn find(&self, id: u64) -> Option<User> {
        self.read().get(&id).cloned()
    }

    /// All users ordered by id
    #[must_use]
    pub fn all(&self) -> Vec<User> {
        self.read().values().cloned().collect()
    }

    /// Insert a user unless the id is taken
    ///
    /// Returns `false` if a user with the same id already exists.
    pub fn insert(&self, user: User) -> bool {
        let mut users = self.write();
        if users.contains_key(&user.id) {
            return false;
        }
        users.insert(user.id, user);
        true
    }

    /// Remove a user, returning it if it existed
    pub fn remove(&self, id: u64) -> Option<User> {
        self.write().remove(&id)
    }

    // A poisoned lock only means another handler panicked mid-request;
    // the map itself is still consistent.
    fn read(&self) -> std::sync::RwLockReadGuard<'_, BTreeMap<u64, User>> {
        self.users.read().unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, BTreeMap<u64, User>> {
        self.users.write().unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

/// Routes for the users resource, relative to its base path
pub fn routes(store: &UserStore) -> Vec<Route> {
    let by_id = store.clone();
    let listing = store.clone();
    let adding = store.clone();
    let removing = store.clone();

    vec![
        get("/{id}", move |args: &Args| {
            payload(&args.parse::<u64>("id").and_then(|id| by_id.find(id)))
        }),
        get("/", move |_: &Args| payload(&listing.all())),
        post("/", move |_: &Args, body: &Value| add_user(&adding, body)),
        delete("/{id}", move |args: &Args| {
            match args.parse::<u64>("id").and_then(|id| removing.remove(id)) {
                Some(user) => {
                    info!("Removed user {}", user.id);
                    no_content()
                }
                None => not_found(),
            }
        }),
    ]
}

fn add_user(store: &UserStore, body: &Value) -> Reply {
    let user: User = match serde_json::from_value(body.clone()) {
        Ok(user) => user,
        Err(err) => {
            return Reply::new(Some(json!({ "error": err.to_string() })), 400);
        }
    };

    let id = user.id;
    if store.insert(user) {
        info!("Added user {}", id);
        created(json!({ "id": id }))
    } else {
        conflict().with_payload(json!({ "error": format!("user {id} already exists") }))
    }
}
