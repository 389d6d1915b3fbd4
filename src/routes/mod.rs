//! Routers mounting one record type's operations under a prefix.

mod common;

pub use common::common_routes;

use crate::engine::RegisteredType;
use crate::handlers::{path, query};
use crate::record::Record;
use crate::state::EndpointState;
use axum::routing::MethodRouter;
use axum::Router;
use std::ops::BitOr;
use std::sync::Arc;

/// Set of operations to mount.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Endpoints(u8);

impl Endpoints {
    pub const NONE: Endpoints = Endpoints(0);
    /// POST
    pub const CREATE: Endpoints = Endpoints(1);
    /// GET with an id
    pub const READ: Endpoints = Endpoints(2);
    /// GET without an id (`?page=&limit=` optional)
    pub const LIST: Endpoints = Endpoints(4);
    /// PUT
    pub const UPDATE: Endpoints = Endpoints(8);
    /// DELETE
    pub const DELETE: Endpoints = Endpoints(16);
    pub const ALL: Endpoints = Endpoints(31);

    pub const fn contains(self, other: Endpoints) -> bool {
        self.0 & other.0 == other.0
    }

    pub const fn intersects(self, other: Endpoints) -> bool {
        self.0 & other.0 != 0
    }
}

impl BitOr for Endpoints {
    type Output = Endpoints;

    fn bitor(self, rhs: Endpoints) -> Endpoints {
        Endpoints(self.0 | rhs.0)
    }
}

/// `/notes/` and `notes` both become `/notes`; the root stays empty.
fn normalize(prefix: &str) -> String {
    let trimmed = prefix.trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("/{}", trimmed)
    }
}

/// Mount `endpoints` at `prefix` with the id in the path:
/// `POST P`, `GET P`, `GET P/{id}`, `PUT P/{id}`, `DELETE P/{id}`.
pub fn path_routes<T: Record>(engine: Arc<RegisteredType<T>>, endpoints: Endpoints, prefix: &str) -> Router {
    let prefix = normalize(prefix);
    let state = EndpointState::new(engine, &prefix, endpoints);

    let mut collection: MethodRouter<EndpointState<T>> = MethodRouter::new();
    if endpoints.contains(Endpoints::CREATE) {
        collection = collection.post(path::create::<T>);
    }
    if endpoints.contains(Endpoints::LIST) {
        collection = collection.get(path::list::<T>);
    }

    let mut item: MethodRouter<EndpointState<T>> = MethodRouter::new();
    if endpoints.contains(Endpoints::READ) {
        item = item.get(path::read::<T>);
    }
    if endpoints.contains(Endpoints::UPDATE) {
        item = item.put(path::update::<T>);
    }
    if endpoints.contains(Endpoints::DELETE) {
        item = item.delete(path::delete::<T>);
    }

    let mut router = Router::new();
    if endpoints.intersects(Endpoints::CREATE | Endpoints::LIST) {
        let collection_path = if prefix.is_empty() { "/" } else { prefix.as_str() };
        router = router.route(collection_path, collection);
    }
    if endpoints.intersects(Endpoints::READ | Endpoints::UPDATE | Endpoints::DELETE) {
        router = router.route(&format!("{}/:id", prefix), item);
    }
    router.with_state(state)
}

/// Mount `endpoints` at `prefix` on a single path with the id as `?id=`.
pub fn query_routes<T: Record>(engine: Arc<RegisteredType<T>>, endpoints: Endpoints, prefix: &str) -> Router {
    let prefix = normalize(prefix);
    let state = EndpointState::new(engine, &prefix, endpoints);

    let mut methods: MethodRouter<EndpointState<T>> = MethodRouter::new();
    if endpoints.contains(Endpoints::CREATE) {
        methods = methods.post(query::create::<T>);
    }
    if endpoints.intersects(Endpoints::READ | Endpoints::LIST) {
        methods = methods.get(query::get::<T>);
    }
    if endpoints.contains(Endpoints::UPDATE) {
        methods = methods.put(query::update::<T>);
    }
    if endpoints.contains(Endpoints::DELETE) {
        methods = methods.delete(query::delete::<T>);
    }

    let mut router = Router::new();
    if endpoints != Endpoints::NONE {
        let path = if prefix.is_empty() { "/" } else { prefix.as_str() };
        router = router.route(path, methods);
    }
    router.with_state(state)
}
