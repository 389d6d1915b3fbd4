//! Per-mount router state shared by the HTTP handlers of one record type.

use crate::engine::RegisteredType;
use crate::routes::Endpoints;
use std::sync::Arc;

pub struct EndpointState<T> {
    pub engine: Arc<RegisteredType<T>>,
    /// Mount prefix, used in session labels.
    pub path: Arc<str>,
    pub endpoints: Endpoints,
}

// Manual impl: `T` itself need not be Clone.
impl<T> Clone for EndpointState<T> {
    fn clone(&self) -> Self {
        EndpointState {
            engine: Arc::clone(&self.engine),
            path: Arc::clone(&self.path),
            endpoints: self.endpoints,
        }
    }
}

impl<T> EndpointState<T> {
    pub fn new(engine: Arc<RegisteredType<T>>, path: &str, endpoints: Endpoints) -> Self {
        EndpointState {
            engine,
            path: Arc::from(path),
            endpoints,
        }
    }
}
