use std::sync::Arc;

use engine::Engine;

struct ServerStateInner {
    engine: Engine,
    graph_path: String,
}

#[derive(Clone)]
pub(crate) struct ServerState {
    inner: Arc<ServerStateInner>,
}

impl ServerState {
    pub(crate) fn new(engine: Engine, graph_path: String) -> Self {
        Self {
            inner: Arc::new(ServerStateInner { engine, graph_path }),
        }
    }

    pub(crate) fn engine(&self) -> &Engine {
        &self.inner.engine
    }

    pub(crate) fn graph_path(&self) -> &str {
        &self.inner.graph_path
    }
}
