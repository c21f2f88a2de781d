mod graphql;
mod health;

use axum::routing::get;
use engine::Engine;
use gateway_config::Config;
use tower_http::cors::CorsLayer;

use crate::state::ServerState;

/// The routes of the gateway: GraphiQL on GET and operations on POST at the graph path,
/// plus the health check unless disabled.
pub fn router(config: &Config, engine: Engine) -> axum::Router {
    let path = config.graph.path();
    let state = ServerState::new(engine, path.to_string());

    let mut router = axum::Router::new().route(path, get(graphql::explorer).post(graphql::execute));

    if config.health.enabled {
        router = router.route(&config.health.path, get(health::health));
    }

    router.layer(CorsLayer::permissive()).with_state(state)
}
