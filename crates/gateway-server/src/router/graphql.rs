use async_graphql::http::GraphiQLSource;
use axum::{
    extract::{rejection::JsonRejection, State},
    response::{Html, IntoResponse, Response},
    Json,
};
use http::{HeaderMap, HeaderValue, StatusCode};

use crate::state::ServerState;

/// Session token of the document store. Clients send back the last one they received to
/// read their own writes.
pub(super) const SESSION_TOKEN_HEADER: &str = "x-session-token";

/// Request units consumed by the operation.
pub(super) const REQUEST_CHARGE_HEADER: &str = "x-request-charge";

pub(super) async fn explorer(State(state): State<ServerState>) -> impl IntoResponse {
    Html(GraphiQLSource::build().endpoint(state.graph_path()).finish())
}

pub(super) async fn execute(
    State(state): State<ServerState>,
    headers: HeaderMap,
    request: Result<Json<async_graphql::Request>, JsonRejection>,
) -> Response {
    let request = match request {
        Ok(Json(request)) => request,
        Err(rejection) => {
            tracing::debug!("rejected request body: {rejection}");

            let body = serde_json::json!({
                "data": null,
                "errors": [{ "message": rejection.body_text() }],
            });

            return (StatusCode::BAD_REQUEST, Json(body)).into_response();
        }
    };

    let session_token = headers
        .get(SESSION_TOKEN_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);

    let response = state.engine().execute(request, session_token).await;

    let mut headers = HeaderMap::new();

    if let Ok(value) = HeaderValue::from_str(&response.metadata.request_charge.to_string()) {
        headers.insert(REQUEST_CHARGE_HEADER, value);
    }

    if let Some(value) = response
        .metadata
        .session_token
        .as_deref()
        .and_then(|token| HeaderValue::from_str(token).ok())
    {
        headers.insert(SESSION_TOKEN_HEADER, value);
    }

    (response.status, headers, Json(response.body)).into_response()
}
