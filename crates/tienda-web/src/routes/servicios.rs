use axum::{extract::State, http::HeaderMap, response::Response};
use serde_json::{json, Map};

use crate::{render, state::AppState};

pub async fn listar(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let (token, session) = state.sessions.resolve(&headers);

    let servicios = state.catalog.servicios();
    let mut data = Map::new();
    data.insert("titulo".to_string(), json!("Nuestros Servicios"));
    data.insert(
        "servicios".to_string(),
        serde_json::to_value(&servicios).unwrap_or_else(|_| json!([])),
    );

    render::page(&state, &session, &token, "servicios", data)
}
