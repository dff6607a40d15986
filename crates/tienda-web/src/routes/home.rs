use axum::{extract::State, http::HeaderMap, http::StatusCode, response::Response};
use serde_json::{json, Map};

use crate::{render, routes::productos::productos_json, state::AppState};

pub async fn index(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let (token, session) = state.sessions.resolve(&headers);

    let productos = state.catalog.productos_destacados(5);
    let servicios = state.catalog.servicios_destacados(3);

    let mut data = Map::new();
    data.insert(
        "titulo".to_string(),
        json!("Inicio - Soluciones Tecnológicas Pradito"),
    );
    data.insert("productos".to_string(), productos_json(&productos));
    data.insert(
        "servicios".to_string(),
        serde_json::to_value(&servicios).unwrap_or_else(|_| json!([])),
    );

    render::page(&state, &session, &token, "index", data)
}

pub async fn quienes_somos(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let (token, session) = state.sessions.resolve(&headers);
    let mut data = Map::new();
    data.insert("titulo".to_string(), json!("Quiénes Somos"));
    render::page(&state, &session, &token, "quienes-somos", data)
}

pub async fn not_found(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let (token, session) = state.sessions.resolve(&headers);
    render::error_page(
        &state,
        &session,
        &token,
        StatusCode::NOT_FOUND,
        "La página que buscas no existe",
    )
}
