//! Session-scoped cart JSON API.
//!
//! This cart is a server-side mirror used only by these endpoints and the
//! `cartCount` view global; it never reconciles with the client-persisted
//! cart. Responses are `{success, message?, cartCount?}` envelopes.

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Map, Value};

use crate::{
    render,
    session::SessionCartItem,
    state::AppState,
};

pub async fn pagina(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let (token, session) = state.sessions.resolve(&headers);
    let mut data = Map::new();
    data.insert("titulo".to_string(), json!("Carrito de Compras"));
    render::page(&state, &session, &token, "carrito", data)
}

#[derive(Deserialize)]
pub struct AddPayload {
    pub id: Option<Value>,
    #[serde(default = "default_cantidad")]
    pub cantidad: i64,
}

fn default_cantidad() -> i64 {
    1
}

/// Mixed call sites send the id as a number or a string.
fn normalize_id(id: &Value) -> Option<String> {
    match id {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

pub async fn add(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<AddPayload>,
) -> Response {
    let (token, _) = state.sessions.resolve(&headers);

    let Some(id) = payload.id.as_ref().and_then(normalize_id) else {
        return envelope(
            &token,
            StatusCode::BAD_REQUEST,
            json!({ "success": false, "message": "ID de producto requerido" }),
        );
    };

    let session = state.sessions.update(&token, |session| {
        match session.cart.iter_mut().find(|item| item.id == id) {
            Some(item) => item.cantidad += payload.cantidad,
            None => session.cart.push(SessionCartItem {
                id: id.clone(),
                cantidad: payload.cantidad,
            }),
        }
    });

    envelope(
        &token,
        StatusCode::OK,
        json!({
            "success": true,
            "message": "Producto añadido al carrito",
            "cartCount": session.cart_count(),
        }),
    )
}

pub async fn remove(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    let (token, _) = state.sessions.resolve(&headers);

    let session = state.sessions.update(&token, |session| {
        session.cart.retain(|item| item.id != id);
    });

    envelope(
        &token,
        StatusCode::OK,
        json!({
            "success": true,
            "message": "Producto eliminado del carrito",
            "cartCount": session.cart_count(),
        }),
    )
}

#[derive(Deserialize)]
pub struct UpdatePayload {
    pub cantidad: Option<i64>,
}

pub async fn update(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(payload): Json<UpdatePayload>,
) -> Response {
    let (token, session) = state.sessions.resolve(&headers);

    let Some(cantidad) = payload.cantidad else {
        return envelope(
            &token,
            StatusCode::BAD_REQUEST,
            json!({ "success": false, "message": "Producto no encontrado o cantidad no especificada" }),
        );
    };

    if !session.cart.iter().any(|item| item.id == id) {
        return envelope(
            &token,
            StatusCode::NOT_FOUND,
            json!({ "success": false, "message": "Producto no encontrado en el carrito" }),
        );
    }

    let session = state.sessions.update(&token, |session| {
        if cantidad <= 0 {
            session.cart.retain(|item| item.id != id);
        } else if let Some(item) = session.cart.iter_mut().find(|item| item.id == id) {
            item.cantidad = cantidad;
        }
    });

    envelope(
        &token,
        StatusCode::OK,
        json!({
            "success": true,
            "message": "Cantidad actualizada",
            "cartCount": session.cart_count(),
        }),
    )
}

pub async fn contents(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let (token, session) = state.sessions.resolve(&headers);

    envelope(
        &token,
        StatusCode::OK,
        json!({
            "success": true,
            "cart": {
                "items": session.cart,
                "total": session.cart_count(),
            },
        }),
    )
}

pub async fn clear(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let (token, _) = state.sessions.resolve(&headers);
    state.sessions.update(&token, |session| session.cart.clear());

    envelope(
        &token,
        StatusCode::OK,
        json!({ "success": true, "message": "Carrito vaciado correctamente" }),
    )
}

fn envelope(token: &str, status: StatusCode, body: Value) -> Response {
    render::with_session_cookie(token, (status, Json(body)).into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_id() {
        assert_eq!(normalize_id(&json!("7")), Some("7".to_string()));
        assert_eq!(normalize_id(&json!(7)), Some("7".to_string()));
        assert_eq!(normalize_id(&json!(" 7 ")), Some("7".to_string()));
        assert_eq!(normalize_id(&json!("")), None);
        assert_eq!(normalize_id(&json!(null)), None);
    }
}
