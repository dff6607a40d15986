use axum::{
    extract::{rejection::JsonRejection, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Map, Value};

use crate::{
    error::AppError,
    render,
    state::AppState,
    whatsapp::{build_whatsapp_url, PedidoForm},
};

/// Build the WhatsApp deep link for an order. Validation failures come back
/// as 400 envelopes so the order form can show the message inline.
pub async fn whatsapp(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Json<Value>, JsonRejection>,
) -> Response {
    let (token, _) = state.sessions.resolve(&headers);

    let Ok(Json(body)) = body else {
        return render::with_session_cookie(
            &token,
            AppError::BadRequest("Cuerpo JSON inválido".to_string()).into_response(),
        );
    };

    let Ok(pedido) = serde_json::from_value::<PedidoForm>(body) else {
        return envelope(
            &token,
            StatusCode::BAD_REQUEST,
            json!({ "success": false, "message": "Faltan datos requeridos" }),
        );
    };

    if let Err(message) = pedido.validate() {
        return envelope(
            &token,
            StatusCode::BAD_REQUEST,
            json!({ "success": false, "message": message }),
        );
    }

    let whatsapp_url = build_whatsapp_url(&state.config.whatsapp_phone, &pedido);
    envelope(
        &token,
        StatusCode::OK,
        json!({ "success": true, "whatsappUrl": whatsapp_url }),
    )
}

pub async fn confirmacion(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let (token, session) = state.sessions.resolve(&headers);
    let mut data = Map::new();
    data.insert("titulo".to_string(), json!("Pedido Confirmado"));
    render::page(&state, &session, &token, "pedidos/confirmacion", data)
}

fn envelope(token: &str, status: StatusCode, body: Value) -> Response {
    render::with_session_cookie(token, (status, Json(body)).into_response())
}
