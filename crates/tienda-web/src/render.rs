//! Bridge between the axum handlers and the template renderer.
//!
//! Every HTML response is built here so the global view context is merged in
//! one place: `categorias` for the navigation (empty when the database is
//! down, the page still renders), the session `cartCount`, and the admin
//! data when logged in. Controller data is merged last and wins.

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{Html, IntoResponse, Response},
};
use serde_json::{json, Map, Value};
use tienda_core::RenderContext;
use tracing::{error, warn};

use crate::{
    session::{session_cookie, Session},
    state::AppState,
};

pub fn page(
    state: &AppState,
    session: &Session,
    token: &str,
    view: &str,
    data: Map<String, Value>,
) -> Response {
    page_with_status(state, session, token, StatusCode::OK, view, data)
}

pub fn page_with_status(
    state: &AppState,
    session: &Session,
    token: &str,
    status: StatusCode,
    view: &str,
    data: Map<String, Value>,
) -> Response {
    let ctx = build_context(state, session, data);

    match state.views.render(view, &ctx) {
        Ok(html) => with_session_cookie(token, (status, Html(html)).into_response()),
        Err(e) => {
            warn!("Error al renderizar la vista {view}: {e}");
            error_fallback(state, session, token, "Error al cargar la página")
        }
    }
}

pub fn error_page(
    state: &AppState,
    session: &Session,
    token: &str,
    status: StatusCode,
    mensaje: &str,
) -> Response {
    let mut data = Map::new();
    data.insert("titulo".to_string(), json!("Error"));
    data.insert("mensaje".to_string(), json!(mensaje));

    let ctx = build_context(state, session, data);
    match state.views.render("error", &ctx) {
        Ok(html) => with_session_cookie(token, (status, Html(html)).into_response()),
        Err(e) => {
            error!("Error al renderizar la página de error: {e}");
            with_session_cookie(
                token,
                (StatusCode::INTERNAL_SERVER_ERROR, mensaje.to_string()).into_response(),
            )
        }
    }
}

fn error_fallback(state: &AppState, session: &Session, token: &str, mensaje: &str) -> Response {
    error_page(
        state,
        session,
        token,
        StatusCode::INTERNAL_SERVER_ERROR,
        mensaje,
    )
}

/// Global values first, controller data last so it wins on collisions.
fn build_context(state: &AppState, session: &Session, data: Map<String, Value>) -> RenderContext {
    let mut ctx = RenderContext::new();

    let categorias = state.catalog.categorias();
    ctx.insert(
        "categorias",
        serde_json::to_value(&categorias).unwrap_or_else(|_| json!([])),
    );
    ctx.insert("cartCount", json!(session.cart_count()));
    if session.admin_logged_in {
        ctx.insert(
            "admin",
            json!({ "username": session.admin_user.clone().unwrap_or_default() }),
        );
    }

    ctx.merge(data);
    ctx
}

pub fn with_session_cookie(token: &str, mut response: Response) -> Response {
    if let Ok(value) = HeaderValue::from_str(&session_cookie(token)) {
        response.headers_mut().append(header::SET_COOKIE, value);
    }
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use crate::config::Config;
    use crate::session::SessionCartItem;
    use tempfile::TempDir;

    fn state_with_views(layout: &str, pages: &[(&str, &str)]) -> (AppState, TempDir) {
        let dir = TempDir::new().expect("temp views dir");
        std::fs::create_dir_all(dir.path().join("layouts")).expect("layouts dir");
        std::fs::write(dir.path().join("layouts/main.html"), layout).expect("layout");
        for (name, body) in pages {
            std::fs::write(dir.path().join(format!("{name}.html")), body).expect("page");
        }

        let config = Config {
            port: 0,
            database_path: ":memory:".to_string(),
            views_root: dir.path().to_string_lossy().to_string(),
            public_root: "public".to_string(),
            admin_user: "admin".to_string(),
            admin_password: "secreta".to_string(),
            whatsapp_phone: "573225865591".to_string(),
        };
        let catalog = Catalog::in_memory().expect("catalog");
        (AppState::new(config, catalog), dir)
    }

    #[test]
    fn test_page_merges_globals_and_controller_data() {
        let (state, _dir) = state_with_views(
            "{{content}}",
            &[("home", "{{titulo}}|{{cartCount}}|{{#each categorias}}{{nombre}};{{/each}}")],
        );
        let session = Session {
            cart: vec![SessionCartItem {
                id: "1".to_string(),
                cantidad: 4,
            }],
            ..Default::default()
        };
        let mut data = Map::new();
        data.insert("titulo".to_string(), json!("Inicio"));

        let response = page(&state, &session, "tok", "home", data);
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().get(header::SET_COOKIE).is_some());
    }

    #[test]
    fn test_missing_view_falls_back_to_error_page() {
        let (state, _dir) = state_with_views(
            "{{content}}",
            &[("error", "<p>{{mensaje}}</p>")],
        );
        let response = page(&state, &Session::default(), "tok", "no-existe", Map::new());
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_missing_error_view_degrades_to_plain_text() {
        let (state, _dir) = state_with_views("{{content}}", &[]);
        let response = error_page(
            &state,
            &Session::default(),
            "tok",
            StatusCode::NOT_FOUND,
            "No encontrado",
        );
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
