//! Admin back-office behind a login gate.
//!
//! Credentials are fixed in the configuration; a failed login redirects
//! back with a generic `?error=true` flag and no detail. Every admin view
//! renders standalone (no public layout). CRUD writes are single
//! statements; failures surface as the generic error page.

use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Redirect, Response},
    Form,
};
use serde::Deserialize;
use serde_json::{json, Map};
use tracing::{info, warn};

use crate::{
    catalog::NuevoProducto,
    render,
    routes::productos::productos_json,
    session::{clear_session_cookie, Session},
    state::AppState,
};

/// Resolve the session and require the admin flag; otherwise redirect to
/// the login page.
fn require_admin(state: &AppState, headers: &HeaderMap) -> Result<(String, Session), Response> {
    let (token, session) = state.sessions.resolve(headers);
    if session.admin_logged_in {
        Ok((token, session))
    } else {
        Err(render::with_session_cookie(
            &token,
            Redirect::to("/admin/login").into_response(),
        ))
    }
}

pub async fn index(State(state): State<AppState>, headers: HeaderMap) -> Response {
    match require_admin(&state, &headers) {
        Ok((token, _)) => render::with_session_cookie(
            &token,
            Redirect::to("/admin/dashboard").into_response(),
        ),
        Err(redirect) => redirect,
    }
}

#[derive(Deserialize)]
pub struct LoginQuery {
    pub error: Option<String>,
}

pub async fn login_page(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<LoginQuery>,
) -> Response {
    let (token, session) = state.sessions.resolve(&headers);

    if session.admin_logged_in {
        return render::with_session_cookie(
            &token,
            Redirect::to("/admin/dashboard").into_response(),
        );
    }

    let mut data = Map::new();
    data.insert(
        "titulo".to_string(),
        json!("Iniciar sesión - Panel de Administración"),
    );
    data.insert("standalone".to_string(), json!(true));
    if query.error.is_some() {
        data.insert("error".to_string(), json!("Credenciales incorrectas"));
    }

    render::page(&state, &session, &token, "admin/login", data)
}

#[derive(Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

pub async fn login(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(form): Form<LoginForm>,
) -> Response {
    let (token, _) = state.sessions.resolve(&headers);

    let valid = !form.username.is_empty()
        && form.username == state.config.admin_user
        && form.password == state.config.admin_password;

    if !valid {
        warn!("Intento de inicio de sesión fallido para {}", form.username);
        return render::with_session_cookie(
            &token,
            Redirect::to("/admin/login?error=true").into_response(),
        );
    }

    info!("Administrador {} inició sesión", form.username);
    state.sessions.update(&token, |session| {
        session.admin_logged_in = true;
        session.admin_user = Some(form.username.clone());
    });

    render::with_session_cookie(&token, Redirect::to("/admin/dashboard").into_response())
}

pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let (token, _) = state.sessions.resolve(&headers);
    state.sessions.destroy(&token);

    let mut response = Redirect::to("/admin/login").into_response();
    if let Ok(value) = HeaderValue::from_str(&clear_session_cookie()) {
        response.headers_mut().append(header::SET_COOKIE, value);
    }
    response
}

pub async fn dashboard(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let (token, session) = match require_admin(&state, &headers) {
        Ok(ok) => ok,
        Err(redirect) => return redirect,
    };

    let stats = state.catalog.stats();
    let mut data = Map::new();
    data.insert(
        "titulo".to_string(),
        json!("Dashboard - Panel de Administración"),
    );
    data.insert("standalone".to_string(), json!(true));
    data.insert(
        "stats".to_string(),
        serde_json::to_value(stats).unwrap_or_else(|_| json!({})),
    );
    data.insert("current_page".to_string(), json!({ "dashboard": true }));

    render::page(&state, &session, &token, "admin/dashboard", data)
}

pub async fn productos(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let (token, session) = match require_admin(&state, &headers) {
        Ok(ok) => ok,
        Err(redirect) => return redirect,
    };

    let productos = state.catalog.productos();
    let mut data = Map::new();
    data.insert("titulo".to_string(), json!("Gestión de Productos"));
    data.insert("standalone".to_string(), json!(true));
    data.insert("productos".to_string(), productos_json(&productos));
    data.insert("current_page".to_string(), json!({ "productos": true }));

    render::page(&state, &session, &token, "admin/productos", data)
}

#[derive(Deserialize)]
pub struct ProductoForm {
    pub categoria_id: i64,
    #[serde(default)]
    pub imagen: String,
    pub nombre: String,
    #[serde(default = "default_condicion")]
    pub condicion: String,
    #[serde(default)]
    pub descripcion: String,
    #[serde(default)]
    pub caracteristicas: String,
    pub precio: f64,
    #[serde(default)]
    pub cantidad_disponible: i64,
    /// Checkbox: present when checked.
    #[serde(default)]
    pub disponible: Option<String>,
}

fn default_condicion() -> String {
    "Nuevo".to_string()
}

impl From<ProductoForm> for NuevoProducto {
    fn from(form: ProductoForm) -> Self {
        NuevoProducto {
            categoria_id: form.categoria_id,
            imagen: form.imagen,
            nombre: form.nombre,
            condicion: form.condicion,
            descripcion: form.descripcion,
            caracteristicas: form.caracteristicas,
            precio: form.precio,
            cantidad_disponible: form.cantidad_disponible,
            disponible: form.disponible.is_some(),
        }
    }
}

pub async fn crear_producto(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(form): Form<ProductoForm>,
) -> Response {
    let (token, session) = match require_admin(&state, &headers) {
        Ok(ok) => ok,
        Err(redirect) => return redirect,
    };

    match state.catalog.crear_producto(&form.into()) {
        Ok(id) => {
            info!("Producto {id} creado");
            render::with_session_cookie(&token, Redirect::to("/admin/productos").into_response())
        }
        Err(e) => {
            warn!("Error al crear producto: {e}");
            render::error_page(
                &state,
                &session,
                &token,
                StatusCode::INTERNAL_SERVER_ERROR,
                "Error al crear el producto",
            )
        }
    }
}

pub async fn editar_producto(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Form(form): Form<ProductoForm>,
) -> Response {
    let (token, session) = match require_admin(&state, &headers) {
        Ok(ok) => ok,
        Err(redirect) => return redirect,
    };

    match state.catalog.editar_producto(id, &form.into()) {
        Ok(true) => {
            render::with_session_cookie(&token, Redirect::to("/admin/productos").into_response())
        }
        Ok(false) => render::error_page(
            &state,
            &session,
            &token,
            StatusCode::NOT_FOUND,
            "Producto no encontrado",
        ),
        Err(e) => {
            warn!("Error al editar producto {id}: {e}");
            render::error_page(
                &state,
                &session,
                &token,
                StatusCode::INTERNAL_SERVER_ERROR,
                "Error al actualizar el producto",
            )
        }
    }
}

pub async fn eliminar_producto(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Response {
    let (token, session) = match require_admin(&state, &headers) {
        Ok(ok) => ok,
        Err(redirect) => return redirect,
    };

    match state.catalog.eliminar_producto(id) {
        Ok(_) => {
            render::with_session_cookie(&token, Redirect::to("/admin/productos").into_response())
        }
        Err(e) => {
            warn!("Error al eliminar producto {id}: {e}");
            render::error_page(
                &state,
                &session,
                &token,
                StatusCode::INTERNAL_SERVER_ERROR,
                "Error al eliminar el producto",
            )
        }
    }
}

pub async fn categorias(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let (token, session) = match require_admin(&state, &headers) {
        Ok(ok) => ok,
        Err(redirect) => return redirect,
    };

    let mut data = Map::new();
    data.insert("titulo".to_string(), json!("Gestión de Categorías"));
    data.insert("standalone".to_string(), json!(true));
    data.insert("current_page".to_string(), json!({ "categorias": true }));

    render::page(&state, &session, &token, "admin/categorias", data)
}

pub async fn servicios(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let (token, session) = match require_admin(&state, &headers) {
        Ok(ok) => ok,
        Err(redirect) => return redirect,
    };

    let servicios = state.catalog.servicios();
    let mut data = Map::new();
    data.insert("titulo".to_string(), json!("Gestión de Servicios"));
    data.insert("standalone".to_string(), json!(true));
    data.insert(
        "servicios".to_string(),
        serde_json::to_value(&servicios).unwrap_or_else(|_| json!([])),
    );
    data.insert("current_page".to_string(), json!({ "servicios": true }));

    render::page(&state, &session, &token, "admin/servicios", data)
}

#[derive(Deserialize)]
pub struct CategoriaForm {
    pub nombre: String,
    #[serde(default)]
    pub descripcion: String,
}

pub async fn crear_categoria(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(form): Form<CategoriaForm>,
) -> Response {
    let (token, session) = match require_admin(&state, &headers) {
        Ok(ok) => ok,
        Err(redirect) => return redirect,
    };

    match state.catalog.crear_categoria(&form.nombre, &form.descripcion) {
        Ok(_) => {
            render::with_session_cookie(&token, Redirect::to("/admin/categorias").into_response())
        }
        Err(e) => {
            warn!("Error al crear categoría: {e}");
            render::error_page(
                &state,
                &session,
                &token,
                StatusCode::INTERNAL_SERVER_ERROR,
                "Error al crear la categoría",
            )
        }
    }
}

pub async fn editar_categoria(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Form(form): Form<CategoriaForm>,
) -> Response {
    let (token, session) = match require_admin(&state, &headers) {
        Ok(ok) => ok,
        Err(redirect) => return redirect,
    };

    match state
        .catalog
        .editar_categoria(id, &form.nombre, &form.descripcion)
    {
        Ok(true) => {
            render::with_session_cookie(&token, Redirect::to("/admin/categorias").into_response())
        }
        Ok(false) => render::error_page(
            &state,
            &session,
            &token,
            StatusCode::NOT_FOUND,
            "Categoría no encontrada",
        ),
        Err(e) => {
            warn!("Error al editar categoría {id}: {e}");
            render::error_page(
                &state,
                &session,
                &token,
                StatusCode::INTERNAL_SERVER_ERROR,
                "Error al actualizar la categoría",
            )
        }
    }
}

pub async fn eliminar_categoria(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Response {
    let (token, session) = match require_admin(&state, &headers) {
        Ok(ok) => ok,
        Err(redirect) => return redirect,
    };

    match state.catalog.eliminar_categoria(id) {
        Ok(_) => {
            render::with_session_cookie(&token, Redirect::to("/admin/categorias").into_response())
        }
        Err(e) => {
            warn!("Error al eliminar categoría {id}: {e}");
            render::error_page(
                &state,
                &session,
                &token,
                StatusCode::INTERNAL_SERVER_ERROR,
                "Error al eliminar la categoría",
            )
        }
    }
}
