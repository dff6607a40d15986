pub mod admin;
pub mod carrito;
pub mod contacto;
pub mod home;
pub mod pedidos;
pub mod productos;
pub mod servicios;

use std::path::PathBuf;

use axum::{
    routing::{delete, get, post, put},
    Router,
};
use tower_http::services::ServeDir;

use crate::state::AppState;

pub fn router(state: AppState) -> Router {
    let public = PathBuf::from(&state.config.public_root);
    Router::new()
        .route("/", get(home::index))
        .route("/quienes-somos", get(home::quienes_somos))
        .route("/productos", get(productos::listar))
        .route("/productos/buscar", get(productos::buscar))
        .route("/productos/:id", get(productos::detalle))
        .route("/categorias/:id/productos", get(productos::por_categoria))
        .route("/servicios", get(servicios::listar))
        .route("/carrito", get(carrito::pagina))
        .route("/carrito/api/add", post(carrito::add))
        .route("/carrito/api/remove/:id", delete(carrito::remove))
        .route("/carrito/api/update/:id", put(carrito::update))
        .route("/carrito/api/contents", get(carrito::contents))
        .route("/carrito/api/clear", post(carrito::clear))
        .route("/pedidos/whatsapp", post(pedidos::whatsapp))
        .route("/pedidos/confirmacion", get(pedidos::confirmacion))
        .route("/contactanos", get(contacto::pagina).post(contacto::enviar))
        .route("/admin", get(admin::index))
        .route("/admin/login", get(admin::login_page).post(admin::login))
        .route("/admin/logout", get(admin::logout))
        .route("/admin/dashboard", get(admin::dashboard))
        .route("/admin/productos", get(admin::productos))
        .route("/admin/productos/crear", post(admin::crear_producto))
        .route("/admin/productos/editar/:id", post(admin::editar_producto))
        .route("/admin/productos/eliminar/:id", get(admin::eliminar_producto))
        .route("/admin/categorias", get(admin::categorias))
        .route("/admin/categorias/crear", post(admin::crear_categoria))
        .route("/admin/categorias/editar/:id", post(admin::editar_categoria))
        .route("/admin/categorias/eliminar/:id", get(admin::eliminar_categoria))
        .route("/admin/servicios", get(admin::servicios))
        .nest_service("/css", ServeDir::new(public.join("css")))
        .nest_service("/js", ServeDir::new(public.join("js")))
        .nest_service("/img", ServeDir::new(public.join("img")))
        .fallback(home::not_found)
        .with_state(state)
}
