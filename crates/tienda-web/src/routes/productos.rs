use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tienda_core::helpers::format_price_f64;

use crate::{catalog::Producto, render, state::AppState};

/// Products serialized for the view layer, with the price preformatted.
pub(crate) fn productos_json(productos: &[Producto]) -> Value {
    Value::Array(
        productos
            .iter()
            .map(|producto| {
                let mut value = serde_json::to_value(producto).unwrap_or_else(|_| json!({}));
                if let Value::Object(map) = &mut value {
                    map.insert(
                        "precio".to_string(),
                        json!(format_price_f64(producto.precio)),
                    );
                }
                value
            })
            .collect(),
    )
}

pub async fn listar(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let (token, session) = state.sessions.resolve(&headers);

    let productos = state.catalog.productos();
    let mut data = Map::new();
    data.insert("titulo".to_string(), json!("Nuestros Productos"));
    data.insert("productos".to_string(), productos_json(&productos));

    render::page(&state, &session, &token, "productos", data)
}

pub async fn detalle(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    let (token, session) = state.sessions.resolve(&headers);

    let Ok(id) = id.parse::<i64>() else {
        return render::error_page(
            &state,
            &session,
            &token,
            StatusCode::BAD_REQUEST,
            "ID de producto inválido",
        );
    };

    let Some(producto) = state.catalog.producto(id) else {
        return render::error_page(
            &state,
            &session,
            &token,
            StatusCode::NOT_FOUND,
            "Producto no encontrado",
        );
    };

    let caracteristicas = split_caracteristicas(&producto.caracteristicas);
    let categoria_nombre = state
        .catalog
        .categoria(producto.categoria_id)
        .map(|c| c.nombre)
        .unwrap_or_else(|| "Sin categoría".to_string());

    let imagen = if producto.imagen.is_empty() {
        "/img/default-product.jpg".to_string()
    } else {
        producto.imagen.clone()
    };

    let mut data = Map::new();
    data.insert("titulo".to_string(), json!(producto.nombre));
    data.insert("isProductoDetalle".to_string(), json!(true));
    data.insert(
        "producto".to_string(),
        json!({
            "id": producto.id,
            "nombre": producto.nombre,
            "precio": format_price_f64(producto.precio),
            "descripcion": producto.descripcion,
            "imagen": imagen,
            "categoria_id": producto.categoria_id,
            "categoria_nombre": categoria_nombre,
            "condicion": producto.condicion,
            "caracteristicas": producto.caracteristicas,
            "cantidad_disponible": producto.cantidad_disponible,
            "disponible": producto.disponible,
        }),
    );
    data.insert(
        "caracteristicasList".to_string(),
        json!(caracteristicas),
    );

    render::page(&state, &session, &token, "producto-detalle", data)
}

/// Feature text arrives in several historical shapes; split on newlines,
/// dashes and bullets, dropping empty fragments.
fn split_caracteristicas(raw: &str) -> Vec<String> {
    raw.replace("\\n", "\n")
        .split(['\n', '\r', '-', '•'])
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

#[derive(Deserialize)]
pub struct BusquedaQuery {
    #[serde(default)]
    pub q: String,
}

pub async fn buscar(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<BusquedaQuery>,
) -> Response {
    let (token, session) = state.sessions.resolve(&headers);

    let q = query.q.trim().to_string();
    if q.is_empty() {
        return Redirect::to("/productos").into_response();
    }

    let productos = state.catalog.buscar_productos(&q);
    let mut data = Map::new();
    data.insert("titulo".to_string(), json!(format!("Resultados para: {q}")));
    data.insert("query".to_string(), json!(q));
    data.insert("totalProductos".to_string(), json!(productos.len()));
    data.insert("productos".to_string(), productos_json(&productos));

    render::page(&state, &session, &token, "productos-busqueda", data)
}

pub async fn por_categoria(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    let (token, session) = state.sessions.resolve(&headers);

    let Ok(id) = id.parse::<i64>() else {
        return render::error_page(
            &state,
            &session,
            &token,
            StatusCode::BAD_REQUEST,
            "ID de categoría inválido",
        );
    };

    let Some(categoria) = state.catalog.categoria(id) else {
        return render::error_page(
            &state,
            &session,
            &token,
            StatusCode::NOT_FOUND,
            "Categoría no encontrada",
        );
    };

    let productos = state.catalog.productos_por_categoria(id);

    let mut data = Map::new();
    data.insert(
        "titulo".to_string(),
        json!(format!("Productos: {}", categoria.nombre)),
    );
    data.insert(
        "categoria".to_string(),
        serde_json::to_value(&categoria).unwrap_or_else(|_| json!({})),
    );
    data.insert("totalProductos".to_string(), json!(productos.len()));
    data.insert("productos".to_string(), productos_json(&productos));

    render::page(&state, &session, &token, "productos-categoria", data)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_caracteristicas_variants() {
        let items = split_caracteristicas("- 8GB RAM\n- 512GB SSD\r• WiFi 6");
        assert_eq!(items, vec!["8GB RAM", "512GB SSD", "WiFi 6"]);
    }

    #[test]
    fn test_split_caracteristicas_escaped_newlines() {
        let items = split_caracteristicas("- Procesador i5\\n- Windows 11");
        assert_eq!(items, vec!["Procesador i5", "Windows 11"]);
    }

    #[test]
    fn test_split_caracteristicas_empty() {
        assert!(split_caracteristicas("").is_empty());
        assert!(split_caracteristicas("- \n- ").is_empty());
    }

    #[test]
    fn test_productos_json_formats_price() {
        let productos = vec![Producto {
            id: 1,
            categoria_id: 1,
            imagen: String::new(),
            nombre: "Laptop".to_string(),
            condicion: "Nuevo".to_string(),
            descripcion: String::new(),
            caracteristicas: String::new(),
            precio: 1899000.0,
            cantidad_disponible: 10,
            disponible: true,
        }];
        let value = productos_json(&productos);
        assert_eq!(value[0]["precio"], json!("1.899.000"));
    }
}
