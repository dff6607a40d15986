use axum::{
    extract::State,
    http::HeaderMap,
    response::Response,
    Form,
};
use serde::Deserialize;
use serde_json::{json, Map};
use tracing::warn;

use crate::{render, state::AppState};

pub async fn pagina(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let (token, session) = state.sessions.resolve(&headers);
    let mut data = Map::new();
    data.insert("titulo".to_string(), json!("Contáctanos"));
    render::page(&state, &session, &token, "contacto", data)
}

#[derive(Debug, Deserialize)]
pub struct ContactoForm {
    #[serde(default)]
    pub nombre: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub telefono: String,
    #[serde(default)]
    pub asunto: String,
    #[serde(default)]
    pub mensaje: String,
}

pub async fn enviar(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(form): Form<ContactoForm>,
) -> Response {
    let (token, session) = state.sessions.resolve(&headers);

    if form.nombre.trim().is_empty()
        || form.email.trim().is_empty()
        || form.asunto.trim().is_empty()
        || form.mensaje.trim().is_empty()
    {
        return render::page(
            &state,
            &session,
            &token,
            "contacto",
            contacto_data(
                Some("Todos los campos marcados con * son obligatorios"),
                None,
                Some(&form),
            ),
        );
    }

    if !is_valid_email(&form.email) {
        return render::page(
            &state,
            &session,
            &token,
            "contacto",
            contacto_data(
                Some("Por favor, ingresa un correo electrónico válido"),
                None,
                Some(&form),
            ),
        );
    }

    let (nombres, apellidos) = split_nombre(&form.nombre);
    if let Err(e) = state.catalog.guardar_contacto(
        &nombres,
        &apellidos,
        &form.telefono,
        &form.email,
        &form.asunto,
        &form.mensaje,
    ) {
        warn!("Error al guardar el mensaje de contacto: {e}");
        return render::page(
            &state,
            &session,
            &token,
            "contacto",
            contacto_data(
                Some("Error al enviar el formulario. Por favor, intenta nuevamente."),
                None,
                Some(&form),
            ),
        );
    }

    render::page(
        &state,
        &session,
        &token,
        "contacto",
        contacto_data(
            None,
            Some("¡Gracias por contactarnos! Te responderemos lo antes posible."),
            None,
        ),
    )
}

fn contacto_data(
    error: Option<&str>,
    success: Option<&str>,
    form: Option<&ContactoForm>,
) -> Map<String, serde_json::Value> {
    let mut data = Map::new();
    data.insert("titulo".to_string(), json!("Contáctanos"));
    if let Some(error) = error {
        data.insert("error".to_string(), json!(error));
    }
    if let Some(success) = success {
        data.insert("success".to_string(), json!(success));
    }
    // Echo the submitted values back so the form keeps them.
    if let Some(form) = form {
        data.insert(
            "formData".to_string(),
            json!({
                "nombre": form.nombre,
                "email": form.email,
                "telefono": form.telefono,
                "asunto": form.asunto,
                "mensaje": form.mensaje,
            }),
        );
    }
    data
}

fn split_nombre(nombre: &str) -> (String, String) {
    let mut parts = nombre.trim().splitn(2, ' ');
    let nombres = parts.next().unwrap_or_default().to_string();
    let apellidos = parts.next().unwrap_or_default().trim().to_string();
    (nombres, apellidos)
}

fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.trim().is_empty()
        && !domain.starts_with('.')
        && domain.split_once('.').is_some_and(|(host, tld)| {
            !host.is_empty() && !tld.is_empty()
        })
        && !email.contains(char::is_whitespace)
}
