//! WhatsApp deep-link generation for checkout.
//!
//! The order summary is composed as a prefilled message and embedded in the
//! `text` parameter of an `api.whatsapp.com/send` URL. `%0A` separates
//! lines; field values are percent-encoded. The link is handed back to the
//! client, never fetched server-side.

use serde::Deserialize;
use tienda_cart::Cart;
use tienda_core::helpers::{format_date, format_price_f64};

#[derive(Debug, Deserialize)]
pub struct PedidoForm {
    pub nombres: String,
    pub apellidos: String,
    pub tipo_documento: String,
    pub num_documento: String,
    pub fecha_nacimiento: String,
    #[serde(default)]
    pub sexo: String,
    #[serde(default)]
    pub estado_civil: String,
    pub ciudad: String,
    pub direccion: String,
    #[serde(default)]
    pub telefono_fijo: String,
    pub telefono_movil: String,
    pub email: String,
    #[serde(rename = "metodoPago")]
    pub metodo_pago: String,
    pub carrito: Cart,
}

impl PedidoForm {
    /// All fields marked required on the order form must be non-empty.
    pub fn validate(&self) -> Result<(), &'static str> {
        let required = [
            &self.nombres,
            &self.apellidos,
            &self.tipo_documento,
            &self.num_documento,
            &self.fecha_nacimiento,
            &self.ciudad,
            &self.direccion,
            &self.telefono_movil,
            &self.email,
            &self.metodo_pago,
        ];
        if required.iter().any(|field| field.trim().is_empty()) {
            return Err("Faltan datos requeridos");
        }
        if self.carrito.items.is_empty() {
            return Err("No hay productos en el carrito");
        }
        Ok(())
    }
}

pub fn build_whatsapp_url(phone: &str, pedido: &PedidoForm) -> String {
    // The form sends ISO dates; the message shows them es-CO style.
    let nacimiento = match format_date(&pedido.fecha_nacimiento) {
        formatted if formatted.is_empty() => pedido.fecha_nacimiento.clone(),
        formatted => formatted,
    };

    let mut lines: Vec<String> = vec![
        "*Nuevo Pedido*".to_string(),
        String::new(),
        format!("*Nombres:* {}", pedido.nombres),
        format!("*Apellidos:* {}", pedido.apellidos),
        format!(
            "*Documento:* {} {}",
            pedido.tipo_documento, pedido.num_documento
        ),
        format!("*Fecha Nacimiento:* {nacimiento}"),
        format!("*Ciudad:* {}", pedido.ciudad),
        format!("*Dirección:* {}", pedido.direccion),
        format!("*Teléfono Móvil:* {}", pedido.telefono_movil),
        format!("*Email:* {}", pedido.email),
    ];

    if !pedido.telefono_fijo.is_empty() {
        lines.push(format!("*Teléfono Fijo:* {}", pedido.telefono_fijo));
    }
    if !pedido.sexo.is_empty() {
        lines.push(format!("*Sexo:* {}", pedido.sexo));
    }
    if !pedido.estado_civil.is_empty() {
        lines.push(format!("*Estado Civil:* {}", pedido.estado_civil));
    }

    lines.push(format!("*Método de Pago:* {}", pedido.metodo_pago));
    lines.push(String::new());
    lines.push("*Productos:*".to_string());

    let mut total = 0.0;
    for item in &pedido.carrito.items {
        let subtotal = item.precio * f64::from(item.cantidad);
        total += subtotal;
        lines.push(format!(
            "- {}x {} - ${}",
            item.cantidad,
            item.nombre,
            format_price_f64(subtotal)
        ));
    }

    lines.push(String::new());
    lines.push(format!("*Total:* ${}", format_price_f64(total)));

    let text = lines
        .iter()
        .map(|line| percent_encode(line))
        .collect::<Vec<_>>()
        .join("%0A");

    format!("https://api.whatsapp.com/send?phone={phone}&text={text}")
}

/// Minimal percent-encoding for the URL query component: unreserved
/// characters pass through, everything else becomes `%XX` per UTF-8 byte.
fn percent_encode(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for byte in input.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' | b'*' => {
                out.push(byte as char)
            }
            _ => out.push_str(&format!("%{:02X}", byte)),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use tienda_cart::CartItem;

    fn pedido() -> PedidoForm {
        PedidoForm {
            nombres: "Ana".to_string(),
            apellidos: "García".to_string(),
            tipo_documento: "CC".to_string(),
            num_documento: "1020304050".to_string(),
            fecha_nacimiento: "1995-04-12".to_string(),
            sexo: String::new(),
            estado_civil: String::new(),
            ciudad: "Bogotá".to_string(),
            direccion: "Calle 1 # 2-3".to_string(),
            telefono_fijo: String::new(),
            telefono_movil: "3001234567".to_string(),
            email: "ana@example.com".to_string(),
            metodo_pago: "Efectivo".to_string(),
            carrito: Cart {
                items: vec![CartItem {
                    id: "1".to_string(),
                    nombre: "Router".to_string(),
                    precio: 349000.0,
                    imagen: String::new(),
                    cantidad: 2,
                    stock: 12,
                }],
                total: 698000.0,
            },
        }
    }

    #[test]
    fn test_url_shape_and_totals() {
        let url = build_whatsapp_url("573225865591", &pedido());
        assert!(url.starts_with("https://api.whatsapp.com/send?phone=573225865591&text="));
        assert!(url.contains("*Nuevo%20Pedido*"));
        assert!(url.contains("%0A"));
        // 2 x 349000 formatted es-CO.
        assert!(url.contains("698.000"));
        // 1995-04-12 reads 12/4/1995.
        assert!(url.contains(percent_encode("12/4/1995").as_str()));
    }

    #[test]
    fn test_optional_fields_omitted_when_empty() {
        let url = build_whatsapp_url("573225865591", &pedido());
        assert!(!url.contains(percent_encode("*Teléfono Fijo:*").as_str()));

        let mut con_fijo = pedido();
        con_fijo.telefono_fijo = "6011234".to_string();
        let url = build_whatsapp_url("573225865591", &con_fijo);
        assert!(url.contains(percent_encode("*Teléfono Fijo:*").as_str()));
    }

    #[test]
    fn test_validate_rejects_missing_fields_and_empty_cart() {
        let mut sin_nombre = pedido();
        sin_nombre.nombres = "  ".to_string();
        assert_eq!(sin_nombre.validate(), Err("Faltan datos requeridos"));

        let mut vacio = pedido();
        vacio.carrito.items.clear();
        assert_eq!(vacio.validate(), Err("No hay productos en el carrito"));

        assert!(pedido().validate().is_ok());
    }

    #[test]
    fn test_percent_encode_escapes_reserved() {
        assert_eq!(percent_encode("a b&c=d"), "a%20b%26c%3Dd");
        assert_eq!(percent_encode("Bogotá"), "Bogot%C3%A1");
    }
}
