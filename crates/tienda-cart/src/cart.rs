//! Cart data model.
//!
//! The persisted shape is `{"items": [...], "total": n}` with item fields
//! `id`, `nombre`, `precio`, `imagen`, `cantidad`, `stock`. Stored values
//! accumulated garbage over time at different call sites, so deserialization
//! is lenient: ids arrive as numbers or strings and normalize to strings,
//! prices arrive as numbers or numeric strings and anything else reads as 0.
//! `total` is derived; readers must recompute it, never trust the stored one.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Cart {
    #[serde(default)]
    pub items: Vec<CartItem>,
    #[serde(default)]
    pub total: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CartItem {
    #[serde(deserialize_with = "id_as_string")]
    pub id: String,
    #[serde(default)]
    pub nombre: String,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub precio: f64,
    #[serde(default)]
    pub imagen: String,
    #[serde(default)]
    pub cantidad: u32,
    #[serde(default)]
    pub stock: u32,
}

impl Cart {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Displayed item count: the sum of quantities, not distinct lines.
    pub fn count(&self) -> u32 {
        self.items.iter().map(|item| item.cantidad).sum()
    }

    pub fn find(&self, id: &str) -> Option<&CartItem> {
        self.items.iter().find(|item| item.id == id)
    }

    pub fn find_mut(&mut self, id: &str) -> Option<&mut CartItem> {
        self.items.iter_mut().find(|item| item.id == id)
    }

    /// Recompute `total` as `Σ precio · cantidad`. A line with a non-finite
    /// or negative price contributes 0 so the sum stays defined.
    pub fn recompute_total(&mut self) {
        self.total = self
            .items
            .iter()
            .map(|item| {
                if item.precio.is_finite() && item.precio > 0.0 {
                    item.precio * f64::from(item.cantidad)
                } else {
                    0.0
                }
            })
            .sum();
    }
}

fn id_as_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::String(s) => s,
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    })
}

fn lenient_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => s.trim().parse::<f64>().unwrap_or(0.0),
        _ => 0.0,
    })
}
