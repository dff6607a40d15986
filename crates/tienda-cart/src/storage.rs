//! Persisted-cart storage.
//!
//! The floating and checkout carts live under separate well-known keys in a
//! string key/value store (browser storage in the original deployment, an
//! in-memory map here and in tests). Reads are tolerant: missing or corrupt
//! JSON loads as the empty cart. Writes are last-write-wins; concurrent
//! writers to the same key are an accepted limitation.

use std::collections::HashMap;

use crate::cart::Cart;

/// Pre-checkout cart shown in the header sidebar.
pub const FLOATING_CART_KEY: &str = "carrito";
/// Snapshot taken when the user proceeds to the order form.
pub const CHECKOUT_CART_KEY: &str = "carrito_checkout";

pub trait CartStorage {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str);
    fn remove(&mut self, key: &str);
}

#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: HashMap<String, String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CartStorage for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        self.entries.insert(key.to_string(), value.to_string());
    }

    fn remove(&mut self, key: &str) {
        self.entries.remove(key);
    }
}

/// Load the cart under `key`; missing or malformed JSON yields the empty
/// cart. The stored total is never trusted and is recomputed on load.
pub fn load_cart<S: CartStorage>(storage: &S, key: &str) -> Cart {
    let mut cart = storage
        .get(key)
        .and_then(|raw| serde_json::from_str::<Cart>(&raw).ok())
        .unwrap_or_default();
    cart.recompute_total();
    cart
}

pub fn store_cart<S: CartStorage>(storage: &mut S, key: &str, cart: &Cart) {
    match serde_json::to_string(cart) {
        Ok(raw) => storage.set(key, &raw),
        Err(_) => storage.remove(key),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cart::CartItem;

    #[test]
    fn test_missing_key_loads_empty_cart() {
        let storage = MemoryStorage::new();
        let cart = load_cart(&storage, FLOATING_CART_KEY);
        assert!(cart.items.is_empty());
        assert_eq!(cart.total, 0.0);
    }

    #[test]
    fn test_corrupt_json_loads_empty_cart() {
        let mut storage = MemoryStorage::new();
        storage.set(FLOATING_CART_KEY, "{items: oops");
        let cart = load_cart(&storage, FLOATING_CART_KEY);
        assert!(cart.items.is_empty());
        assert_eq!(cart.total, 0.0);
    }

    #[test]
    fn test_round_trip() {
        let mut storage = MemoryStorage::new();
        let mut cart = Cart {
            items: vec![CartItem {
                id: "3".to_string(),
                nombre: "Router".to_string(),
                precio: 120000.0,
                imagen: "/img/router.jpg".to_string(),
                cantidad: 2,
                stock: 4,
            }],
            total: 0.0,
        };
        cart.recompute_total();

        store_cart(&mut storage, FLOATING_CART_KEY, &cart);
        let loaded = load_cart(&storage, FLOATING_CART_KEY);
        assert_eq!(loaded, cart);
    }

    #[test]
    fn test_stored_total_is_recomputed_on_load() {
        let mut storage = MemoryStorage::new();
        storage.set(
            FLOATING_CART_KEY,
            r#"{"items":[{"id":"1","precio":1000,"cantidad":2,"stock":5}],"total":1}"#,
        );
        let cart = load_cart(&storage, FLOATING_CART_KEY);
        assert_eq!(cart.total, 2000.0);
    }

    #[test]
    fn test_slots_are_independent() {
        let mut storage = MemoryStorage::new();
        let cart = Cart {
            items: vec![CartItem {
                id: "1".to_string(),
                nombre: "Cable".to_string(),
                precio: 5000.0,
                imagen: String::new(),
                cantidad: 1,
                stock: 9,
            }],
            total: 5000.0,
        };
        store_cart(&mut storage, FLOATING_CART_KEY, &cart);
        assert!(load_cart(&storage, CHECKOUT_CART_KEY).items.is_empty());
    }
}
