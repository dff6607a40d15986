//! The cart engine: the single authority over cart mutations.
//!
//! Every UI entry point goes through this module, so stock validation lives
//! in exactly one place. Mutations that would exceed a product's stock
//! ceiling are rejected whole; nothing is clamped and nothing is partially
//! written. After each successful mutation the engine persists the cart and
//! publishes a `CartEvent` to its subscribers so dependent surfaces (badge
//! count, sidebar) stay consistent without knowing about each other.

use crate::cart::{Cart, CartItem};
use crate::storage::{
    load_cart, store_cart, CartStorage, CHECKOUT_CART_KEY, FLOATING_CART_KEY,
};

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum CartError {
    /// The mutation would exceed the stock ceiling; `remaining` is the exact
    /// headroom still purchasable (0 when the ceiling is already reached).
    #[error("solo quedan {remaining} unidades disponibles")]
    StockExceeded { remaining: u32 },
    #[error("producto no encontrado en el carrito: {id}")]
    ItemNotFound { id: String },
}

/// Published after every successful mutation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CartEvent {
    /// Sum of quantities across all lines.
    pub count: u32,
    pub total: f64,
}

type Subscriber = Box<dyn FnMut(&CartEvent)>;

pub struct CartEngine<S: CartStorage> {
    storage: S,
    subscribers: Vec<Subscriber>,
}

impl<S: CartStorage> CartEngine<S> {
    pub fn new(storage: S) -> Self {
        Self {
            storage,
            subscribers: Vec::new(),
        }
    }

    /// Register a subscriber for cart-changed events. Handlers are attached
    /// once here; state changes drive the updates from then on.
    pub fn subscribe(&mut self, subscriber: impl FnMut(&CartEvent) + 'static) {
        self.subscribers.push(Box::new(subscriber));
    }

    pub fn floating(&self) -> Cart {
        load_cart(&self.storage, FLOATING_CART_KEY)
    }

    pub fn checkout(&self) -> Cart {
        load_cart(&self.storage, CHECKOUT_CART_KEY)
    }

    /// Quantity of `id` already resident in the floating cart.
    pub fn quantity_in_cart(&self, id: &str) -> u32 {
        self.floating().find(id).map(|item| item.cantidad).unwrap_or(0)
    }

    /// Add `candidate` to the floating cart, merging with an existing line
    /// for the same product. A candidate that carries a stock refreshes the
    /// snapshot; a candidate without one (deserialized as 0) keeps the
    /// existing snapshot as the ceiling.
    pub fn add_item(&mut self, candidate: CartItem) -> Result<(), CartError> {
        let mut cart = self.floating();

        match cart.find_mut(&candidate.id) {
            Some(existing) => {
                let ceiling = if candidate.stock > 0 {
                    candidate.stock
                } else {
                    existing.stock
                };
                let requested = existing.cantidad + candidate.cantidad;
                if requested > ceiling {
                    return Err(CartError::StockExceeded {
                        remaining: ceiling.saturating_sub(existing.cantidad),
                    });
                }
                existing.cantidad = requested;
                existing.stock = ceiling;
            }
            None => {
                if candidate.cantidad > candidate.stock {
                    return Err(CartError::StockExceeded {
                        remaining: candidate.stock,
                    });
                }
                cart.items.push(candidate);
            }
        }

        self.commit(cart);
        Ok(())
    }

    /// Apply a ±1 quantity change. Decrementing to 0 removes the line;
    /// incrementing past the stock snapshot is rejected with the headroom.
    pub fn change_quantity(&mut self, id: &str, delta: i32) -> Result<(), CartError> {
        let mut cart = self.floating();
        let item = cart.find_mut(id).ok_or_else(|| CartError::ItemNotFound {
            id: id.to_string(),
        })?;

        if delta > 0 {
            if item.cantidad + 1 > item.stock {
                return Err(CartError::StockExceeded {
                    remaining: item.stock.saturating_sub(item.cantidad),
                });
            }
            item.cantidad += 1;
        } else if item.cantidad <= 1 {
            cart.items.retain(|item| item.id != id);
        } else {
            item.cantidad -= 1;
        }

        self.commit(cart);
        Ok(())
    }

    pub fn remove_item(&mut self, id: &str) {
        let mut cart = self.floating();
        cart.items.retain(|item| item.id != id);
        self.commit(cart);
    }

    /// Snapshot the floating cart into the checkout slot and empty the
    /// floating cart. Both writes happen before any event is published, so
    /// callers observe a single transition.
    pub fn move_to_checkout(&mut self) -> Cart {
        let mut cart = self.floating();
        cart.recompute_total();
        store_cart(&mut self.storage, CHECKOUT_CART_KEY, &cart);
        self.commit(Cart::default());
        cart
    }

    pub fn clear(&mut self) {
        self.storage.remove(FLOATING_CART_KEY);
        self.storage.remove(CHECKOUT_CART_KEY);
        self.publish(&CartEvent {
            count: 0,
            total: 0.0,
        });
    }

    fn commit(&mut self, mut cart: Cart) {
        cart.recompute_total();
        store_cart(&mut self.storage, FLOATING_CART_KEY, &cart);
        self.publish(&CartEvent {
            count: cart.count(),
            total: cart.total,
        });
    }

    fn publish(&mut self, event: &CartEvent) {
        for subscriber in &mut self.subscribers {
            subscriber(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn engine() -> CartEngine<MemoryStorage> {
        CartEngine::new(MemoryStorage::new())
    }

    fn candidate(id: &str, precio: f64, cantidad: u32, stock: u32) -> CartItem {
        CartItem {
            id: id.to_string(),
            nombre: format!("producto {id}"),
            precio,
            imagen: String::new(),
            cantidad,
            stock,
        }
    }

    #[test]
    fn test_add_then_rejected_add_leaves_cart_unchanged() {
        let mut engine = engine();
        engine
            .add_item(candidate("p1", 1000.0, 1, 2))
            .expect("first add within stock");
        let cart = engine.floating();
        assert_eq!(cart.items.len(), 1);
        assert_eq!(cart.items[0].cantidad, 1);
        assert_eq!(cart.total, 1000.0);

        let err = engine
            .add_item(candidate("p1", 1000.0, 2, 2))
            .expect_err("1 + 2 exceeds stock 2");
        assert_eq!(err, CartError::StockExceeded { remaining: 1 });

        let cart = engine.floating();
        assert_eq!(cart.items[0].cantidad, 1);
        assert_eq!(cart.total, 1000.0);
    }

    #[test]
    fn test_new_item_over_stock_rejected() {
        let mut engine = engine();
        let err = engine
            .add_item(candidate("p1", 500.0, 4, 3))
            .expect_err("4 > stock 3");
        assert_eq!(err, CartError::StockExceeded { remaining: 3 });
        assert!(engine.floating().is_empty());
    }

    #[test]
    fn test_add_without_stock_field_keeps_snapshot() {
        let mut engine = engine();
        engine.add_item(candidate("p1", 1000.0, 1, 5)).expect("first add");

        // Stored carts and some call sites omit the stock field; it reads
        // as 0 and must not clobber the snapshot.
        let sin_stock: CartItem = serde_json::from_value(serde_json::json!({
            "id": "p1", "precio": 1000, "cantidad": 1,
        }))
        .expect("deserialize candidate");
        engine
            .add_item(sin_stock)
            .expect("snapshot ceiling of 5 allows 1 + 1");

        let cart = engine.floating();
        assert_eq!(cart.items[0].cantidad, 2);
        assert_eq!(cart.items[0].stock, 5);

        let err = engine
            .add_item(candidate("p1", 1000.0, 1, 2))
            .expect_err("explicit stock 2 refreshes the ceiling");
        assert_eq!(err, CartError::StockExceeded { remaining: 0 });
    }

    #[test]
    fn test_accepted_adds_accumulate() {
        let mut engine = engine();
        engine.add_item(candidate("p1", 1000.0, 2, 5)).expect("add 2");
        engine.add_item(candidate("p1", 1000.0, 3, 5)).expect("add 3");
        let cart = engine.floating();
        assert_eq!(cart.items[0].cantidad, 5);
        assert_eq!(cart.total, 5000.0);
    }

    #[test]
    fn test_increment_to_ceiling_then_rejected_with_zero_remaining() {
        let mut engine = engine();
        engine.add_item(candidate("p1", 100.0, 3, 5)).expect("add 3");
        engine.change_quantity("p1", 1).expect("4 within stock 5");
        engine.change_quantity("p1", 1).expect("5 within stock 5");
        let err = engine
            .change_quantity("p1", 1)
            .expect_err("6 exceeds stock 5");
        assert_eq!(err, CartError::StockExceeded { remaining: 0 });
        assert_eq!(engine.floating().items[0].cantidad, 5);
    }

    #[test]
    fn test_decrement_from_one_removes_item() {
        let mut engine = engine();
        engine.add_item(candidate("p1", 100.0, 1, 5)).expect("add");
        engine.change_quantity("p1", -1).expect("decrement");
        assert!(engine.floating().is_empty());
        assert_eq!(engine.floating().total, 0.0);
    }

    #[test]
    fn test_remove_item_recomputes_total() {
        let mut engine = engine();
        engine.add_item(candidate("p1", 100.0, 2, 5)).expect("add p1");
        engine.add_item(candidate("p2", 50.0, 1, 5)).expect("add p2");
        engine.remove_item("p1");
        let cart = engine.floating();
        assert_eq!(cart.items.len(), 1);
        assert_eq!(cart.total, 50.0);
    }

    #[test]
    fn test_move_to_checkout_is_one_transition() {
        let mut engine = engine();
        engine.add_item(candidate("p1", 100.0, 1, 5)).expect("add p1");
        engine.add_item(candidate("p2", 200.0, 1, 5)).expect("add p2");

        let moved = engine.move_to_checkout();
        assert_eq!(moved.items.len(), 2);
        assert_eq!(engine.checkout().items.len(), 2);
        assert!(engine.floating().is_empty());
        assert_eq!(engine.floating().total, 0.0);
    }

    #[test]
    fn test_events_published_on_success_only() {
        let mut engine = engine();
        let events: Rc<RefCell<Vec<CartEvent>>> = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&events);
        engine.subscribe(move |event| sink.borrow_mut().push(*event));

        engine.add_item(candidate("p1", 1000.0, 2, 2)).expect("add");
        let _ = engine.add_item(candidate("p1", 1000.0, 1, 2));

        let events = events.borrow();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0], CartEvent { count: 2, total: 2000.0 });
    }

    #[test]
    fn test_count_in_events_sums_quantities() {
        let mut engine = engine();
        let last: Rc<RefCell<Option<CartEvent>>> = Rc::new(RefCell::new(None));
        let sink = Rc::clone(&last);
        engine.subscribe(move |event| *sink.borrow_mut() = Some(*event));

        engine.add_item(candidate("p1", 100.0, 2, 9)).expect("add p1");
        engine.add_item(candidate("p2", 100.0, 3, 9)).expect("add p2");
        assert_eq!(last.borrow().expect("event published").count, 5);
    }
}
