//! Storefront cart state engine.
//!
//! Layers:
//!
//! - `cart`: the persisted cart data model with lenient deserialization.
//! - `storage`: the key/value seam between the engine and whatever persists
//!   the cart (browser storage in production, memory in tests), with
//!   separate slots for the floating and checkout carts.
//! - `engine`: the single authority over mutations; enforces stock ceilings
//!   and fans out change events to registered subscribers.
//! - `selector`: per-page-instance quantity selector state machine.
//! - `toast`: single-slot transient notification state.
//!
//! The rule throughout: mutations reject when they would exceed stock;
//! only direct numeric input clamps.

pub mod cart;
pub mod engine;
pub mod selector;
pub mod storage;
pub mod toast;

pub use cart::{Cart, CartItem};
pub use engine::{CartEngine, CartError, CartEvent};
pub use selector::{QuantitySelector, SelectorPhase};
pub use storage::{
    load_cart, store_cart, CartStorage, MemoryStorage, CHECKOUT_CART_KEY, FLOATING_CART_KEY,
};
pub use toast::{Toast, ToastHost, ToastKind};
