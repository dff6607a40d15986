//! Quantity selector for the product detail page.
//!
//! Each page instance owns its selector; there is no shared module state.
//! The selectable ceiling is `available = stock - already_in_cart`, so a
//! product half-resident in the floating cart offers only the leftover
//! units. Direct numeric entry clamps into `[1, available]` (mutations on
//! the cart itself never clamp; see `engine`). Submit carries a fixed-window
//! reentrancy guard so double clicks send one add.

use std::time::{Duration, Instant};

use crate::engine::CartError;

const SUBMIT_GUARD: Duration = Duration::from_millis(1000);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectorPhase {
    Uninitialized,
    Ready,
    Adjusting,
    Submitting,
}

#[derive(Debug)]
pub struct QuantitySelector {
    stock: u32,
    in_cart: u32,
    quantity: u32,
    phase: SelectorPhase,
    last_submit: Option<Instant>,
    submit_guard: Duration,
}

impl QuantitySelector {
    pub fn new() -> Self {
        Self {
            stock: 0,
            in_cart: 0,
            quantity: 0,
            phase: SelectorPhase::Uninitialized,
            last_submit: None,
            submit_guard: SUBMIT_GUARD,
        }
    }

    #[cfg(test)]
    fn with_guard(guard: Duration) -> Self {
        Self {
            submit_guard: guard,
            ..Self::new()
        }
    }

    /// Bind the selector to a product's stock and the quantity of it already
    /// in the floating cart. With nothing available every control disables
    /// and the quantity is forced to 0.
    pub fn mount(&mut self, stock: u32, in_cart: u32) {
        self.stock = stock;
        self.in_cart = in_cart;
        self.quantity = if self.available() > 0 { 1 } else { 0 };
        self.phase = SelectorPhase::Ready;
    }

    pub fn available(&self) -> u32 {
        self.stock.saturating_sub(self.in_cart)
    }

    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    pub fn phase(&self) -> SelectorPhase {
        self.phase
    }

    pub fn is_disabled(&self) -> bool {
        self.phase == SelectorPhase::Uninitialized || self.available() == 0
    }

    pub fn increment(&mut self) -> Result<u32, CartError> {
        if self.is_disabled() {
            return Ok(self.quantity);
        }
        if self.quantity + 1 > self.available() {
            return Err(CartError::StockExceeded {
                remaining: self.available().saturating_sub(self.quantity),
            });
        }
        self.phase = SelectorPhase::Adjusting;
        self.quantity += 1;
        self.phase = SelectorPhase::Ready;
        Ok(self.quantity)
    }

    /// Decrement stops at 1; removal is the cart's job, not the selector's.
    pub fn decrement(&mut self) -> u32 {
        if !self.is_disabled() && self.quantity > 1 {
            self.quantity -= 1;
        }
        self.quantity
    }

    /// Direct numeric entry, clamped into `[1, available]`. Entry above the
    /// ceiling clamps and reports the headroom so the caller can show the
    /// usual "only N left" message.
    pub fn set_quantity(&mut self, requested: i64) -> Result<u32, CartError> {
        if self.is_disabled() {
            return Ok(self.quantity);
        }
        let available = i64::from(self.available());
        if requested > available {
            self.quantity = self.available();
            return Err(CartError::StockExceeded {
                remaining: self.available(),
            });
        }
        self.quantity = requested.max(1) as u32;
        Ok(self.quantity)
    }

    /// Enter `Submitting` unless a submit is already in flight. The guard
    /// releases after a fixed window, not on operation completion.
    pub fn try_submit(&mut self) -> bool {
        if self.is_disabled() {
            return false;
        }
        let now = Instant::now();
        if let Some(last) = self.last_submit {
            if now.duration_since(last) < self.submit_guard {
                return false;
            }
        }
        self.last_submit = Some(now);
        self.phase = SelectorPhase::Submitting;
        true
    }

    /// Return to `Ready` once the caller finishes its add.
    pub fn finish_submit(&mut self) {
        if self.phase == SelectorPhase::Submitting {
            self.phase = SelectorPhase::Ready;
        }
    }
}

impl Default for QuantitySelector {
    fn default() -> Self {
        Self::new()
    }
}
