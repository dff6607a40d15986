//! Storefront template renderer.
//!
//! The crate separates rendering into layers:
//!
//! - `reader`: scans markup for `{{...}}` directives and parses them into a
//!   small AST. Parsing is total; malformed input degrades to literal text.
//! - `runtime`: evaluates the AST against a per-request JSON context and
//!   strips whatever directive syntax survives.
//! - `views`: resolves named view files, composes page + layout through the
//!   `{{content}}` marker, and drives the two layers above.
//! - `helpers`: `es-CO` price and date formatting, applied by callers before
//!   values enter the context.
//!
//! Resolution failures inside a template are never errors: a missing name
//! renders as empty text. Only a missing view file fails a render.

pub mod helpers;
pub mod reader;
pub mod runtime;
pub mod views;

pub use reader::{CmpOp, Condition, Node, Operand, parse};
pub use runtime::{RenderContext, render_nodes, strip_unresolved};
pub use views::{RenderError, ViewEngine};
