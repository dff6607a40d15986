//! Evaluation of a parsed template against a render context.
//!
//! The context is a flat map of JSON values built per request and discarded
//! after the response. Resolution is deliberately fail-open: a missing name
//! or a directive that cannot be resolved renders as empty text, never as an
//! error. Only file-level problems (see `views`) are fatal.

use serde_json::{Map, Value};

use crate::reader::{CmpOp, Condition, Node, Operand};

/// Per-request name/value mapping for template evaluation.
///
/// Values are either scalars, arrays-of-objects (for `{{#each}}`), or nested
/// objects reached through dotted paths.
#[derive(Debug, Clone, Default)]
pub struct RenderContext {
    data: Map<String, Value>,
}

impl RenderContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_map(data: Map<String, Value>) -> Self {
        Self { data }
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Value) {
        self.data.insert(key.into(), value);
    }

    /// Merge another layer into the context; later entries win.
    pub fn merge(&mut self, layer: Map<String, Value>) {
        for (k, v) in layer {
            self.data.insert(k, v);
        }
    }

    /// Dotted-path lookup (`producto.nombre`). Missing segments yield `None`.
    pub fn get(&self, path: &str) -> Option<Value> {
        map_get(&self.data, path)
    }
}

fn map_get(map: &Map<String, Value>, path: &str) -> Option<Value> {
    if path.is_empty() {
        return None;
    }
    let mut parts = path.split('.');
    let first = parts.next()?;
    let mut current = map.get(first)?;
    for part in parts {
        match current {
            Value::Object(obj) => current = obj.get(part)?,
            Value::Array(arr) => {
                let idx = part.parse::<usize>().ok()?;
                current = arr.get(idx)?;
            }
            _ => return None,
        }
    }
    Some(current.clone())
}

struct EachScope<'a> {
    element: &'a Value,
    index: usize,
}

/// Render a node sequence against the context.
pub fn render_nodes(nodes: &[Node], ctx: &RenderContext) -> String {
    let mut out = String::new();
    render_into(&mut out, nodes, ctx, None);
    out
}

fn render_into(out: &mut String, nodes: &[Node], ctx: &RenderContext, scope: Option<&EachScope>) {
    for node in nodes {
        match node {
            Node::Text(text) => out.push_str(text),
            Node::Var(path) => out.push_str(&resolve_var(path, ctx, scope)),
            Node::Each { path, body } => {
                let Some(Value::Array(items)) = ctx.get(path) else {
                    // Not an array (or missing): the block renders as empty.
                    continue;
                };
                for (index, element) in items.iter().enumerate() {
                    let inner = EachScope { element, index };
                    render_into(out, body, ctx, Some(&inner));
                }
            }
            Node::If {
                cond,
                then,
                otherwise,
            } => {
                let branch = if eval_condition(cond, ctx) {
                    then
                } else {
                    otherwise
                };
                render_into(out, branch, ctx, scope);
            }
        }
    }
}

/// Variable resolution order inside an `{{#each}}` body: context scalars win
/// over element properties (scalar substitution runs conceptually first),
/// then the element's own properties, then `{{this}}` / `{{@index}}`.
/// Dotted paths always resolve against the root context.
fn resolve_var(path: &str, ctx: &RenderContext, scope: Option<&EachScope>) -> String {
    if let Some(scope) = scope {
        if path == "this" {
            return display_string(scope.element);
        }
        if path == "@index" {
            return scope.index.to_string();
        }
        if !path.contains('.') {
            if let Some(value) = ctx.get(path) {
                if let Some(s) = scalar_string(&value) {
                    return s;
                }
            }
            if let Value::Object(props) = scope.element {
                if let Some(value) = props.get(path) {
                    return scalar_string(value).unwrap_or_default();
                }
            }
            return String::new();
        }
    }

    match ctx.get(path) {
        Some(value) => scalar_string(&value).unwrap_or_default(),
        None => String::new(),
    }
}

/// String form of a scalar; `None` for arrays and objects, which are never
/// substituted directly (the cleanup pass removes the directive instead).
fn scalar_string(value: &Value) -> Option<String> {
    match value {
        Value::Null => Some(String::new()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(format_number(n)),
        Value::String(s) => Some(s.clone()),
        Value::Array(_) | Value::Object(_) => None,
    }
}

fn format_number(n: &serde_json::Number) -> String {
    if let Some(i) = n.as_i64() {
        return i.to_string();
    }
    match n.as_f64() {
        Some(f) if f.fract() == 0.0 && f.is_finite() => format!("{:.0}", f),
        _ => n.to_string(),
    }
}

/// String form used by `{{this}}`: objects and arrays become JSON.
fn display_string(value: &Value) -> String {
    match value {
        Value::Array(_) | Value::Object(_) => value.to_string(),
        other => scalar_string(other).unwrap_or_default(),
    }
}

pub(crate) fn truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().map(|f| f != 0.0 && !f.is_nan()).unwrap_or(false),
        Some(Value::String(s)) => !s.is_empty(),
        // Arrays and objects are truthy regardless of contents.
        Some(Value::Array(_)) | Some(Value::Object(_)) => true,
    }
}

fn eval_condition(cond: &Condition, ctx: &RenderContext) -> bool {
    match cond {
        Condition::Truthy(path) => truthy(ctx.get(path).as_ref()),
        Condition::Compare { lhs, op, rhs } => {
            let a = resolve_operand(lhs, ctx);
            let b = resolve_operand(rhs, ctx);
            match op {
                CmpOp::Eq | CmpOp::StrictEq => values_equal(&a, &b),
                CmpOp::Ne | CmpOp::StrictNe => !values_equal(&a, &b),
                CmpOp::Gt => compare(&a, &b).is_some_and(|o| o.is_gt()),
                CmpOp::Lt => compare(&a, &b).is_some_and(|o| o.is_lt()),
                CmpOp::Ge => compare(&a, &b).is_some_and(|o| !o.is_lt()),
                CmpOp::Le => compare(&a, &b).is_some_and(|o| !o.is_gt()),
            }
        }
    }
}

/// `undefined` and missing paths both resolve to null; the context holds
/// JSON values, so the strict and loose operator variants coincide.
fn resolve_operand(operand: &Operand, ctx: &RenderContext) -> Value {
    match operand {
        Operand::Bool(b) => Value::Bool(*b),
        Operand::Null | Operand::Undefined => Value::Null,
        Operand::Number(n) => serde_json::Number::from_f64(*n)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        Operand::Str(s) => Value::String(s.clone()),
        Operand::Path(path) => ctx.get(path).unwrap_or(Value::Null),
    }
}

fn as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.parse::<f64>().ok(),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        _ => None,
    }
}

fn values_equal(a: &Value, b: &Value) -> bool {
    if a == b {
        return true;
    }
    // Null only equals null; `"" == null` must not match through the
    // display-string fallback (both sides render as "").
    if matches!(a, Value::Null) || matches!(b, Value::Null) {
        return false;
    }
    match (as_f64(a), as_f64(b)) {
        (Some(x), Some(y)) => x == y,
        _ => display_string(a) == display_string(b),
    }
}

fn compare(a: &Value, b: &Value) -> Option<std::cmp::Ordering> {
    match (as_f64(a), as_f64(b)) {
        (Some(x), Some(y)) => x.partial_cmp(&y),
        _ => Some(display_string(a).cmp(&display_string(b))),
    }
}

/// Strip any directive syntax that survived rendering so raw `{{...}}`
/// fragments never reach the client.
pub fn strip_unresolved(html: &str) -> String {
    let mut out = html.to_string();
    out = strip_blocks(&out, "{{#each", "{{/each}}");
    out = strip_blocks(&out, "{{#if", "{{/if}}");
    strip_tags(&out)
}

fn strip_blocks(html: &str, open: &str, close: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut rest = html;
    while let Some(start) = rest.find(open) {
        out.push_str(&rest[..start]);
        match rest[start..].find(close) {
            Some(end) => rest = &rest[start + end + close.len()..],
            None => {
                // Unmatched open tag: drop the tag alone.
                match rest[start..].find("}}") {
                    Some(tag_end) => rest = &rest[start + tag_end + 2..],
                    None => return out,
                }
            }
        }
    }
    out.push_str(rest);
    out
}

fn strip_tags(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut rest = html;
    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        match rest[start..].find("}}") {
            Some(end) => rest = &rest[start + end + 2..],
            None => {
                out.push_str(&rest[start..]);
                return out;
            }
        }
    }
    out.push_str(rest);
    out
}
