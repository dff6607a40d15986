//! View resolution and layout composition.
//!
//! Pages live under `<views_root>/<name>.html` and are wrapped in
//! `layouts/main.html` by replacing the layout's `{{content}}` marker with the
//! page body BEFORE any directive is parsed. A context entry `standalone`
//! set to a truthy value skips the layout (used by the admin login page).
//! Unlike directive resolution, a missing view file is fatal to the request.

use std::fs;
use std::path::{Component, Path, PathBuf};

use crate::reader::parse;
use crate::runtime::{render_nodes, strip_unresolved, truthy, RenderContext};

const LAYOUT_VIEW: &str = "layouts/main";
const CONTENT_MARKER: &str = "{{content}}";

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("view not found: {0}")]
    ViewNotFound(String),
    #[error("failed to read view {name}: {source}")]
    Io {
        name: String,
        #[source]
        source: std::io::Error,
    },
}

/// Renders named views against a per-request context.
#[derive(Debug, Clone)]
pub struct ViewEngine {
    views_root: PathBuf,
}

impl ViewEngine {
    pub fn new(views_root: impl Into<PathBuf>) -> Self {
        Self {
            views_root: views_root.into(),
        }
    }

    pub fn views_root(&self) -> &Path {
        &self.views_root
    }

    /// Render `<name>.html` wrapped in the main layout (unless the context
    /// marks the view `standalone`), then strip leftover directive syntax.
    pub fn render(&self, name: &str, ctx: &RenderContext) -> Result<String, RenderError> {
        let page = self.read_view(name)?;

        let standalone = truthy(ctx.get("standalone").as_ref());
        let source = if standalone || name == LAYOUT_VIEW {
            page
        } else {
            let layout = self.read_view(LAYOUT_VIEW)?;
            layout.replacen(CONTENT_MARKER, &page, 1)
        };

        let html = render_nodes(&parse(&source), ctx);
        Ok(strip_unresolved(&html))
    }

    fn read_view(&self, name: &str) -> Result<String, RenderError> {
        let rel = sanitize_view_name(name)
            .ok_or_else(|| RenderError::ViewNotFound(name.to_string()))?;
        let path = self.views_root.join(rel).with_extension("html");
        if !path.is_file() {
            return Err(RenderError::ViewNotFound(name.to_string()));
        }
        fs::read_to_string(&path).map_err(|source| RenderError::Io {
            name: name.to_string(),
            source,
        })
    }
}

/// View names are relative paths without parent or root components.
fn sanitize_view_name(name: &str) -> Option<PathBuf> {
    let trimmed = name.trim_start_matches('/');
    if trimmed.is_empty() {
        return None;
    }
    let rel = PathBuf::from(trimmed);
    for comp in rel.components() {
        if matches!(
            comp,
            Component::ParentDir | Component::RootDir | Component::Prefix(_)
        ) {
            return None;
        }
    }
    Some(rel)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};
    use tempfile::TempDir;

    fn views_dir() -> TempDir {
        let dir = TempDir::new().expect("create temp views dir");
        std::fs::create_dir_all(dir.path().join("layouts")).expect("create layouts dir");
        std::fs::write(
            dir.path().join("layouts/main.html"),
            "<html><body>{{content}}</body></html>",
        )
        .expect("write layout");
        dir
    }

    fn ctx(value: Value) -> RenderContext {
        let Value::Object(map) = value else {
            panic!("fixture must be an object");
        };
        RenderContext::from_map(map)
    }

    #[test]
    fn test_page_wrapped_in_layout() {
        let dir = views_dir();
        std::fs::write(dir.path().join("home.html"), "<h1>{{titulo}}</h1>")
            .expect("write page");

        let engine = ViewEngine::new(dir.path());
        let html = engine
            .render("home", &ctx(json!({"titulo": "Tienda"})))
            .expect("render home");
        assert_eq!(html, "<html><body><h1>Tienda</h1></body></html>");
    }

    #[test]
    fn test_standalone_skips_layout() {
        let dir = views_dir();
        std::fs::create_dir_all(dir.path().join("admin")).expect("create admin dir");
        std::fs::write(dir.path().join("admin/login.html"), "<form>{{titulo}}</form>")
            .expect("write login page");

        let engine = ViewEngine::new(dir.path());
        let html = engine
            .render(
                "admin/login",
                &ctx(json!({"titulo": "Acceso", "standalone": true})),
            )
            .expect("render login");
        assert_eq!(html, "<form>Acceso</form>");
    }

    #[test]
    fn test_layout_directives_share_the_context() {
        let dir = views_dir();
        std::fs::write(
            dir.path().join("layouts/main.html"),
            "<nav>{{#each categorias}}[{{nombre}}]{{/each}}</nav>{{content}}",
        )
        .expect("write layout");
        std::fs::write(dir.path().join("productos.html"), "<p>{{total}} productos</p>")
            .expect("write page");

        let engine = ViewEngine::new(dir.path());
        let html = engine
            .render(
                "productos",
                &ctx(json!({
                    "categorias": [{"nombre": "Redes"}, {"nombre": "Cámaras"}],
                    "total": 7,
                })),
            )
            .expect("render productos");
        assert_eq!(html, "<nav>[Redes][Cámaras]</nav><p>7 productos</p>");
    }

    #[test]
    fn test_missing_view_is_an_error() {
        let dir = views_dir();
        let engine = ViewEngine::new(dir.path());
        let err = engine
            .render("no-existe", &RenderContext::new())
            .expect_err("missing view must fail");
        assert!(matches!(err, RenderError::ViewNotFound(_)));
    }

    #[test]
    fn test_traversal_in_view_name_rejected() {
        let dir = views_dir();
        let engine = ViewEngine::new(dir.path());
        let err = engine
            .render("../etc/passwd", &RenderContext::new())
            .expect_err("parent components must be rejected");
        assert!(matches!(err, RenderError::ViewNotFound(_)));
    }

    #[test]
    fn test_unresolved_directives_stripped_from_output() {
        let dir = views_dir();
        std::fs::write(dir.path().join("roto.html"), "<p>{{#if abierto}}hola</p>")
            .expect("write page");

        let engine = ViewEngine::new(dir.path());
        let html = engine
            .render("roto", &RenderContext::new())
            .expect("render roto");
        assert_eq!(html, "<html><body><p>hola</p></body></html>");
    }

    #[test]
    fn test_render_is_deterministic() {
        let dir = views_dir();
        std::fs::write(dir.path().join("home.html"), "{{#each xs}}{{this}}{{/each}}")
            .expect("write page");

        let engine = ViewEngine::new(dir.path());
        let c = ctx(json!({"xs": [1, 2, 3]}));
        let first = engine.render("home", &c).expect("first render");
        let second = engine.render("home", &c).expect("second render");
        assert_eq!(first, second);
    }
}
