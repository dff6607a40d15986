//! Template reader: scans raw markup for `{{...}}` directives and parses the
//! result into a small AST.
//!
//! The grammar is deliberately tiny:
//!
//! - `{{name}}` / `{{object.property}}`: variable substitution
//! - `{{#each path}} ... {{/each}}`: iteration over an array
//! - `{{#if condition}} ... {{else}} ... {{/if}}`: conditional, where the
//!   condition is a bare path or a binary comparison
//!
//! Parsing is total: malformed input (an unclosed block, a stray `{{/if}}`)
//! degrades to literal text instead of failing, and the renderer's cleanup
//! pass strips whatever directive syntax is left over. Blocks nest to any
//! depth because the parser recurses; there is no iterate-until-stable pass.

/// A parsed template fragment.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Text(String),
    /// Dotted path into the render context.
    Var(String),
    Each {
        path: String,
        body: Vec<Node>,
    },
    If {
        cond: Condition,
        then: Vec<Node>,
        otherwise: Vec<Node>,
    },
}

/// An `{{#if ...}}` condition.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// Bare path, tested for truthiness.
    Truthy(String),
    Compare {
        lhs: Operand,
        op: CmpOp,
        rhs: Operand,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    Bool(bool),
    Null,
    Undefined,
    Number(f64),
    Str(String),
    /// Dotted path or bare name, resolved against the context.
    Path(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CmpOp {
    StrictEq,
    StrictNe,
    Eq,
    Ne,
    Ge,
    Le,
    Gt,
    Lt,
}

/// Parse a template source into its node sequence.
pub fn parse(source: &str) -> Vec<Node> {
    let tokens = scan(source);
    let mut pos = 0;
    let (nodes, _) = parse_block(&tokens, &mut pos, Terminator::None);
    nodes
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Text(String),
    Var(String),
    OpenEach { path: String, raw: String },
    OpenIf { cond: String, raw: String },
    Else { raw: String },
    CloseEach { raw: String },
    CloseIf { raw: String },
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Terminator {
    None,
    Each,
    If,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Ending {
    Eof,
    Close,
    Else,
}

fn scan(source: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut rest = source;

    while let Some(start) = rest.find("{{") {
        let Some(end) = rest[start + 2..].find("}}") else {
            // No closing braces: everything left is text.
            break;
        };
        if start > 0 {
            tokens.push(Token::Text(rest[..start].to_string()));
        }
        let inner = &rest[start + 2..start + 2 + end];
        let raw = &rest[start..start + 2 + end + 2];
        tokens.push(classify(inner, raw));
        rest = &rest[start + 2 + end + 2..];
    }

    if !rest.is_empty() {
        tokens.push(Token::Text(rest.to_string()));
    }
    tokens
}

fn classify(inner: &str, raw: &str) -> Token {
    let trimmed = inner.trim();
    if let Some(path) = trimmed.strip_prefix("#each") {
        return Token::OpenEach {
            path: path.trim().to_string(),
            raw: raw.to_string(),
        };
    }
    if let Some(cond) = trimmed.strip_prefix("#if") {
        return Token::OpenIf {
            cond: cond.trim().to_string(),
            raw: raw.to_string(),
        };
    }
    match trimmed {
        "else" => Token::Else {
            raw: raw.to_string(),
        },
        "/each" => Token::CloseEach {
            raw: raw.to_string(),
        },
        "/if" => Token::CloseIf {
            raw: raw.to_string(),
        },
        _ => Token::Var(trimmed.to_string()),
    }
}

fn parse_block(tokens: &[Token], pos: &mut usize, term: Terminator) -> (Vec<Node>, Ending) {
    let mut nodes = Vec::new();

    while *pos < tokens.len() {
        let token = tokens[*pos].clone();
        *pos += 1;
        match token {
            Token::Text(text) => nodes.push(Node::Text(text)),
            Token::Var(path) => nodes.push(Node::Var(path)),
            Token::OpenEach { path, raw } => {
                let (body, ending) = parse_block(tokens, pos, Terminator::Each);
                if ending == Ending::Close {
                    nodes.push(Node::Each { path, body });
                } else {
                    // Unclosed block: keep the opening tag as text so the
                    // cleanup pass can strip it.
                    nodes.push(Node::Text(raw));
                    nodes.extend(body);
                }
            }
            Token::OpenIf { cond, raw } => {
                let (then, ending) = parse_block(tokens, pos, Terminator::If);
                if ending == Ending::Eof {
                    nodes.push(Node::Text(raw));
                    nodes.extend(then);
                    continue;
                }
                let otherwise = if ending == Ending::Else {
                    let (otherwise, _) = parse_block(tokens, pos, Terminator::If);
                    otherwise
                } else {
                    Vec::new()
                };
                nodes.push(Node::If {
                    cond: parse_condition(&cond),
                    then,
                    otherwise,
                });
            }
            Token::Else { raw } => {
                if term == Terminator::If {
                    return (nodes, Ending::Else);
                }
                nodes.push(Node::Text(raw));
            }
            Token::CloseEach { raw } => {
                if term == Terminator::Each {
                    return (nodes, Ending::Close);
                }
                nodes.push(Node::Text(raw));
            }
            Token::CloseIf { raw } => {
                if term == Terminator::If {
                    return (nodes, Ending::Close);
                }
                nodes.push(Node::Text(raw));
            }
        }
    }

    (nodes, Ending::Eof)
}

// Longer operators first so `===` is never read as `==` followed by `=`,
// and `>=` is never read as `>`.
const OPERATORS: [(&str, CmpOp); 8] = [
    ("===", CmpOp::StrictEq),
    ("!==", CmpOp::StrictNe),
    ("==", CmpOp::Eq),
    ("!=", CmpOp::Ne),
    (">=", CmpOp::Ge),
    ("<=", CmpOp::Le),
    (">", CmpOp::Gt),
    ("<", CmpOp::Lt),
];

pub(crate) fn parse_condition(src: &str) -> Condition {
    for (symbol, op) in OPERATORS {
        if let Some(idx) = find_outside_quotes(src, symbol) {
            let lhs = parse_operand(&src[..idx]);
            let rhs = parse_operand(&src[idx + symbol.len()..]);
            return Condition::Compare { lhs, op, rhs };
        }
    }
    Condition::Truthy(src.trim().to_string())
}

/// Find `needle` in `haystack`, skipping anything inside quoted literals.
fn find_outside_quotes(haystack: &str, needle: &str) -> Option<usize> {
    let bytes = haystack.as_bytes();
    let needle_bytes = needle.as_bytes();
    let mut quote: Option<u8> = None;
    let mut i = 0;

    while i + needle_bytes.len() <= bytes.len() {
        let c = bytes[i];
        match quote {
            Some(q) => {
                if c == q {
                    quote = None;
                }
            }
            None => {
                if c == b'\'' || c == b'"' {
                    quote = Some(c);
                } else if bytes[i..].starts_with(needle_bytes) {
                    return Some(i);
                }
            }
        }
        i += 1;
    }
    None
}

fn parse_operand(src: &str) -> Operand {
    let trimmed = src.trim();
    if trimmed.len() >= 2 {
        let first = trimmed.as_bytes()[0];
        let last = trimmed.as_bytes()[trimmed.len() - 1];
        if (first == b'\'' || first == b'"') && first == last {
            return Operand::Str(trimmed[1..trimmed.len() - 1].to_string());
        }
    }
    match trimmed {
        "true" => return Operand::Bool(true),
        "false" => return Operand::Bool(false),
        "null" => return Operand::Null,
        "undefined" => return Operand::Undefined,
        _ => {}
    }
    if let Ok(n) = trimmed.parse::<f64>() {
        return Operand::Number(n);
    }
    Operand::Path(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text() {
        assert_eq!(parse("hola"), vec![Node::Text("hola".to_string())]);
    }

    #[test]
    fn test_var_and_text() {
        let nodes = parse("<h1>{{titulo}}</h1>");
        assert_eq!(
            nodes,
            vec![
                Node::Text("<h1>".to_string()),
                Node::Var("titulo".to_string()),
                Node::Text("</h1>".to_string()),
            ]
        );
    }

    #[test]
    fn test_each_block() {
        let nodes = parse("{{#each productos}}<li>{{nombre}}</li>{{/each}}");
        assert_eq!(
            nodes,
            vec![Node::Each {
                path: "productos".to_string(),
                body: vec![
                    Node::Text("<li>".to_string()),
                    Node::Var("nombre".to_string()),
                    Node::Text("</li>".to_string()),
                ],
            }]
        );
    }

    #[test]
    fn test_if_else_block() {
        let nodes = parse("{{#if disponible}}si{{else}}no{{/if}}");
        assert_eq!(
            nodes,
            vec![Node::If {
                cond: Condition::Truthy("disponible".to_string()),
                then: vec![Node::Text("si".to_string())],
                otherwise: vec![Node::Text("no".to_string())],
            }]
        );
    }

    #[test]
    fn test_nested_blocks() {
        let nodes = parse("{{#each items}}{{#if activo}}{{nombre}}{{/if}}{{/each}}");
        let Node::Each { body, .. } = &nodes[0] else {
            panic!("expected each node");
        };
        assert!(matches!(body[0], Node::If { .. }));
    }

    #[test]
    fn test_comparison_operators_longest_first() {
        let cond = parse_condition("total >= 100");
        assert_eq!(
            cond,
            Condition::Compare {
                lhs: Operand::Path("total".to_string()),
                op: CmpOp::Ge,
                rhs: Operand::Number(100.0),
            }
        );

        let cond = parse_condition("estado === 'activo'");
        assert_eq!(
            cond,
            Condition::Compare {
                lhs: Operand::Path("estado".to_string()),
                op: CmpOp::StrictEq,
                rhs: Operand::Str("activo".to_string()),
            }
        );

        let cond = parse_condition("valor !== null");
        assert_eq!(
            cond,
            Condition::Compare {
                lhs: Operand::Path("valor".to_string()),
                op: CmpOp::StrictNe,
                rhs: Operand::Null,
            }
        );
    }

    #[test]
    fn test_operator_inside_quotes_ignored() {
        let cond = parse_condition("mensaje == 'a < b'");
        assert_eq!(
            cond,
            Condition::Compare {
                lhs: Operand::Path("mensaje".to_string()),
                op: CmpOp::Eq,
                rhs: Operand::Str("a < b".to_string()),
            }
        );
    }

    #[test]
    fn test_unclosed_block_degrades_to_text() {
        let nodes = parse("{{#if flag}}hola");
        assert_eq!(
            nodes,
            vec![
                Node::Text("{{#if flag}}".to_string()),
                Node::Text("hola".to_string()),
            ]
        );
    }

    #[test]
    fn test_stray_close_is_text() {
        let nodes = parse("hola{{/if}}");
        assert_eq!(
            nodes,
            vec![
                Node::Text("hola".to_string()),
                Node::Text("{{/if}}".to_string()),
            ]
        );
    }

    #[test]
    fn test_dotted_each_path() {
        let nodes = parse("{{#each pedido.items}}x{{/each}}");
        assert_eq!(
            nodes,
            vec![Node::Each {
                path: "pedido.items".to_string(),
                body: vec![Node::Text("x".to_string())],
            }]
        );
    }
}
