//! Identifier derivation for generated code.

use tablegen_core::{to_pascal_case, to_snake_case};

/// Rust reserved keywords that cannot be used as identifiers
/// Source: https://doc.rust-lang.org/reference/keywords.html
const RUST_KEYWORDS: &[&str] = &[
    // Strict keywords (2021 edition)
    "as", "async", "await", "break", "const", "continue", "crate", "dyn", "else", "enum", "extern",
    "false", "fn", "for", "if", "impl", "in", "let", "loop", "match", "mod", "move", "mut", "pub",
    "ref", "return", "self", "Self", "static", "struct", "super", "trait", "true", "type",
    "unsafe", "use", "where", "while",
    // Reserved keywords (may be used in future)
    "abstract", "become", "box", "do", "final", "macro", "override", "priv", "try", "typeof",
    "unsized", "virtual", "yield",
    // Weak keywords (context-sensitive, but best to avoid)
    "union", "dyn",
];

fn is_rust_keyword(name: &str) -> bool {
    RUST_KEYWORDS.contains(&name)
}

/// Struct name for a table: PascalCase of the table name.
pub fn struct_name(table: &str) -> String {
    to_pascal_case(table)
}

/// Field identifier for a column: snake_case, raw where the column name is
/// a Rust keyword ("type" is common in real schemas). Keywords that cannot
/// be raw identifiers get a trailing underscore instead.
pub fn field_ident(column: &str) -> String {
    let ident = sanitize(&to_snake_case(column));
    if is_rust_keyword(&ident) {
        if matches!(ident.as_str(), "self" | "Self" | "super" | "crate") {
            format!("{ident}_")
        } else {
            format!("r#{ident}")
        }
    } else {
        ident
    }
}

/// Force the name into identifier shape: non-alphanumerics become
/// underscores, a leading digit gets an underscore prefix.
fn sanitize(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for c in name.chars() {
        if c.is_ascii_alphanumeric() || c == '_' {
            out.push(c);
        } else {
            out.push('_');
        }
    }
    if out.chars().next().is_some_and(|c| c.is_ascii_digit()) {
        out.insert(0, '_');
    }
    if out.is_empty() {
        out.push('_');
    }
    out
}
