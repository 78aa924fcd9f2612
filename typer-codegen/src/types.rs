//! Type mapping from schema types to Rust types, and identifier shaping.

use convert_case::{Case, Casing};
use proc_macro2::{Ident, Span, TokenStream};
use quote::{format_ident, quote};

use typer_schema::ast::{OpaqueKind, ScalarKind};
use typer_schema::naming::is_rust_keyword;

/// Keywords that cannot be written as raw identifiers.
const NON_RAW_KEYWORDS: &[&str] = &["self", "Self", "super", "crate", "_"];

/// Convert a schema scalar kind to its Rust type token stream.
pub fn scalar_to_rust_type(kind: ScalarKind) -> TokenStream {
    match kind {
        ScalarKind::Boolean => quote! { bool },
        ScalarKind::Integer => quote! { i64 },
        ScalarKind::Number => quote! { f64 },
        ScalarKind::String => quote! { String },
    }
}

/// Convert an opaque kind to the runtime's untyped container.
pub fn opaque_to_rust_type(kind: OpaqueKind, runtime: &TokenStream) -> TokenStream {
    match kind {
        OpaqueKind::Object => quote! { #runtime::JsonObject },
        OpaqueKind::Any => quote! { #runtime::JsonValue },
    }
}

/// Wrap a type in `Option` when the field may be absent.
pub fn apply_presence(base_type: TokenStream, required: bool) -> TokenStream {
    if required {
        base_type
    } else {
        quote! { Option<#base_type> }
    }
}

/// Convert a plan name to snake_case.
///
/// Characters that cannot appear in an identifier separate words.
pub fn to_snake_case(name: &str) -> String {
    let spaced: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { ' ' })
        .collect();
    spaced.trim().to_case(Case::Snake)
}

/// Derive a field or method name from a plan name.
///
/// The result is always usable as an identifier through [`field_ident`].
pub fn member_name(name: &str) -> String {
    let mut snake = to_snake_case(name);
    if snake.is_empty() {
        snake.push_str("field");
    }
    if snake.starts_with(|c: char| c.is_ascii_digit()) {
        snake.insert(0, '_');
    }
    if NON_RAW_KEYWORDS.contains(&snake.as_str()) {
        snake.push('_');
    }
    snake
}

/// Build an identifier for a member name, using a raw identifier for keywords.
pub fn field_ident(name: &str) -> Ident {
    if is_rust_keyword(name) && !NON_RAW_KEYWORDS.contains(&name) {
        Ident::new_raw(name, Span::call_site())
    } else {
        format_ident!("{}", name)
    }
}

/// Build a type or case identifier from an already formatted name.
pub fn type_ident(name: &str) -> Ident {
    format_ident!("{}", name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_to_rust_type() {
        assert_eq!(scalar_to_rust_type(ScalarKind::Integer).to_string(), "i64");
        assert_eq!(scalar_to_rust_type(ScalarKind::Number).to_string(), "f64");
        assert_eq!(scalar_to_rust_type(ScalarKind::String).to_string(), "String");
    }

    #[test]
    fn test_opaque_to_rust_type() {
        let runtime = quote! { ::typer_runtime };
        let ty = opaque_to_rust_type(OpaqueKind::Object, &runtime);
        assert!(ty.to_string().contains("JsonObject"));
    }

    #[test]
    fn test_apply_presence() {
        assert_eq!(apply_presence(quote! { bool }, true).to_string(), "bool");
        assert_eq!(apply_presence(quote! { bool }, false).to_string(), "Option < bool >");
    }

    #[test]
    fn test_to_snake_case() {
        assert_eq!(to_snake_case("first_name"), "first_name");
        assert_eq!(to_snake_case("firstName"), "first_name");
        assert_eq!(to_snake_case("User Signed Up"), "user_signed_up");
        assert_eq!(to_snake_case("ip-address"), "ip_address");
    }

    #[test]
    fn test_member_name_edge_cases() {
        assert_eq!(member_name("$$$"), "field");
        assert_eq!(member_name("self"), "self_");
        assert_eq!(member_name("type"), "type");
    }

    #[test]
    fn test_field_ident_keywords() {
        assert_eq!(field_ident("type").to_string(), "r#type");
        assert_eq!(field_ident("email").to_string(), "email");
    }
}
