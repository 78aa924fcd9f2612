//! Code generators for plan types, their encoders, and the event wrapper.

mod encode_gen;
mod enum_gen;
mod type_gen;
mod variant_gen;
mod wrapper;

pub use encode_gen::generate_encode_impl;
pub use enum_gen::generate_enum;
pub use type_gen::{generate_alias, generate_record};
pub use variant_gen::generate_variant;
pub use wrapper::{WrapperOutput, WrapperSettings, generate_wrapper};

use proc_macro2::{Ident, TokenStream};
use quote::quote;

use typer_schema::ast::{PropertyType, TypeName};
use typer_schema::error::{SchemaError, SchemaResult};
use typer_schema::naming::{NameRegistry, format_class_name};

use crate::types::{field_ident, member_name, opaque_to_rust_type, scalar_to_rust_type, type_ident};

const TYPE_SCOPE: &str = "types";
const METHOD_SCOPE: &str = "methods";

/// Generate documentation comment tokens from an optional doc string.
pub fn generate_doc_comment(doc: Option<&str>) -> TokenStream {
    match doc {
        Some(doc) => {
            let lines: Vec<_> = doc.lines().map(|line| format!(" {}", line.trim())).collect();
            let doc_lines = lines.iter().map(|line| {
                quote! { #[doc = #line] }
            });
            quote! { #(#doc_lines)* }
        }
        None => TokenStream::new(),
    }
}

/// Identifier state shared by all generators of one run.
///
/// Type names live in one scope for the whole output. Field names are
/// scoped per record or per variant case, method names per wrapper.
#[derive(Debug)]
pub struct EmitContext {
    registry: NameRegistry,
    runtime: TokenStream,
}

impl EmitContext {
    /// Create a context emitting paths into `runtime`.
    pub fn new(runtime: TokenStream) -> Self {
        Self {
            registry: NameRegistry::new(),
            runtime,
        }
    }

    /// Path of the runtime crate in generated code.
    pub fn runtime(&self) -> &TokenStream {
        &self.runtime
    }

    /// Claim a type name that does not come from the plan.
    pub fn reserve_type(&mut self, id: &str, name: &str) -> SchemaResult<Ident> {
        self.registry
            .register(id, TYPE_SCOPE, name)
            .map(|n| type_ident(&n))
    }

    /// Identifier of a named plan type.
    pub fn type_ident(&mut self, name: &TypeName) -> SchemaResult<Ident> {
        let formatted = format_class_name(name.prefix(), &name.name);
        if formatted.is_empty() {
            return Err(SchemaError::invalid_name(
                name.name.as_str(),
                "name produces an empty identifier",
            ));
        }
        self.reserve_type(&name.id(), &formatted)
    }

    /// Identifier of the field holding `key` within `scope`.
    pub fn field_ident(&mut self, scope: &str, key: &str) -> SchemaResult<Ident> {
        self.registry
            .register(key, &format!("fields:{scope}"), &member_name(key))
            .map(|n| field_ident(&n))
    }

    /// Identifier of a wrapper method.
    pub fn method_ident(&mut self, id: &str, name: &str) -> SchemaResult<Ident> {
        self.registry
            .register(id, METHOD_SCOPE, &member_name(name))
            .map(|n| field_ident(&n))
    }

    /// The Rust type of a value of `ty`.
    pub fn type_tokens(&mut self, ty: &PropertyType) -> SchemaResult<TokenStream> {
        Ok(match ty {
            PropertyType::Scalar(kind) => scalar_to_rust_type(*kind),
            PropertyType::Opaque(kind) => opaque_to_rust_type(*kind, &self.runtime),
            PropertyType::Array(item) => {
                let item = self.type_tokens(item)?;
                quote! { Vec<#item> }
            }
            PropertyType::Enum(e) => self.named_tokens(&e.name)?,
            PropertyType::Record(r) => self.named_tokens(&r.name)?,
            PropertyType::Variant(v) => self.named_tokens(&v.name)?,
            PropertyType::Alias(a) => self.named_tokens(&a.name)?,
        })
    }

    fn named_tokens(&mut self, name: &TypeName) -> SchemaResult<TokenStream> {
        let ident = self.type_ident(name)?;
        Ok(quote! { #ident })
    }
}

/// Field scope of a variant case.
pub(crate) fn case_scope(variant: &TypeName, case_name: &str) -> String {
    format!("{}#{}", variant.id(), case_name)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> EmitContext {
        EmitContext::new(quote! { ::typer_runtime })
    }

    #[test]
    fn test_generate_doc_comment() {
        let doc = generate_doc_comment(Some("This is a test.\nSecond line."));
        let code = doc.to_string();
        assert!(code.contains("This is a test"));
        assert!(code.contains("Second line"));
    }

    #[test]
    fn test_generate_doc_comment_none() {
        let doc = generate_doc_comment(None);
        assert!(doc.is_empty());
    }

    #[test]
    fn test_type_idents_are_prefixed_and_unique() {
        let mut ctx = ctx();
        let a = ctx.type_ident(&TypeName::custom_type("user_profile")).unwrap();
        let b = ctx.type_ident(&TypeName::custom_type("user profile")).unwrap();
        let again = ctx.type_ident(&TypeName::custom_type("user_profile")).unwrap();
        assert_eq!(a.to_string(), "CustomTypeUserProfile");
        assert_eq!(b.to_string(), "CustomTypeUserProfile1");
        assert_eq!(again, a);
    }

    #[test]
    fn test_reserved_type_name_wins() {
        let mut ctx = ctx();
        ctx.reserve_type("client", "TypedAnalytics").unwrap();
        let ident = ctx.type_ident(&TypeName::event("typed analytics")).unwrap();
        assert_eq!(ident.to_string(), "TypedAnalytics1");
    }

    #[test]
    fn test_field_idents_per_scope() {
        let mut ctx = ctx();
        assert_eq!(ctx.field_ident("a", "firstName").unwrap().to_string(), "first_name");
        assert_eq!(ctx.field_ident("a", "first_name").unwrap().to_string(), "first_name1");
        assert_eq!(ctx.field_ident("b", "first_name").unwrap().to_string(), "first_name");
        assert_eq!(ctx.field_ident("b", "type").unwrap().to_string(), "r#type");
    }

    #[test]
    fn test_type_tokens() {
        let mut ctx = ctx();
        let ty = PropertyType::Array(Box::new(PropertyType::Scalar(
            typer_schema::ast::ScalarKind::String,
        )));
        assert_eq!(ctx.type_tokens(&ty).unwrap().to_string(), "Vec < String >");
    }
}
