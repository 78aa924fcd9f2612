//! Code generation for aliases and records.

use proc_macro2::TokenStream;
use quote::quote;

use typer_schema::ast::{AliasType, RecordType};
use typer_schema::error::SchemaResult;

use super::{EmitContext, generate_doc_comment};
use crate::types::apply_presence;

/// Generate a documentation-only alias.
pub fn generate_alias(ctx: &mut EmitContext, alias: &AliasType) -> SchemaResult<TokenStream> {
    let name = ctx.type_ident(&alias.name)?;
    let target = ctx.type_tokens(&alias.target)?;
    let doc = generate_doc_comment(alias.description.as_deref());

    Ok(quote! {
        #doc
        #[allow(non_camel_case_types)]
        pub type #name = #target;
    })
}

/// Generate a record struct.
///
/// Optional fields become `Option`; `None` means the key is left out of
/// the encoded object.
pub fn generate_record(ctx: &mut EmitContext, record: &RecordType) -> SchemaResult<TokenStream> {
    let name = ctx.type_ident(&record.name)?;
    let doc = generate_doc_comment(record.description.as_deref());
    let scope = record.name.id();

    let fields = record
        .fields
        .iter()
        .map(|field| {
            let ident = ctx.field_ident(&scope, &field.key)?;
            let ty = apply_presence(ctx.type_tokens(&field.ty)?, field.required);
            let field_doc = generate_doc_comment(field.description.as_deref());
            Ok(quote! {
                #field_doc
                pub #ident: #ty
            })
        })
        .collect::<SchemaResult<Vec<_>>>()?;

    Ok(quote! {
        #doc
        #[derive(Debug, Clone, PartialEq)]
        #[allow(non_camel_case_types)]
        pub struct #name {
            #(#fields,)*
        }
    })
}
