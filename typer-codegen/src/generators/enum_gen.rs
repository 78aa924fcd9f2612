//! Code generation for plan enums.

use proc_macro2::TokenStream;
use quote::quote;

use typer_schema::ast::EnumType;
use typer_schema::error::SchemaResult;

use super::{EmitContext, generate_doc_comment};
use crate::types::type_ident;

/// Generate a closed enumeration.
///
/// Wire values live in the generated `Encode` impl; case names are only
/// identifiers.
pub fn generate_enum(ctx: &mut EmitContext, enum_def: &EnumType) -> SchemaResult<TokenStream> {
    let enum_name = ctx.type_ident(&enum_def.name)?;
    let doc = generate_doc_comment(enum_def.description.as_deref());

    let variants: Vec<_> = enum_def
        .cases
        .iter()
        .map(|case| {
            let variant_name = type_ident(&case.case_name);
            let wire = format!(" Wire value `{}`.", case.value);
            quote! {
                #[doc = #wire]
                #variant_name
            }
        })
        .collect();

    let variant_names: Vec<_> = enum_def
        .cases
        .iter()
        .map(|c| type_ident(&c.case_name))
        .collect();

    Ok(quote! {
        #doc
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        #[allow(non_camel_case_types)]
        pub enum #enum_name {
            #(#variants,)*
        }

        impl #enum_name {
            /// Get all variants of this enum.
            pub const fn variants() -> &'static [Self] {
                &[#(Self::#variant_names,)*]
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use quote::quote;

    use super::*;
    use typer_schema::ast::{Literal, TypeName};

    #[test]
    fn test_generate_enum() {
        let enum_def = EnumType::from_values(
            TypeName::custom_type("status"),
            vec!["active".into(), "in-progress".into(), Literal::Integer(3)],
        )
        .unwrap();

        let mut ctx = EmitContext::new(quote! { ::typer_runtime });
        let code = generate_enum(&mut ctx, &enum_def).unwrap().to_string();

        assert!(code.contains("pub enum CustomTypeStatus"));
        assert!(code.contains("Active"));
        assert!(code.contains("InProgress"));
        assert!(code.contains("_3"));
        assert!(code.contains("Wire value"));
        assert!(code.contains("pub const fn variants"));
    }
}
