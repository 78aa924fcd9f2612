//! Code generation for `Encode` impls.
//!
//! Each generated impl follows the layout of its compiled [`TypeEncoder`]:
//! keys in declaration order, absent optionals skipped, discriminators last.

use proc_macro2::{Ident, Literal, TokenStream};
use quote::quote;

use typer_schema::error::SchemaResult;

use super::{EmitContext, case_scope};
use crate::encoder::{
    CaseEncoder, DiscriminatorSlot, EnumEncoder, FieldEncoder, RecordEncoder, TypeEncoder,
    VariantEncoder,
};
use crate::types::type_ident;

/// Generate the `Encode` (and, for objects, `EncodeObject`) impls of a type.
pub fn generate_encode_impl(
    ctx: &mut EmitContext,
    encoder: &TypeEncoder,
) -> SchemaResult<TokenStream> {
    match encoder {
        TypeEncoder::Record(record) => generate_record_impl(ctx, record),
        TypeEncoder::Enum(e) => generate_enum_impl(ctx, e),
        TypeEncoder::Variant(v) if v.variant.is_primitive() => generate_primitive_impl(ctx, v),
        TypeEncoder::Variant(v) => generate_discriminated_impl(ctx, v),
    }
}

fn generate_record_impl(ctx: &mut EmitContext, record: &RecordEncoder) -> SchemaResult<TokenStream> {
    let rt = ctx.runtime().clone();
    let name = ctx.type_ident(&record.name)?;
    let scope = record.name.id();

    let mut inserts = Vec::with_capacity(record.fields.len());
    for field in &record.fields {
        let ident = ctx.field_ident(&scope, &field.key)?;
        inserts.push(field_insert(&rt, field, quote! { &self.#ident }));
    }
    let body = object_body(&rt, &inserts);

    Ok(quote! {
        impl #rt::EncodeObject for #name {
            fn encode_object(&self) -> #rt::JsonObject {
                #body
            }
        }

        impl #rt::Encode for #name {
            fn encode(&self) -> #rt::JsonValue {
                #rt::JsonValue::Object(#rt::EncodeObject::encode_object(self))
            }
        }
    })
}

fn generate_enum_impl(ctx: &mut EmitContext, e: &EnumEncoder) -> SchemaResult<TokenStream> {
    let rt = ctx.runtime().clone();
    let name = ctx.type_ident(&e.name)?;

    let arms = e.cases.iter().map(|(case_name, value)| {
        let case_ident = type_ident(case_name);
        let wire = json_tokens(&rt, value);
        quote! { Self::#case_ident => #wire }
    });

    Ok(quote! {
        impl #rt::Encode for #name {
            fn encode(&self) -> #rt::JsonValue {
                match *self {
                    #(#arms,)*
                }
            }
        }
    })
}

fn generate_primitive_impl(ctx: &mut EmitContext, v: &VariantEncoder) -> SchemaResult<TokenStream> {
    let rt = ctx.runtime().clone();
    let name = ctx.type_ident(&v.variant.name)?;

    let arms = v.cases.iter().map(|case| {
        let case_ident = type_ident(case.case_name());
        quote! { Self::#case_ident(value) => #rt::Encode::encode(value) }
    });

    Ok(quote! {
        impl #rt::Encode for #name {
            fn encode(&self) -> #rt::JsonValue {
                match self {
                    #(#arms,)*
                }
            }
        }
    })
}

fn generate_discriminated_impl(
    ctx: &mut EmitContext,
    v: &VariantEncoder,
) -> SchemaResult<TokenStream> {
    let rt = ctx.runtime().clone();
    let name = ctx.type_ident(&v.variant.name)?;

    let mut arms = Vec::with_capacity(v.cases.len());
    for case in &v.cases {
        let CaseEncoder::Object {
            case_name,
            fields,
            discriminator: (disc_key, slot),
        } = case
        else {
            continue;
        };

        let scope = case_scope(&v.variant.name, case_name);
        let case_ident = type_ident(case_name);
        let mut bindings: Vec<Ident> = Vec::with_capacity(fields.len() + 1);
        let mut inserts = Vec::with_capacity(fields.len() + 1);

        for field in fields {
            let ident = ctx.field_ident(&scope, &field.key)?;
            inserts.push(field_insert(&rt, field, quote! { #ident }));
            bindings.push(ident);
        }

        let key = disc_key.as_str();
        match slot {
            DiscriminatorSlot::Fixed(value) => {
                let wire = json_tokens(&rt, value);
                inserts.push(quote! {
                    __encoded.insert(#key.to_string(), #wire);
                });
            }
            DiscriminatorSlot::Supplied(_) => {
                let ident = ctx.field_ident(&scope, disc_key)?;
                inserts.push(quote! {
                    __encoded.insert(#key.to_string(), #rt::Encode::encode(#ident));
                });
                bindings.push(ident);
            }
        }

        let body = object_body(&rt, &inserts);
        arms.push(quote! {
            Self::#case_ident { #(#bindings,)* } => {
                #body
            }
        });
    }

    Ok(quote! {
        impl #rt::EncodeObject for #name {
            fn encode_object(&self) -> #rt::JsonObject {
                match self {
                    #(#arms)*
                }
            }
        }

        impl #rt::Encode for #name {
            fn encode(&self) -> #rt::JsonValue {
                #rt::JsonValue::Object(#rt::EncodeObject::encode_object(self))
            }
        }
    })
}

/// Statement writing one field. `access` evaluates to a reference to the
/// field's value.
fn field_insert(rt: &TokenStream, field: &FieldEncoder, access: TokenStream) -> TokenStream {
    let key = field.key.as_str();
    if field.required {
        quote! {
            __encoded.insert(#key.to_string(), #rt::Encode::encode(#access));
        }
    } else {
        quote! {
            if let Some(value) = #access {
                __encoded.insert(#key.to_string(), #rt::Encode::encode(value));
            }
        }
    }
}

fn object_body(rt: &TokenStream, inserts: &[TokenStream]) -> TokenStream {
    if inserts.is_empty() {
        return quote! { #rt::JsonObject::new() };
    }
    quote! {
        let mut __encoded = #rt::JsonObject::new();
        #(#inserts)*
        __encoded
    }
}

/// Tokens building a fixed JSON scalar.
fn json_tokens(rt: &TokenStream, value: &serde_json::Value) -> TokenStream {
    match value {
        serde_json::Value::Bool(b) => quote! { #rt::JsonValue::Bool(#b) },
        serde_json::Value::Number(n) => match n.as_i64() {
            Some(i) => {
                let lit = Literal::i64_suffixed(i);
                quote! { #rt::JsonValue::from(#lit) }
            }
            None => {
                let lit = Literal::f64_suffixed(n.as_f64().unwrap_or_default());
                quote! { #rt::JsonValue::from(#lit) }
            }
        },
        serde_json::Value::String(s) => {
            let s = s.as_str();
            quote! { #rt::JsonValue::String(#s.to_string()) }
        }
        _ => quote! { #rt::JsonValue::Null },
    }
}

#[cfg(test)]
mod tests {
    use quote::quote;

    use super::*;
    use crate::encoder::EncoderCompiler;
    use crate::generators::{generate_enum, generate_record, generate_variant};
    use typer_schema::ast::PropertyType;
    use typer_schema::validate_plan_json;

    const PLAN: &str = r##"{
        "name": "Shop",
        "customTypes": {
            "feature_config": {
                "type": "object",
                "schema": {
                    "properties": {
                        "feature_flag": { "required": true },
                        "email": { "required": false }
                    }
                },
                "variants": [{
                    "type": "discriminator",
                    "discriminator": "feature_flag",
                    "cases": [
                        { "displayName": "Premium", "match": [true], "schema": { "properties": { "email": { "required": true } } } }
                    ],
                    "defaultSchema": { "properties": {} }
                }]
            }
        },
        "properties": {
            "feature_flag": { "type": ["boolean", "string"] },
            "email": { "type": ["string"] },
            "status": { "type": ["string", "integer"], "config": { "enum": ["active", 3] } },
            "rating": { "type": ["number"], "config": { "enum": [1, 4.5] } },
            "payload": { "type": ["object", "array"] }
        }
    }"##;

    /// Emit every named type with its impl, in generator order.
    fn emit_all() -> String {
        let schema = validate_plan_json(PLAN).unwrap();
        let set = EncoderCompiler::new().compile(&schema).unwrap();
        let mut ctx = EmitContext::new(quote! { ::typer_runtime });
        let mut out = TokenStream::new();

        for ty in schema.named_types() {
            let item = match &ty {
                PropertyType::Record(r) => generate_record(&mut ctx, r).unwrap(),
                PropertyType::Enum(e) => generate_enum(&mut ctx, e).unwrap(),
                PropertyType::Variant(v) => generate_variant(&mut ctx, v).unwrap(),
                _ => continue,
            };
            out.extend(item);
            if let Some(encoder) = set.for_type(ty.name().unwrap()) {
                out.extend(generate_encode_impl(&mut ctx, encoder).unwrap());
            }
        }

        syn::parse2::<syn::File>(out.clone()).expect("generated code should parse");
        out.to_string()
    }

    #[test]
    fn test_discriminated_impl_writes_tag_last() {
        let code = emit_all();
        assert!(code.contains("impl :: typer_runtime :: EncodeObject for CustomTypeFeatureConfig"));
        assert!(code.contains("Self :: Case_True { email , }"));
        assert!(code.contains(
            "__encoded . insert (\"feature_flag\" . to_string () , :: typer_runtime :: JsonValue :: Bool (true))"
        ));
        assert!(code.contains("Self :: Default { email , feature_flag , }"));
        assert!(code.contains("if let Some (value) = email"));
    }

    #[test]
    fn test_enum_impl_uses_wire_values() {
        let code = emit_all();
        assert!(code.contains("Self :: Active => :: typer_runtime :: JsonValue :: String (\"active\" . to_string ())"));
        assert!(code.contains("Self :: _3 => :: typer_runtime :: JsonValue :: from (3i64)"));
    }

    #[test]
    fn test_primitive_impl_writes_bare_value() {
        let code = emit_all();
        assert!(code.contains("Self :: BooleanValue (value) => :: typer_runtime :: Encode :: encode (value)"));
    }

    #[test]
    fn test_float_enum_value_is_f64_literal() {
        let code = emit_all();
        assert!(code.contains("Self :: _4_5 => :: typer_runtime :: JsonValue :: from (4.5f64)"));
        assert!(code.contains("Self :: _1 => :: typer_runtime :: JsonValue :: from (1i64)"));
    }

    #[test]
    fn test_container_cases_encode_bare() {
        let code = emit_all();
        assert!(code.contains("ObjectValue (:: typer_runtime :: JsonObject)"));
        assert!(code.contains("ArrayValue (Vec < :: typer_runtime :: JsonValue >)"));
        assert!(code.contains("Self :: ObjectValue (value) => :: typer_runtime :: Encode :: encode (value)"));
    }

    #[test]
    fn test_empty_record_has_no_mut_binding() {
        let rt = quote! { ::typer_runtime };
        assert_eq!(object_body(&rt, &[]).to_string(), ":: typer_runtime :: JsonObject :: new ()");
    }
}
