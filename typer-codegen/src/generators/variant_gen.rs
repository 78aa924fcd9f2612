//! Code generation for variants.

use proc_macro2::TokenStream;
use quote::quote;

use typer_schema::ast::{CaseTag, VariantCase, VariantType};
use typer_schema::error::{SchemaError, SchemaResult};

use super::{EmitContext, case_scope, generate_doc_comment};
use crate::types::{apply_presence, type_ident};

/// Generate a closed sum type.
///
/// A primitive alternation becomes an enum of single-value tuple cases. An
/// object variant becomes an enum of struct cases; the tag is implied by the
/// case except for `Default`, which carries the discriminator as its last
/// field.
pub fn generate_variant(ctx: &mut EmitContext, variant: &VariantType) -> SchemaResult<TokenStream> {
    let name = ctx.type_ident(&variant.name)?;
    let doc = generate_doc_comment(variant.description.as_deref());

    let cases = variant
        .all_cases()
        .map(|case| generate_case(ctx, variant, case))
        .collect::<SchemaResult<Vec<_>>>()?;

    Ok(quote! {
        #doc
        #[derive(Debug, Clone, PartialEq)]
        #[allow(non_camel_case_types)]
        pub enum #name {
            #(#cases,)*
        }
    })
}

fn generate_case(
    ctx: &mut EmitContext,
    variant: &VariantType,
    case: &VariantCase,
) -> SchemaResult<TokenStream> {
    let case_ident = type_ident(&case.case_name);
    let doc = match (&case.description, &case.tag) {
        (Some(description), _) => generate_doc_comment(Some(description)),
        (None, CaseTag::Literal(lit)) => {
            let line = format!("Selected when the discriminator is `{lit}`.");
            generate_doc_comment(Some(&line))
        }
        (None, _) => TokenStream::new(),
    };

    if let CaseTag::Primitive(_) = case.tag {
        let [wrapped] = case.fields.as_slice() else {
            return Err(SchemaError::invalid_variant(
                variant.name.name.as_str(),
                format!("primitive case `{}` must wrap exactly one value", case.case_name),
            ));
        };
        let ty = ctx.type_tokens(&wrapped.ty)?;
        return Ok(quote! {
            #doc
            #case_ident(#ty)
        });
    }

    let Some(disc) = &variant.discriminator else {
        return Err(SchemaError::invalid_variant(
            variant.name.name.as_str(),
            format!("case `{}` needs a discriminator", case.case_name),
        ));
    };

    let scope = case_scope(&variant.name, &case.case_name);
    let mut fields = Vec::with_capacity(case.fields.len() + 1);
    for field in &case.fields {
        let ident = ctx.field_ident(&scope, &field.key)?;
        let ty = apply_presence(ctx.type_tokens(&field.ty)?, field.required);
        let field_doc = generate_doc_comment(field.description.as_deref());
        fields.push(quote! {
            #field_doc
            #ident: #ty
        });
    }

    if case.is_default() {
        let ident = ctx.field_ident(&scope, &disc.key)?;
        let ty = ctx.type_tokens(&disc.ty)?;
        let field_doc = generate_doc_comment(disc.description.as_deref());
        fields.push(quote! {
            #field_doc
            #ident: #ty
        });
    }

    Ok(quote! {
        #doc
        #case_ident {
            #(#fields,)*
        }
    })
}

#[cfg(test)]
mod tests {
    use quote::quote;

    use super::*;
    use typer_schema::ast::PropertyType;
    use typer_schema::validate_plan_json;

    const PLAN: &str = r##"{
        "name": "Flags",
        "customTypes": {
            "feature_config": {
                "type": "object",
                "schema": {
                    "properties": {
                        "feature_flag": { "required": true },
                        "email": { "required": false },
                        "tags": { "required": false }
                    }
                },
                "variants": [{
                    "type": "discriminator",
                    "discriminator": "feature_flag",
                    "cases": [
                        { "displayName": "Premium", "match": [true], "schema": { "properties": { "email": { "required": true } } } },
                        { "displayName": "Beta", "match": ["beta"], "schema": { "properties": { "tags": { "required": true } } } }
                    ],
                    "defaultSchema": { "properties": {} }
                }]
            }
        },
        "properties": {
            "feature_flag": { "type": ["boolean", "string"] },
            "email": { "type": ["string"] },
            "tags": { "type": ["array"], "itemTypes": ["string"] },
            "context": { "type": ["string", "object", "array"] }
        }
    }"##;

    fn variant(name: &str, section: &str) -> std::sync::Arc<VariantType> {
        let schema = validate_plan_json(PLAN).unwrap();
        let ty = match section {
            "customTypes" => schema.get_custom_type(name),
            _ => schema.get_property(name),
        };
        match ty.map(PropertyType::resolved) {
            Some(PropertyType::Variant(v)) => v.clone(),
            other => panic!("expected a variant, got {other:?}"),
        }
    }

    #[test]
    fn test_generate_discriminated_variant() {
        let v = variant("feature_config", "customTypes");
        let mut ctx = EmitContext::new(quote! { ::typer_runtime });
        let code = generate_variant(&mut ctx, &v).unwrap().to_string();

        assert!(code.contains("pub enum CustomTypeFeatureConfig"));
        assert!(code.contains("Case_True { email : PropertyEmail , tags : Option < PropertyTags > , }"));
        assert!(code.contains("CaseBeta { email : Option < PropertyEmail > , tags : PropertyTags , }"));
        assert!(code.contains("feature_flag : PropertyFeatureFlag"));
    }

    #[test]
    fn test_generate_primitive_variant() {
        let v = variant("feature_flag", "properties");
        let mut ctx = EmitContext::new(quote! { ::typer_runtime });
        let code = generate_variant(&mut ctx, &v).unwrap().to_string();

        assert!(code.contains("pub enum PropertyFeatureFlag"));
        assert!(code.contains("BooleanValue (bool)"));
        assert!(code.contains("StringValue (String)"));
    }

    #[test]
    fn test_variant_without_default_exposes_only_tagged_cases() {
        let schema = validate_plan_json(
            r#"{
                "name": "Strict",
                "customTypes": {
                    "choice": {
                        "type": "object",
                        "schema": { "properties": { "kind": { "required": true } } },
                        "variants": [{
                            "type": "discriminator",
                            "discriminator": "kind",
                            "cases": [{ "displayName": "A", "match": ["a"], "schema": { "properties": {} } }]
                        }]
                    }
                },
                "properties": { "kind": { "type": ["string"] } }
            }"#,
        )
        .unwrap();
        let Some(PropertyType::Variant(v)) = schema.get_custom_type("choice") else {
            panic!("expected a variant");
        };
        let mut ctx = EmitContext::new(quote! { ::typer_runtime });
        let code = generate_variant(&mut ctx, v).unwrap().to_string();

        assert!(code.contains("CaseA { }"));
        assert!(!code.contains("Default"));
        assert!(!code.contains("kind :"));
    }

    #[test]
    fn test_generate_container_alternation() {
        let v = variant("context", "properties");
        let mut ctx = EmitContext::new(quote! { ::typer_runtime });
        let code = generate_variant(&mut ctx, &v).unwrap().to_string();

        assert!(code.contains("StringValue (String)"));
        assert!(code.contains("ObjectValue (:: typer_runtime :: JsonObject)"));
        assert!(code.contains("ArrayValue (Vec < :: typer_runtime :: JsonValue >)"));
    }
}
