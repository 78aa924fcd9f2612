//! Procedural macro for typer.
//!
//! [`typer_plan!`] reads a tracking plan at compile time and expands to the
//! same bindings `typer-codegen` writes to disk: plan types, their `Encode`
//! impls, and the event wrapper.
//!
//! # Example
//!
//! ```rust,ignore
//! typer::typer_plan!("plan.json");
//!
//! let analytics = TypedAnalytics::new(client);
//! analytics.track_order_placed(&TrackOrderPlacedProperties { order_id: "o-1".into() });
//! ```

use proc_macro::TokenStream;
use quote::quote;
use syn::parse::{Parse, ParseStream};
use syn::{Ident, LitStr, Path, Token, parse_macro_input};

use typer_codegen::{GenerationOptions, Generator};

mod plan_reader;

use plan_reader::read_plan_with_config;

/// Runtime path used when the caller depends on the `typer` facade crate.
const FACADE_RUNTIME_PATH: &str = "::typer::runtime";

/// Generate typed analytics bindings from a plan file.
///
/// The path is resolved relative to the crate root. Options follow the path:
///
/// - `runtime = path` - where the generated code finds the runtime crate
///   (default `::typer::runtime`)
/// - `client = Name` - name of the wrapper struct
///
/// A `typer.toml` next to the plan, or in one of its parent directories,
/// supplies the client name, platform and metadata overrides. A config that
/// exists but fails to load is a compile error. Both files are tracked, so
/// editing either one rebuilds the caller.
///
/// ```rust,ignore
/// typer::typer_plan!("analytics/plan.json", runtime = ::typer_runtime, client = ShopAnalytics);
/// ```
#[proc_macro]
pub fn typer_plan(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as PlanInput);

    match generate_from_plan(&input) {
        Ok(tokens) => tokens.into(),
        Err(err_msg) => quote! {
            compile_error!(#err_msg);
        }
        .into(),
    }
}

struct PlanInput {
    path: LitStr,
    runtime: Option<Path>,
    client: Option<Ident>,
}

impl Parse for PlanInput {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let path: LitStr = input.parse()?;
        let mut runtime = None;
        let mut client = None;

        while !input.is_empty() {
            input.parse::<Token![,]>()?;
            if input.is_empty() {
                break;
            }
            let key: Ident = input.parse()?;
            input.parse::<Token![=]>()?;
            match key.to_string().as_str() {
                "runtime" => runtime = Some(input.parse()?),
                "client" => client = Some(input.parse()?),
                other => {
                    return Err(syn::Error::new(
                        key.span(),
                        format!("unknown option `{other}`, expected `runtime` or `client`"),
                    ));
                }
            }
        }

        Ok(Self {
            path,
            runtime,
            client,
        })
    }
}

fn generate_from_plan(input: &PlanInput) -> Result<proc_macro2::TokenStream, String> {
    let plan = read_plan_with_config(&input.path.value()).map_err(|e| e.to_string())?;

    let mut options = match &plan.config {
        Some(config) => GenerationOptions::from_config(config)
            .with_metadata(config.resolve_metadata(&plan.schema.metadata)),
        None => GenerationOptions::default(),
    };
    options.runtime_path = match &input.runtime {
        Some(path) => quote!(#path).to_string(),
        None => FACADE_RUNTIME_PATH.to_string(),
    };
    if let Some(client) = &input.client {
        options.client_name = client.to_string();
    }

    let bindings = Generator::new(options)
        .generate_tokens(&plan.schema)
        .map_err(|e| e.to_string())?;

    // Rebuild when the plan or its config changes.
    let tracked = plan.tracked_files().map(|path| {
        let path = path.display().to_string();
        quote! { const _: &[u8] = include_bytes!(#path); }
    });

    Ok(quote! {
        #(#tracked)*
        #bindings
    })
}
