use proc_macro::TokenStream;
use quote::quote;
use syn::{Data, DeriveInput, Fields, LitStr};

pub fn derive_document(input: TokenStream) -> TokenStream {
    let input = syn::parse_macro_input!(input as DeriveInput);
    let name = &input.ident;

    let settings = match extract_settings(&input) {
        Ok(settings) => settings,
        Err(err) => return err.to_compile_error().into(),
    };

    let key_field = match extract_key_field(&input) {
        Ok(field) => field,
        Err(err) => return err.to_compile_error().into(),
    };

    let bucket = settings
        .bucket
        .unwrap_or_else(|| format!("{}s", to_snake_case(&name.to_string())));
    let type_name = settings.type_name.unwrap_or_else(|| name.to_string());

    let expanded = quote! {
        impl ripple_rust::Document for #name {
            const BUCKET: &'static str = #bucket;
            const TYPE_NAME: &'static str = #type_name;

            fn key(&self) -> &str {
                &self.#key_field
            }

            fn set_key(&mut self, key: &str) {
                self.#key_field = key.to_string();
            }
        }
    };

    TokenStream::from(expanded)
}

#[derive(Default)]
struct Settings {
    bucket: Option<String>,
    type_name: Option<String>,
}

// Reads #[document(bucket = "...", type_name = "...")] from struct-level attributes
fn extract_settings(input: &DeriveInput) -> syn::Result<Settings> {
    let mut settings = Settings::default();
    for attr in &input.attrs {
        if !attr.path().is_ident("document") {
            continue;
        }

        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("bucket") {
                let value: LitStr = meta.value()?.parse()?;
                settings.bucket = Some(value.value());
                Ok(())
            } else if meta.path.is_ident("type_name") {
                let value: LitStr = meta.value()?.parse()?;
                settings.type_name = Some(value.value());
                Ok(())
            } else {
                Err(meta.error("expected `bucket` or `type_name`"))
            }
        })?;
    }
    Ok(settings)
}

fn extract_key_field(input: &DeriveInput) -> syn::Result<syn::Ident> {
    let Data::Struct(data_struct) = &input.data else {
        return Err(syn::Error::new_spanned(
            &input.ident,
            "Document derive only supports structs",
        ));
    };
    let Fields::Named(fields) = &data_struct.fields else {
        return Err(syn::Error::new_spanned(
            &input.ident,
            "Document derive needs named fields",
        ));
    };

    for field in &fields.named {
        for attr in &field.attrs {
            if !attr.path().is_ident("document") {
                continue;
            }
            let mut is_key = false;
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("key") {
                    is_key = true;
                    Ok(())
                } else {
                    Err(meta.error("expected `key`"))
                }
            })?;
            if is_key {
                if let Some(ident) = &field.ident {
                    return Ok(ident.clone());
                }
            }
        }
    }

    // Default: look for a field named "key"
    fields
        .named
        .iter()
        .filter_map(|field| field.ident.as_ref())
        .find(|ident| *ident == "key")
        .cloned()
        .ok_or_else(|| {
            syn::Error::new_spanned(
                &input.ident,
                "Document derive: no field marked with #[document(key)] and no field named `key`",
            )
        })
}

fn to_snake_case(s: &str) -> String {
    let mut result = String::new();
    for (i, ch) in s.chars().enumerate() {
        if ch.is_uppercase() {
            if i > 0 {
                result.push('_');
            }
            result.extend(ch.to_lowercase());
        } else {
            result.push(ch);
        }
    }
    result
}
