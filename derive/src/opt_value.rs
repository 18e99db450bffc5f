use proc_macro::TokenStream;
use quote::quote;
use syn::{Data, DeriveInput, Error, Fields, Ident, LitStr, Result, Variant};

pub(crate) fn expand_opt_value(input: &DeriveInput) -> Result<TokenStream> {
    let Data::Enum(data) = &input.data else {
        Err(Error::new_spanned(
            input,
            "`OptValue` may only be derived on enums.",
        ))?
    };

    let variants = data
        .variants
        .iter()
        .map(VariantMetadata::parse)
        .collect::<Result<Vec<_>>>()?;

    let tags = variants.iter().map(|variant| &variant.tag);

    let arms = variants.iter().enumerate().map(|(position, variant)| {
        let name = &variant.name;
        quote! { #position => Self::#name }
    });

    let name = &input.ident;

    let expanded = quote! {
        impl ::cotter::typed::OptValue for #name {
            fn decode(
                session: &mut ::cotter::session::Session<'_>,
                name: &str,
            ) -> ::core::result::Result<Self, ::cotter::session::DecodeError> {
                const ACCEPTED: &[&str] = &[#(#tags),*];

                ::core::result::Result::Ok(match session.decode_enum(name, ACCEPTED)? {
                    #(#arms,)*
                    _ => ::core::unreachable!(),
                })
            }
        }
    };

    Ok(expanded.into())
}

#[derive(Debug)]
struct VariantMetadata {
    name: Ident,
    tag: String,
}

impl VariantMetadata {
    fn parse(variant: &Variant) -> Result<Self> {
        let Fields::Unit = &variant.fields else {
            Err(Error::new_spanned(
                variant,
                "`OptValue` may only be derived on enums with unit variants.",
            ))?
        };

        let name = variant.ident.clone();

        let tag = match variant.attrs.iter().find(|a| a.path().is_ident("opt")) {
            Some(attr) => attr.meta.require_list()?.parse_args::<LitStr>()?.value(),
            None => tag_name(&name),
        };

        Ok(Self { name, tag })
    }
}

/// A tag for a variant: the identifier rendered in kebab case.
fn tag_name(name: &Ident) -> String {
    let mut tag = String::new();

    for (i, c) in name.to_string().chars().enumerate() {
        if c.is_ascii_uppercase() {
            if i > 0 {
                tag.push('-');
            }
            tag.extend(c.to_lowercase());
        } else if c == '_' {
            tag.push('-');
        } else {
            tag.push(c);
        }
    }

    tag
}
