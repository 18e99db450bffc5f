use proc_macro::TokenStream;
use quote::quote;
use syn::{
    Data, DeriveInput, Error, Field, Fields, Ident, LitStr, Result, Token, Type,
    parse::{Parse, ParseStream},
};

pub(crate) fn expand_from_opts(input: &DeriveInput) -> Result<TokenStream> {
    let Data::Struct(data) = &input.data else {
        Err(Error::new_spanned(
            input,
            "`FromOpts` may only be derived on structs.",
        ))?
    };

    let Fields::Named(fields) = &data.fields else {
        Err(Error::new_spanned(
            input,
            "`FromOpts` may only be derived on structs with named fields.",
        ))?
    };

    let fields = fields
        .named
        .iter()
        .map(FieldMetadata::parse)
        .collect::<Result<Vec<_>>>()?;

    let assignments = fields.iter().map(|field| {
        let FieldMetadata { name, option, kind } = field;

        match kind {
            FieldKind::Value => quote! {
                #name: ::cotter::typed::OptValue::decode(session, #option)?
            },
            FieldKind::Size { optional: false } => quote! {
                #name: session.decode_size(#option)?
            },
            FieldKind::Size { optional: true } => quote! {
                #name: if session.has_field(#option) {
                    ::core::option::Option::Some(session.decode_size(#option)?)
                } else {
                    ::core::option::Option::None
                }
            },
            FieldKind::Nested => quote! {
                #name: ::cotter::typed::FromOpts::from_opts(session)?
            },
        }
    });

    let name = &input.ident;

    let expanded = quote! {
        impl ::cotter::typed::FromOpts for #name {
            fn from_opts(
                session: &mut ::cotter::session::Session<'_>,
            ) -> ::core::result::Result<Self, ::cotter::session::DecodeError> {
                session.begin_struct();
                let value = Self { #(#assignments),* };
                session.end_struct()?;
                ::core::result::Result::Ok(value)
            }
        }
    };

    Ok(expanded.into())
}

#[derive(Debug)]
struct FieldMetadata {
    name: Ident,
    option: String,
    kind: FieldKind,
}

#[derive(Debug)]
enum FieldKind {
    Value,
    Size { optional: bool },
    Nested,
}

impl FieldMetadata {
    fn parse(field: &Field) -> Result<Self> {
        let name = field.ident.clone().unwrap();

        let attribute = match field.attrs.iter().find(|a| a.path().is_ident("opt")) {
            Some(attr) => attr.meta.require_list()?.parse_args::<OptAttribute>()?,
            None => OptAttribute::default(),
        };

        if attribute.nested {
            if attribute.size || attribute.rename.is_some() {
                Err(Error::new_spanned(
                    field,
                    "Nested fields take no other `opt` arguments.",
                ))?
            }

            return Ok(Self {
                name,
                option: String::new(),
                kind: FieldKind::Nested,
            });
        }

        let option = match &attribute.rename {
            Some(rename) => rename.value(),
            None => option_name(&name),
        };

        let kind = if attribute.size {
            FieldKind::Size {
                optional: is_option(&field.ty),
            }
        } else {
            FieldKind::Value
        };

        Ok(Self { name, option, kind })
    }
}

/// An option name for a field: the identifier with any
/// reserved-word-escaping trailing underscore dropped, and the rest
/// rendered as hyphens.
fn option_name(name: &Ident) -> String {
    let mut name = name.to_string();
    if name.ends_with('_') {
        name.pop();
    }
    name.replace('_', "-")
}

fn is_option(ty: &Type) -> bool {
    let Type::Path(path) = ty else {
        return false;
    };

    match path.path.segments.first() {
        Some(segment) => segment.ident == "Option",
        None => false,
    }
}

#[derive(Debug, Default)]
struct OptAttribute {
    rename: Option<LitStr>,
    size: bool,
    nested: bool,
}

impl Parse for OptAttribute {
    fn parse(input: ParseStream) -> Result<Self> {
        let mut attribute = Self::default();

        loop {
            if input.is_empty() {
                break;
            }

            if input.peek(LitStr) {
                let rename = input.parse::<LitStr>()?;

                if attribute.rename.replace(rename).is_some() {
                    Err(input.error("Only one option name may be given."))?
                }
            } else {
                let argument = input.parse::<Ident>()?;

                if argument == "size" {
                    attribute.size = true;
                } else if argument == "nested" {
                    attribute.nested = true;
                } else {
                    Err(Error::new_spanned(
                        argument,
                        "Arguments must be an option name, `size`, or `nested`.",
                    ))?
                }
            }

            if input.is_empty() {
                break;
            }
            input.parse::<Token![,]>()?;
        }

        Ok(attribute)
    }
}
