use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

mod from_opts;
mod opt_value;

#[proc_macro_derive(FromOpts, attributes(opt))]
pub fn derive_from_opts(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match from_opts::expand_from_opts(&input) {
        Ok(tokens) => tokens,
        Err(err) => err.to_compile_error().into(),
    }
}

#[proc_macro_derive(OptValue, attributes(opt))]
pub fn derive_opt_value(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match opt_value::expand_opt_value(&input) {
        Ok(tokens) => tokens,
        Err(err) => err.to_compile_error().into(),
    }
}
