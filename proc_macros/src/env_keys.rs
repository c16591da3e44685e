use heck::ToShoutySnakeCase;
use proc_macro::TokenStream;
use quote::quote;
use syn::{Ident, ItemStruct, LitStr, parse_macro_input};

pub fn expand(attr: TokenStream, item: TokenStream) -> TokenStream {
    let prefix = if attr.is_empty() {
        None
    } else {
        Some(parse_macro_input!(attr as LitStr).value())
    };
    let input = parse_macro_input!(item as ItemStruct);
    let struct_name = &input.ident;

    let consts = input
        .fields
        .iter()
        .filter_map(|f| f.ident.as_ref())
        .map(|field| {
            let shouty = field.to_string().to_shouty_snake_case();
            let const_name = Ident::new(&shouty, field.span());
            let key = match &prefix {
                Some(prefix) => format!("{}_{}", prefix.to_shouty_snake_case(), shouty),
                None => shouty,
            };
            quote! {
                pub const #const_name: &'static str = #key;
            }
        });

    let expanded = quote! {
        #input

        impl #struct_name {
            #(#consts)*
        }
    };

    TokenStream::from(expanded)
}
