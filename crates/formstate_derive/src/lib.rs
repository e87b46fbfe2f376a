use proc_macro::TokenStream;
use proc_macro2::{Ident, Span, TokenStream as TokenStream2};
use proc_macro_crate::{FoundCrate, crate_name};
use quote::{format_ident, quote};
use syn::{Data, DeriveInput, Fields, parse_macro_input};

#[proc_macro_derive(FormModel)]
pub fn derive_form_model(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    if !input.generics.params.is_empty() {
        return syn::Error::new_spanned(
            input.ident,
            "FormModel derive currently supports only non-generic structs",
        )
        .to_compile_error()
        .into();
    }

    let model_ident = input.ident;
    let fields_struct_ident = format_ident!("{model_ident}Fields");

    let named_fields = match input.data {
        Data::Struct(data) => match data.fields {
            Fields::Named(fields) => fields.named,
            _ => {
                return syn::Error::new(
                    Span::call_site(),
                    "FormModel derive requires a struct with named fields",
                )
                .to_compile_error()
                .into();
            }
        },
        _ => {
            return syn::Error::new(
                Span::call_site(),
                "FormModel derive is only supported on structs",
            )
            .to_compile_error()
            .into();
        }
    };

    let formstate = formstate_path();
    let mut key_accessors = Vec::new();
    let mut keys = Vec::new();
    let mut to_values = Vec::new();
    let mut from_values = Vec::new();

    for field in named_fields {
        let Some(field_ident) = field.ident else {
            continue;
        };
        let field_name = field_ident.to_string();
        let key = quote!(#formstate::form::FieldKey::new(#field_name));

        key_accessors.push(quote! {
            pub fn #field_ident(&self) -> #formstate::form::FieldKey {
                #key
            }
        });
        keys.push(key.clone());
        to_values.push(quote! {
            values.insert(#key, ::std::string::ToString::to_string(&self.#field_ident));
        });
        from_values.push(quote! {
            #field_ident: ::core::convert::Into::into(
                values
                    .value(#field_name)
                    .map(::std::string::ToString::to_string)
                    .unwrap_or_default(),
            )
        });
    }

    quote! {
        #[derive(Clone, Copy, Debug, Default)]
        pub struct #fields_struct_ident;

        impl #fields_struct_ident {
            #(#key_accessors)*
        }

        impl #formstate::form::FormModel for #model_ident {
            type Fields = #fields_struct_ident;

            fn fields() -> Self::Fields {
                #fields_struct_ident
            }

            fn keys() -> ::std::vec::Vec<#formstate::form::FieldKey> {
                ::std::vec![#(#keys),*]
            }

            fn to_values(&self) -> #formstate::form::FormValues {
                let mut values = #formstate::form::FormValues::new();
                #(#to_values)*
                values
            }

            fn from_values(values: &#formstate::form::FormValues) -> Self {
                Self {
                    #(#from_values),*
                }
            }
        }
    }
    .into()
}

fn formstate_path() -> TokenStream2 {
    match crate_name("formstate") {
        Ok(FoundCrate::Name(name)) => {
            let ident = Ident::new(&name, Span::call_site());
            quote!(::#ident)
        }
        Ok(FoundCrate::Itself) => quote!(crate),
        Err(_) => quote!(::formstate),
    }
}
