use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use syn::DeriveInput;

use crate::{parse_field_attrs, VariantBindings};

/// Generates the `value_hash()` method implementation.
///
/// Field hashes are folded in declaration order with the kernel's mixer, so
/// two values that compare equal field-by-field always produce the same hash.
pub fn generate_value_hash(input: &DeriveInput) -> syn::Result<TokenStream> {
    match &input.data {
        syn::Data::Struct(data) => Ok(generate_value_hash_struct(data)),
        syn::Data::Enum(data) => Ok(generate_value_hash_enum(data)),
        syn::Data::Union(_) => Err(syn::Error::new_spanned(
            input,
            "ValueEq cannot be derived for unions",
        )),
    }
}

fn generate_value_hash_struct(data: &syn::DataStruct) -> TokenStream {
    let folds: Vec<_> = match &data.fields {
        syn::Fields::Named(named) => named
            .named
            .iter()
            .filter_map(|f| {
                if parse_field_attrs(&f.attrs).skip {
                    return None;
                }
                let ident = f.ident.as_ref()?;
                Some(fold(quote! { &self.#ident }))
            })
            .collect(),
        syn::Fields::Unnamed(unnamed) => unnamed
            .unnamed
            .iter()
            .enumerate()
            .filter_map(|(i, f)| {
                if parse_field_attrs(&f.attrs).skip {
                    return None;
                }
                let idx = syn::Index::from(i);
                Some(fold(quote! { &self.#idx }))
            })
            .collect(),
        syn::Fields::Unit => Vec::new(),
    };

    quote! {
        fn value_hash(&self, arenas: &::mzident_core::Arenas) -> u64 {
            let _ = arenas;
            let hash = ::mzident_core::value_eq::SEED;
            #(#folds)*
            hash
        }
    }
}

fn generate_value_hash_enum(data: &syn::DataEnum) -> TokenStream {
    let arms: Vec<_> = data
        .variants
        .iter()
        .enumerate()
        .map(|(discriminant, variant)| {
            let variant_ident = &variant.ident;
            let bindings = VariantBindings::new(&variant.fields);
            let pattern = bindings.pattern("lhs");
            let discriminant = discriminant as u64;
            let folds: Vec<_> = bindings
                .compared
                .iter()
                .map(|key| {
                    let binding = format_ident!("__lhs_{}", key);
                    fold(quote! { #binding })
                })
                .collect();
            quote! {
                Self::#variant_ident #pattern => {
                    let hash = ::mzident_core::value_eq::mix(
                        ::mzident_core::value_eq::SEED,
                        #discriminant,
                    );
                    #(#folds)*
                    hash
                }
            }
        })
        .collect();

    quote! {
        fn value_hash(&self, arenas: &::mzident_core::Arenas) -> u64 {
            let _ = arenas;
            match self {
                #(#arms)*
            }
        }
    }
}

fn fold(value: TokenStream) -> TokenStream {
    quote! {
        let hash = ::mzident_core::value_eq::mix(
            hash,
            ::mzident_core::ValueEq::value_hash(#value, arenas),
        );
    }
}
