use proc_macro::TokenStream;
use quote::{format_ident, quote};
use syn::{parse_macro_input, DeriveInput};

mod hash;

/// Derive macro for the `ValueEq` trait.
///
/// Generates `value_eq()` and `value_hash()` that walk the fields in
/// declaration order. Collections, references and annotations bring their
/// own semantics through their `ValueEq` impls, so the generated code only
/// has to combine them.
///
/// # Example
///
/// ```ignore
/// use mzident_core::{ContextId, ValueEq};
///
/// #[derive(Debug, Clone, ValueEq)]
/// struct Sample {
///     #[value_eq(skip)]
///     id: Option<String>,
///     name: Option<String>,
///     #[value_eq(skip)]
///     context: Option<ContextId>,
/// }
/// ```
///
/// # Attributes
///
/// - `#[value_eq(skip)]` - Leave this field out of both equality and hashing
#[proc_macro_derive(ValueEq, attributes(value_eq))]
pub fn derive_value_eq(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    match derive_value_eq_impl(&input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

fn derive_value_eq_impl(input: &DeriveInput) -> syn::Result<proc_macro2::TokenStream> {
    let name = &input.ident;
    let generics = &input.generics;

    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    let where_clause = build_where_clause(generics, where_clause);

    check_field_attrs(input)?;
    let eq_impl = generate_value_eq(input)?;
    let hash_impl = hash::generate_value_hash(input)?;

    Ok(quote! {
        impl #impl_generics ::mzident_core::ValueEq for #name #ty_generics #where_clause {
            #eq_impl
            #hash_impl
        }
    })
}

fn build_where_clause(
    generics: &syn::Generics,
    existing: Option<&syn::WhereClause>,
) -> proc_macro2::TokenStream {
    let type_params: Vec<_> = generics.type_params().map(|p| &p.ident).collect();

    if type_params.is_empty() && existing.is_none() {
        return quote! {};
    }

    let bounds = type_params.iter().map(|p| {
        quote! { #p: ::mzident_core::ValueEq }
    });

    let existing_predicates = existing
        .map(|w| {
            let predicates = &w.predicates;
            quote! { #predicates, }
        })
        .unwrap_or_default();

    quote! {
        where
            #existing_predicates
            #(#bounds),*
    }
}

fn generate_value_eq(input: &DeriveInput) -> syn::Result<proc_macro2::TokenStream> {
    match &input.data {
        syn::Data::Struct(data) => Ok(generate_value_eq_struct(data)),
        syn::Data::Enum(data) => Ok(generate_value_eq_enum(data)),
        syn::Data::Union(_) => Err(syn::Error::new_spanned(
            input,
            "ValueEq cannot be derived for unions",
        )),
    }
}

fn generate_value_eq_struct(data: &syn::DataStruct) -> proc_macro2::TokenStream {
    let comparisons: Vec<_> = match &data.fields {
        syn::Fields::Named(named) => named
            .named
            .iter()
            .filter_map(|f| {
                if parse_field_attrs(&f.attrs).skip {
                    return None;
                }
                let ident = f.ident.as_ref()?;
                Some(quote! {
                    ::mzident_core::ValueEq::value_eq(&self.#ident, &other.#ident, arenas)
                })
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
                Some(quote! {
                    ::mzident_core::ValueEq::value_eq(&self.#idx, &other.#idx, arenas)
                })
            })
            .collect(),
        syn::Fields::Unit => Vec::new(),
    };

    quote! {
        fn value_eq(&self, other: &Self, arenas: &::mzident_core::Arenas) -> bool {
            let _ = (other, arenas);
            #(#comparisons &&)* true
        }
    }
}

fn generate_value_eq_enum(data: &syn::DataEnum) -> proc_macro2::TokenStream {
    let arms: Vec<_> = data
        .variants
        .iter()
        .map(|variant| {
            let variant_ident = &variant.ident;
            let bindings = VariantBindings::new(&variant.fields);
            let lhs = bindings.pattern("lhs");
            let rhs = bindings.pattern("rhs");
            let comparisons: Vec<_> = bindings
                .compared
                .iter()
                .map(|key| {
                    let l = format_ident!("__lhs_{}", key);
                    let r = format_ident!("__rhs_{}", key);
                    quote! { ::mzident_core::ValueEq::value_eq(#l, #r, arenas) }
                })
                .collect();
            quote! {
                (Self::#variant_ident #lhs, Self::#variant_ident #rhs) => {
                    #(#comparisons &&)* true
                }
            }
        })
        .collect();

    quote! {
        #[allow(unreachable_patterns)]
        fn value_eq(&self, other: &Self, arenas: &::mzident_core::Arenas) -> bool {
            let _ = arenas;
            match (self, other) {
                #(#arms)*
                _ => false,
            }
        }
    }
}

/// Binding names for one enum variant's compared fields.
///
/// Named fields bind as `__lhs_<name>`, positional ones as `__lhs_<index>`.
pub(crate) struct VariantBindings<'a> {
    fields: &'a syn::Fields,
    pub compared: Vec<String>,
}

impl<'a> VariantBindings<'a> {
    pub(crate) fn new(fields: &'a syn::Fields) -> Self {
        let compared = match fields {
            syn::Fields::Named(named) => named
                .named
                .iter()
                .filter(|f| !parse_field_attrs(&f.attrs).skip)
                .filter_map(|f| f.ident.as_ref().map(|i| i.to_string()))
                .collect(),
            syn::Fields::Unnamed(unnamed) => unnamed
                .unnamed
                .iter()
                .enumerate()
                .filter(|(_, f)| !parse_field_attrs(&f.attrs).skip)
                .map(|(i, _)| i.to_string())
                .collect(),
            syn::Fields::Unit => Vec::new(),
        };
        VariantBindings { fields, compared }
    }

    /// Destructuring pattern binding compared fields and ignoring the rest.
    pub(crate) fn pattern(&self, side: &str) -> proc_macro2::TokenStream {
        match self.fields {
            syn::Fields::Named(named) => {
                let binds: Vec<_> = named
                    .named
                    .iter()
                    .filter(|f| !parse_field_attrs(&f.attrs).skip)
                    .filter_map(|f| {
                        let ident = f.ident.as_ref()?;
                        let binding = format_ident!("__{}_{}", side, ident);
                        Some(quote! { #ident: #binding })
                    })
                    .collect();
                quote! { { #(#binds,)* .. } }
            }
            syn::Fields::Unnamed(unnamed) => {
                let binds: Vec<_> = unnamed
                    .unnamed
                    .iter()
                    .enumerate()
                    .map(|(i, f)| {
                        if parse_field_attrs(&f.attrs).skip {
                            quote! { _ }
                        } else {
                            let binding = format_ident!("__{}_{}", side, i);
                            quote! { #binding }
                        }
                    })
                    .collect();
                quote! { ( #(#binds),* ) }
            }
            syn::Fields::Unit => quote! {},
        }
    }
}

#[derive(Default)]
pub(crate) struct FieldAttrs {
    pub skip: bool,
}

/// Parses the `value_eq` attributes of one field, rejecting unknown keys.
fn field_attrs(attrs: &[syn::Attribute]) -> syn::Result<FieldAttrs> {
    let mut result = FieldAttrs::default();

    for attr in attrs {
        if !attr.path().is_ident("value_eq") {
            continue;
        }

        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("skip") {
                result.skip = true;
                Ok(())
            } else {
                Err(meta.error("unknown value_eq attribute"))
            }
        })?;
    }

    Ok(result)
}

/// Validates every field attribute up front so code generation can use the
/// infallible [`parse_field_attrs`].
fn check_field_attrs(input: &DeriveInput) -> syn::Result<()> {
    let fields: Vec<&syn::Field> = match &input.data {
        syn::Data::Struct(data) => data.fields.iter().collect(),
        syn::Data::Enum(data) => data.variants.iter().flat_map(|v| v.fields.iter()).collect(),
        syn::Data::Union(_) => Vec::new(),
    };
    for field in fields {
        field_attrs(&field.attrs)?;
    }
    Ok(())
}

pub(crate) fn parse_field_attrs(attrs: &[syn::Attribute]) -> FieldAttrs {
    field_attrs(attrs).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use syn::parse_quote;

    #[test]
    fn skip_is_accepted() {
        let input: DeriveInput = parse_quote! {
            struct Sample {
                #[value_eq(skip)]
                id: Option<String>,
                name: Option<String>,
            }
        };
        assert!(check_field_attrs(&input).is_ok());
        assert!(derive_value_eq_impl(&input).is_ok());
    }

    #[test]
    fn misspelled_key_is_rejected() {
        let input: DeriveInput = parse_quote! {
            struct Sample {
                #[value_eq(skp)]
                id: Option<String>,
            }
        };
        let err = derive_value_eq_impl(&input).unwrap_err();
        assert_eq!(err.to_string(), "unknown value_eq attribute");
    }

    #[test]
    fn enum_fields_are_checked() {
        let input: DeriveInput = parse_quote! {
            enum Contact {
                Person { #[value_eq(ignore)] id: u32 },
            }
        };
        assert!(check_field_attrs(&input).is_err());
    }
}
