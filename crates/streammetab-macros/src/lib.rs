use proc_macro::TokenStream;
use quote::{format_ident, quote};
use syn::{parse_macro_input, Data, DeriveInput, Fields, Lit, Meta};

/// Derive macro that generates a companion `*Series` struct holding one
/// column per field, filled one integration step at a time. All fields in the
/// source struct must be `f64`.
///
/// The generated series struct has the same fields as `Vec<f64>`, with
/// `with_capacity`, `push`, `len`, `is_empty`, `row` and `column` methods.
/// A `field_names()` associated function is also added to the source struct.
///
/// Use `#[fluxes(series_name = "CustomName")]` to override the default
/// series struct name (`{StructName}Series`).
#[proc_macro_derive(Fluxes, attributes(fluxes))]
pub fn derive_fluxes(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    let name = &input.ident;

    let series_name =
        extract_series_name(&input).unwrap_or_else(|| format_ident!("{}Series", name));

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(named) => &named.named,
            _ => {
                return syn::Error::new_spanned(
                    name,
                    "Fluxes can only be derived for structs with named fields",
                )
                .to_compile_error()
                .into();
            }
        },
        _ => {
            return syn::Error::new_spanned(name, "Fluxes can only be derived for structs")
                .to_compile_error()
                .into();
        }
    };

    if fields.is_empty() {
        return syn::Error::new_spanned(name, "Fluxes struct must have at least one field")
            .to_compile_error()
            .into();
    }

    let mut field_names = Vec::new();
    let mut field_idents = Vec::new();
    for field in fields {
        let Some(ident) = field.ident.as_ref() else {
            continue;
        };
        if !is_f64_type(&field.ty) {
            return syn::Error::new_spanned(&field.ty, "Fluxes derive: all fields must be f64")
                .to_compile_error()
                .into();
        }
        field_names.push(ident.to_string());
        field_idents.push(ident);
    }

    let first_field = &field_idents[0];

    let field_name_strs: Vec<&str> = field_names.iter().map(|s| s.as_str()).collect();

    let series_fields = field_idents.iter().map(|f| {
        quote! { pub #f: Vec<f64> }
    });

    let with_cap_fields = field_idents.iter().map(|f| {
        quote! { #f: Vec::with_capacity(n) }
    });

    let push_fields = field_idents.iter().map(|f| {
        quote! { self.#f.push(f.#f); }
    });

    let row_fields = field_idents.iter().map(|f| {
        quote! { #f: self.#f[i] }
    });

    let column_arms = field_idents
        .iter()
        .zip(field_name_strs.iter())
        .map(|(f, s)| {
            quote! { #s => Some(self.#f.as_slice()) }
        });

    let expanded = quote! {
        /// Column-oriented output series, one entry per integration step.
        #[derive(Debug, Clone, Default, PartialEq)]
        pub struct #series_name {
            #(#series_fields,)*
        }

        impl #series_name {
            /// Pre-allocate all columns for `n` steps.
            pub fn with_capacity(n: usize) -> Self {
                Self {
                    #(#with_cap_fields,)*
                }
            }

            /// Append a single step's values.
            pub fn push(&mut self, f: &#name) {
                #(#push_fields)*
            }

            /// Number of steps stored.
            pub fn len(&self) -> usize {
                self.#first_field.len()
            }

            /// Returns `true` if no steps have been stored.
            pub fn is_empty(&self) -> bool {
                self.#first_field.is_empty()
            }

            /// Values of every column at step `i`.
            pub fn row(&self, i: usize) -> Option<#name> {
                if i >= self.len() {
                    return None;
                }
                Some(#name {
                    #(#row_fields,)*
                })
            }

            /// Look up a column by field name.
            pub fn column(&self, name: &str) -> Option<&[f64]> {
                match name {
                    #(#column_arms,)*
                    _ => None,
                }
            }
        }

        impl #name {
            /// Returns the field names of this struct, in declaration order.
            pub fn field_names() -> &'static [&'static str] {
                &[#(#field_name_strs),*]
            }
        }
    };

    expanded.into()
}

fn extract_series_name(input: &DeriveInput) -> Option<proc_macro2::Ident> {
    for attr in &input.attrs {
        if attr.path().is_ident("fluxes") {
            let nested = attr
                .parse_args_with(
                    syn::punctuated::Punctuated::<syn::Meta, syn::Token![,]>::parse_terminated,
                )
                .ok()?;
            for meta in nested {
                if let Meta::NameValue(nv) = meta {
                    if nv.path.is_ident("series_name") {
                        if let syn::Expr::Lit(expr_lit) = &nv.value {
                            if let Lit::Str(lit_str) = &expr_lit.lit {
                                return Some(format_ident!("{}", lit_str.value()));
                            }
                        }
                    }
                }
            }
        }
    }
    None
}

fn is_f64_type(ty: &syn::Type) -> bool {
    if let syn::Type::Path(type_path) = ty {
        type_path.path.is_ident("f64")
    } else {
        false
    }
}
