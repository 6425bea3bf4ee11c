//! `#[derive(Entity)]` code generation.
//!
//! Emits two impls for the annotated struct:
//!
//! - `Fields`, visiting every bindable `#[scan]` field in declaration order;
//! - `Entity`, describing every `#[scan]` field (unsupported shapes included)
//!   as a `FieldSchema` for the runtime schema compiler.

mod attrs;
mod classify;

use proc_macro2::TokenStream;
use quote::{quote, quote_spanned};
use syn::ext::IdentExt;
use syn::spanned::Spanned;
use syn::{DeriveInput, Error, Ident, LitStr, Result, Type};

use self::attrs::parse_scan_attr;
use self::classify::{FieldKind, classify};
use crate::common::{extract_named_fields, has_attribute, type_display};
use crate::paths::{core as core_paths, std as std_paths};

struct FieldPlan<'a> {
    ident: &'a Ident,
    name: LitStr,
    ty: &'a Type,
    kind: FieldKind<'a>,
}

impl FieldPlan<'_> {
    fn visit(&self) -> TokenStream {
        let Self { ident, name, ty, .. } = self;
        match &self.kind {
            FieldKind::Scalar => quote_spanned! {ty.span()=>
                visitor.scalar(#name, &mut self.#ident)?;
            },
            FieldKind::Codec => quote_spanned! {ty.span()=>
                visitor.codec(#name, &mut self.#ident)?;
            },
            FieldKind::OneToOne { wrapper, .. } => {
                let wrapper = wrapper.path();
                quote_spanned! {ty.span()=>
                    visitor.one_to_one(#name, &mut #wrapper(&mut self.#ident))?;
                }
            }
            FieldKind::OneToMany { .. } => quote_spanned! {ty.span()=>
                visitor.one_to_many(#name, &mut self.#ident)?;
            },
            FieldKind::Unsupported(_) => quote! {},
        }
    }

    fn schema(&self) -> TokenStream {
        let field_schema = core_paths::field_schema();
        let name = &self.name;
        let ident = self.ident.unraw().to_string();
        let type_name = type_display(self.ty);
        match &self.kind {
            FieldKind::Scalar => quote! {
                #field_schema::scalar(#name, #ident, #type_name)
            },
            FieldKind::Codec => quote! {
                #field_schema::codec(#name, #ident, #type_name)
            },
            FieldKind::OneToOne { inner, .. } => quote! {
                #field_schema::one_to_one::<#inner>(#name, #ident, #type_name)
            },
            FieldKind::OneToMany { inner } => quote! {
                #field_schema::one_to_many::<#inner>(#name, #ident, #type_name)
            },
            FieldKind::Unsupported(shape) => {
                let shape = shape.path();
                quote! {
                    #field_schema::unsupported(#name, #ident, #type_name, #shape)
                }
            }
        }
    }
}

pub(crate) fn generate_entity(input: DeriveInput) -> Result<TokenStream> {
    let struct_name = &input.ident;
    let fields = extract_named_fields(&input)?;

    let mut plans: Vec<FieldPlan<'_>> = Vec::new();
    for field in fields.iter().filter(|field| has_attribute(field, "scan")) {
        let Some(attr) = parse_scan_attr(field)? else {
            continue;
        };
        let Some(ident) = field.ident.as_ref() else {
            continue;
        };

        if plans.iter().any(|plan| plan.name.value() == attr.name.value()) {
            return Err(Error::new(
                attr.name.span(),
                format!(
                    "column name `{}` is already bound by another field of `{struct_name}`",
                    attr.name.value()
                ),
            ));
        }

        let kind = classify(&field.ty, attr.mode.as_ref())?;
        plans.push(FieldPlan {
            ident,
            name: attr.name,
            ty: &field.ty,
            kind,
        });
    }

    let entity = core_paths::entity();
    let fields_trait = core_paths::fields();
    let field_visitor = core_paths::field_visitor();
    let result = core_paths::result();
    let entity_schema = core_paths::entity_schema();
    let std_result = std_paths::result();
    let std_vec = std_paths::vec();

    let struct_name_str = struct_name.unraw().to_string();
    let visits = plans.iter().map(FieldPlan::visit);
    let schemas = plans.iter().map(FieldPlan::schema);
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    Ok(quote! {
        impl #impl_generics #fields_trait for #struct_name #ty_generics #where_clause {
            fn entity_name(&self) -> &'static str {
                #struct_name_str
            }

            #[allow(unused_variables)]
            fn visit_fields(&mut self, visitor: &mut dyn #field_visitor) -> #result<()> {
                #(#visits)*
                #std_result::Ok(())
            }
        }

        impl #impl_generics #entity for #struct_name #ty_generics #where_clause {
            fn schema() -> #entity_schema {
                #entity_schema::of::<Self>(#struct_name_str, #std_vec![#(#schemas),*])
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use syn::parse_quote;

    fn expand(input: DeriveInput) -> Result<String> {
        generate_entity(input).map(|tokens| tokens.to_string())
    }

    #[test]
    fn test_generates_visits_and_schema() {
        let output = expand(parse_quote! {
            struct User {
                #[scan("id")]
                id: i64,
                #[scan("role")]
                role: Option<Box<Role>>,
                #[scan("vehicle")]
                vehicles: Vec<Vehicle>,
                #[scan("characteristics", codec)]
                characteristics: Traits,
                cache: u64,
            }
        })
        .unwrap();

        assert!(output.contains("visitor . scalar (\"id\" , & mut self . id)"));
        assert!(output.contains("rowfold :: core :: OptionalBoxed (& mut self . role)"));
        assert!(output.contains("visitor . one_to_many (\"vehicle\" , & mut self . vehicles)"));
        assert!(output.contains("visitor . codec (\"characteristics\""));
        assert!(output.contains("one_to_one :: < Role >"));
        assert!(!output.contains("cache"));
    }

    #[test]
    fn test_unsupported_fields_are_described_not_visited() {
        let output = expand(parse_quote! {
            struct Lookup {
                #[scan("table")]
                table: HashMap<String, i64>,
            }
        })
        .unwrap();

        assert!(output.contains("rowfold :: core :: Shape :: Map"));
        assert!(output.contains("\"HashMap<String, i64>\""));
        assert!(!output.contains("visitor . scalar"));
    }

    #[test]
    fn test_raw_identifiers_are_unrawed() {
        let output = expand(parse_quote! {
            struct Vehicle {
                #[scan("type")]
                r#type: String,
            }
        })
        .unwrap();
        assert!(output.contains("\"type\" , \"type\" , \"String\""));
    }

    #[test]
    fn test_rejects_duplicate_column_names() {
        let err = expand(parse_quote! {
            struct Pair {
                #[scan("id")]
                left: i64,
                #[scan("id")]
                right: i64,
            }
        })
        .unwrap_err();
        assert!(err.to_string().contains("already bound"));
    }

    #[test]
    fn test_rejects_non_structs() {
        let err = expand(parse_quote! {
            enum Kind {
                Car,
            }
        })
        .unwrap_err();
        assert!(err.to_string().contains("not enums"));
    }
}
