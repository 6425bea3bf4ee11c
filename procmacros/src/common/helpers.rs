//! Shared helper functions for procedural macro code generation.

use quote::ToTokens;
use syn::{Data, DeriveInput, Error, Field, Fields, Result};

/// Extract the named fields of a struct.
///
/// # Errors
///
/// Returns an error if the input is an enum, a union, a tuple struct or a
/// unit struct.
pub(crate) fn extract_named_fields(
    input: &DeriveInput,
) -> Result<&syn::punctuated::Punctuated<Field, syn::token::Comma>> {
    let struct_name = &input.ident;
    match &input.data {
        Data::Struct(data_struct) => match &data_struct.fields {
            Fields::Named(fields) => Ok(&fields.named),
            Fields::Unnamed(_) => Err(Error::new_spanned(
                struct_name,
                "Entity cannot be derived for tuple structs, fields need names to carry #[scan] annotations",
            )),
            Fields::Unit => Err(Error::new_spanned(
                struct_name,
                "Entity cannot be derived for unit structs",
            )),
        },
        Data::Enum(_) => Err(Error::new_spanned(
            struct_name,
            "Entity can only be derived for structs, not enums",
        )),
        Data::Union(_) => Err(Error::new_spanned(
            struct_name,
            "Entity can only be derived for structs, not unions",
        )),
    }
}

/// Check if a field has a specific attribute by name.
pub(crate) fn has_attribute(field: &Field, attr_name: &str) -> bool {
    field.attrs.iter().any(|attr| {
        attr.path()
            .get_ident()
            .is_some_and(|ident| ident == attr_name)
    })
}

/// Render a type the way it was written, for error messages.
///
/// Token spacing is dropped around punctuation, so `HashMap < String , i64 >`
/// reads as `HashMap<String, i64>`.
pub(crate) fn type_display(ty: &syn::Type) -> String {
    let raw = ty.to_token_stream().to_string();
    let chars: Vec<char> = raw.chars().collect();
    let tight = |c: char| matches!(c, '<' | '>' | ',' | ':' | '&' | '(' | ')' | '[' | ']' | ';');

    let mut out = String::with_capacity(raw.len());
    for (i, &c) in chars.iter().enumerate() {
        if c == ' ' {
            let prev = i.checked_sub(1).and_then(|p| chars.get(p)).copied();
            let next = chars.get(i + 1).copied();
            if prev.is_some_and(tight) || next.is_some_and(tight) {
                continue;
            }
        }
        out.push(c);
    }
    out.replace(',', ", ").replace(';', "; ")
}
