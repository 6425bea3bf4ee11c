//! Shared helpers for inspecting `syn::Type` without stringification.

use syn::{GenericArgument, Path, PathArguments, Type, TypeParamBound};

/// Type names read from a single column.
const SCALAR_IDENTS: &[&str] = &[
    "i8", "i16", "i32", "i64", "isize", "u8", "u16", "u32", "u64", "usize", "f32", "f64", "bool",
    "char", "String", "NaiveDate", "NaiveTime", "NaiveDateTime", "DateTime", "Uuid",
];

const MAP_IDENTS: &[&str] = &["HashMap", "BTreeMap", "IndexMap", "HashSet", "BTreeSet", "IndexSet"];

const CHANNEL_IDENTS: &[&str] = &["Sender", "Receiver", "SyncSender", "UnboundedSender", "UnboundedReceiver"];

const CALLABLE_TRAITS: &[&str] = &["Fn", "FnMut", "FnOnce"];

fn last_path_ident(path: &Path) -> Option<&syn::Ident> {
    path.segments.last().map(|seg| &seg.ident)
}

fn type_path(ty: &Type) -> Option<&Path> {
    if let Type::Path(type_path) = ty {
        Some(&type_path.path)
    } else {
        None
    }
}

fn last_ident_is(ty: &Type, names: &[&str]) -> bool {
    type_path(ty)
        .and_then(last_path_ident)
        .is_some_and(|ident| names.iter().any(|name| ident == name))
}

/// First generic type argument of `ty` when its last path segment is `wrapper`.
fn generic_inner<'t>(ty: &'t Type, wrapper: &str) -> Option<&'t Type> {
    let path = type_path(ty)?;
    let segment = path.segments.last()?;
    if segment.ident != wrapper {
        return None;
    }
    let PathArguments::AngleBracketed(args) = &segment.arguments else {
        return None;
    };
    args.args.iter().find_map(|arg| {
        if let GenericArgument::Type(inner) = arg {
            Some(inner)
        } else {
            None
        }
    })
}

pub(crate) fn option_inner_type(ty: &Type) -> Option<&Type> {
    generic_inner(ty, "Option")
}

pub(crate) fn box_inner_type(ty: &Type) -> Option<&Type> {
    generic_inner(ty, "Box")
}

pub(crate) fn vec_inner_type(ty: &Type) -> Option<&Type> {
    generic_inner(ty, "Vec")
}

pub(crate) fn type_is_vec_u8(ty: &Type) -> bool {
    vec_inner_type(ty).is_some_and(|inner| last_ident_is(inner, &["u8"]))
}

/// A type converted through `FromColumn`: a known scalar, `Vec<u8>`, or an
/// `Option` of either.
pub(crate) fn type_is_scalar(ty: &Type) -> bool {
    let ty = option_inner_type(ty).unwrap_or(ty);
    last_ident_is(ty, SCALAR_IDENTS) || type_is_vec_u8(ty)
}

pub(crate) fn type_is_map(ty: &Type) -> bool {
    last_ident_is(ty, MAP_IDENTS)
}

pub(crate) fn type_is_channel(ty: &Type) -> bool {
    last_ident_is(ty, CHANNEL_IDENTS)
}

fn bounds_are_callable<'b>(mut bounds: impl Iterator<Item = &'b TypeParamBound>) -> bool {
    bounds.any(|bound| {
        matches!(bound, TypeParamBound::Trait(trait_bound)
            if last_path_ident(&trait_bound.path)
                .is_some_and(|ident| CALLABLE_TRAITS.iter().any(|name| ident == name)))
    })
}

/// `fn(..)` pointers and `dyn Fn(..)` / `impl Fn(..)` objects.
pub(crate) fn type_is_callable(ty: &Type) -> bool {
    match ty {
        Type::BareFn(_) => true,
        Type::TraitObject(object) => bounds_are_callable(object.bounds.iter()),
        Type::ImplTrait(object) => bounds_are_callable(object.bounds.iter()),
        _ => false,
    }
}

/// `dyn Trait` / `impl Trait` objects that are not callables.
pub(crate) fn type_is_polymorphic(ty: &Type) -> bool {
    matches!(ty, Type::TraitObject(_) | Type::ImplTrait(_)) && !type_is_callable(ty)
}
