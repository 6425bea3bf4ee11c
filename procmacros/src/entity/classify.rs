//! Decides how each annotated field is bound, from its declared type and an
//! optional explicit flag.

use proc_macro2::TokenStream;
use quote::quote;
use syn::{Error, Ident, Result, Type};

use super::attrs::Mode;
use crate::common::type_utils::{
    box_inner_type, option_inner_type, type_is_callable, type_is_channel, type_is_map,
    type_is_polymorphic, type_is_scalar, vec_inner_type,
};
use crate::paths::core as core_paths;

/// How a one-to-one child is held by its parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Wrapper {
    Required,
    Boxed,
    Optional,
    OptionalBoxed,
}

impl Wrapper {
    pub(crate) fn path(self) -> TokenStream {
        match self {
            Self::Required => core_paths::required(),
            Self::Boxed => core_paths::boxed(),
            Self::Optional => core_paths::optional(),
            Self::OptionalBoxed => core_paths::optional_boxed(),
        }
    }
}

/// Field shapes recorded in the schema and rejected when it is validated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Shape {
    Array,
    Map,
    NestedCollection,
    Callable,
    Channel,
    Polymorphic,
}

impl Shape {
    pub(crate) fn path(self) -> TokenStream {
        let shape = core_paths::shape();
        match self {
            Self::Array => quote!(#shape::Array),
            Self::Map => quote!(#shape::Map),
            Self::NestedCollection => quote!(#shape::NestedCollection),
            Self::Callable => quote!(#shape::Callable),
            Self::Channel => quote!(#shape::Channel),
            Self::Polymorphic => quote!(#shape::Polymorphic),
        }
    }
}

pub(crate) enum FieldKind<'t> {
    Scalar,
    Codec,
    OneToOne { wrapper: Wrapper, inner: &'t Type },
    OneToMany { inner: &'t Type },
    Unsupported(Shape),
}

pub(crate) fn classify<'t>(ty: &'t Type, mode: Option<&(Mode, Ident)>) -> Result<FieldKind<'t>> {
    match mode {
        Some((Mode::Codec, _)) => Ok(FieldKind::Codec),
        Some((Mode::Scalar, _)) => Ok(FieldKind::Scalar),
        Some((Mode::Many, flag)) => vec_inner_type(ty)
            .map(|inner| FieldKind::OneToMany { inner })
            .ok_or_else(|| Error::new(flag.span(), "`many` fields must be declared as Vec<T>")),
        Some((Mode::One, _)) => one_to_one(ty),
        None => infer(ty),
    }
}

fn infer(ty: &Type) -> Result<FieldKind<'_>> {
    if let Some(shape) = shape_of(ty) {
        return Ok(FieldKind::Unsupported(shape));
    }
    if type_is_scalar(ty) {
        return Ok(FieldKind::Scalar);
    }

    if let Some(inner) = vec_inner_type(ty) {
        if type_is_scalar(inner) {
            return Err(Error::new_spanned(
                ty,
                "collections of scalars cannot be bound to rows, wrap the element in an entity or mark the field `codec`",
            ));
        }
        return Ok(FieldKind::OneToMany { inner });
    }
    if option_inner_type(ty).is_some_and(|inner| vec_inner_type(inner).is_some()) {
        return Err(Error::new_spanned(
            ty,
            "Option<Vec<T>> is not supported, use Vec<T>: a parent without children gets an empty Vec",
        ));
    }

    match ty {
        Type::Reference(_) => Err(Error::new_spanned(
            ty,
            "borrowed fields cannot be scanned into, use an owned type",
        )),
        Type::Tuple(_) => Err(Error::new_spanned(
            ty,
            "tuples cannot be scanned into, use a nested #[derive(Entity)] struct",
        )),
        _ => one_to_one(ty),
    }
}

fn shape_of(ty: &Type) -> Option<Shape> {
    let ty = option_inner_type(ty).unwrap_or(ty);
    let ty = box_inner_type(ty).unwrap_or(ty);

    if let Some(inner) = vec_inner_type(ty)
        && (vec_inner_type(inner).is_some() || matches!(inner, Type::Array(_)))
    {
        return Some(Shape::NestedCollection);
    }
    if matches!(ty, Type::Array(_)) {
        Some(Shape::Array)
    } else if type_is_callable(ty) {
        Some(Shape::Callable)
    } else if type_is_polymorphic(ty) {
        Some(Shape::Polymorphic)
    } else if type_is_map(ty) {
        Some(Shape::Map)
    } else if type_is_channel(ty) {
        Some(Shape::Channel)
    } else {
        None
    }
}

fn one_to_one(ty: &Type) -> Result<FieldKind<'_>> {
    let (wrapper, inner) = match option_inner_type(ty) {
        Some(inner) => match box_inner_type(inner) {
            Some(boxed) => (Wrapper::OptionalBoxed, boxed),
            None => (Wrapper::Optional, inner),
        },
        None => match box_inner_type(ty) {
            Some(boxed) => (Wrapper::Boxed, boxed),
            None => (Wrapper::Required, ty),
        },
    };

    if !matches!(inner, Type::Path(_)) {
        return Err(Error::new_spanned(
            ty,
            "cannot infer how to scan this type, mark the field `codec` or `scalar`",
        ));
    }
    Ok(FieldKind::OneToOne { wrapper, inner })
}
