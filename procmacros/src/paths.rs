//! Centralized path definitions for generated code.
//!
//! This module provides fully-qualified paths for all types and traits used in macro-generated code.
//! Using `rowfold::` prefix (without leading `::`) allows doc tests in subcrates to create a
//! `mod rowfold { ... }` shim that re-exports from the current crate, avoiding circular dependencies.

use proc_macro2::TokenStream;
use quote::quote;

// =============================================================================
// STANDARD LIBRARY
// =============================================================================

pub mod std {
    use super::*;

    pub fn result() -> TokenStream {
        quote!(::std::result::Result)
    }

    pub fn vec() -> TokenStream {
        quote!(::std::vec)
    }
}

// =============================================================================
// CORE TYPES AND TRAITS
// =============================================================================

/// Runtime items from rowfold::core
pub mod core {
    use super::*;

    pub fn entity() -> TokenStream {
        quote!(rowfold::core::Entity)
    }

    pub fn fields() -> TokenStream {
        quote!(rowfold::core::Fields)
    }

    pub fn field_visitor() -> TokenStream {
        quote!(rowfold::core::FieldVisitor)
    }

    pub fn result() -> TokenStream {
        quote!(rowfold::core::Result)
    }

    pub fn entity_schema() -> TokenStream {
        quote!(rowfold::core::EntitySchema)
    }

    pub fn field_schema() -> TokenStream {
        quote!(rowfold::core::FieldSchema)
    }

    pub fn shape() -> TokenStream {
        quote!(rowfold::core::Shape)
    }

    pub fn required() -> TokenStream {
        quote!(rowfold::core::Required)
    }

    pub fn boxed() -> TokenStream {
        quote!(rowfold::core::Boxed)
    }

    pub fn optional() -> TokenStream {
        quote!(rowfold::core::Optional)
    }

    pub fn optional_boxed() -> TokenStream {
        quote!(rowfold::core::OptionalBoxed)
    }
}
