//! `#[scan("name")]` / `#[scan("name", flag)]` parsing.

use syn::parse::{Parse, ParseStream};
use syn::{Error, Field, Ident, LitStr, Result, Token};

/// Explicit binding mode overriding type inference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Mode {
    Codec,
    Scalar,
    One,
    Many,
}

pub(crate) struct ScanAttr {
    pub(crate) name: LitStr,
    pub(crate) mode: Option<(Mode, Ident)>,
}

impl Parse for ScanAttr {
    fn parse(input: ParseStream) -> Result<Self> {
        let name: LitStr = input.parse()?;
        if name.value().is_empty() {
            return Err(Error::new(name.span(), "column name must not be empty"));
        }

        let mut mode = None;
        if input.parse::<Option<Token![,]>>()?.is_some() && !input.is_empty() {
            let flag: Ident = input.parse()?;
            let parsed = match flag.to_string().as_str() {
                "codec" => Mode::Codec,
                "scalar" => Mode::Scalar,
                "one" => Mode::One,
                "many" => Mode::Many,
                other => {
                    return Err(Error::new(
                        flag.span(),
                        format!("unknown scan flag `{other}`, expected one of: codec, scalar, one, many"),
                    ));
                }
            };
            mode = Some((parsed, flag));
            input.parse::<Option<Token![,]>>()?;
        }

        if !input.is_empty() {
            return Err(input.error("expected #[scan(\"name\")] or #[scan(\"name\", flag)]"));
        }
        Ok(Self { name, mode })
    }
}

/// The field's `#[scan(...)]` attribute, if any.
pub(crate) fn parse_scan_attr(field: &Field) -> Result<Option<ScanAttr>> {
    let mut found = None;
    for attr in &field.attrs {
        if !attr.path().is_ident("scan") {
            continue;
        }
        if found.is_some() {
            return Err(Error::new_spanned(attr, "duplicate #[scan] attribute"));
        }
        found = Some(attr.parse_args::<ScanAttr>()?);
    }
    Ok(found)
}
