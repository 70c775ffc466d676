#![allow(unreachable_pub)]
#![allow(clippy::needless_pass_by_value)]

//! # Macros
//!
//! Procedural macros for the imghub workspace.
//!
//! * [`macro@imghub_error`] declares every error enum in the workspace. Consumers need
//!   `thiserror` in their own dependency list because the expansion refers to `::thiserror::Error`.
//! * [`macro@api_model`] and [`macro@api_handler`] wire HTTP payloads and handlers into serde and
//!   `utoipa`. The `utoipa` parts are gated on the consuming crate's `server` feature.

mod macros;

use proc_macro::TokenStream;
use syn::{DeriveInput, ItemFn, ItemStruct, parse_macro_input};

/// Turns a plain enum into a fully wired error type.
///
/// # Generated items
///
/// * `#[derive(Debug, thiserror::Error)]` unless already derived.
/// * A `<Name>Ext<T>` trait with `.context(..)`, implemented for `Result<T, Name>` and for
///   `Result<T, Source>` of every variant holding a `source` field.
/// * `From<Source>` for every variant holding a `source` field (other than `Internal`).
/// * `From<&'static str>` and `From<String>` when an `Internal { message, context }` variant exists.
/// * A module-local `format_context` helper for use inside `#[error(..)]` strings.
///
/// # Requirements
///
/// * Variants must use named fields.
/// * A variant with a source must also carry `context: Option<Cow<'static, str>>`.
/// * Only one annotated enum per module, because `format_context` is emitted next to it.
///
/// # Example
///
/// ```rust,ignore
/// use std::borrow::Cow;
///
/// #[imghub_derive::imghub_error]
/// pub enum StorageError {
///     #[error("I/O failure{}: {source}", format_context(.context))]
///     Io { source: std::io::Error, context: Option<Cow<'static, str>> },
/// }
///
/// fn read() -> Result<Vec<u8>, StorageError> {
///     std::fs::read("x").context("Reading x")
/// }
/// ```
#[proc_macro_attribute]
pub fn imghub_error(_args: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as DeriveInput);
    macros::error::expand(input).into()
}

/// Attribute macro for HTTP request and response payloads.
///
/// Adds `Debug`, `serde::Serialize`, `serde::Deserialize` and, when the consuming crate's
/// `server` feature is on, `utoipa::ToSchema`. Derives already present are left alone.
///
/// # Arguments
///
/// * `rename_all = "..."`: serde casing, `camelCase` by default.
/// * `deny_unknown_fields = bool`: defaults to `true`.
///
/// # Example
///
/// ```rust,ignore
/// use imghub_derive::api_model;
///
/// #[api_model(deny_unknown_fields = false)]
/// pub struct UploadRequest {
///     pub url: String,
/// }
/// ```
#[proc_macro_attribute]
pub fn api_model(attr: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as ItemStruct);
    macros::api::expand_api_model(attr.into(), input).into()
}

/// Attribute macro for axum handlers documented with `utoipa`.
///
/// Arguments are passed verbatim to `utoipa::path` (`get`, `path = "..."`, `responses(..)`,
/// `tag = ..`) when the consuming crate's `server` feature is on.
///
/// # Example
///
/// ```rust,ignore
/// use imghub_derive::api_handler;
///
/// #[api_handler(
///     get,
///     path = "/health",
///     responses((status = OK, body = HealthResponse)),
///     tag = "System"
/// )]
/// pub async fn health_handler() -> Json<HealthResponse> {
///     // ...
/// }
/// ```
#[proc_macro_attribute]
pub fn api_handler(args: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as ItemFn);
    macros::api::expand_api_handler(args.into(), input).into()
}
