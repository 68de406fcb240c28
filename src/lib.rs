// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

// Unsafe code should not be used.
// Hard to reason about correctness, and maintainability.
#![forbid(unsafe_code)]
// Ensure that all lint names are valid.
#![deny(unknown_lints)]
// Fail-fast lints: correctness, safety, and API surface
#![deny(
    // Panic sources - catch all ways code can panic
    clippy::panic, // forbid explicit panic! macro
    clippy::unreachable, // catches unreachable! macro usage
    clippy::todo, // blocks remaining todo! placeholders
    clippy::unimplemented, // blocks unimplemented! placeholders
    clippy::unwrap_used, // reject Result/Option unwraps
    clippy::expect_used, // reject expect with panic messages
    clippy::indexing_slicing, // reject unchecked [] indexing

    // Rust warnings/upstream
    dead_code, // ban unused items
    deprecated, // prevent use of deprecated APIs
    future_incompatible, // catch patterns slated to break
    keyword_idents, // disallow identifiers that are keywords
    missing_debug_implementations, // require Debug on public types
    non_ascii_idents, // disallow non-ASCII identifiers
    nonstandard_style, // enforce idiomatic naming/style
    trivial_casts, // block needless casts
    unreachable_code, // catch dead/unreachable code
    unreachable_patterns, // catch unreachable match arms
    unused_extern_crates, // remove unused extern crate declarations
    unused_import_braces, // avoid unused braces in imports

    // no_std hygiene
    clippy::std_instead_of_core, // prefer core/alloc over std in no_std

    // Misc polish
    clippy::dbg_macro, // forbid dbg! in production code
    clippy::semicolon_if_nothing_returned, // enforce trailing semicolon for unit
)]
#![warn(
    clippy::match_like_matches_macro, // prefer matches! macro over verbose match
    clippy::needless_continue, // remove redundant continue statements
)]
#![cfg_attr(docsrs, feature(doc_cfg))]
// Use README.md as crate documentation.
#![doc = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/README.md"))]
// We'll default to building for no_std - use core, alloc instead of std.
#![no_std]

extern crate alloc;

// Import std crate if building with std support.
// We don't import types or macros from std.
// As a result, types and macros from std must be qualified via `std::`
// making dependencies on std easier to spot.
#[cfg(any(feature = "std", test))]
extern crate std;

mod convert;
mod diagnostics;
mod finalize;
mod input;
mod number;
mod source;
mod types;
mod value;
mod variable;

pub use convert::{convert, ConversionError};
pub use diagnostics::{Diagnostic, Diagnostics, Severity};
pub use finalize::{check_input_variables, finalize_input_variables, prepare_final_input_value};
pub use input::{InputValue, InputValues, SourceKind};
pub use number::{Number, ParseNumberError};
pub use source::{SourcePos, SourceRange};
pub use types::Type;
pub use value::Value;
pub use variable::{VariableDecl, VariableDecls};

#[cfg(feature = "arc")]
pub use alloc::sync::Arc as Rc;

#[cfg(not(feature = "arc"))]
pub use alloc::rc::Rc;

#[cfg(test)]
mod tests;
