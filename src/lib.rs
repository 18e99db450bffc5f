#![no_std]

//! A schema-driven decoder for flat key/value option sets.
//!
//! Cotter takes the output of an option tokenizer — an ordered, possibly
//! repeated sequence of textual `name=value` pairs — and decodes it into
//! typed Rust values, tracking which occurrences have been consumed so
//! that missing and unrecognized options are both reported precisely.
//! Repeated occurrences of a name decode as lists, and a single
//! occurrence holding a numeric interval (such as `3-7`) expands into
//! the individual elements of that interval.
//!
//! Most users should begin with the [`decode`](typed::decode) function
//! and the derive macros in the [`typed`] module. Applications driving
//! an external schema directly can instead operate the underlying
//! [`Session`](session::Session), which exposes the struct, list, and
//! scalar operations one call at a time.
//!
//! ## Cargo Features
//!
//! The following crate feature flags are available:
//!
//! - `derive`: enable derive macros (default).

extern crate alloc;

pub mod session;
pub mod source;
pub mod typed;
