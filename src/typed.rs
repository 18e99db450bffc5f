//! Typed decoding interfaces for common record shapes.
//!
//! The traits in this module connect record types to the decode
//! [`Session`], publishing whole records through [`FromOpts`] and
//! single named fields through [`OptValue`].
//!
//! In many cases (when records are structs of supported field types),
//! these traits can be derived. See the [`FromOpts`](macro@FromOpts)
//! and [`OptValue`](macro@OptValue) macros for details.

use alloc::{string::String, vec::Vec};

use crate::{
    session::{DecodeError, Session},
    source::RawOptions,
};

/// Decode a typed record from a raw option set.
///
/// Builds a session over `source` and runs the record's
/// [`FromOpts`] implementation, which also performs the final
/// leftover check: an occurrence left unconsumed by every field fails
/// the decode.
pub fn decode<T: FromOpts>(source: &RawOptions) -> Result<T, DecodeError> {
    let mut session = Session::new(source);
    T::from_opts(&mut session)
}

/// Derive [`FromOpts`] for a struct decoded from an option set.
///
/// _Requires Cargo feature `derive`._
///
/// # Example
///
/// Each named field decodes under its option name: the field name with
/// underscores rendered as hyphens, or the name given with an
/// `#[opt("...")]` attribute. Fields of type `Option<T>` are optional;
/// all others are mandatory. A `Vec<T>` field decodes the name's
/// repeated occurrences (including ranges such as `1-4` for integer
/// elements) as a list.
///
/// ```
/// #[derive(Debug, FromOpts)]
/// struct Netdev {
///     mac: Option<String>,
///     #[opt("queue-count")]
///     queues: u64,
///     cpus: Vec<u64>,
/// }
/// ```
///
/// Two further attribute arguments adjust how a field decodes. `size`
/// routes a `u64` (or `Option<u64>`) field through the byte-size
/// decoder, accepting suffixed values like `512M`. `nested` decodes a
/// field through its own [`FromOpts`] implementation, drawing from the
/// same flat namespace.
///
/// ```
/// #[derive(Debug, FromOpts)]
/// struct Memdev {
///     #[opt(size)]
///     mem: u64,
///     #[opt(nested)]
///     policy: Policy,
/// }
/// ```
#[cfg(feature = "derive")]
pub use cotter_derive::FromOpts;

/// Produce one record from a decode session.
///
/// See the [`FromOpts`](macro@FromOpts) derive macro for an automatic
/// implementation of this trait.
pub trait FromOpts: Sized {
    /// Decode the record, consuming its fields' occurrences.
    fn from_opts(session: &mut Session<'_>) -> Result<Self, DecodeError>;
}

/// Derive [`OptValue`] for an enumeration of accepted tags.
///
/// _Requires Cargo feature `derive`._
///
/// # Example
///
/// Each unit variant matches its tag: the variant name in kebab case,
/// or the tag given with an `#[opt("...")]` attribute. Matching is
/// exact and case-sensitive; any other value fails the decode, naming
/// the accepted tags.
///
/// ```
/// #[derive(Debug, OptValue)]
/// enum Duplex {
///     Half,
///     Full,
///     #[opt("auto")]
///     Negotiated,
/// }
/// ```
#[cfg(feature = "derive")]
pub use cotter_derive::OptValue;

/// Produce one named field value from a decode session.
///
/// Implementations are provided for strings, booleans, the integer
/// primitives, `Option<T>` (an optional field), and `Vec<T>` (a
/// repeated field decoded as a list). See the
/// [`OptValue`](macro@OptValue) derive macro for implementations on
/// enumerations of accepted tags.
pub trait OptValue: Sized {
    /// Decode the field named `name`.
    fn decode(session: &mut Session<'_>, name: &str) -> Result<Self, DecodeError>;
}

impl OptValue for String {
    fn decode(session: &mut Session<'_>, name: &str) -> Result<Self, DecodeError> {
        session.decode_str(name)
    }
}

impl OptValue for bool {
    fn decode(session: &mut Session<'_>, name: &str) -> Result<Self, DecodeError> {
        session.decode_bool(name)
    }
}

impl OptValue for i64 {
    fn decode(session: &mut Session<'_>, name: &str) -> Result<Self, DecodeError> {
        session.decode_i64(name)
    }
}

impl OptValue for u64 {
    fn decode(session: &mut Session<'_>, name: &str) -> Result<Self, DecodeError> {
        session.decode_u64(name)
    }
}

macro_rules! narrowed {
    ($t:ident, $via:ident, $expected:literal) => {
        #[doc = concat!("Decoded through [`Session::", stringify!($via), "`], then range-checked.")]
        impl OptValue for $t {
            fn decode(session: &mut Session<'_>, name: &str) -> Result<Self, DecodeError> {
                let wide = session.$via(name)?;
                Self::try_from(wide).map_err(|_| DecodeError::InvalidParameterValue {
                    name: name.into(),
                    expected: $expected.into(),
                })
            }
        }
    };
}

narrowed!(u8, decode_u64, "a u8 value");
narrowed!(u16, decode_u64, "a u16 value");
narrowed!(u32, decode_u64, "a u32 value");

narrowed!(i8, decode_i64, "an i8 value");
narrowed!(i16, decode_i64, "an i16 value");
narrowed!(i32, decode_i64, "an i32 value");

/// An optional field: absent names decode as `None` rather than
/// failing with a missing-parameter error.
impl<T: OptValue> OptValue for Option<T> {
    fn decode(session: &mut Session<'_>, name: &str) -> Result<Self, DecodeError> {
        if session.has_field(name) {
            T::decode(session, name).map(Some)
        } else {
            Ok(None)
        }
    }
}

/// A repeated field, decoded as a list over the name's occurrences in
/// source order. Absent names fail with a missing-parameter error;
/// wrap in `Option` for a list that may be omitted.
impl<T: OptValue> OptValue for Vec<T> {
    fn decode(session: &mut Session<'_>, name: &str) -> Result<Self, DecodeError> {
        session.begin_list(name)?;

        let mut elements = Vec::new();
        while session.next_list_element() {
            match T::decode(session, name) {
                Ok(element) => elements.push(element),
                Err(err) => {
                    session.end_list();
                    Err(err)?
                }
            }
        }
        session.end_list();

        Ok(elements)
    }
}
