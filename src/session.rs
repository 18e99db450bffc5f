//! Decode sessions over a raw option source.
//!
//! A [`Session`] mediates one decode pass over one [`RawOptions`]
//! source. Operations are driven by the caller in program order,
//! following the shape of the target record: a struct is bracketed by
//! [`begin_struct`](Session::begin_struct) and
//! [`end_struct`](Session::end_struct), a repeated field by
//! [`begin_list`](Session::begin_list),
//! [`next_list_element`](Session::next_list_element), and
//! [`end_list`](Session::end_list), and each field value is produced by
//! one of the scalar decoders.
//!
//! # Architecture
//!
//! The outermost `begin_struct` groups the source's occurrences by name
//! into the *unprocessed index*, a map from name to the FIFO queue of
//! that name's occurrences. Every lookup runs against this index, and
//! every successful decode consumes from it: scalar decodes remove the
//! whole name, list iteration pops occurrences one at a time. A name is
//! present in the index exactly as long as an unconsumed occurrence
//! remains, so at the outermost `end_struct` any name still present is
//! an unrecognized extra and fails the decode. Nested `begin_struct`
//! calls share the enclosing flat namespace and do not touch the index.
//!
//! List decoding runs a small state machine. Opening a list pins the
//! named queue; each `next_list_element` then exposes the queue's head
//! occurrence to the scalar decoders, retiring it on the following
//! call. When an integer decoder finds a head occurrence of the form
//! `low-high` it switches the machine into a range state, and the
//! machine synthesizes the interval's elements one per call before
//! retiring the single occurrence that produced them. At most one list
//! is active at a time; lists do not nest.
//!
//! Misuse of the calling protocol (advancing a list that was never
//! opened, querying presence mid-list, nesting lists) is a programming
//! error and panics; malformed input data is reported as a
//! [`DecodeError`].

use alloc::{
    collections::{BTreeMap, VecDeque},
    string::String,
};

use thiserror::Error;

use crate::source::RawOptions;

mod literal;

/// The largest number of elements a single range occurrence may expand
/// to, bounding the cost of expressions like `0-99999999999`.
pub const RANGE_MAX: u64 = 65536;

/// Errors reported while decoding an option set.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// A mandatory option has no occurrence in the source.
    #[error("Parameter '{0}' is missing.")]
    MissingParameter(String),
    /// An occurrence was never consumed by any decode call.
    #[error("Invalid parameter '{0}'.")]
    InvalidParameter(String),
    /// An occurrence exists, but its value fails to parse or validate
    /// as the requested type.
    #[error("Parameter '{name}' expects {expected}.")]
    InvalidParameterValue { name: String, expected: String },
}

impl DecodeError {
    fn value(name: &str, expected: &str) -> Self {
        Self::InvalidParameterValue {
            name: name.into(),
            expected: expected.into(),
        }
    }
}

/// Progress of the list currently being traversed, if any.
///
/// Each variant carries exactly the data that exists in that state:
/// the pinned queue's name once a list is open, and the interval
/// counters only while expanding a range.
#[derive(Debug, Clone, Copy)]
enum ListMode<'a> {
    /// Not traversing a list of repeated options.
    None,
    /// `begin_list` succeeded; nothing consumed yet.
    Started { name: &'a str },
    /// Iterating raw occurrences one at a time. The queue's head is
    /// exposed to the scalar decoders; advancing retires it.
    InProgress { name: &'a str },
    /// Expanding one occurrence into a signed interval. Advancing
    /// counts `next` toward `limit`, then retires the occurrence.
    SignedRange { name: &'a str, next: i64, limit: i64 },
    /// As above, for an unsigned interval.
    UnsignedRange { name: &'a str, next: u64, limit: u64 },
}

/// A single-use decode session over one raw option source.
///
/// The session borrows the source for its whole lifetime and owns all
/// bookkeeping: the unprocessed index, the struct nesting depth, and
/// the list state machine. It is strictly sequential and must be
/// driven from one thread; a failed decode leaves it valid only for
/// closing out the open list and structs.
#[derive(Debug)]
pub struct Session<'a> {
    source: &'a RawOptions,
    depth: usize,
    /// Name to the FIFO queue of that name's unconsumed occurrence
    /// values. Queues are removed the instant they drain, so presence
    /// implies at least one occurrence.
    index: BTreeMap<&'a str, VecDeque<Option<&'a str>>>,
    list_mode: ListMode<'a>,
}

impl<'a> Session<'a> {
    /// Create a session reading from `source`.
    pub fn new(source: &'a RawOptions) -> Self {
        Self {
            source,
            depth: 0,
            index: BTreeMap::new(),
            list_mode: ListMode::None,
        }
    }

    /// Open a struct.
    ///
    /// The outermost call builds the unprocessed index from the source,
    /// in source order, reinstating the identifier as a synthetic `id`
    /// entry. Nested calls share the enclosing flat namespace.
    pub fn begin_struct(&mut self) {
        self.depth += 1;
        if self.depth > 1 {
            return;
        }

        for opt in self.source.iter() {
            self.index
                .entry(opt.name())
                .or_default()
                .push_back(opt.value());
        }

        if let Some(id) = self.source.id() {
            self.index.entry("id").or_default().push_back(Some(id));
        }
    }

    /// Close a struct.
    ///
    /// Closing the outermost struct verifies that every occurrence was
    /// consumed, failing with [`DecodeError::InvalidParameter`] naming
    /// the lexicographically first leftover otherwise, and tears down
    /// the index. Must not be called while a list is open.
    pub fn end_struct(&mut self) -> Result<(), DecodeError> {
        assert!(
            matches!(self.list_mode, ListMode::None),
            "a list is still open"
        );
        assert!(self.depth > 0, "no struct is open");

        self.depth -= 1;
        if self.depth > 0 {
            return Ok(());
        }

        let leftover = self.index.keys().next().copied();
        self.index.clear();

        match leftover {
            Some(name) => Err(DecodeError::InvalidParameter(name.into())),
            None => Ok(()),
        }
    }

    /// Whether an unconsumed occurrence of `name` remains.
    ///
    /// Does not consume. Presence is a struct-level query and must not
    /// be asked mid-list.
    pub fn has_field(&self, name: &str) -> bool {
        assert!(
            matches!(self.list_mode, ListMode::None),
            "presence queried during a list"
        );
        assert!(self.depth > 0, "no struct is open");

        self.index.contains_key(name)
    }

    /// Open a list over the occurrences of `name`.
    ///
    /// Fails with [`DecodeError::MissingParameter`] when no occurrence
    /// exists; an absent list is never a silent empty iteration.
    pub fn begin_list(&mut self, name: &str) -> Result<(), DecodeError> {
        assert!(matches!(self.list_mode, ListMode::None), "lists cannot nest");

        let (&name, _) = self
            .distinct(name)
            .ok_or_else(|| DecodeError::MissingParameter(name.into()))?;
        self.list_mode = ListMode::Started { name };

        Ok(())
    }

    /// Advance the open list, returning whether an element is ready for
    /// a scalar decoder.
    ///
    /// The first call exposes the head occurrence; later calls retire
    /// the element just decoded, ending the list (and returning
    /// `false`) once the last occurrence is consumed. While a range is
    /// being expanded, calls count through the interval without
    /// touching the queue, then retire the one occurrence that encoded
    /// it.
    pub fn next_list_element(&mut self) -> bool {
        match self.list_mode {
            ListMode::Started { name } => {
                self.list_mode = ListMode::InProgress { name };
                true
            }
            ListMode::SignedRange { name, next, limit } => {
                if next < limit {
                    self.list_mode = ListMode::SignedRange {
                        name,
                        next: next + 1,
                        limit,
                    };
                    true
                } else {
                    // Range completed; retire the occurrence behind it.
                    self.list_mode = ListMode::InProgress { name };
                    self.retire(name)
                }
            }
            ListMode::UnsignedRange { name, next, limit } => {
                if next < limit {
                    self.list_mode = ListMode::UnsignedRange {
                        name,
                        next: next + 1,
                        limit,
                    };
                    true
                } else {
                    self.list_mode = ListMode::InProgress { name };
                    self.retire(name)
                }
            }
            ListMode::InProgress { name } => self.retire(name),
            ListMode::None => panic!("no list is open"),
        }
    }

    /// Close the open list, from any point of its traversal.
    pub fn end_list(&mut self) {
        assert!(
            !matches!(self.list_mode, ListMode::None),
            "no list is open"
        );
        self.list_mode = ListMode::None;
    }

    /// Decode a string.
    ///
    /// A bare flag (an occurrence with no value) decodes as the empty
    /// string.
    pub fn decode_str(&mut self, name: &str) -> Result<String, DecodeError> {
        let value = self.lookup_scalar(name)?.unwrap_or("");

        let value = value.into();
        self.processed(name);
        Ok(value)
    }

    /// Decode a boolean.
    ///
    /// A bare flag decodes as `true`; otherwise the value must be one
    /// of `on`, `yes`, `y` (true) or `off`, `no`, `n` (false).
    pub fn decode_bool(&mut self, name: &str) -> Result<bool, DecodeError> {
        let value = match self.lookup_scalar(name)? {
            None => true,
            Some("on" | "yes" | "y") => true,
            Some("off" | "no" | "n") => false,
            Some(_) => Err(DecodeError::value(name, "on|yes|y|off|no|n"))?,
        };

        self.processed(name);
        Ok(value)
    }

    /// Decode a signed 64-bit integer.
    ///
    /// Accepts decimal, octal (leading `0`), and hexadecimal (leading
    /// `0x`) literals with an optional sign. Inside a list, a value of
    /// the form `low-high` additionally opens a range: this call
    /// returns `low`, and [`next_list_element`](Self::next_list_element)
    /// then yields the interval's remaining elements one at a time.
    pub fn decode_i64(&mut self, name: &str) -> Result<i64, DecodeError> {
        if let ListMode::SignedRange { next, .. } = self.list_mode {
            return Ok(next);
        }

        let value = self.lookup_scalar(name)?.unwrap_or("");

        if let Some((low, rest)) = literal::signed(value) {
            if rest.is_empty() {
                self.processed(name);
                return Ok(low);
            }

            if let (Some(bound), ListMode::InProgress { name }) =
                (rest.strip_prefix('-'), self.list_mode)
            {
                if let Some((high, "")) = literal::signed(bound) {
                    // The span is computed in the unsigned domain, where
                    // it cannot overflow.
                    if low <= high && high.wrapping_sub(low) as u64 <= RANGE_MAX - 1 {
                        // The occurrence is retired only once the range
                        // is exhausted.
                        self.list_mode = ListMode::SignedRange {
                            name,
                            next: low,
                            limit: high,
                        };
                        return Ok(low);
                    }
                }
            }
        }

        Err(DecodeError::value(
            name,
            match self.list_mode {
                ListMode::None => "an int64 value",
                _ => "an int64 value or range",
            },
        ))
    }

    /// Decode an unsigned 64-bit integer.
    ///
    /// As [`decode_i64`](Self::decode_i64), but unsigned: no sign is
    /// accepted at the top level, so a `-` after a leading value is
    /// always a range separator.
    pub fn decode_u64(&mut self, name: &str) -> Result<u64, DecodeError> {
        if let ListMode::UnsignedRange { next, .. } = self.list_mode {
            return Ok(next);
        }

        let value = self.lookup_scalar(name)?.unwrap_or("");

        if let Some((low, rest)) = literal::unsigned(value) {
            if rest.is_empty() {
                self.processed(name);
                return Ok(low);
            }

            if let (Some(bound), ListMode::InProgress { name }) =
                (rest.strip_prefix('-'), self.list_mode)
            {
                if let Some((high, "")) = literal::unsigned(bound) {
                    if low <= high && high - low <= RANGE_MAX - 1 {
                        self.list_mode = ListMode::UnsignedRange {
                            name,
                            next: low,
                            limit: high,
                        };
                        return Ok(low);
                    }
                }
            }
        }

        Err(DecodeError::value(
            name,
            match self.list_mode {
                ListMode::None => "a uint64 value",
                _ => "a uint64 value or range",
            },
        ))
    }

    /// Decode a byte size.
    ///
    /// Accepts a decimal integer or fractional count with an optional
    /// binary-multiplier suffix (`B`, `K`, `M`, `G`, `T`; bytes when
    /// absent). Ranges are not supported for size fields.
    pub fn decode_size(&mut self, name: &str) -> Result<u64, DecodeError> {
        let value = self.lookup_scalar(name)?.unwrap_or("");

        let Some(size) = literal::size(value) else {
            return Err(DecodeError::value(
                name,
                "a size value representable as a non-negative 64-bit integer",
            ));
        };

        self.processed(name);
        Ok(size)
    }

    /// Decode an enumerated tag, returning its position in `accepted`.
    ///
    /// The match is exact and case-sensitive.
    pub fn decode_enum(&mut self, name: &str, accepted: &[&str]) -> Result<usize, DecodeError> {
        let value = self.lookup_scalar(name)?.unwrap_or("");

        let Some(position) = accepted.iter().position(|tag| *tag == value) else {
            return Err(DecodeError::value(name, &accepted.join("|")));
        };

        self.processed(name);
        Ok(position)
    }

    /// Look up `name`'s queue in the index.
    fn distinct(&self, name: &str) -> Option<(&&'a str, &VecDeque<Option<&'a str>>)> {
        assert!(self.depth > 0, "no struct is open");
        self.index.get_key_value(name)
    }

    /// Fetch the occurrence value a scalar decoder should read.
    ///
    /// Outside a list this is the *last* occurrence of `name` (the last
    /// one wins for repeated non-list scalars); inside one it is the
    /// head occurrence exposed by `next_list_element`, whatever queue
    /// the list pinned.
    fn lookup_scalar(&self, name: &str) -> Result<Option<&'a str>, DecodeError> {
        match self.list_mode {
            ListMode::None => {
                let (_, queue) = self
                    .distinct(name)
                    .ok_or_else(|| DecodeError::MissingParameter(name.into()))?;
                Ok(*queue.back().expect("index queues are never empty"))
            }
            ListMode::InProgress { name } => {
                let queue = self.index.get(name).expect("the list is already exhausted");
                Ok(*queue.front().expect("index queues are never empty"))
            }
            _ => panic!("scalar lookup during range expansion"),
        }
    }

    /// Mark `name` consumed after a successful scalar decode.
    ///
    /// Inside a list, consumption is deferred to `next_list_element`'s
    /// pop.
    fn processed(&mut self, name: &str) {
        match self.list_mode {
            ListMode::None => {
                self.index.remove(name);
            }
            ListMode::InProgress { .. } => {}
            _ => unreachable!(),
        }
    }

    /// Retire the head occurrence of the pinned queue, returning
    /// whether another remains.
    fn retire(&mut self, name: &str) -> bool {
        let queue = self.index.get_mut(name).expect("the list is already exhausted");
        queue.pop_front();

        if queue.is_empty() {
            self.index.remove(name);
            false
        } else {
            true
        }
    }
}
