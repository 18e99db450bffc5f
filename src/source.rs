//! Raw option sources.
//!
//! A [`RawOptions`] is the immutable input to one decode pass: the
//! ordered sequence of name/value occurrences produced by an option
//! tokenizer, plus an optional identifier value kept apart from the
//! ordinary sequence. Sources can be assembled occurrence by occurrence
//! with [`push`](RawOptions::push), or parsed from a comma-separated
//! option string with [`parse`](RawOptions::parse).

use alloc::{string::String, vec::Vec};

use thiserror::Error;

/// One parsed `name=value` (or bare `name`) token of an option string.
///
/// A name may recur across several options of a source; each recurrence
/// is a distinct occurrence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawOption {
    name: String,
    value: Option<String>,
}

impl RawOption {
    /// The option's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The option's value, absent for bare-flag syntax.
    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }
}

/// An error parsing an option string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// A fragment is missing its option name.
    #[error("A fragment is missing its option name.")]
    EmptyName,
    /// The identifier option requires a value.
    #[error("The identifier option requires a value.")]
    BareIdentifier,
}

/// An ordered set of raw options, with an optional identifier.
///
/// The identifier is held outside the occurrence sequence; no ordinary
/// occurrence is ever named `id`. A decode session reinstates it as a
/// synthetic `id` entry so it participates in lookup and leftover
/// checking like any other option.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawOptions {
    opts: Vec<RawOption>,
    id: Option<String>,
}

impl RawOptions {
    /// Create an empty source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an occurrence of `name`, with or without a value.
    ///
    /// The identifier has its own slot; supplying it here is a caller
    /// error.
    pub fn push(&mut self, name: &str, value: Option<&str>) {
        assert_ne!(name, "id", "the identifier must be supplied through `set_id`");
        self.opts.push(RawOption {
            name: name.into(),
            value: value.map(Into::into),
        });
    }

    /// Set the identifier value.
    pub fn set_id(&mut self, id: &str) {
        self.id = Some(id.into());
    }

    /// The identifier value, if one was supplied.
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// Iterate over the occurrences in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &RawOption> {
        self.opts.iter()
    }

    /// Whether the source holds no occurrences and no identifier.
    pub fn is_empty(&self) -> bool {
        self.opts.is_empty() && self.id.is_none()
    }

    /// The number of occurrences, not counting the identifier.
    pub fn len(&self) -> usize {
        self.opts.len()
    }

    /// Parse a comma-separated option string into a source.
    ///
    /// Fragments take the form `name=value` or a bare `name` (no
    /// value). Within a value, a doubled comma stands for one literal
    /// comma. A fragment named `id` is routed to the identifier slot,
    /// with the last one winning; a bare `id` is an error, as is an
    /// empty name. A single trailing comma is tolerated.
    pub fn parse(input: &str) -> Result<Self, ParseError> {
        let mut options = Self::new();

        let mut rest = input;
        while !rest.is_empty() {
            let end = rest.find(['=', ',']).unwrap_or(rest.len());
            let (name, mut tail) = rest.split_at(end);

            if name.is_empty() {
                Err(ParseError::EmptyName)?;
            }

            let value = match tail.strip_prefix('=') {
                Some(t) => {
                    let (value, t) = unescape_value(t);
                    tail = t;
                    Some(value)
                }
                None => None,
            };

            match (name, value) {
                ("id", Some(id)) => options.id = Some(id),
                ("id", None) => Err(ParseError::BareIdentifier)?,
                (name, value) => options.opts.push(RawOption {
                    name: name.into(),
                    value,
                }),
            }

            rest = tail.strip_prefix(',').unwrap_or(tail);
        }

        Ok(options)
    }
}

/// Take a value up to the next fragment separator, collapsing doubled
/// commas. Returns the value and the remaining input, separator intact.
fn unescape_value(input: &str) -> (String, &str) {
    let mut value = String::new();

    let mut rest = input;
    loop {
        match rest.find(',') {
            Some(i) if rest[i + 1..].starts_with(',') => {
                value.push_str(&rest[..=i]);
                rest = &rest[i + 2..];
            }
            Some(i) => {
                value.push_str(&rest[..i]);
                break (value, &rest[i..]);
            }
            None => {
                value.push_str(rest);
                break (value, "");
            }
        }
    }
}
