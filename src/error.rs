use crate::field::Field;

/// All the ways version handling can fail.
///
/// Parsing only ever produces [`Error::Malformed`]. [`Error::UnknownField`]
/// comes from turning a string into a [`Field`], and [`Error::InvalidValue`]
/// from giving a field a value outside its domain.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The input does not match the version grammar.
    #[error("malformed version `{input}`: unparseable fragment `{fragment}` at byte {offset}")]
    Malformed {
        /// The full rejected input.
        input: String,
        /// The part of the input past the longest parseable prefix.
        fragment: String,
        /// Byte position of `fragment` within `input`.
        offset: usize,
    },

    /// A field name outside the recognized vocabulary.
    #[error("unknown field `{name}`")]
    UnknownField {
        /// The unrecognized name, trimmed.
        name: String,
    },

    /// A value outside the addressed field's domain.
    #[error("invalid value `{value}` for field `{field}`: {reason}")]
    InvalidValue {
        /// The addressed field.
        field: Field,
        /// The rejected value, as given.
        value: String,
        /// What the field would have accepted.
        reason: String,
    },
}

impl Error {
    pub(crate) fn invalid_value(
        field: Field,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidValue {
            field,
            value: value.into(),
            reason: reason.into(),
        }
    }
}

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, Error>;
