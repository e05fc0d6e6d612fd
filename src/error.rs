use thiserror::Error;

/// Errors returned by [`ThreadedTree`](crate::ThreadedTree) operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    /// `remove` was asked for a key the tree doesn't hold.
    #[error("key not found")]
    KeyNotFound,

    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Encode(#[from] EncodeError),
}

/// Malformed input handed to `decode`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{kind} at offset {offset}")]
pub struct DecodeError {
    pub kind: DecodeErrorKind,
    /// Byte offset into the input where decoding stopped.
    pub offset: usize,
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum DecodeErrorKind {
    #[error("unexpected end of input")]
    UnexpectedEnd,
    #[error("invalid key")]
    InvalidKey,
    #[error("invalid value")]
    InvalidValue,
    #[error("invalid field length")]
    InvalidLength,
    #[error("key out of order for its position")]
    OutOfOrder,
    #[error("trailing input after the encoded tree")]
    TrailingInput,
}

/// An entry that the chosen format can't represent.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum EncodeError {
    #[error("key doesn't render as a single decimal digit")]
    KeyNotRepresentable,
    #[error("value doesn't render as a single character")]
    ValueNotRepresentable,
}

impl DecodeError {
    pub(crate) fn new(kind: DecodeErrorKind, offset: usize) -> Self {
        DecodeError { kind, offset }
    }
}
