//! Error types for schema parsing, encoding and decoding.
//!
//! Encode and decode failures carry a [`Path`] locating the offending
//! component inside nested tuples and arrays, rendered like
//! `tuple[2].array[5]`.

use alloy_primitives::U256;
use std::fmt;

/// One tuple or array hop on the way to a failing component.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Frame {
    /// Index of a tuple component.
    Tuple(usize),
    /// Index of an array element.
    Array(usize),
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tuple(i) => write!(f, "tuple[{i}]"),
            Self::Array(i) => write!(f, "array[{i}]"),
        }
    }
}

/// Component path from the top-level value down to the failure site.
///
/// The path is empty when the top-level value itself is at fault.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Path(Vec<Frame>);

impl Path {
    /// Frames from outermost to innermost.
    pub fn frames(&self) -> &[Frame] {
        &self.0
    }

    /// True when the error concerns the top-level value.
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    fn prepend(&mut self, frame: Frame) {
        self.0.insert(0, frame);
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str("value");
        }
        for (i, frame) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            write!(f, "{frame}")?;
        }
        Ok(())
    }
}

/// Failure to turn a type string into a type.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    /// The name is not part of the ABI type grammar.
    #[error("unknown type `{0}`")]
    UnknownType(String),
    /// The string violates the grammar (unbalanced brackets, whitespace,
    /// missing parameters, excessive nesting, ...).
    #[error("invalid type string: {0}")]
    InvalidTypeString(String),
    /// A width, precision or array length parameter is outside its domain.
    #[error("type parameter out of range: {0}")]
    ParameterOutOfRange(String),
}

/// What went wrong while validating or encoding a value.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum EncodeErrorKind {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error("{value} out of range for {ty}")]
    ValueOutOfRange { ty: String, value: String },
    #[error("expected {expected} elements, got {got}")]
    LengthMismatch { expected: usize, got: usize },
    #[error("invalid address: {0}")]
    InvalidAddressFormat(String),
    #[error("string is not valid utf-8")]
    InvalidUtf8,
    #[error("fractional component does not fit {precision} decimal places")]
    FractionalLoss { precision: u32 },
    #[error("cannot encode {value} as {ty}")]
    TypeMismatch { ty: String, value: String },
}

/// Validation or encoding failure, located by a component [`Path`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EncodeError {
    pub path: Path,
    pub kind: EncodeErrorKind,
}

impl EncodeError {
    pub(crate) fn new(kind: EncodeErrorKind) -> Self {
        Self { path: Path::default(), kind }
    }

    pub(crate) fn within(mut self, frame: Frame) -> Self {
        self.path.prepend(frame);
        self
    }
}

impl fmt::Display for EncodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_root() {
            write!(f, "{}", self.kind)
        } else {
            write!(f, "{} at {}", self.kind, self.path)
        }
    }
}

impl std::error::Error for EncodeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.kind)
    }
}

impl From<EncodeErrorKind> for EncodeError {
    fn from(kind: EncodeErrorKind) -> Self {
        Self::new(kind)
    }
}

impl From<ParseError> for EncodeError {
    fn from(err: ParseError) -> Self {
        Self::new(err.into())
    }
}

/// What went wrong while decoding a byte buffer.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum DecodeErrorKind {
    #[error("unexpected end of data: {needed} bytes needed, {available} available")]
    InsufficientData { needed: usize, available: usize },
    #[error("invalid offset or length {0}")]
    InvalidOffset(U256),
    #[error("non-canonical padding")]
    NonCanonicalPadding,
    #[error("boolean word is not 0 or 1")]
    InvalidBool,
    #[error("payload is not valid utf-8")]
    InvalidUtf8,
    #[error(transparent)]
    Parse(#[from] ParseError),
}

/// Decoding failure, located by a component [`Path`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DecodeError {
    pub path: Path,
    pub kind: DecodeErrorKind,
}

impl DecodeError {
    pub(crate) fn new(kind: DecodeErrorKind) -> Self {
        Self { path: Path::default(), kind }
    }

    pub(crate) fn within(mut self, frame: Frame) -> Self {
        self.path.prepend(frame);
        self
    }
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_root() {
            write!(f, "{}", self.kind)
        } else {
            write!(f, "{} at {}", self.kind, self.path)
        }
    }
}

impl std::error::Error for DecodeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.kind)
    }
}

impl From<DecodeErrorKind> for DecodeError {
    fn from(kind: DecodeErrorKind) -> Self {
        Self::new(kind)
    }
}

impl From<ParseError> for DecodeError {
    fn from(err: ParseError) -> Self {
        Self::new(err.into())
    }
}
