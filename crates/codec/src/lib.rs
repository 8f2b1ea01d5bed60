//! Encoder and decoder for the Ethereum Contract ABI (v2), plus the
//! Keccak-256 hash used throughout the EVM ecosystem.
//!
//! The codec is a pipeline over a closed type tree: type strings are parsed
//! into an [`AbiType`], values are checked against a node, and the encoder
//! and decoder walk the tree with the ABI's 32-byte word and head/tail
//! disciplines. Everything is pure and synchronous; the decoder treats its
//! input as hostile and never overreads.
//!
//! # Examples
//!
//! ```
//! use abicodec::{decode, encode, Value, U256};
//!
//! let value = Value::Tuple(vec![
//!     Value::Uint(U256::from(42u64)),
//!     Value::String("Hello World!".into()),
//! ]);
//! let data = encode("(uint256,string)", &value)?;
//! assert_eq!(data.len() % 32, 0);
//! assert_eq!(decode("(uint256,string)", &data)?, value);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod decoder;
mod encoder;
mod error;
mod keccak;
mod lexer;
mod parser;
mod ty;
mod validate;
mod value;

pub use error::{
    DecodeError, DecodeErrorKind, EncodeError, EncodeErrorKind, Frame, ParseError, Path,
};
pub use keccak::{keccak256, selector};
pub use ty::AbiType;
pub use value::{Decimal, ParseDecimalError, ScaleError, Value};

#[doc(no_inline)]
pub use alloy_primitives::{Address, Sign, B256, I256, U256};

/// Parses a type string like `(uint256,bytes)[2]` into its type tree.
///
/// Also available as [`AbiType`]'s [`FromStr`](std::str::FromStr). Nesting
/// is capped at 32 levels; deeper trees must not be built by hand either,
/// since the encoder and decoder recurse along the tree.
pub fn parse(schema: &str) -> Result<AbiType, ParseError> {
    parser::parse(schema)
}

/// Checks `value` against a type string. See [`AbiType::validate`].
pub fn validate(schema: &str, value: &Value) -> Result<(), EncodeError> {
    parse(schema)?.validate(value)
}

/// ABI-encodes `value` under a type string.
///
/// ```
/// use abicodec::{encode, Value, U256};
///
/// let data = encode("uint256", &Value::Uint(U256::from(42u64)))?;
/// assert_eq!(data[31], 0x2a);
/// # Ok::<(), abicodec::EncodeError>(())
/// ```
pub fn encode(schema: &str, value: &Value) -> Result<Vec<u8>, EncodeError> {
    parse(schema)?.encode(value)
}

/// Decodes `data` under a type string, rejecting non-canonical padding.
pub fn decode(schema: &str, data: &[u8]) -> Result<Value, DecodeError> {
    parse(schema)?.decode(data)
}

/// Decodes `data` under a type string, tolerating non-canonical padding
/// bits. Lengths and offsets are still fully validated.
pub fn decode_lenient(schema: &str, data: &[u8]) -> Result<Value, DecodeError> {
    parse(schema)?.decode_lenient(data)
}
