//! The ABI type tree.
//!
//! [`AbiType`] is the parsed form of a Solidity type string like
//! `(uint256,bytes)[2]`. The set of variants is closed: the ABI grammar has
//! no extension point, so the encoder, decoder and validator each match
//! exhaustively over it.

use crate::{
    decoder, encoder,
    error::{DecodeError, EncodeError, ParseError},
    parser,
    value::Value,
};
use itertools::Itertools;
use std::{fmt, str::FromStr};

/// A node of the ABI type tree. Equality is structural.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum AbiType {
    /// `address`, a 160-bit account identifier.
    Address,
    /// `bool`.
    Bool,
    /// `uint8`..`uint256` / `int8`..`int256`, width a multiple of 8.
    Int { signed: bool, bits: usize },
    /// `ufixed<bits>x<precision>` / `fixed<bits>x<precision>`: a decimal
    /// scaled by `10^precision` into the corresponding integer range.
    Fixed { signed: bool, bits: usize, precision: u32 },
    /// `bytes1`..`bytes32`.
    FixedBytes(usize),
    /// `string`, UTF-8 on the wire.
    String,
    /// `bytes`, a byte sequence of arbitrary length.
    Bytes,
    /// `T[n]`, exactly `n` elements.
    FixedArray(Box<AbiType>, usize),
    /// `T[]`, any number of elements.
    Array(Box<AbiType>),
    /// `(T1,...,Tk)`. May be empty, encoding to zero bytes.
    Tuple(Vec<AbiType>),
}

impl AbiType {
    /// Whether values of this type use the offset-and-tail ("dynamic")
    /// layout rather than a fixed-width one.
    pub fn is_dynamic(&self) -> bool {
        match self {
            Self::String | Self::Bytes | Self::Array(_) => true,
            Self::FixedArray(inner, _) => inner.is_dynamic(),
            Self::Tuple(components) => components.iter().any(Self::is_dynamic),
            _ => false,
        }
    }

    /// Encoded byte width of a static type. Depends only on the type, never
    /// on the value. Meaningless for dynamic types.
    pub fn static_size(&self) -> usize {
        match self {
            Self::FixedArray(inner, n) => inner.static_size() * n,
            Self::Tuple(components) => components.iter().map(Self::static_size).sum(),
            _ => 32,
        }
    }

    /// Bytes this type occupies in the head of an enclosing sequence: one
    /// offset word when dynamic, the full static width otherwise.
    pub(crate) fn head_size(&self) -> usize {
        if self.is_dynamic() {
            32
        } else {
            self.static_size()
        }
    }

    /// Checks that `value` is encodable as this type.
    pub fn validate(&self, value: &Value) -> Result<(), EncodeError> {
        crate::validate::validate(self, value)
    }

    /// True when `value` is encodable as this type.
    pub fn is_encodable(&self, value: &Value) -> bool {
        self.validate(value).is_ok()
    }

    /// ABI-encodes `value` under this type.
    pub fn encode(&self, value: &Value) -> Result<Vec<u8>, EncodeError> {
        encoder::encode(self, value)
    }

    /// Decodes `data` under this type, rejecting non-canonical padding.
    pub fn decode(&self, data: &[u8]) -> Result<Value, DecodeError> {
        decoder::decode(self, data, true)
    }

    /// Decodes `data` under this type, tolerating non-canonical padding
    /// bits. Lengths and offsets are still fully validated.
    pub fn decode_lenient(&self, data: &[u8]) -> Result<Value, DecodeError> {
        decoder::decode(self, data, false)
    }
}

impl fmt::Display for AbiType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Address => f.write_str("address"),
            Self::Bool => f.write_str("bool"),
            Self::Int { signed: true, bits } => write!(f, "int{bits}"),
            Self::Int { signed: false, bits } => write!(f, "uint{bits}"),
            Self::Fixed { signed: true, bits, precision } => write!(f, "fixed{bits}x{precision}"),
            Self::Fixed { signed: false, bits, precision } => write!(f, "ufixed{bits}x{precision}"),
            Self::FixedBytes(m) => write!(f, "bytes{m}"),
            Self::String => f.write_str("string"),
            Self::Bytes => f.write_str("bytes"),
            Self::FixedArray(inner, n) => write!(f, "{inner}[{n}]"),
            Self::Array(inner) => write!(f, "{inner}[]"),
            Self::Tuple(components) => write!(f, "({})", components.iter().format(",")),
        }
    }
}

impl FromStr for AbiType {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parser::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uint(bits: usize) -> AbiType {
        AbiType::Int { signed: false, bits }
    }

    #[test]
    fn dynamic_is_contagious() {
        assert!(!uint(256).is_dynamic());
        assert!(AbiType::Bytes.is_dynamic());
        assert!(!AbiType::Tuple(vec![uint(8), AbiType::Bool]).is_dynamic());
        assert!(AbiType::Tuple(vec![uint(8), AbiType::String]).is_dynamic());
        assert!(!AbiType::FixedArray(Box::new(uint(8)), 4).is_dynamic());
        assert!(AbiType::FixedArray(Box::new(AbiType::Bytes), 4).is_dynamic());
        assert!(AbiType::Array(Box::new(uint(8))).is_dynamic());
    }

    #[test]
    fn static_sizes() {
        assert_eq!(uint(8).static_size(), 32);
        assert_eq!(AbiType::FixedArray(Box::new(uint(256)), 3).static_size(), 96);
        assert_eq!(AbiType::Tuple(vec![]).static_size(), 0);
        let nested = AbiType::Tuple(vec![
            AbiType::Address,
            AbiType::FixedArray(Box::new(AbiType::Bool), 2),
        ]);
        assert_eq!(nested.static_size(), 96);
    }

    #[test]
    fn canonical_rendering() {
        let ty = AbiType::Array(Box::new(AbiType::Tuple(vec![
            uint(256),
            AbiType::Fixed { signed: true, bits: 128, precision: 18 },
            AbiType::FixedBytes(4),
        ])));
        assert_eq!(ty.to_string(), "(uint256,fixed128x18,bytes4)[]");
    }
}
