//! Native values accepted and produced by the codec.

use alloy_primitives::{hex, Address, Sign, I256, U256};
use itertools::Itertools;
use std::{fmt, str::FromStr};

/// A value in the native domain of some [`AbiType`](crate::AbiType).
///
/// Decoding always produces the canonical variant for the schema (signed
/// integers as [`Int`](Self::Int), `bytesN` as
/// [`FixedBytes`](Self::FixedBytes), ...). Validation and encoding accept a
/// slightly wider domain, e.g. an address given as a `0x`-prefixed hex
/// string or as 20 raw bytes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Value {
    Address(Address),
    Bool(bool),
    Uint(U256),
    Int(I256),
    Fixed(Decimal),
    FixedBytes(Vec<u8>),
    Bytes(Vec<u8>),
    String(String),
    Array(Vec<Value>),
    Tuple(Vec<Value>),
}

impl Value {
    /// Short noun for error messages.
    pub(crate) fn kind_name(&self) -> &'static str {
        match self {
            Self::Address(_) => "address",
            Self::Bool(_) => "bool",
            Self::Uint(_) => "unsigned integer",
            Self::Int(_) => "signed integer",
            Self::Fixed(_) => "decimal",
            Self::FixedBytes(_) => "fixed bytes",
            Self::Bytes(_) => "bytes",
            Self::String(_) => "string",
            Self::Array(_) => "array",
            Self::Tuple(_) => "tuple",
        }
    }

    pub fn as_address(&self) -> Option<Address> {
        match self {
            Self::Address(a) => Some(*a),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_uint(&self) -> Option<U256> {
        match self {
            Self::Uint(u) => Some(*u),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<I256> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_fixed(&self) -> Option<&Decimal> {
        match self {
            Self::Fixed(d) => Some(d),
            _ => None,
        }
    }

    /// The raw bytes of a [`Bytes`](Self::Bytes) or
    /// [`FixedBytes`](Self::FixedBytes) value.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::FixedBytes(b) | Self::Bytes(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// The elements of an [`Array`](Self::Array) or
    /// [`Tuple`](Self::Tuple) value.
    pub fn as_slice(&self) -> Option<&[Value]> {
        match self {
            Self::Array(v) | Self::Tuple(v) => Some(v),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Address(a) => write!(f, "0x{}", hex::encode(a)),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Uint(u) => write!(f, "{u}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Fixed(d) => write!(f, "{d}"),
            Self::FixedBytes(b) | Self::Bytes(b) => write!(f, "0x{}", hex::encode(b)),
            Self::String(s) => write!(f, "{s:?}"),
            Self::Array(values) => write!(f, "[{}]", values.iter().format(", ")),
            Self::Tuple(values) => write!(f, "({})", values.iter().format(", ")),
        }
    }
}

impl From<Address> for Value {
    fn from(a: Address) -> Self {
        Self::Address(a)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<U256> for Value {
    fn from(u: U256) -> Self {
        Self::Uint(u)
    }
}

impl From<I256> for Value {
    fn from(i: I256) -> Self {
        Self::Int(i)
    }
}

impl From<u64> for Value {
    fn from(u: u64) -> Self {
        Self::Uint(U256::from(u))
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::String(s.to_owned())
    }
}

impl From<Decimal> for Value {
    fn from(d: Decimal) -> Self {
        Self::Fixed(d)
    }
}

/// Rescaling a [`Decimal`] failed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ScaleError {
    /// Fractional digits remain beyond the target precision.
    #[error("fractional digits beyond target precision")]
    Fractional,
    /// The scaled magnitude does not fit in 256 bits.
    #[error("scaled value overflows 256 bits")]
    Overflow,
}

/// An exact decimal: `±magnitude · 10^-scale`.
///
/// Any value in range for some `(u)fixed<bits>x<precision>` has a scaled
/// magnitude below `2^256`, so a 256-bit magnitude covers the whole
/// fixed-point domain. No floating point is involved anywhere.
#[derive(Clone, Copy, Debug)]
pub struct Decimal {
    sign: Sign,
    mag: U256,
    scale: u32,
}

impl Decimal {
    /// A decimal from its parts. A zero magnitude is normalized to a
    /// positive sign.
    pub fn new(sign: Sign, mag: U256, scale: u32) -> Self {
        let sign = if mag.is_zero() { Sign::Positive } else { sign };
        Self { sign, mag, scale }
    }

    pub const ZERO: Self = Self { sign: Sign::Positive, mag: U256::ZERO, scale: 0 };

    pub fn sign(&self) -> Sign {
        self.sign
    }

    pub fn magnitude(&self) -> U256 {
        self.mag
    }

    pub fn scale(&self) -> u32 {
        self.scale
    }

    pub fn is_zero(&self) -> bool {
        self.mag.is_zero()
    }

    /// The signed magnitude of `self · 10^precision`, exactly.
    ///
    /// Fails with [`ScaleError::Fractional`] when digits would be cut off
    /// and with [`ScaleError::Overflow`] when the result exceeds 256 bits.
    pub fn scaled(&self, precision: u32) -> Result<(Sign, U256), ScaleError> {
        if precision >= self.scale {
            if self.mag.is_zero() {
                return Ok((Sign::Positive, U256::ZERO));
            }
            let factor = pow10(precision - self.scale).ok_or(ScaleError::Overflow)?;
            let mag = self.mag.checked_mul(factor).ok_or(ScaleError::Overflow)?;
            Ok((self.sign, mag))
        } else {
            if self.mag.is_zero() {
                return Ok((Sign::Positive, U256::ZERO));
            }
            let divisor = pow10(self.scale - precision).ok_or(ScaleError::Fractional)?;
            let (q, r) = self.mag.div_rem(divisor);
            if !r.is_zero() {
                return Err(ScaleError::Fractional);
            }
            Ok((if q.is_zero() { Sign::Positive } else { self.sign }, q))
        }
    }

    /// Trailing-zero-free form; the basis for numeric equality.
    fn normalized(&self) -> (Sign, U256, u32) {
        let mut mag = self.mag;
        let mut scale = self.scale;
        let ten = U256::from(10u8);
        while scale > 0 {
            let (q, r) = mag.div_rem(ten);
            if !r.is_zero() {
                break;
            }
            mag = q;
            scale -= 1;
        }
        let sign = if mag.is_zero() { Sign::Positive } else { self.sign };
        (sign, mag, scale)
    }
}

impl PartialEq for Decimal {
    fn eq(&self, other: &Self) -> bool {
        self.normalized() == other.normalized()
    }
}

impl Eq for Decimal {}

impl From<I256> for Decimal {
    fn from(i: I256) -> Self {
        let (sign, mag) = i.into_sign_and_abs();
        Self::new(sign, mag, 0)
    }
}

impl From<U256> for Decimal {
    fn from(u: U256) -> Self {
        Self::new(Sign::Positive, u, 0)
    }
}

impl fmt::Display for Decimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.sign.is_negative() && !self.mag.is_zero() {
            f.write_str("-")?;
        }
        let digits = self.mag.to_string();
        let scale = self.scale as usize;
        if scale == 0 {
            f.write_str(&digits)
        } else if digits.len() > scale {
            let (int, frac) = digits.split_at(digits.len() - scale);
            write!(f, "{int}.{frac}")
        } else {
            write!(f, "0.{}{digits}", "0".repeat(scale - digits.len()))
        }
    }
}

/// A malformed decimal literal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
#[error("invalid decimal literal: {0}")]
pub struct ParseDecimalError(&'static str);

impl FromStr for Decimal {
    type Err = ParseDecimalError;

    /// Parses `[+-]? digits [. digits]? ([eE] [+-]? digits)?` exactly, with
    /// at least one digit present.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (sign, rest) = match s.as_bytes().first() {
            Some(b'-') => (Sign::Negative, &s[1..]),
            Some(b'+') => (Sign::Positive, &s[1..]),
            _ => (Sign::Positive, s),
        };
        let (body, exp) = match rest.split_once(['e', 'E']) {
            Some((body, exp)) => {
                let exp =
                    exp.parse::<i64>().map_err(|_| ParseDecimalError("malformed exponent"))?;
                (body, exp)
            }
            None => (rest, 0),
        };
        let (int_part, frac_part) = body.split_once('.').unwrap_or((body, ""));
        if int_part.is_empty() && frac_part.is_empty() {
            return Err(ParseDecimalError("no digits"));
        }
        let mut mag = U256::ZERO;
        let ten = U256::from(10u8);
        for b in int_part.bytes().chain(frac_part.bytes()) {
            if !b.is_ascii_digit() {
                return Err(ParseDecimalError("unexpected character"));
            }
            mag = mag
                .checked_mul(ten)
                .and_then(|m| m.checked_add(U256::from(b - b'0')))
                .ok_or(ParseDecimalError("magnitude overflows 256 bits"))?;
        }
        let mut scale = (frac_part.len() as i64)
            .checked_sub(exp)
            .ok_or(ParseDecimalError("exponent out of range"))?;
        if scale < 0 {
            if !mag.is_zero() {
                let shift = u32::try_from(-scale)
                    .map_err(|_| ParseDecimalError("exponent out of range"))?;
                let factor =
                    pow10(shift).ok_or(ParseDecimalError("magnitude overflows 256 bits"))?;
                mag = mag
                    .checked_mul(factor)
                    .ok_or(ParseDecimalError("magnitude overflows 256 bits"))?;
            }
            scale = 0;
        }
        let scale =
            u32::try_from(scale).map_err(|_| ParseDecimalError("exponent out of range"))?;
        Ok(Self::new(sign, mag, scale))
    }
}

/// `10^n`, or `None` past 256 bits.
pub(crate) fn pow10(n: u32) -> Option<U256> {
    U256::from(10u8).checked_pow(U256::from(n))
}
