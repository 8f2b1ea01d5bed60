//! Value validation against a type tree.
//!
//! The leaf helpers here are shared with the encoder so that both agree on
//! the accepted value domain: an address may arrive as an [`Address`], as 20
//! raw bytes or as a `0x`-prefixed hex string; integers may arrive in either
//! integer variant as long as the numeric value fits.

use crate::{
    error::{EncodeError, EncodeErrorKind, Frame},
    ty::AbiType,
    value::{ScaleError, Value},
};
use alloy_primitives::{hex, Address, I256, U256};

/// Checks that `value` is encodable as `ty`, reporting the path of the
/// first offending component.
pub(crate) fn validate(ty: &AbiType, value: &Value) -> Result<(), EncodeError> {
    match ty {
        AbiType::Address => as_address(ty, value).map(drop).map_err(EncodeError::new),
        AbiType::Bool => as_bool(ty, value).map(drop).map_err(EncodeError::new),
        AbiType::Int { signed: false, bits } => {
            as_uint(ty, value, *bits).map(drop).map_err(EncodeError::new)
        }
        AbiType::Int { signed: true, bits } => {
            as_int(ty, value, *bits).map(drop).map_err(EncodeError::new)
        }
        AbiType::Fixed { signed, bits, precision } => {
            fixed_word(ty, value, *signed, *bits, *precision).map(drop).map_err(EncodeError::new)
        }
        AbiType::FixedBytes(m) => {
            as_fixed_bytes(ty, value, *m).map(drop).map_err(EncodeError::new)
        }
        AbiType::String => as_str(ty, value).map(drop).map_err(EncodeError::new),
        AbiType::Bytes => as_byte_seq(ty, value).map(drop).map_err(EncodeError::new),
        AbiType::FixedArray(inner, n) => {
            let elements = as_array(ty, value)?;
            // Length before elements.
            if elements.len() != *n {
                return Err(EncodeErrorKind::LengthMismatch { expected: *n, got: elements.len() }
                    .into());
            }
            validate_elements(inner, elements, Frame::Array)
        }
        AbiType::Array(inner) => {
            validate_elements(inner, as_array(ty, value)?, Frame::Array)
        }
        AbiType::Tuple(components) => {
            let elements = as_tuple(ty, value)?;
            if elements.len() != components.len() {
                return Err(EncodeErrorKind::LengthMismatch {
                    expected: components.len(),
                    got: elements.len(),
                }
                .into());
            }
            for (i, (component, element)) in components.iter().zip(elements).enumerate() {
                validate(component, element).map_err(|e| e.within(Frame::Tuple(i)))?;
            }
            Ok(())
        }
    }
}

fn validate_elements(
    inner: &AbiType,
    elements: &[Value],
    frame: fn(usize) -> Frame,
) -> Result<(), EncodeError> {
    for (i, element) in elements.iter().enumerate() {
        validate(inner, element).map_err(|e| e.within(frame(i)))?;
    }
    Ok(())
}

fn mismatch(ty: &AbiType, value: &Value) -> EncodeErrorKind {
    EncodeErrorKind::TypeMismatch { ty: ty.to_string(), value: value.kind_name().to_string() }
}

pub(crate) fn as_array<'v>(
    ty: &AbiType,
    value: &'v Value,
) -> Result<&'v [Value], EncodeErrorKind> {
    match value {
        Value::Array(elements) => Ok(elements),
        other => Err(mismatch(ty, other)),
    }
}

pub(crate) fn as_tuple<'v>(
    ty: &AbiType,
    value: &'v Value,
) -> Result<&'v [Value], EncodeErrorKind> {
    match value {
        Value::Tuple(elements) => Ok(elements),
        other => Err(mismatch(ty, other)),
    }
}

pub(crate) fn as_bool(ty: &AbiType, value: &Value) -> Result<bool, EncodeErrorKind> {
    match value {
        Value::Bool(b) => Ok(*b),
        other => Err(mismatch(ty, other)),
    }
}

pub(crate) fn as_str<'v>(ty: &AbiType, value: &'v Value) -> Result<&'v str, EncodeErrorKind> {
    match value {
        Value::String(s) => Ok(s),
        other => Err(mismatch(ty, other)),
    }
}

pub(crate) fn as_byte_seq<'v>(
    ty: &AbiType,
    value: &'v Value,
) -> Result<&'v [u8], EncodeErrorKind> {
    match value {
        Value::Bytes(b) | Value::FixedBytes(b) => Ok(b),
        other => Err(mismatch(ty, other)),
    }
}

pub(crate) fn as_fixed_bytes<'v>(
    ty: &AbiType,
    value: &'v Value,
    m: usize,
) -> Result<&'v [u8], EncodeErrorKind> {
    let bytes = as_byte_seq(ty, value)?;
    if bytes.len() != m {
        return Err(EncodeErrorKind::LengthMismatch { expected: m, got: bytes.len() });
    }
    Ok(bytes)
}

pub(crate) fn as_address(ty: &AbiType, value: &Value) -> Result<Address, EncodeErrorKind> {
    match value {
        Value::Address(a) => Ok(*a),
        Value::FixedBytes(b) | Value::Bytes(b) => {
            if b.len() != 20 {
                return Err(EncodeErrorKind::InvalidAddressFormat(format!(
                    "expected 20 bytes, got {}",
                    b.len()
                )));
            }
            Ok(Address::from_slice(b))
        }
        Value::String(s) => address_from_hex(s),
        other => Err(mismatch(ty, other)),
    }
}

fn address_from_hex(s: &str) -> Result<Address, EncodeErrorKind> {
    let Some(digits) = s.strip_prefix("0x") else {
        return Err(EncodeErrorKind::InvalidAddressFormat("missing 0x prefix".into()));
    };
    // Length before alphabet.
    if digits.len() != 40 {
        return Err(EncodeErrorKind::InvalidAddressFormat(format!(
            "expected 40 hex characters, got {}",
            digits.len()
        )));
    }
    if !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(EncodeErrorKind::InvalidAddressFormat("non-hex character".into()));
    }
    let bytes = hex::decode(digits)
        .map_err(|_| EncodeErrorKind::InvalidAddressFormat("non-hex character".into()))?;
    Ok(Address::from_slice(&bytes))
}

pub(crate) fn as_uint(ty: &AbiType, value: &Value, bits: usize) -> Result<U256, EncodeErrorKind> {
    let max = uint_max(bits);
    match value {
        Value::Uint(u) if *u <= max => Ok(*u),
        Value::Uint(u) => Err(out_of_range(ty, u)),
        Value::Int(i) if !i.is_negative() && i.unsigned_abs() <= max => Ok(i.unsigned_abs()),
        Value::Int(i) => Err(out_of_range(ty, i)),
        other => Err(mismatch(ty, other)),
    }
}

pub(crate) fn as_int(ty: &AbiType, value: &Value, bits: usize) -> Result<I256, EncodeErrorKind> {
    match value {
        Value::Int(i) if (int_min(bits)..=int_max(bits)).contains(i) => Ok(*i),
        Value::Int(i) => Err(out_of_range(ty, i)),
        Value::Uint(u) if *u <= int_max(bits).unsigned_abs() => Ok(I256::from_raw(*u)),
        Value::Uint(u) => Err(out_of_range(ty, u)),
        other => Err(mismatch(ty, other)),
    }
}

/// The 256-bit two's-complement word of a fixed-point value scaled by
/// `10^precision`, after range and exactness checks.
pub(crate) fn fixed_word(
    ty: &AbiType,
    value: &Value,
    signed: bool,
    bits: usize,
    precision: u32,
) -> Result<U256, EncodeErrorKind> {
    let Value::Fixed(decimal) = value else {
        return Err(mismatch(ty, value));
    };
    let (sign, mag) = decimal.scaled(precision).map_err(|e| match e {
        ScaleError::Fractional => EncodeErrorKind::FractionalLoss { precision },
        ScaleError::Overflow => out_of_range(ty, decimal),
    })?;
    if signed {
        let scaled = I256::checked_from_sign_and_abs(sign, mag)
            .filter(|k| (int_min(bits)..=int_max(bits)).contains(k))
            .ok_or_else(|| out_of_range(ty, decimal))?;
        Ok(scaled.into_raw())
    } else {
        if sign.is_negative() || mag > uint_max(bits) {
            return Err(out_of_range(ty, decimal));
        }
        Ok(mag)
    }
}

fn out_of_range(ty: &AbiType, value: &dyn std::fmt::Display) -> EncodeErrorKind {
    EncodeErrorKind::ValueOutOfRange { ty: ty.to_string(), value: value.to_string() }
}

pub(crate) fn uint_max(bits: usize) -> U256 {
    if bits == 256 {
        U256::MAX
    } else {
        (U256::ONE << bits) - U256::ONE
    }
}

pub(crate) fn int_max(bits: usize) -> I256 {
    I256::MAX.asr(256 - bits)
}

pub(crate) fn int_min(bits: usize) -> I256 {
    I256::MIN.asr(256 - bits)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Decimal;
    use alloy_primitives::{address, Sign};

    fn ty(s: &str) -> AbiType {
        s.parse().unwrap()
    }

    #[test]
    fn integer_bounds() {
        assert_eq!(uint_max(8), U256::from(255u64));
        assert_eq!(uint_max(256), U256::MAX);
        assert_eq!(int_max(8), I256::try_from(127).unwrap());
        assert_eq!(int_min(8), I256::try_from(-128).unwrap());
        assert_eq!(int_max(256), I256::MAX);
        assert_eq!(int_min(256), I256::MIN);
    }

    #[test]
    fn uint_range_is_inclusive() {
        let u8_ty = ty("uint8");
        assert!(u8_ty.is_encodable(&Value::Uint(U256::from(255u64))));
        assert!(!u8_ty.is_encodable(&Value::Uint(U256::from(256u64))));
        assert!(u8_ty.is_encodable(&Value::Uint(U256::ZERO)));
    }

    #[test]
    fn int_range_is_inclusive() {
        let i8_ty = ty("int8");
        assert!(i8_ty.is_encodable(&Value::Int(I256::try_from(-128).unwrap())));
        assert!(i8_ty.is_encodable(&Value::Int(I256::try_from(127).unwrap())));
        assert!(!i8_ty.is_encodable(&Value::Int(I256::try_from(128).unwrap())));
        assert!(!i8_ty.is_encodable(&Value::Int(I256::try_from(-129).unwrap())));
        // A non-negative value may arrive in the unsigned variant.
        assert!(i8_ty.is_encodable(&Value::Uint(U256::from(127u64))));
        assert!(!i8_ty.is_encodable(&Value::Uint(U256::from(128u64))));
    }

    #[test]
    fn booleans_are_not_integers() {
        let err = ty("uint8").validate(&Value::Bool(true)).unwrap_err();
        assert!(matches!(err.kind, EncodeErrorKind::TypeMismatch { .. }));
    }

    #[test]
    fn address_forms() {
        let canonical = address!("0xb3c95ff08316fb2f2e3e52ee82f8e7b605aa1304");
        let node = ty("address");
        assert!(node.is_encodable(&Value::Address(canonical)));
        assert!(node.is_encodable(&Value::Bytes(canonical.to_vec())));
        assert!(node.is_encodable(&Value::String(
            "0xB3C95ff08316fb2F2e3E52Ee82F8e7b605Aa1304".into()
        )));
        // Length is checked before the alphabet.
        let err = node.validate(&Value::String("0xzz".into())).unwrap_err();
        assert_eq!(
            err.kind,
            EncodeErrorKind::InvalidAddressFormat("expected 40 hex characters, got 2".into())
        );
        let err = node
            .validate(&Value::String(format!("0x{}", "z".repeat(40))))
            .unwrap_err();
        assert_eq!(err.kind, EncodeErrorKind::InvalidAddressFormat("non-hex character".into()));
        assert!(!node.is_encodable(&Value::Bytes(vec![0; 19])));
    }

    #[test]
    fn fixed_requires_exact_scaling() {
        let node = ty("ufixed128x2");
        assert!(node.is_encodable(&Value::Fixed("1.25".parse().unwrap())));
        let err = node.validate(&Value::Fixed("1.255".parse().unwrap())).unwrap_err();
        assert_eq!(err.kind, EncodeErrorKind::FractionalLoss { precision: 2 });
        let err = node
            .validate(&Value::Fixed(Decimal::new(Sign::Negative, U256::from(5u64), 1)))
            .unwrap_err();
        assert!(matches!(err.kind, EncodeErrorKind::ValueOutOfRange { .. }));
    }

    #[test]
    fn array_checks_length_before_elements() {
        // Both the length and the first element are wrong; the length wins.
        let err = ty("uint8[2]")
            .validate(&Value::Array(vec![Value::Bool(true)]))
            .unwrap_err();
        assert_eq!(err.kind, EncodeErrorKind::LengthMismatch { expected: 2, got: 1 });
    }

    #[test]
    fn first_offending_path_is_reported() {
        let value = Value::Tuple(vec![
            Value::Bool(true),
            Value::Array(vec![
                Value::Uint(U256::from(1u64)),
                Value::Uint(U256::from(999u64)),
            ]),
        ]);
        let err = ty("(bool,uint8[])").validate(&value).unwrap_err();
        assert_eq!(err.path.to_string(), "tuple[1].array[1]");
        assert!(matches!(err.kind, EncodeErrorKind::ValueOutOfRange { .. }));
    }

    #[test]
    fn tuple_requires_exact_arity() {
        let err = ty("(bool,bool)").validate(&Value::Tuple(vec![Value::Bool(true)])).unwrap_err();
        assert_eq!(err.kind, EncodeErrorKind::LengthMismatch { expected: 2, got: 1 });
    }
}
