//! ABI encoding: 32-byte word discipline with head/tail layout for dynamic
//! components.
//!
//! Encoding validates as it goes, via the same leaf coercions as the
//! validator, so a separate validation pass is never required.

use crate::{
    error::{EncodeError, EncodeErrorKind, Frame},
    ty::AbiType,
    validate,
    value::Value,
};
use alloy_primitives::U256;

/// Encodes `value` as `ty`.
///
/// The top level behaves like the sole element of a one-tuple: the payload
/// is produced directly, with no enclosing offset word.
pub(crate) fn encode(ty: &AbiType, value: &Value) -> Result<Vec<u8>, EncodeError> {
    payload(ty, value)
}

/// The payload bytes of one `(type, value)` pair: the static encoding for
/// static types, the length-and-data or head/tail body for dynamic ones.
fn payload(ty: &AbiType, value: &Value) -> Result<Vec<u8>, EncodeError> {
    match ty {
        AbiType::Address => {
            let address = validate::as_address(ty, value)?;
            let mut word = vec![0u8; 32];
            word[12..].copy_from_slice(address.as_slice());
            Ok(word)
        }
        AbiType::Bool => {
            let bit = validate::as_bool(ty, value)?;
            Ok(U256::from(bit as u8).to_be_bytes::<32>().to_vec())
        }
        AbiType::Int { signed: false, bits } => {
            Ok(validate::as_uint(ty, value, *bits)?.to_be_bytes::<32>().to_vec())
        }
        AbiType::Int { signed: true, bits } => {
            Ok(validate::as_int(ty, value, *bits)?.into_raw().to_be_bytes::<32>().to_vec())
        }
        AbiType::Fixed { signed, bits, precision } => {
            let word = validate::fixed_word(ty, value, *signed, *bits, *precision)?;
            Ok(word.to_be_bytes::<32>().to_vec())
        }
        AbiType::FixedBytes(m) => {
            let bytes = validate::as_fixed_bytes(ty, value, *m)?;
            let mut word = vec![0u8; 32];
            word[..bytes.len()].copy_from_slice(bytes);
            Ok(word)
        }
        AbiType::String => Ok(length_prefixed(validate::as_str(ty, value)?.as_bytes())),
        AbiType::Bytes => Ok(length_prefixed(validate::as_byte_seq(ty, value)?)),
        AbiType::Tuple(components) => {
            let elements = validate::as_tuple(ty, value)?;
            if elements.len() != components.len() {
                return Err(EncodeErrorKind::LengthMismatch {
                    expected: components.len(),
                    got: elements.len(),
                }
                .into());
            }
            let pairs: Vec<_> = components.iter().zip(elements).collect();
            encode_sequence(&pairs, Frame::Tuple)
        }
        AbiType::FixedArray(inner, n) => {
            let elements = validate::as_array(ty, value)?;
            if elements.len() != *n {
                return Err(EncodeErrorKind::LengthMismatch { expected: *n, got: elements.len() }
                    .into());
            }
            let pairs: Vec<_> = elements.iter().map(|v| (inner.as_ref(), v)).collect();
            encode_sequence(&pairs, Frame::Array)
        }
        AbiType::Array(inner) => {
            let elements = validate::as_array(ty, value)?;
            let pairs: Vec<_> = elements.iter().map(|v| (inner.as_ref(), v)).collect();
            let mut out = U256::from(elements.len()).to_be_bytes::<32>().to_vec();
            out.extend_from_slice(&encode_sequence(&pairs, Frame::Array)?);
            Ok(out)
        }
    }
}

/// Head/tail encoding of an ordered component sequence.
///
/// Static components inline their payload in the head; dynamic ones put an
/// offset word there and append the payload to the tail. Offsets are
/// measured from the start of this block.
fn encode_sequence(
    pairs: &[(&AbiType, &Value)],
    frame: fn(usize) -> Frame,
) -> Result<Vec<u8>, EncodeError> {
    let head_size: usize = pairs.iter().map(|(ty, _)| ty.head_size()).sum();
    let mut head = Vec::with_capacity(head_size);
    let mut tail = Vec::new();
    for (i, (ty, value)) in pairs.iter().enumerate() {
        let encoded = payload(ty, value).map_err(|e| e.within(frame(i)))?;
        if ty.is_dynamic() {
            head.extend_from_slice(&U256::from(head_size + tail.len()).to_be_bytes::<32>());
            tail.extend_from_slice(&encoded);
        } else {
            head.extend_from_slice(&encoded);
        }
    }
    head.extend_from_slice(&tail);
    Ok(head)
}

/// A length word followed by the data, zero-padded up to a word boundary.
fn length_prefixed(data: &[u8]) -> Vec<u8> {
    let mut out = U256::from(data.len()).to_be_bytes::<32>().to_vec();
    out.extend_from_slice(data);
    out.resize(32 + data.len().next_multiple_of(32), 0);
    out
}
