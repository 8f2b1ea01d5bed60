//! ABI decoding with full structural validation of hostile input.
//!
//! Every read is bounds-checked. Offsets and length words must fit a native
//! size, land inside the enclosing block, and leave room for the data they
//! announce; allocations are capped by what the remaining buffer could
//! possibly hold. Strict mode additionally rejects every non-canonical
//! padding bit.

use crate::{
    error::{DecodeError, DecodeErrorKind, Frame},
    ty::AbiType,
    validate,
    value::{Decimal, Value},
};
use alloy_primitives::{Address, Sign, I256, U256};

pub(crate) fn decode(ty: &AbiType, data: &[u8], strict: bool) -> Result<Value, DecodeError> {
    decode_value(ty, data, strict)
}

/// Decodes one value whose payload starts at the beginning of `block`.
/// Reads only as many bytes as the type requires.
fn decode_value(ty: &AbiType, block: &[u8], strict: bool) -> Result<Value, DecodeError> {
    match ty {
        AbiType::Address => {
            let word = word_at(block, 0)?;
            if strict && !all_zero(&word[..12]) {
                return Err(DecodeErrorKind::NonCanonicalPadding.into());
            }
            Ok(Value::Address(Address::from_slice(&word[12..])))
        }
        AbiType::Bool => {
            let word = word_at(block, 0)?;
            if strict {
                if !all_zero(&word[..31]) || word[31] > 1 {
                    return Err(DecodeErrorKind::InvalidBool.into());
                }
                Ok(Value::Bool(word[31] == 1))
            } else {
                Ok(Value::Bool(word.iter().any(|&b| b != 0)))
            }
        }
        AbiType::Int { signed, bits } => {
            let raw = U256::from_be_bytes(word_at(block, 0)?);
            if *signed {
                Ok(Value::Int(decode_int(raw, *bits, strict)?))
            } else {
                Ok(Value::Uint(decode_uint(raw, *bits, strict)?))
            }
        }
        AbiType::Fixed { signed, bits, precision } => {
            let raw = U256::from_be_bytes(word_at(block, 0)?);
            let decimal = if *signed {
                let (sign, mag) = decode_int(raw, *bits, strict)?.into_sign_and_abs();
                Decimal::new(sign, mag, *precision)
            } else {
                Decimal::new(Sign::Positive, decode_uint(raw, *bits, strict)?, *precision)
            };
            Ok(Value::Fixed(decimal))
        }
        AbiType::FixedBytes(m) => {
            let word = word_at(block, 0)?;
            if strict && !all_zero(&word[*m..]) {
                return Err(DecodeErrorKind::NonCanonicalPadding.into());
            }
            Ok(Value::FixedBytes(word[..*m].to_vec()))
        }
        AbiType::String => {
            let bytes = read_length_prefixed(block, strict)?;
            String::from_utf8(bytes)
                .map(Value::String)
                .map_err(|_| DecodeErrorKind::InvalidUtf8.into())
        }
        AbiType::Bytes => Ok(Value::Bytes(read_length_prefixed(block, strict)?)),
        AbiType::Tuple(components) => {
            let types: Vec<&AbiType> = components.iter().collect();
            Ok(Value::Tuple(decode_sequence(&types, block, strict, Frame::Tuple)?))
        }
        AbiType::FixedArray(inner, n) => {
            let types = vec![inner.as_ref(); *n];
            Ok(Value::Array(decode_sequence(&types, block, strict, Frame::Array)?))
        }
        AbiType::Array(inner) => {
            let length_word = U256::from_be_bytes(word_at(block, 0)?);
            let n = to_size(length_word)
                .ok_or(DecodeErrorKind::InvalidOffset(length_word))?;
            let body = &block[32..];
            // No element can occupy less than its head slot, so `n` heads
            // must fit in the body before anything is allocated.
            let min_size = n
                .checked_mul(inner.head_size().max(1))
                .ok_or(DecodeErrorKind::InvalidOffset(length_word))?;
            if min_size > body.len() {
                return Err(DecodeErrorKind::InsufficientData {
                    needed: min_size,
                    available: body.len(),
                }
                .into());
            }
            let types = vec![inner.as_ref(); n];
            Ok(Value::Array(decode_sequence(&types, body, strict, Frame::Array)?))
        }
    }
}

/// Decodes the head/tail block of an ordered component sequence.
fn decode_sequence(
    types: &[&AbiType],
    block: &[u8],
    strict: bool,
    frame: fn(usize) -> Frame,
) -> Result<Vec<Value>, DecodeError> {
    let head_size: usize = types.iter().map(|ty| ty.head_size()).sum();
    if head_size > block.len() {
        return Err(DecodeErrorKind::InsufficientData {
            needed: head_size,
            available: block.len(),
        }
        .into());
    }
    let mut values = Vec::with_capacity(types.len());
    let mut pos = 0;
    for (i, ty) in types.iter().enumerate() {
        let value = if ty.is_dynamic() {
            let offset_word = U256::from_be_bytes(word_at(block, pos)?);
            // The offset must point past every head and inside the block;
            // duplicate or decreasing offsets are not rejected.
            let offset = to_size(offset_word)
                .filter(|&o| o >= head_size && o < block.len())
                .ok_or(DecodeErrorKind::InvalidOffset(offset_word))?;
            pos += 32;
            decode_value(ty, &block[offset..], strict).map_err(|e| e.within(frame(i)))?
        } else {
            let value =
                decode_value(ty, &block[pos..], strict).map_err(|e| e.within(frame(i)))?;
            pos += ty.static_size();
            value
        };
        values.push(value);
    }
    Ok(values)
}

/// Reads a length word followed by that many payload bytes, checking that
/// the zero padding up to the word boundary is present (and, in strict
/// mode, actually zero).
fn read_length_prefixed(block: &[u8], strict: bool) -> Result<Vec<u8>, DecodeError> {
    let length_word = U256::from_be_bytes(word_at(block, 0)?);
    let n = to_size(length_word).ok_or(DecodeErrorKind::InvalidOffset(length_word))?;
    let body = &block[32..];
    if n > body.len() {
        return Err(DecodeErrorKind::InsufficientData { needed: n, available: body.len() }.into());
    }
    let padded = n.next_multiple_of(32);
    if padded > body.len() {
        return Err(
            DecodeErrorKind::InsufficientData { needed: padded, available: body.len() }.into()
        );
    }
    if strict && !all_zero(&body[n..padded]) {
        return Err(DecodeErrorKind::NonCanonicalPadding.into());
    }
    Ok(body[..n].to_vec())
}

fn decode_uint(raw: U256, bits: usize, strict: bool) -> Result<U256, DecodeError> {
    if bits == 256 {
        return Ok(raw);
    }
    let max = validate::uint_max(bits);
    if raw <= max {
        Ok(raw)
    } else if strict {
        Err(DecodeErrorKind::NonCanonicalPadding.into())
    } else {
        Ok(raw & max)
    }
}

fn decode_int(raw: U256, bits: usize, strict: bool) -> Result<I256, DecodeError> {
    let value = I256::from_raw(raw);
    if bits == 256 {
        return Ok(value);
    }
    // A canonical encoding replicates the sign bit through the whole word.
    let extension = value.asr(bits - 1);
    if extension == I256::ZERO || extension == I256::MINUS_ONE {
        Ok(value)
    } else if strict {
        Err(DecodeErrorKind::NonCanonicalPadding.into())
    } else {
        let mask = validate::uint_max(bits);
        let low = raw & mask;
        let truncated = if low & (U256::ONE << (bits - 1)) != U256::ZERO {
            low | !mask
        } else {
            low
        };
        Ok(I256::from_raw(truncated))
    }
}

fn word_at(block: &[u8], pos: usize) -> Result<[u8; 32], DecodeError> {
    match block.get(pos..pos + 32) {
        Some(slice) => {
            let mut word = [0u8; 32];
            word.copy_from_slice(slice);
            Ok(word)
        }
        None => Err(DecodeErrorKind::InsufficientData {
            needed: pos + 32,
            available: block.len(),
        }
        .into()),
    }
}

/// Narrows a 256-bit word to a native size, rejecting anything above
/// `2^63 - 1` so hostile offsets can never wrap an address computation.
fn to_size(word: U256) -> Option<usize> {
    let value = u64::try_from(word).ok()?;
    if value > i64::MAX as u64 {
        return None;
    }
    usize::try_from(value).ok()
}

fn all_zero(bytes: &[u8]) -> bool {
    bytes.iter().all(|&b| b == 0)
}
