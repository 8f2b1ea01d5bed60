//! Schema-directed conversion between JSON text and codec values.
//!
//! Numbers survive exactly thanks to `serde_json`'s `arbitrary_precision`
//! feature: the raw token text reaches the decimal parser without ever
//! becoming an `f64`. Integers may also be given as `0x`-prefixed hex
//! strings, byte blobs and addresses always as hex strings.

use abicodec::{AbiType, Decimal, ScaleError, Sign, Value, I256, U256};
use alloy_primitives::hex;
use eyre::{bail, eyre, Result};
use serde_json::Value as Json;

/// Builds the [`Value`] for `ty` out of its JSON rendition.
pub fn value_from_json(ty: &AbiType, json: &Json) -> Result<Value> {
    match ty {
        AbiType::Address => match json {
            // Passed through as a string: the codec itself validates the
            // 0x prefix, length and alphabet.
            Json::String(s) => Ok(Value::String(s.clone())),
            _ => bail!("expected a hex string for {ty}"),
        },
        AbiType::Bool => match json {
            Json::Bool(b) => Ok(Value::Bool(*b)),
            _ => bail!("expected a boolean for {ty}"),
        },
        AbiType::Int { .. } => integer_value(ty, json),
        AbiType::Fixed { .. } => match json {
            Json::Number(n) => Ok(Value::Fixed(n.to_string().parse::<Decimal>()?)),
            Json::String(s) => Ok(Value::Fixed(s.trim().parse::<Decimal>()?)),
            _ => bail!("expected a number for {ty}"),
        },
        AbiType::FixedBytes(_) => Ok(Value::FixedBytes(hex_bytes(ty, json)?)),
        AbiType::Bytes => Ok(Value::Bytes(hex_bytes(ty, json)?)),
        AbiType::String => match json {
            Json::String(s) => Ok(Value::String(s.clone())),
            _ => bail!("expected a string for {ty}"),
        },
        AbiType::FixedArray(inner, _) | AbiType::Array(inner) => match json {
            Json::Array(items) => items
                .iter()
                .map(|item| value_from_json(inner, item))
                .collect::<Result<Vec<_>>>()
                .map(Value::Array),
            _ => bail!("expected an array for {ty}"),
        },
        AbiType::Tuple(components) => match json {
            Json::Array(items) => {
                if items.len() != components.len() {
                    bail!("expected {} elements for {ty}, got {}", components.len(), items.len());
                }
                components
                    .iter()
                    .zip(items)
                    .map(|(component, item)| value_from_json(component, item))
                    .collect::<Result<Vec<_>>>()
                    .map(Value::Tuple)
            }
            _ => bail!("expected an array for {ty}"),
        },
    }
}

/// Renders a decoded value as JSON: numbers arbitrary-precision, byte
/// blobs and addresses as `0x` lowercase hex, tuples as arrays.
pub fn value_to_json(value: &Value) -> Json {
    match value {
        Value::Address(a) => Json::String(format!("0x{}", hex::encode(a))),
        Value::Bool(b) => Json::Bool(*b),
        Value::Uint(u) => number(u.to_string()),
        Value::Int(i) => number(i.to_string()),
        Value::Fixed(d) => number(d.to_string()),
        Value::FixedBytes(b) | Value::Bytes(b) => Json::String(hex::encode_prefixed(b)),
        Value::String(s) => Json::String(s.clone()),
        Value::Array(items) | Value::Tuple(items) => {
            Json::Array(items.iter().map(value_to_json).collect())
        }
    }
}

fn integer_value(ty: &AbiType, json: &Json) -> Result<Value> {
    let text = match json {
        Json::Number(n) => n.to_string(),
        Json::String(s) => s.trim().to_string(),
        _ => bail!("expected a number for {ty}"),
    };
    let (sign, digits) = match text.strip_prefix('-') {
        Some(rest) => (Sign::Negative, rest),
        None => (Sign::Positive, text.strip_prefix('+').unwrap_or(&text)),
    };
    let mag = if let Some(hex_digits) = digits.strip_prefix("0x") {
        U256::from_str_radix(hex_digits, 16)
            .map_err(|e| eyre!("invalid hex integer for {ty}: {e}"))?
    } else {
        let decimal: Decimal = digits.parse()?;
        decimal
            .scaled(0)
            .map_err(|e| match e {
                ScaleError::Fractional => eyre!("{text} is not an integer"),
                ScaleError::Overflow => eyre!("{text} does not fit 256 bits"),
            })?
            .1
    };
    match sign {
        Sign::Positive => Ok(Value::Uint(mag)),
        Sign::Negative => I256::checked_from_sign_and_abs(Sign::Negative, mag)
            .map(Value::Int)
            .ok_or_else(|| eyre!("{text} does not fit 256 bits")),
    }
}

fn hex_bytes(ty: &AbiType, json: &Json) -> Result<Vec<u8>> {
    match json {
        Json::String(s) => {
            hex::decode(s.trim()).map_err(|e| eyre!("invalid hex for {ty}: {e}"))
        }
        _ => bail!("expected a hex string for {ty}"),
    }
}

/// Arbitrary-precision JSON number from its exact textual form.
fn number(text: String) -> Json {
    match serde_json::from_str::<serde_json::Number>(&text) {
        Ok(n) => Json::Number(n),
        Err(_) => Json::String(text),
    }
}
