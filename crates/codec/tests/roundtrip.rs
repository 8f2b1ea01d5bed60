//! Property tests: decode is the inverse of encode over generated
//! (schema, value) pairs, encodings stay word-aligned, and the canonical
//! type string parses back to the same tree.

use abicodec::{AbiType, Decimal, Sign, Value, I256, U256};
use proptest::prelude::*;

fn leaf_type() -> impl Strategy<Value = AbiType> {
    prop_oneof![
        Just(AbiType::Address),
        Just(AbiType::Bool),
        Just(AbiType::String),
        Just(AbiType::Bytes),
        (any::<bool>(), 1..=32usize).prop_map(|(signed, w)| AbiType::Int { signed, bits: w * 8 }),
        (any::<bool>(), 1..=32usize, 1..=80u32)
            .prop_map(|(signed, w, precision)| AbiType::Fixed { signed, bits: w * 8, precision }),
        (1..=32usize).prop_map(AbiType::FixedBytes),
    ]
}

fn abi_type() -> impl Strategy<Value = AbiType> {
    leaf_type().prop_recursive(3, 24, 4, |inner| {
        // A `()[n]` element would decode from zero bytes per element, which
        // the decoder's allocation cap rejects; keep array elements sized.
        let sized = inner
            .clone()
            .prop_filter("array elements must occupy bytes", |t| {
                t.is_dynamic() || t.static_size() > 0
            });
        prop_oneof![
            sized.clone().prop_map(|t| AbiType::Array(Box::new(t))),
            (sized, 1..=3usize).prop_map(|(t, n)| AbiType::FixedArray(Box::new(t), n)),
            prop::collection::vec(inner, 0..=3).prop_map(AbiType::Tuple),
        ]
    })
}

/// An in-range word for the given bit width, as (unsigned, signed) parts.
fn masked_word(bits: usize) -> impl Strategy<Value = U256> {
    any::<[u8; 32]>().prop_map(move |bytes| {
        let raw = U256::from_be_bytes(bytes);
        if bits == 256 {
            raw
        } else {
            raw & ((U256::ONE << bits) - U256::ONE)
        }
    })
}

fn sign_extend(raw: U256, bits: usize) -> I256 {
    if bits == 256 {
        return I256::from_raw(raw);
    }
    let mask = (U256::ONE << bits) - U256::ONE;
    let low = raw & mask;
    if low & (U256::ONE << (bits - 1)) != U256::ZERO {
        I256::from_raw(low | !mask)
    } else {
        I256::from_raw(low)
    }
}

fn value_for(ty: &AbiType) -> BoxedStrategy<Value> {
    match ty {
        AbiType::Address => any::<[u8; 20]>()
            .prop_map(|b| Value::Address(abicodec::Address::from(b)))
            .boxed(),
        AbiType::Bool => any::<bool>().prop_map(Value::Bool).boxed(),
        AbiType::Int { signed: false, bits } => {
            masked_word(*bits).prop_map(Value::Uint).boxed()
        }
        AbiType::Int { signed: true, bits } => {
            let bits = *bits;
            masked_word(bits).prop_map(move |raw| Value::Int(sign_extend(raw, bits))).boxed()
        }
        AbiType::Fixed { signed: false, bits, precision } => {
            let precision = *precision;
            masked_word(*bits)
                .prop_map(move |mag| {
                    Value::Fixed(Decimal::new(Sign::Positive, mag, precision))
                })
                .boxed()
        }
        AbiType::Fixed { signed: true, bits, precision } => {
            let (bits, precision) = (*bits, *precision);
            masked_word(bits)
                .prop_map(move |raw| {
                    let (sign, mag) = sign_extend(raw, bits).into_sign_and_abs();
                    Value::Fixed(Decimal::new(sign, mag, precision))
                })
                .boxed()
        }
        AbiType::FixedBytes(m) => prop::collection::vec(any::<u8>(), *m)
            .prop_map(Value::FixedBytes)
            .boxed(),
        AbiType::Bytes => prop::collection::vec(any::<u8>(), 0..=48)
            .prop_map(Value::Bytes)
            .boxed(),
        AbiType::String => ".{0,12}".prop_map(Value::String).boxed(),
        AbiType::FixedArray(inner, n) => {
            prop::collection::vec(value_for(inner), *n).prop_map(Value::Array).boxed()
        }
        AbiType::Array(inner) => {
            prop::collection::vec(value_for(inner), 0..=3).prop_map(Value::Array).boxed()
        }
        AbiType::Tuple(components) => components
            .iter()
            .map(value_for)
            .collect::<Vec<_>>()
            .prop_map(Value::Tuple)
            .boxed(),
    }
}

fn typed_value() -> impl Strategy<Value = (AbiType, Value)> {
    abi_type().prop_flat_map(|ty| {
        let values = value_for(&ty);
        (Just(ty), values)
    })
}

proptest! {
    #[test]
    fn decode_inverts_encode((ty, value) in typed_value()) {
        let encoded = ty.encode(&value).unwrap();
        prop_assert_eq!(encoded.len() % 32, 0);
        let decoded = ty.decode(&encoded).unwrap();
        prop_assert_eq!(decoded, value);
    }

    #[test]
    fn lenient_decode_accepts_canonical_encodings((ty, value) in typed_value()) {
        let encoded = ty.encode(&value).unwrap();
        prop_assert_eq!(ty.decode_lenient(&encoded).unwrap(), ty.decode(&encoded).unwrap());
    }

    #[test]
    fn static_types_have_constant_width((ty, value) in typed_value()) {
        if !ty.is_dynamic() {
            let encoded = ty.encode(&value).unwrap();
            prop_assert_eq!(encoded.len(), ty.static_size());
        }
    }

    #[test]
    fn canonical_type_string_parses_back(ty in abi_type()) {
        let rendered = ty.to_string();
        prop_assert_eq!(rendered.parse::<AbiType>().unwrap(), ty);
    }

    #[test]
    fn truncation_never_panics((ty, value) in typed_value()) {
        let encoded = ty.encode(&value).unwrap();
        if !encoded.is_empty() {
            // Any prefix either decodes or fails cleanly; it must not panic.
            let _ = ty.decode(&encoded[..encoded.len() - 1]);
            let _ = ty.decode(&encoded[..encoded.len() / 2]);
        }
    }
}
