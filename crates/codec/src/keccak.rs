//! Keccak-256, the Ethereum flavour.
//!
//! This is the original Keccak submission (domain byte `0x01`), not the
//! NIST SHA-3 finalisation: rate 1088 bits, capacity 512 bits, 24 rounds of
//! the f[1600] permutation.

use alloy_primitives::{Selector, B256};

/// Rate in bytes: (1600 - 2 * 256) / 8.
const RATE: usize = 136;

const ROUND_CONSTANTS: [u64; 24] = [
    0x0000000000000001,
    0x0000000000008082,
    0x800000000000808a,
    0x8000000080008000,
    0x000000000000808b,
    0x0000000080000001,
    0x8000000080008081,
    0x8000000000008009,
    0x000000000000008a,
    0x0000000000000088,
    0x0000000080008009,
    0x000000008000000a,
    0x000000008000808b,
    0x800000000000008b,
    0x8000000000008089,
    0x8000000000008003,
    0x8000000000008002,
    0x8000000000000080,
    0x000000000000800a,
    0x800000008000000a,
    0x8000000080008081,
    0x8000000000008080,
    0x0000000080000001,
    0x8000000080008008,
];

/// Rotation amounts along the rho-pi lane walk.
const ROTATIONS: [u32; 24] =
    [1, 3, 6, 10, 15, 21, 28, 36, 45, 55, 2, 14, 27, 41, 56, 8, 25, 43, 62, 18, 39, 61, 20, 44];

/// Lane visiting order of the combined rho-pi step.
const PI_LANES: [usize; 24] =
    [10, 7, 11, 17, 18, 3, 5, 16, 8, 21, 24, 4, 15, 23, 19, 13, 12, 2, 20, 14, 22, 9, 6, 1];

/// Computes the Keccak-256 digest of `data`.
///
/// ```
/// use abicodec::keccak256;
///
/// assert_eq!(
///     keccak256("").to_string(),
///     "0xc5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470",
/// );
/// ```
pub fn keccak256(data: impl AsRef<[u8]>) -> B256 {
    let data = data.as_ref();
    let mut state = [0u64; 25];

    let mut blocks = data.chunks_exact(RATE);
    for block in &mut blocks {
        absorb(&mut state, block);
        keccak_f1600(&mut state);
    }

    // Final block: pad10*1 with the Keccak domain byte, not SHA-3's 0x06.
    let remainder = blocks.remainder();
    let mut last = [0u8; RATE];
    last[..remainder.len()].copy_from_slice(remainder);
    last[remainder.len()] = 0x01;
    last[RATE - 1] |= 0x80;
    absorb(&mut state, &last);
    keccak_f1600(&mut state);

    let mut digest = [0u8; 32];
    for (lane, chunk) in state.iter().zip(digest.chunks_exact_mut(8)) {
        chunk.copy_from_slice(&lane.to_le_bytes());
    }
    B256::new(digest)
}

/// First four digest bytes of a canonical function signature, e.g.
/// `transfer(address,uint256)`.
pub fn selector(signature: &str) -> Selector {
    Selector::from_slice(&keccak256(signature.as_bytes()).0[..4])
}

fn absorb(state: &mut [u64; 25], block: &[u8]) {
    for (lane, chunk) in state.iter_mut().zip(block.chunks_exact(8)) {
        let mut bytes = [0u8; 8];
        bytes.copy_from_slice(chunk);
        *lane ^= u64::from_le_bytes(bytes);
    }
}

fn keccak_f1600(state: &mut [u64; 25]) {
    for &rc in &ROUND_CONSTANTS {
        // theta
        let mut parity = [0u64; 5];
        for x in 0..5 {
            parity[x] = state[x] ^ state[x + 5] ^ state[x + 10] ^ state[x + 15] ^ state[x + 20];
        }
        for x in 0..5 {
            let d = parity[(x + 4) % 5] ^ parity[(x + 1) % 5].rotate_left(1);
            for y in 0..5 {
                state[x + 5 * y] ^= d;
            }
        }

        // rho and pi in one walk over the lanes
        let mut carry = state[1];
        for (&lane, &rotation) in PI_LANES.iter().zip(&ROTATIONS) {
            let next = state[lane];
            state[lane] = carry.rotate_left(rotation);
            carry = next;
        }

        // chi, row by row
        for row in (0..25).step_by(5) {
            let lanes = [
                state[row],
                state[row + 1],
                state[row + 2],
                state[row + 3],
                state[row + 4],
            ];
            for x in 0..5 {
                state[row + x] = lanes[x] ^ (!lanes[(x + 1) % 5] & lanes[(x + 2) % 5]);
            }
        }

        // iota
        state[0] ^= rc;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::hex;

    fn digest_hex(data: &[u8]) -> String {
        hex::encode(keccak256(data))
    }

    #[test]
    fn empty_input() {
        assert_eq!(
            digest_hex(b""),
            "c5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470"
        );
    }

    #[test]
    fn hello_world() {
        assert_eq!(
            digest_hex(b"Hello World!"),
            "3ea2f1d0abf3fc66cf29eebb70cbd4e7fe762ef8a09bcc06c8edf641230afec0"
        );
    }

    #[test]
    fn short_ascii() {
        assert_eq!(
            digest_hex(b"foo"),
            "41b1a0649752af1b28b3dc29a1556eee781e4a4c3a1f7f53f90fa834de098c4d"
        );
    }

    #[test]
    fn fox_pangram() {
        assert_eq!(
            digest_hex(b"The quick brown fox jumps over the lazy dog"),
            "4d741b6f1eb29cb2a9b9911c82f56fa8d73b04959d3d9d222895df6c0b28aa15"
        );
    }

    #[test]
    fn transfer_selector() {
        assert_eq!(selector("transfer(address,uint256)").to_string(), "0xa9059cbb");
    }
}
