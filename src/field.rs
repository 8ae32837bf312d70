//! Reduction of 256-bit hashes into the BN254 scalar field.
//!
//! The circuit's arithmetic field is smaller than the full 256-bit hash
//! space, so every hash commitment handed to the circuit must first be
//! reduced modulo the field order
//! `21888242871839275222246405745257275088548364400416034343698204186575808495617`.

use alloy_primitives::hex;
use ark_bn254::Fr;
use ark_ff::{BigInteger, PrimeField};
use common::PanagramError;
use sha3::{Digest, Keccak256};

/// Hash a plaintext guess into a field element: `keccak256(guess) mod r`.
pub fn hash_guess(guess: &str) -> Fr {
    let digest = Keccak256::digest(guess.as_bytes());
    Fr::from_be_bytes_mod_order(&digest)
}

/// Reduce a big-endian 256-bit value into the field.
pub fn reduce_bytes(bytes: &[u8; 32]) -> Fr {
    Fr::from_be_bytes_mod_order(bytes)
}

/// Parse a hex string (with or without `0x` prefix, at most 64 digits) and
/// reduce it into the field.
pub fn parse_field_hex(s: &str) -> Result<Fr, PanagramError> {
    let digits = s.strip_prefix("0x").unwrap_or(s);
    if digits.is_empty() || digits.len() > 64 {
        return Err(PanagramError::InvalidInput(format!(
            "expected at most 64 hex digits, got {} in {s:?}",
            digits.len()
        )));
    }
    // hex::decode needs an even number of digits.
    let padded = if digits.len() % 2 == 1 {
        format!("0{digits}")
    } else {
        digits.to_string()
    };
    let raw = hex::decode(&padded)
        .map_err(|e| PanagramError::InvalidInput(format!("malformed hex {s:?}: {e}")))?;
    let mut bytes = [0u8; 32];
    bytes[32 - raw.len()..].copy_from_slice(&raw);
    Ok(Fr::from_be_bytes_mod_order(&bytes))
}

/// Parse a 20-byte wallet address (`0x` + exactly 40 hex digits) into a
/// field element. A 160-bit value always fits below the field order.
pub fn parse_address(s: &str) -> Result<Fr, PanagramError> {
    let digits = s.strip_prefix("0x").ok_or_else(|| {
        PanagramError::InvalidInput(format!("address {s:?} must be 0x-prefixed"))
    })?;
    if digits.len() != 40 {
        return Err(PanagramError::InvalidInput(format!(
            "address must be 20 bytes (40 hex digits), got {} digits",
            digits.len()
        )));
    }
    let raw = hex::decode(digits)
        .map_err(|e| PanagramError::InvalidInput(format!("malformed address {s:?}: {e}")))?;
    Ok(Fr::from_be_bytes_mod_order(&raw))
}

/// Render a field element as 32 big-endian bytes, zero-left-padded.
pub fn field_to_bytes32(v: Fr) -> [u8; 32] {
    let be = v.into_bigint().to_bytes_be();
    let mut out = [0u8; 32];
    out[32 - be.len()..].copy_from_slice(&be);
    out
}

/// Render a field element as a `0x`-prefixed, 64-digit, zero-padded hex string.
pub fn field_to_hex(v: Fr) -> String {
    format!("0x{}", hex::encode(field_to_bytes32(v)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_bigint::BigUint;

    const MODULUS_DEC: &str =
        "21888242871839275222246405745257275088548364400416034343698204186575808495617";

    fn modulus() -> BigUint {
        BigUint::parse_bytes(MODULUS_DEC.as_bytes(), 10).unwrap()
    }

    #[test]
    fn reduction_matches_bigint_arithmetic() {
        let samples: [[u8; 32]; 3] = [[0u8; 32], [0xffu8; 32], {
            let mut b = [0u8; 32];
            b[0] = 0x30;
            b[31] = 0x01;
            b
        }];
        for bytes in samples {
            let reduced = reduce_bytes(&bytes);
            let expected = BigUint::from_bytes_be(&bytes) % modulus();
            let got = BigUint::from_bytes_be(&field_to_bytes32(reduced));
            assert_eq!(got, expected);
            assert!(got < modulus());
        }
    }

    #[test]
    fn triangles_single_hash_constant() {
        let hash = hash_guess("triangles");
        assert_eq!(
            field_to_hex(hash),
            "0x11212d1d1aad94d2dc18aed031902208221aa74484ac3e9122863fba27d5ca36"
        );
    }

    #[test]
    fn hex_parsing_accepts_short_and_unprefixed_input() {
        assert_eq!(parse_field_hex("0x01").unwrap(), Fr::from(1u64));
        assert_eq!(parse_field_hex("ff").unwrap(), Fr::from(255u64));
        // Odd digit counts are zero-extended on the left.
        assert_eq!(parse_field_hex("0x100").unwrap(), Fr::from(256u64));
    }

    #[test]
    fn hex_parsing_reduces_oversized_values() {
        let all_ones = "0x".to_string() + &"ff".repeat(32);
        let parsed = parse_field_hex(&all_ones).unwrap();
        let expected = BigUint::from_bytes_be(&[0xffu8; 32]) % modulus();
        assert_eq!(BigUint::from_bytes_be(&field_to_bytes32(parsed)), expected);
    }

    #[test]
    fn hex_parsing_rejects_malformed_input() {
        assert!(matches!(
            parse_field_hex(""),
            Err(PanagramError::InvalidInput(_))
        ));
        assert!(matches!(
            parse_field_hex("0xzz"),
            Err(PanagramError::InvalidInput(_))
        ));
        let too_long = "0x".to_string() + &"0".repeat(65);
        assert!(matches!(
            parse_field_hex(&too_long),
            Err(PanagramError::InvalidInput(_))
        ));
    }

    #[test]
    fn address_parsing_enforces_width() {
        let addr = parse_address("0x8D0EF35fF6E9e4234b34B916EF842d199AB10a7a").unwrap();
        assert_eq!(
            field_to_hex(addr),
            "0x0000000000000000000000008d0ef35ff6e9e4234b34b916ef842d199ab10a7a"
        );

        assert!(matches!(
            parse_address("0x1234"),
            Err(PanagramError::InvalidInput(_))
        ));
        assert!(matches!(
            parse_address("8D0EF35fF6E9e4234b34B916EF842d199AB10a7a"),
            Err(PanagramError::InvalidInput(_))
        ));
        let too_long = "0x".to_string() + &"ab".repeat(21);
        assert!(matches!(
            parse_address(&too_long),
            Err(PanagramError::InvalidInput(_))
        ));
    }

    #[test]
    fn hex_rendering_is_zero_padded() {
        assert_eq!(
            field_to_hex(Fr::from(1u64)),
            "0x0000000000000000000000000000000000000000000000000000000000000001"
        );
    }
}
