//! Byte-string to field-element packing.
//!
//! Strings are committed by hashing their packed representation, so the
//! packing must be deterministic and identical wherever a string is used as
//! a tree key.

use crate::crypto::field::FieldElement;

/// Bytes per field element. `256^31 - 1 < p` for BN254, so a full chunk never
/// wraps the modulus.
pub const BYTES_PER_ELEMENT: usize = 31;

/// Pack bytes into little-endian 31-byte chunks, one field element each.
///
/// The empty input packs to `[0]` so the result is always a valid hash
/// argument list.
pub fn pack_bytes(bytes: &[u8]) -> Vec<FieldElement> {
    if bytes.is_empty() {
        return vec![FieldElement::ZERO];
    }

    bytes
        .chunks(BYTES_PER_ELEMENT)
        .map(FieldElement::from_le_bytes)
        .collect()
}

/// Pack the UTF-8 encoding of `s`.
pub fn pack_str(s: &str) -> Vec<FieldElement> {
    pack_bytes(s.as_bytes())
}

#[cfg(test)]
mod tests {
    use num_bigint::BigUint;

    use super::*;

    #[test]
    fn test_empty_packs_to_single_zero() {
        assert_eq!(pack_bytes(&[]), vec![FieldElement::ZERO]);
        assert_eq!(pack_str(""), vec![FieldElement::ZERO]);
    }

    #[test]
    fn test_short_input_is_little_endian() {
        // 0x01 + 0x02 * 256
        assert_eq!(pack_bytes(&[0x01, 0x02]), vec![FieldElement::from(513u64)]);
        assert_eq!(pack_str("A"), vec![FieldElement::from(65u64)]);
    }

    #[test]
    fn test_full_chunk_is_single_element() {
        let bytes = [0xFFu8; BYTES_PER_ELEMENT];
        let packed = pack_bytes(&bytes);
        assert_eq!(packed.len(), 1);
        let expected = (BigUint::from(1u8) << (8 * BYTES_PER_ELEMENT)) - BigUint::from(1u8);
        assert_eq!(packed[0].to_biguint(), expected);
        assert!(expected < FieldElement::modulus());
    }

    #[test]
    fn test_long_input_splits_into_chunks() {
        let bytes: Vec<u8> = (0..70u8).collect();
        let packed = pack_bytes(&bytes);
        assert_eq!(packed.len(), 3);
        assert_eq!(packed[2], FieldElement::from_le_bytes(&bytes[62..]));
        assert_eq!(packed[1], FieldElement::from_le_bytes(&bytes[31..62]));
    }

    #[test]
    fn test_packing_is_deterministic() {
        assert_eq!(pack_str("UgandaLandSchemaV1.0"), pack_str("UgandaLandSchemaV1.0"));
        assert_ne!(pack_str("MinistryOfLands"), pack_str("MinistryOfLand"));
    }
}
