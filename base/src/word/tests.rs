use test_strategy::proptest;

use super::*;

#[proptest]
fn masking_is_idempotent(raw: u64) {
    let w = Word::from_bits(raw);
    assert_eq!(Word::from_bits(w.bits()), w);
    assert_eq!(w.bits() & !WORD_MASK, 0);
}

#[proptest]
fn sign_extension_round_trips(#[strategy(0..=WORD_MASK)] bits: u64) {
    let w = Word::from_bits(bits);
    assert_eq!(Word::from_i64(w.to_i64()), w);
}

#[proptest]
fn signed_range_round_trips(#[strategy(-(1_i64 << 38)..(1_i64 << 38))] n: i64) {
    assert_eq!(Word::from_i64(n).to_i64(), n);
}

#[test]
fn test_limits() {
    assert_eq!(Word::MAX.to_i64(), 137_438_953_471);
    assert_eq!(Word::MIN.to_i64(), -137_438_953_472);
    assert_eq!(Word::NOTHING.to_i64(), -1);
    assert!(Word::MIN.is_negative());
    assert!(!Word::MAX.is_negative());
    assert!(Word::ZERO.is_zero());
}

#[test]
fn test_truncation_wraps() {
    // One more than the largest positive value wraps to the most
    // negative value rather than saturating.
    assert_eq!(Word::from_i64(Word::MAX.to_i64() + 1), Word::MIN);
    assert_eq!(Word::from_i64(-1), Word::NOTHING);
    assert_eq!(Word::from_i64(1_i64 << 39), Word::ZERO);
}

#[test]
fn test_checked_conversions() {
    assert_eq!(Word::try_from(WORD_MASK), Ok(Word::NOTHING));
    assert_eq!(
        Word::try_from(WORD_MASK + 1),
        Err(ConversionFailed::TooLarge)
    );
    assert_eq!(Word::try_from(-5_i64).map(Word::to_i64), Ok(-5));
    assert_eq!(Word::try_from(1_i64 << 38), Err(ConversionFailed::TooLarge));
    assert_eq!(
        Word::try_from(-(1_i64 << 38) - 1),
        Err(ConversionFailed::TooSmall)
    );
}

#[test]
fn test_leading_sign_bits() {
    assert_eq!(Word::ZERO.leading_sign_bits(), 38);
    assert_eq!(Word::NOTHING.leading_sign_bits(), 38);
    assert_eq!(Word::ONE.leading_sign_bits(), 37);
    assert_eq!(Word::MAX.leading_sign_bits(), 0);
    assert_eq!(Word::MIN.leading_sign_bits(), 0);
    assert_eq!(Word::from_i64(-2).leading_sign_bits(), 37);
    assert_eq!(Word::from_bits(1 << 30).leading_sign_bits(), 7);
}

#[test]
fn test_display_is_octal() {
    assert_eq!(Word::from(8_u8).to_string(), "0000000000010");
    assert_eq!(Word::NOTHING.to_string(), "7777777777777");
    assert_eq!(format!("{:o}", Word::from(64_u8)), "100");
}

#[test]
fn deserialize_rejects_bits_above_the_word() {
    use serde::de::value::{Error as ValueError, U64Deserializer};
    use serde::de::IntoDeserializer;

    let fits: U64Deserializer<ValueError> = WORD_MASK.into_deserializer();
    assert_eq!(Word::deserialize(fits), Ok(Word::NOTHING));
    let too_wide: U64Deserializer<ValueError> = (1u64 << WORD_BITS).into_deserializer();
    assert!(Word::deserialize(too_wide).is_err());
}
