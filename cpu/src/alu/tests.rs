use super::*;
use test_strategy::proptest;

fn w(n: i64) -> Word {
    Word::from_i64(n)
}

#[test]
fn add_max_and_one_overflows() {
    let (result, overflow) = add(w(137_438_953_471), Word::ONE);
    assert!(overflow);
    assert_eq!(result, Word::MIN);
}

#[test]
fn add_negative_without_overflow() {
    assert_eq!(add(w(-5), w(3)), (w(-2), false));
    assert_eq!(add(Word::MIN, Word::MAX), (w(-1), false));
}

#[test]
fn sub_min_overflows() {
    let (_, overflow) = sub(Word::MIN, Word::ONE);
    assert!(overflow);
    let (result, overflow) = negate(Word::MIN);
    assert!(overflow);
    assert_eq!(result, Word::MIN);
}

#[test]
fn and_is_bitwise() {
    assert_eq!(and(w(0b1100), w(0b1010)), (w(0b1000), false));
    assert_eq!(and(w(-1), w(-8)), (w(-8), false));
}

#[test]
fn shl_small_counts() {
    assert_eq!(shl(w(3), 4), (w(48), false));
    assert_eq!(shl(w(-3), 4), (w(-48), false));
    assert_eq!(shl(Word::ONE, 37), (w(1 << 37), false));
    let (result, overflow) = shl(Word::ONE, 38);
    assert!(overflow);
    assert_eq!(result, Word::MIN);
}

#[test]
fn shl_large_counts_detect_lost_bits() {
    // A single one bit shifted through the sign position and out of
    // the word leaves zero but must still report overflow.
    let (result, overflow) = shl(Word::ONE, 40);
    assert!(overflow);
    assert_eq!(result, Word::ZERO);

    let (result, overflow) = shl(Word::ZERO, 100);
    assert!(!overflow);
    assert_eq!(result, Word::ZERO);

    let (result, overflow) = shl(w(-1), 30);
    assert!(!overflow);
    assert_eq!(result, w(-1 << 30));
}

#[test]
fn shr_is_logical() {
    assert_eq!(shr(w(-1), 1), (Word::MAX, false));
    assert_eq!(shr(w(48), 4), (w(3), false));
    assert_eq!(shr(w(-1), 39), (Word::ZERO, false));
    assert_eq!(shr(w(-1), 127), (Word::ZERO, false));
}

#[test]
fn mul_fast_and_wide_paths() {
    assert_eq!(mul(w(-7), w(6)), (w(-42), false));
    assert_eq!(mul(w(1 << 20), w(1 << 17)), (w(1 << 37), false));
    let (_, overflow) = mul(w(1 << 20), w(1 << 18));
    assert!(overflow);
    let (_, overflow) = mul(w(1 << 35), w(8));
    assert!(overflow);
    assert_eq!(mul(w(1 << 35), w(-8)), (Word::MIN, false));
}

#[test]
fn long_mul_splits_the_product() {
    let (product, overflow) = long_mul(w(1 << 37), w(1 << 10));
    assert!(!overflow);
    assert_eq!(product.high, w(1 << 9));
    assert_eq!(product.ext, 0);

    let (product, overflow) = long_mul(w(-3), w(5));
    assert!(!overflow);
    assert_eq!(product.high, w(-1));
    assert_eq!(product.ext, MAGNITUDE_MASK - 14);
    assert_eq!(product.to_i128(), -15);
}

#[test]
fn long_mul_of_min_squared_overflows() {
    let (_, overflow) = long_mul(Word::MIN, Word::MIN);
    assert!(overflow);
    let (product, overflow) = long_mul(Word::MIN, Word::MAX);
    assert!(!overflow);
    assert_eq!(
        product.to_i128(),
        i128::from(Word::MIN.to_i64()) * i128::from(Word::MAX.to_i64())
    );
}

#[test]
fn long_div_by_zero() {
    let (result, overflow) = long_div(DoubleLength::new(w(1234), 99), Word::ZERO);
    assert!(overflow);
    assert_eq!(result, DoubleLength::default());
}

#[test]
fn long_div_truncates_toward_zero() {
    // -15 / 4 = -3.75, truncated to -3.
    let dividend = DoubleLength::new(w(-1), MAGNITUDE_MASK - 14);
    assert_eq!(dividend.to_i128(), -15);
    let (result, overflow) = long_div(dividend, w(4));
    assert!(!overflow);
    assert_eq!(result.high, w(-3));
    assert_eq!(result.ext, 0);
}

#[test]
fn long_div_overflow_when_quotient_too_large() {
    let (_, overflow) = long_div(DoubleLength::new(w(1), 0), Word::ONE);
    assert!(overflow);
}

#[test]
fn long_shifts() {
    let value = DoubleLength::new(w(1), 0);
    let (shifted, overflow) = long_shr(value, 1);
    assert!(!overflow);
    assert_eq!(shifted, DoubleLength::new(Word::ZERO, 1 << 37));

    let (back, overflow) = long_shl(shifted, 1);
    assert!(!overflow);
    assert_eq!(back, value);

    let (_, overflow) = long_shl(DoubleLength::new(w(1 << 36), 0), 2);
    assert!(overflow);

    let (negative, _) = long_shr(DoubleLength::new(w(-4), 0), 2);
    assert_eq!(negative.high, w(-1));
    assert_eq!(negative.to_i128(), -(1 << 38));

    let (gone, overflow) = long_shl(DoubleLength::new(Word::ZERO, 1), 100);
    assert!(overflow);
    assert_eq!(gone.to_i128(), 0);
}

#[test]
fn predicates() {
    assert!(is_zero(Word::ZERO));
    assert!(!is_zero(Word::ONE));
    assert!(is_negative(Word::NOTHING));
    assert!(!is_negative(Word::MAX));
}

#[proptest]
fn add_matches_wide_arithmetic(
    #[strategy(-(1i64 << 38)..(1i64 << 38))] a: i64,
    #[strategy(-(1i64 << 38)..(1i64 << 38))] b: i64,
) {
    let (result, overflow) = add(w(a), w(b));
    let exact = a + b;
    let in_range = (-(1i64 << 38)..(1i64 << 38)).contains(&exact);
    assert_eq!(overflow, !in_range);
    if in_range {
        assert_eq!(result.to_i64(), exact);
    }
}

#[proptest]
fn shl_agrees_with_fast_path(
    #[strategy(-(1i64 << 38)..(1i64 << 38))] a: i64,
    #[strategy(0u32..26)] places: u32,
) {
    // Bit-by-bit shifting is what the fast path must match.
    let mut value = a;
    let mut overflow = false;
    for _ in 0..places {
        value <<= 1;
        if !(-(1i64 << 38)..(1i64 << 38)).contains(&value) {
            overflow = true;
            value = Word::from_i64(value).to_i64();
        }
    }
    assert_eq!(shl(w(a), places), (w(value), overflow));
}

#[proptest]
fn long_div_undoes_long_mul(
    #[strategy(-(1i64 << 38)..(1i64 << 38))] a: i64,
    #[strategy(1i64..(1i64 << 38))] b: i64,
) {
    let (product, overflow) = long_mul(w(a), w(b));
    assert!(!overflow);
    let (quotient, overflow) = long_div(product, w(b));
    assert!(!overflow);
    assert_eq!(quotient.high, w(a));
}
