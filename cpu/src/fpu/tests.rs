use super::*;
use test_strategy::proptest;

fn f(x: f64) -> Word {
    match Word::from_f64(x) {
        Ok(w) => w,
        Err(e) => panic!("{x} is not representable: {e}"),
    }
}

#[test]
fn arithmetic() {
    assert_eq!(add(f(1.5), f(2.25)), (f(3.75), false));
    assert_eq!(sub(f(1.5), f(2.25)), (f(-0.75), false));
    assert_eq!(mul(f(-3.0), f(0.5)), (f(-1.5), false));
    assert_eq!(div(f(1.0), f(4.0)), (f(0.25), false));
    assert_eq!(sub(f(2.0), f(2.0)), (Word::ZERO, false));
}

#[test]
fn overflow_gives_nothing() {
    let big = Word::from_float_parts(1 << 28, EXPONENT_MAX);
    let (result, overflow) = mul(big, big);
    assert!(overflow);
    assert_eq!(result, Word::NOTHING);
    let (result, overflow) = add(big, big);
    assert!(overflow);
    assert_eq!(result, Word::NOTHING);
}

#[test]
fn underflow_gives_zero_quietly() {
    let tiny = Word::from_float_parts(1 << 28, 0);
    assert_eq!(mul(tiny, tiny), (Word::ZERO, false));
}

#[test]
fn divide_by_zero() {
    assert_eq!(div(f(1.0), Word::ZERO), (Word::ZERO, true));
    assert_eq!(sdiv(Word::from_i64(7), Word::ZERO), None);
}

#[test]
fn convert_integers() {
    assert_eq!(convert(Word::ZERO), (Word::ZERO, false));
    assert_eq!(convert(Word::ONE), (f(1.0), false));
    assert_eq!(convert(Word::from_i64(-12)), (f(-12.0), false));
    let (w, overflow) = convert(Word::MAX);
    assert!(!overflow);
    // Only 29 fraction bits survive.
    assert_eq!(w.to_f64(), (Word::MAX.to_i64() >> 9 << 9) as f64);
}

#[test]
fn rotate_is_end_around() {
    assert_eq!(shl(Word::MIN, 1), (Word::ONE, false));
    assert_eq!(shl(Word::ONE, 39), (Word::ONE, false));
    assert_eq!(shl(Word::from_bits(0b11), 38), (Word::from_bits(SIGN_BIT | 1), false));
    assert_eq!(shl(Word::NOTHING, 17), (Word::NOTHING, false));
}

#[test]
fn integer_division_truncates() {
    let w = Word::from_i64;
    assert_eq!(sdiv(w(7), w(2)), Some((w(3), false)));
    assert_eq!(sdiv(w(-7), w(2)), Some((w(-3), false)));
    assert_eq!(sdiv(w(7), w(-2)), Some((w(-3), false)));
    assert_eq!(sdiv(Word::MIN, w(-1)), Some((Word::MIN, true)));
}

#[test]
fn integer_square_root() {
    let w = Word::from_i64;
    assert_eq!(sqrt(w(0)), (w(0), false));
    assert_eq!(sqrt(w(16)), (w(4), false));
    assert_eq!(sqrt(w(17)), (w(4), false));
    assert_eq!(sqrt(w(-16)), (w(0), false));
    assert_eq!(sqrt(Word::MAX), (w(524_287), false));
}

#[proptest]
fn rotation_by_word_length_is_identity(#[strategy(0u64..(1u64 << 39))] bits: u64) {
    let w = Word::from_bits(bits);
    let (once, _) = shl(w, 13);
    let (back, _) = shl(once, 26);
    assert_eq!(back, w);
}
