use super::*;

#[test]
fn write_then_read() {
    let mut store = Store::new();
    store.write(100, Word::from_i64(12345));
    assert_eq!(store.read(100), Word::from_i64(12345));
    assert_eq!(store.fetch(100), Word::from_i64(12345));
}

#[test]
fn initial_instructions_are_wired() {
    let mut store = Store::new();
    for addr in 0..4u32 {
        store.write(addr, Word::NOTHING);
        assert_eq!(store.fetch(addr), INITIAL_INSTRUCTIONS[addr as usize]);
        assert_eq!(store.read(addr), Word::ZERO);
    }
    store.clear();
    assert_eq!(store.fetch(0), INITIAL_INSTRUCTIONS[0]);
}

#[test]
fn initial_instruction_text() {
    let text: Vec<String> = INITIAL_INSTRUCTIONS
        .iter()
        .map(|w| InstructionPair::from(*w).to_string())
        .collect();
    assert_eq!(
        text,
        vec!["26 4 : 06 0", "22 4 / 16 3", "55 5 : 71 0", "43 1 : 40 2"]
    );
    assert_eq!(INITIAL_INSTRUCTIONS[1], pair!("22 4 / 16 3"));
}

#[test]
fn addresses_wrap() {
    let mut store = Store::new();
    store.write(10, Word::from_i64(7));
    store.write(20, Word::from_i64(9));
    assert_eq!(store.read(8192 + 10), store.read(10));
    assert_eq!(store.fetch(2 * 8192 + 20), store.fetch(20));
    store.write(8192 + 2, Word::ONE);
    assert_eq!(store.fetch(2), INITIAL_INSTRUCTIONS[2]);
}

#[test]
fn clear_zeroes_everything_else() {
    let mut store = Store::new();
    store.write(4, Word::ONE);
    store.write(8191, Word::ONE);
    store.clear();
    assert_eq!(store.read(4), Word::ZERO);
    assert_eq!(store.read(8191), Word::ZERO);
}

#[test]
fn restore_requires_a_full_image() {
    let mut store = Store::new();
    assert_eq!(
        store.restore(&[Word::ONE; 10]),
        Err(SnapshotError::WrongSize {
            expected: STORE_SIZE,
            got: 10
        })
    );
    let image = vec![Word::ONE; STORE_SIZE];
    assert_eq!(store.restore(&image), Ok(()));
    assert_eq!(store.fetch(0), INITIAL_INSTRUCTIONS[0]);
    assert_eq!(store.read(4), Word::ONE);
    assert_eq!(store.words().len(), STORE_SIZE);
}

#[test]
fn load_wraps_and_skips_wired_locations() {
    let mut store = Store::new();
    store.load(8190, &[Word::ONE, Word::ONE, Word::ONE, Word::ONE]);
    assert_eq!(store.read(8190), Word::ONE);
    assert_eq!(store.read(8191), Word::ONE);
    assert_eq!(store.fetch(0), INITIAL_INSTRUCTIONS[0]);
}
