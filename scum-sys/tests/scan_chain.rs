// SPDX-FileCopyrightText: 2025 SCuM Project Authors
//
// SPDX-License-Identifier: Apache-2.0

use proptest::prelude::*;
use test_strategy::proptest;

use scum_sys::scan_chain::*;

#[proptest]
fn set_then_get_round_trips(#[strategy(0..ASC_BIT_COUNT)] position: usize) {
    let mut chain = AscChain::new();
    chain.set(position).unwrap();
    prop_assert!(chain.get(position).unwrap());
    chain.clear(position).unwrap();
    prop_assert!(!chain.get(position).unwrap());
}

#[proptest]
fn set_leaves_neighbors_untouched(
    #[strategy(0..ASC_BIT_COUNT)] position: usize,
    #[strategy(any::<[u32; ASC_WORD_COUNT]>())] seed: [u32; ASC_WORD_COUNT],
) {
    let mut chain = AscChain::new();
    for (index, word) in seed.iter().enumerate() {
        chain.update_word(index, 0, *word);
    }

    let before: Vec<bool> = (0..ASC_BIT_COUNT).map(|p| chain.get(p).unwrap()).collect();
    chain.set(position).unwrap();

    for p in 0..ASC_BIT_COUNT {
        let expected = if p == position { true } else { before[p] };
        prop_assert_eq!(chain.get(p).unwrap(), expected);
    }
}

#[proptest]
fn out_of_range_positions_fail(#[strategy(ASC_BIT_COUNT..usize::MAX)] position: usize) {
    let mut chain = AscChain::new();
    prop_assert_eq!(chain.set(position), Err(OutOfRange { position }));
    prop_assert_eq!(chain.clear(position), Err(OutOfRange { position }));
    prop_assert_eq!(chain.get(position), Err(OutOfRange { position }));
}

#[test]
fn position_zero_is_msb_of_word_zero() {
    let mut chain = AscChain::new();
    chain.set(0).unwrap();
    assert_eq!(chain.word(0), 0x8000_0000);
}

#[test]
fn shift_order_is_msb_first_from_word_37() {
    let mut chain = AscChain::new();
    // Position 1184 is the MSB of word 37, the first bit on the wire;
    // position 31 is the LSB of word 0, the last.
    chain.set(1184).unwrap();
    chain.set(31).unwrap();

    let bits: Vec<bool> = chain.shift_bits().collect();
    assert_eq!(bits.len(), ASC_BIT_COUNT);
    assert!(bits[0]);
    assert!(bits[ASC_BIT_COUNT - 1]);
    assert_eq!(bits.iter().filter(|&&b| b).count(), 2);
}

#[test]
fn update_word_respects_keep_mask() {
    let mut chain = AscChain::new();
    chain.update_word(34, 0, 0xFFFF_FFFF);
    chain.update_word(34, 0x8000_001F, 0x0123_4560);
    assert_eq!(chain.word(34), 0x8123_457F);
}
