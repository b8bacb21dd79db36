// SPDX-FileCopyrightText: 2025 SCuM Project Authors
//
// SPDX-License-Identifier: Apache-2.0

use proptest::prelude::*;
use test_strategy::proptest;

use scum_sys::scan_chain::AscChain;
use scum_sys::tuning::*;

#[proptest]
fn flip_lsb8_is_an_involution(byte: u8) {
    prop_assert_eq!(flip_lsb8(flip_lsb8(byte as u32)), byte as u32);
}

#[proptest]
fn flip_char_is_an_involution(byte: u8) {
    prop_assert_eq!(flip_char(flip_char(byte)), byte);
}

#[test]
fn hf_clock_fine_bits_land_at_870() {
    let mut chain = AscChain::new();
    encode_hf_clock(
        &mut chain,
        HfClockCodes {
            coarse: 0,
            fine: 0b01011,
        },
    )
    .unwrap();

    // fine<0..3> at 870..874 direct, fine<4> at 874 inverted.
    assert!(chain.get(870).unwrap());
    assert!(chain.get(871).unwrap());
    assert!(!chain.get(872).unwrap());
    assert!(chain.get(873).unwrap());
    assert!(chain.get(874).unwrap());
}

#[test]
fn hf_clock_coarse_split_is_inverted_above_bit_1() {
    let mut chain = AscChain::new();
    encode_hf_clock(
        &mut chain,
        HfClockCodes {
            coarse: 0b00111,
            fine: 0,
        },
    )
    .unwrap();

    // coarse<0..1> at 860..862 direct, coarse<2..4> at 875..878 inverted.
    assert!(chain.get(860).unwrap());
    assert!(chain.get(861).unwrap());
    assert!(!chain.get(875).unwrap());
    assert!(chain.get(876).unwrap());
    assert!(chain.get(877).unwrap());
}

#[test]
fn if_clock_fields_are_msb_at_low_position() {
    let mut chain = AscChain::new();
    encode_if_clock(
        &mut chain,
        IfClockCodes {
            coarse: 0b10001,
            fine: 0b00001,
        },
        true,
    )
    .unwrap();

    // coarse<4> lands at 427, coarse<0> at 431.
    assert!(chain.get(427).unwrap());
    assert!(!chain.get(428).unwrap());
    assert!(chain.get(431).unwrap());
    // fine<0> lands at 437.
    assert!(chain.get(437).unwrap());
    assert!(!chain.get(433).unwrap());
    assert!(chain.get(726).unwrap());
}

#[test]
fn rc2m_word_packs_reversed_codes_with_enable() {
    let mut chain = AscChain::new();
    chain.update_word(34, 0, 0x8000_0010);

    encode_rc2m(
        &mut chain,
        Rc2mCodes {
            coarse: 1,
            fine: 0,
            superfine: 31,
        },
    );

    let word = chain.word(34);
    // Sign bit and low five bits survive the update.
    assert_eq!(word & 0x8000_001F, 0x8000_0010);
    // Both parked coarse DACs at full scale.
    assert_eq!((word >> 26) & 0x1F, 0x1F);
    assert_eq!((word >> 21) & 0x1F, 0x1F);
    // coarse = 1 bit-reversed over 5 bits.
    assert_eq!((word >> 16) & 0x1F, 0x10);
    assert_eq!((word >> 11) & 0x1F, 0);
    assert_eq!((word >> 6) & 0x1F, 0x1F);
    // DAC enable.
    assert_ne!(word & 0x20, 0);
}

#[test]
fn lc_map_expands_default_code() {
    let map = LcBoardMap::default();
    // 680 = 4 * 140 + 120; 120 = 5 * 23 + 5.
    assert_eq!(
        map.expand(680),
        LcSubCodes {
            coarse: 23,
            mid: 15,
            fine: 5
        }
    );
}

#[test]
fn lc_map_skips_fine_16() {
    let map = LcBoardMap::default();
    // 42 % 140 = 42; 42 % 23 = 19, past the skip point.
    assert_eq!(
        map.expand(42),
        LcSubCodes {
            coarse: 19,
            mid: 3,
            fine: 20
        }
    );
}

#[proptest]
fn lc_map_is_monotone_per_step(#[strategy(0u16..1600)] code: u16) {
    let map = LcBoardMap::default();
    let a = map.expand(code);
    let b = map.expand(code + 1);
    let key = |s: LcSubCodes| (s.coarse as u32, s.mid as u32, s.fine as u32);
    prop_assert!(key(b) > key(a));
}

#[test]
fn lc_fcode_packs_fine_lsb_separately() {
    // fine = 1 bit-reverses to 0x80, whose low bit is the second word.
    let (fcode, fcode2) = lc_fcode_words(LcSubCodes {
        coarse: 0,
        mid: 0,
        fine: 1,
    });
    assert_eq!(fcode, 0);
    assert_eq!(fcode2, 1);

    let (fcode, fcode2) = lc_fcode_words(LcSubCodes {
        coarse: 31,
        mid: 0,
        fine: 0,
    });
    assert_eq!(fcode, 0x1F);
    assert_eq!(fcode2, 0);
}

#[test]
fn divider_words_match_div_by_480() {
    let (code1, code2) = divider_words(480, true, true);
    assert_eq!(code1, 0xFFFF_FFFF);
    assert_eq!(code2, 0xFFFF_F21F);
}
