// SPDX-FileCopyrightText: 2025 SCuM Project Authors
//
// SPDX-License-Identifier: Apache-2.0

//! Per-domain oscillator tuning codes and their scan-chain encoders.
//!
//! The DAC codes in the [`TuningStore`] are the single source of truth; the
//! `encode_*` functions copy them into the scan-chain mirror. Field layouts
//! come straight from the chip's scan-chain map: several DACs are wired
//! bit-reversed, and a few coarse bits are inverted in silicon, which is why
//! the encoders are full of flips.

use crate::scan_chain::{AscChain, OutOfRange};
use ufmt::derive::uDebug;

/// Starting coarse code for the HF system clock DAC.
pub const INIT_HF_CLOCK_COARSE: u8 = 3;
/// Starting fine code for the HF system clock DAC.
pub const INIT_HF_CLOCK_FINE: u8 = 17;
/// Starting coarse code for the 2 MHz RC DAC.
pub const INIT_RC2M_COARSE: u8 = 21;
/// Starting fine code for the 2 MHz RC DAC.
pub const INIT_RC2M_FINE: u8 = 15;
/// Starting superfine code for the 2 MHz RC DAC.
pub const INIT_RC2M_SUPERFINE: u8 = 15;
/// Starting coarse code for the IF RC clock DAC.
pub const INIT_IF_COARSE: u8 = 22;
/// Starting fine code for the IF RC clock DAC.
pub const INIT_IF_FINE: u8 = 18;

/// Target IF RC clock counts per 100 ms gate window (16 MHz nominal).
pub const INIT_IF_CLK_TARGET: u32 = 1_600_000;

/// Target divided-LC counts per 100 ms gate window, for RX channel 11
/// (2.4025 GHz through the divide-by-960 chain).
pub const REFERENCE_LC_TARGET: u32 = 250_260;

/// Starting monotonic LC code. Board-characterized, like the
/// [`LcBoardMap`] divisors.
pub const DEFAULT_INIT_LC_CODE: u16 = 680;

// The first two 2 MHz RC coarse DACs are parked at full scale; the loop only
// moves the third.
const RC2M_COARSE1: u8 = 31;
const RC2M_COARSE2: u8 = 31;

/// Reverse the endianness of the low byte of `value`.
pub fn flip_lsb8(value: u32) -> u32 {
    let mut out = 0;
    out |= (value & 0x01) << 7;
    out |= (value & 0x02) << 5;
    out |= (value & 0x04) << 3;
    out |= (value & 0x08) << 1;
    out |= (value & 0x10) >> 1;
    out |= (value & 0x20) >> 3;
    out |= (value & 0x40) >> 5;
    out |= (value & 0x80) >> 7;
    out
}

/// Reverse the bit order of a byte.
pub fn flip_char(mut value: u8) -> u8 {
    value = (value & 0xF0) >> 4 | (value & 0x0F) << 4;
    value = (value & 0xCC) >> 2 | (value & 0x33) << 2;
    value = (value & 0xAA) >> 1 | (value & 0x55) << 1;
    value
}

/// Bit-reverse a 5-bit code into the DAC's wire order.
fn rev5(code: u8) -> u32 {
    (flip_lsb8(code as u32) >> 3) & 0x1F
}

/// HF system clock DAC codes, 5 bits each.
#[derive(uDebug, Debug, Clone, Copy, PartialEq, Eq)]
pub struct HfClockCodes {
    pub coarse: u8,
    pub fine: u8,
}

impl Default for HfClockCodes {
    fn default() -> Self {
        HfClockCodes {
            coarse: INIT_HF_CLOCK_COARSE,
            fine: INIT_HF_CLOCK_FINE,
        }
    }
}

/// 2 MHz RC DAC codes, 5 bits each.
#[derive(uDebug, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rc2mCodes {
    pub coarse: u8,
    pub fine: u8,
    pub superfine: u8,
}

impl Default for Rc2mCodes {
    fn default() -> Self {
        Rc2mCodes {
            coarse: INIT_RC2M_COARSE,
            fine: INIT_RC2M_FINE,
            superfine: INIT_RC2M_SUPERFINE,
        }
    }
}

/// IF RC clock DAC codes, 5 bits each. `fine` is widened to carry the
/// transient overflow value 32 between correction and normalization.
#[derive(uDebug, Debug, Clone, Copy, PartialEq, Eq)]
pub struct IfClockCodes {
    pub coarse: u8,
    pub fine: u8,
}

impl Default for IfClockCodes {
    fn default() -> Self {
        IfClockCodes {
            coarse: INIT_IF_COARSE,
            fine: INIT_IF_FINE,
        }
    }
}

/// All tunable oscillator codes plus their per-board targets.
#[derive(uDebug, Debug, Clone, Copy, PartialEq, Eq)]
pub struct TuningStore {
    pub hf: HfClockCodes,
    pub rc2m: Rc2mCodes,
    pub if_clk: IfClockCodes,
    /// Monotonic LC code, expanded through [`LcBoardMap`] on commit.
    pub lc_code: u16,
    pub if_clk_target: u32,
    pub lc_target: u32,
}

impl Default for TuningStore {
    fn default() -> Self {
        TuningStore {
            hf: HfClockCodes::default(),
            rc2m: Rc2mCodes::default(),
            if_clk: IfClockCodes::default(),
            lc_code: DEFAULT_INIT_LC_CODE,
            if_clk_target: INIT_IF_CLK_TARGET,
            lc_target: REFERENCE_LC_TARGET,
        }
    }
}

/// Write the HF clock coarse/fine codes into the chain.
///
/// Coarse bits 2..5 and fine bit 4 are inverted in silicon.
pub fn encode_hf_clock(chain: &mut AscChain, codes: HfClockCodes) -> Result<(), OutOfRange> {
    for j in 0..4 {
        chain.write(870 + j, (codes.fine >> j) & 1 != 0)?;
    }
    chain.write(874, (codes.fine >> 4) & 1 == 0)?;

    for j in 0..2 {
        chain.write(860 + j, (codes.coarse >> j) & 1 != 0)?;
    }
    for j in 2..5 {
        chain.write(873 + j, (codes.coarse >> j) & 1 == 0)?;
    }
    Ok(())
}

/// Write the IF RC coarse/fine codes into the chain.
///
/// Both fields are wired MSB at the lowest position, so the loops count down.
pub fn encode_if_clock(
    chain: &mut AscChain,
    codes: IfClockCodes,
    high_range: bool,
) -> Result<(), OutOfRange> {
    for j in 0..5 {
        chain.write(431 - j, (codes.coarse >> j) & 1 != 0)?;
    }
    for j in 0..5 {
        chain.write(437 - j, (codes.fine >> j) & 1 != 0)?;
    }
    chain.write(726, high_range)?;
    Ok(())
}

/// Write the five 2 MHz RC DAC codes into scan-chain word 34, bit-reversed,
/// with the DAC enable bit set.
pub fn encode_rc2m(chain: &mut AscChain, codes: Rc2mCodes) {
    let mut bits = rev5(RC2M_COARSE1) << 26;
    bits |= rev5(RC2M_COARSE2) << 21;
    bits |= rev5(codes.coarse) << 16;
    bits |= rev5(codes.fine) << 11;
    bits |= rev5(codes.superfine) << 6;
    bits |= 1 << 5;
    chain.update_word(34, 0x8000_001F, bits);
}

/// LC coarse/mid/fine sub-codes, 5 bits each.
#[derive(uDebug, Debug, Clone, Copy, PartialEq, Eq)]
pub struct LcSubCodes {
    pub coarse: u8,
    pub mid: u8,
    pub fine: u8,
}

/// Empirical mapping from the monotonic LC code to coarse/mid/fine
/// sub-codes.
///
/// The divisors were characterized per physical board; treat them as
/// calibration data, not algorithmic constants. The defaults fit the boards
/// this mapping was tuned on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LcBoardMap {
    pub coarse_divs: u16,
    pub mid_divs: u16,
    pub mid_mult: u16,
    pub coarse_offset: u16,
    pub mid_fix: u16,
    pub fine_fix: u16,
}

impl Default for LcBoardMap {
    fn default() -> Self {
        LcBoardMap {
            coarse_divs: 140,
            mid_divs: 23,
            mid_mult: 3,
            coarse_offset: 19,
            mid_fix: 0,
            fine_fix: 0,
        }
    }
}

impl LcBoardMap {
    /// Expand a monotonic LC code into sub-codes.
    ///
    /// Fine codes above 15 skip one step; the DAC's upper half is offset by
    /// one LSB.
    pub fn expand(&self, lc_code: u16) -> LcSubCodes {
        let coarse = (lc_code / self.coarse_divs + self.coarse_offset) & 0xFF;
        let rem = lc_code % self.coarse_divs;
        let mid = (rem / self.mid_divs * self.mid_mult + self.mid_fix) & 0xFF;
        let mut fine = (rem % self.mid_divs + self.fine_fix) & 0xFF;
        if fine > 15 {
            fine += 1;
        }
        LcSubCodes {
            coarse: coarse as u8,
            mid: mid as u8,
            fine: fine as u8,
        }
    }
}

/// Pack LC sub-codes into the two LO frequency-control register words.
///
/// The first word carries the coarse and mid codes and all but the LSB of
/// the fine code; the second carries the fine LSB.
pub fn lc_fcode_words(sub: LcSubCodes) -> (u32, u32) {
    let coarse_f = flip_char(sub.coarse & 0x1F) as u32;
    let mid_f = flip_char(sub.mid & 0x1F) as u32;
    let fine_f = flip_char(sub.fine & 0x1F) as u32;

    let mut fcode = 0;
    fcode |= (fine_f & 0x78) << 9;
    fcode |= mid_f << 3;
    fcode |= coarse_f >> 3;

    let fcode2 = (fine_f & 0x80) >> 7;

    (fcode, fcode2)
}

/// Pack the static LC divider ratio and its control bits into the two
/// divider register words.
///
/// `reset` is active low, `enable` active high, and the whole field is
/// inverted on the wire. Odd divide ratios do not work at full LC-tank input
/// frequency; use an even ratio behind the prescaler.
pub fn divider_words(div_ratio: u32, reset: bool, enable: bool) -> (u32, u32) {
    let div_code_1 = (div_ratio & 0x0000_0C00) << 4;

    let mut div_code_2 = (div_ratio & 0x0000_F000) >> 12;
    div_code_2 |= div_ratio & 0x0000_03F0;
    div_code_2 |= (enable as u32) << 10;
    div_code_2 |= (reset as u32) << 11;
    div_code_2 |= (div_ratio & 0x0000_000F) << 12;

    (!div_code_1, !div_code_2)
}

/// Encode every domain in the store into the chain.
pub fn encode_all(chain: &mut AscChain, store: &TuningStore) -> Result<(), OutOfRange> {
    encode_hf_clock(chain, store.hf)?;
    encode_if_clock(chain, store.if_clk, false)?;
    encode_rc2m(chain, store.rc2m);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flip_helpers() {
        assert_eq!(flip_lsb8(0x01), 0x80);
        assert_eq!(flip_lsb8(0xA5), 0xA5);
        assert_eq!(flip_char(0b1000_0000), 0b0000_0001);
        assert_eq!(flip_char(0b1100_1000), 0b0001_0011);
        assert_eq!(rev5(1), 0x10);
        assert_eq!(rev5(0x1F), 0x1F);
    }
}
