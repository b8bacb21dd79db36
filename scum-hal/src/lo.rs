// SPDX-FileCopyrightText: 2025 SCuM Project Authors
//
// SPDX-License-Identifier: Apache-2.0

//! LC oscillator tuning and divider registers.
//!
//! Unlike the other oscillator DACs, the LC tank's coarse/mid/fine DACs and
//! its static frequency divider are driven directly by analog configuration
//! registers so the local oscillator can be retuned without reprogramming
//! the whole scan chain. The bit packing of these words lives in
//! `scum-sys::tuning` (`lc_fcode_words`, `divider_words`); this wrapper only
//! writes the raw words.

use crate::analog_cfg::AnalogCfg;

/// Registers carrying the LC coarse/mid/fine DAC codes.
const LO_FCODE_REG: usize = 7;
const LO_FCODE2_REG: usize = 8;

/// Registers carrying the static divider programming (bit-inverted sense).
const DIV_CODE1_REG: usize = 5;
const DIV_CODE2_REG: usize = 6;

/// Handle on the LC tuning registers.
pub struct LoTuningPort {
    cfg: AnalogCfg,
}

impl LoTuningPort {
    /// Create a new [`LoTuningPort`].
    ///
    /// # Safety
    ///
    /// `base_addr` MUST BE the base of the analog configuration bank.
    pub const unsafe fn new(base_addr: *const ()) -> LoTuningPort {
        LoTuningPort {
            cfg: AnalogCfg::new(base_addr),
        }
    }

    /// Program the LC DACs. Takes effect immediately.
    pub fn set_frequency_words(&mut self, fcode: u32, fcode2: u32) {
        self.cfg.write(LO_FCODE_REG, fcode);
        self.cfg.write(LO_FCODE2_REG, fcode2);
    }

    /// Program the static LC divider. Takes effect immediately.
    pub fn set_divider_words(&mut self, code1: u32, code2: u32) {
        self.cfg.write(DIV_CODE1_REG, code1);
        self.cfg.write(DIV_CODE2_REG, code2);
    }
}
