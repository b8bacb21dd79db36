// SPDX-FileCopyrightText: 2025 SCuM Project Authors
//
// SPDX-License-Identifier: Apache-2.0

//! The analog scan-chain I/O port.
//!
//! One analog configuration register multiplexes the five control signals of
//! the on-die 1216-bit shift register: the serial data line, the two
//! non-overlapping latch clocks of the double-latch flip-flop chain, the
//! load strobe that transfers the shadow register into the live analog
//! configuration, and the (active-low, held high) chain reset.
//!
//! Shifting and loading are split on purpose: the chain is only applied to
//! the silicon by the load pulse, so a full shift followed by one load
//! changes the analog configuration atomically instead of bit by bit.

use crate::analog_cfg::AnalogCfg;

/// Index of the scan-chain control register in the analog configuration bank.
const SCAN_REG: usize = 22;

// Signal bit positions within the control register.
const DATA: u32 = 0x01;
const PHI1: u32 = 0x02;
const PHI2: u32 = 0x04;
const LOAD: u32 = 0x08;
const RESET_B: u32 = 0x20;

/// Driver for the scan-chain shift port.
///
/// Not reentrant: the port is a single shared hardware register, so
/// [`ScanChainPort::shift_out`] must never run concurrently with itself.
pub struct ScanChainPort {
    cfg: AnalogCfg,
}

impl ScanChainPort {
    /// Create a new [`ScanChainPort`].
    ///
    /// # Safety
    ///
    /// `base_addr` MUST BE the base of the analog configuration bank.
    pub const unsafe fn new(base_addr: *const ()) -> ScanChainPort {
        ScanChainPort {
            cfg: AnalogCfg::new(base_addr),
        }
    }

    /// Shift a full chain image out to the hardware shadow register.
    ///
    /// `bits` must enumerate the chain in physical shift order (see
    /// `AscChain::shift_bits` in `scum-sys`). The data line is inverted at
    /// the pad, so a set bit is presented as 0.
    pub fn shift_out(&mut self, bits: impl Iterator<Item = bool>) {
        for bit in bits {
            let data = if bit { 0 } else { DATA };

            // Present the bit with phi1 low, chain reset held off.
            self.cfg.write(SCAN_REG, RESET_B | data);

            // Toggle phi2 to capture into the first latch.
            self.cfg.write(SCAN_REG, RESET_B | data | PHI2);
            self.cfg.write(SCAN_REG, RESET_B | data);

            // Raise phi1 to propagate into the second latch.
            self.cfg.write(SCAN_REG, RESET_B | data | PHI1);
        }
    }

    /// Pulse the load strobe, latching the shadow register into the live
    /// analog configuration.
    pub fn load_shadow(&mut self) {
        self.cfg.write(SCAN_REG, RESET_B | LOAD);
        self.cfg.write(SCAN_REG, RESET_B);
    }
}
