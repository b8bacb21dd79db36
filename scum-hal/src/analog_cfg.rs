// SPDX-FileCopyrightText: 2025 SCuM Project Authors
//
// SPDX-License-Identifier: Apache-2.0

//! The analog configuration register file.
//!
//! A bank of 32-bit registers on the APB bus that both drives analog control
//! signals (counter gating, LC oscillator and divider DACs, the scan-chain
//! shift port) and reads analog status back (counter values). The registers
//! are not contiguous: the bus decodes them at a stride of `0x4_0000`.

/// APB base address of the analog configuration bank.
pub const ANALOG_CFG_BASE: usize = 0x5200_0000;

/// Base address of the debug UART data register.
pub const UART_BASE: usize = 0x5100_0000;

/// AHB base address of the RF timer block.
pub const RFTIMER_BASE: usize = 0x4200_0000;

/// Address stride between consecutive analog configuration registers.
const REG_STRIDE: usize = 0x4_0000;

/// Raw accessor for the analog configuration bank.
#[derive(Clone)]
pub struct AnalogCfg {
    base: *mut u8,
}

// SAFETY: single-core SoC; a handle is only ever used from one execution
// context at a time.
unsafe impl core::marker::Send for AnalogCfg {}

impl AnalogCfg {
    /// Create a new [`AnalogCfg`] handle given the bank's base address.
    ///
    /// # Safety
    ///
    /// `base_addr` MUST BE the base of the memory-mapped analog configuration
    /// bank; register indices up to 30 are dereferenced relative to it.
    pub const unsafe fn new(base_addr: *const ()) -> AnalogCfg {
        AnalogCfg {
            base: base_addr as *mut u8,
        }
    }

    fn reg(&self, index: usize) -> *mut u32 {
        // SAFETY: in-bounds per the constructor contract; the stride is fixed
        // by the bus decoder.
        unsafe { self.base.add(index * REG_STRIDE).cast::<u32>() }
    }

    /// Read analog configuration register `index`.
    pub fn read(&self, index: usize) -> u32 {
        // SAFETY: valid address per the constructor contract.
        unsafe { self.reg(index).read_volatile() }
    }

    /// Write analog configuration register `index`.
    pub fn write(&self, index: usize, value: u32) {
        // SAFETY: valid address per the constructor contract.
        unsafe { self.reg(index).write_volatile(value) }
    }

    /// Read-modify-write analog configuration register `index`.
    pub fn modify(&self, index: usize, f: impl FnOnce(u32) -> u32) {
        self.write(index, f(self.read(index)));
    }
}
