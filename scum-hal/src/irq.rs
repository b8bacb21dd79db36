// SPDX-FileCopyrightText: 2025 SCuM Project Authors
//
// SPDX-License-Identifier: Apache-2.0

//! NVIC interrupt numbering.
//!
//! The numbering matches the chip's vector table; positions 4, 5 and 10 are
//! unassigned on this silicon revision.

use cortex_m::interrupt::InterruptNumber;
use cortex_m::peripheral::NVIC;

/// SCuM interrupt sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum Irq {
    /// UART byte received.
    Uart = 0,
    /// Debounced external GPIO 3, active high.
    Gpio3 = 1,
    /// External optical input.
    OpticalIrqIn = 2,
    /// ADC conversion complete.
    Adc = 3,
    /// Radio event.
    Rf = 6,
    /// RF timer compare or capture event.
    RfTimer = 7,
    /// Optical receiver start value.
    RawchipsStartval = 8,
    /// Optical receiver 32-bit word.
    Rawchips32 = 9,
    /// Optical start-of-frame delimiter.
    OpticalSfd = 11,
    /// External GPIO 8, active high.
    Gpio8 = 12,
    /// External GPIO 9, active low.
    Gpio9 = 13,
    /// External GPIO 10, active low.
    Gpio10 = 14,
}

// SAFETY: the discriminants above match the device's vector table layout.
unsafe impl InterruptNumber for Irq {
    fn number(self) -> u16 {
        self as u16
    }
}

/// Enable an interrupt in the NVIC.
///
/// # Safety
///
/// Unmasking an interrupt can break critical sections based on masking.
pub unsafe fn enable(irq: Irq) {
    NVIC::unmask(irq);
}

/// Disable an interrupt in the NVIC.
pub fn disable(irq: Irq) {
    NVIC::mask(irq);
}

/// Clear an interrupt's pending flag in the NVIC.
pub fn unpend(irq: Irq) {
    NVIC::unpend(irq);
}
