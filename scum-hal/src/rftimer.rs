// SPDX-FileCopyrightText: 2025 SCuM Project Authors
//
// SPDX-License-Identifier: Apache-2.0

//! The RF timer block.
//!
//! A free-running counter clocked at 500 kHz (the 20 MHz HF clock through a
//! divide-by-40 tap) with eight compare channels, each of which can raise
//! the RF timer interrupt. The calibration code uses one compare channel as
//! a locally generated 100 ms reference edge.

// Register offsets within the block.
const CONTROL: usize = 0x00;
const COUNTER: usize = 0x04;
const MAX_COUNT: usize = 0x08;
const COMPARE: usize = 0x10;
const COMPARE_CONTROL: usize = 0x30;
const INT: usize = 0x70;
const INT_CLEAR: usize = 0x74;

// Control register bits.
const CONTROL_ENABLE: u32 = 0x01;
const CONTROL_INTERRUPT_ENABLE: u32 = 0x02;
const CONTROL_COUNT_RESET: u32 = 0x04;

// Compare control register bits.
const COMPARE_ENABLE: u32 = 0x01;
const COMPARE_INTERRUPT_ENABLE: u32 = 0x02;

/// Counter ticks per millisecond at the 500 kHz time base.
pub const TICKS_PER_MS: u32 = 500;

/// Number of compare channels.
pub const NUM_CHANNELS: usize = 8;

/// Handle on the RF timer block.
pub struct RfTimer {
    base: *mut u8,
}

// SAFETY: single-core SoC; a handle is only ever used from one execution
// context at a time.
unsafe impl core::marker::Send for RfTimer {}

impl RfTimer {
    /// Create a new [`RfTimer`] handle.
    ///
    /// # Safety
    ///
    /// `base_addr` MUST BE the base of the memory-mapped RF timer block.
    pub const unsafe fn new(base_addr: *const ()) -> RfTimer {
        RfTimer {
            base: base_addr as *mut u8,
        }
    }

    fn reg(&self, offset: usize) -> *mut u32 {
        // SAFETY: offsets are within the block per the constructor contract.
        unsafe { self.base.add(offset).cast::<u32>() }
    }

    fn write(&self, offset: usize, value: u32) {
        // SAFETY: valid address per the constructor contract.
        unsafe { self.reg(offset).write_volatile(value) }
    }

    fn read(&self, offset: usize) -> u32 {
        // SAFETY: valid address per the constructor contract.
        unsafe { self.reg(offset).read_volatile() }
    }

    /// Reset and start the timer with interrupts enabled at the block level.
    pub fn init(&mut self) {
        self.write(MAX_COUNT, u32::MAX);
        self.write(
            CONTROL,
            CONTROL_ENABLE | CONTROL_INTERRUPT_ENABLE | CONTROL_COUNT_RESET,
        );
    }

    /// Current counter value.
    pub fn counter(&self) -> u32 {
        self.read(COUNTER)
    }

    /// Program a compare channel's match value.
    pub fn set_compare(&mut self, channel: usize, value: u32) {
        self.write(COMPARE + 4 * channel, value);
    }

    /// Enable a compare channel and its interrupt, clearing any pending
    /// match first.
    pub fn enable_compare(&mut self, channel: usize) {
        self.clear_channel(channel);
        self.write(
            COMPARE_CONTROL + 4 * channel,
            COMPARE_ENABLE | COMPARE_INTERRUPT_ENABLE,
        );
    }

    /// Disable a compare channel.
    pub fn disable_compare(&mut self, channel: usize) {
        self.write(COMPARE_CONTROL + 4 * channel, 0);
    }

    /// Pending interrupt flags (compare channels in the low eight bits).
    pub fn pending(&self) -> u32 {
        self.read(INT)
    }

    /// Clear a compare channel's pending flag.
    pub fn clear_channel(&mut self, channel: usize) {
        self.write(INT_CLEAR, 1 << channel);
    }

    /// Clear a set of pending flags.
    pub fn clear_pending(&mut self, mask: u32) {
        self.write(INT_CLEAR, mask);
    }
}
