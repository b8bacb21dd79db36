// SPDX-FileCopyrightText: 2025 SCuM Project Authors
//
// SPDX-License-Identifier: Apache-2.0

//! Free-running reference counters.
//!
//! Five 32-bit counters (32 kHz, HF clock, 2 MHz RC, divided LC, IF ADC
//! clock), each exposed as a 16-bit-low/16-bit-high register pair, gated by
//! one shared control register. The counters cannot be reset individually;
//! reading a coherent snapshot requires disabling them all, reading, then
//! resetting and re-enabling them all.

use ufmt::derive::uDebug;

use crate::analog_cfg::AnalogCfg;

/// Control register value that gates all counters off.
const CTRL_DISABLE_ALL: u32 = 0x007F;
/// Control register value that resets all counters.
const CTRL_RESET_ALL: u32 = 0x0000;
/// Control register value that enables all counters.
const CTRL_ENABLE_ALL: u32 = 0x3FFF;

/// Register pair indices (low, high) per counter.
const PAIR_32K: (usize, usize) = (0, 1);
const PAIR_HF: (usize, usize) = (4, 5);
const PAIR_2M: (usize, usize) = (6, 7);
const PAIR_LC: (usize, usize) = (10, 11);
const PAIR_IF: (usize, usize) = (12, 13);

/// One coherent reading of all five reference counters.
///
/// When the counters are gated by the 100 ms reference edge, these values are
/// counts per 100 ms window; all calibration targets assume that window.
#[derive(uDebug, Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct CounterSnapshot {
    pub count_32k: u32,
    pub count_hf: u32,
    pub count_2m: u32,
    pub count_lc: u32,
    pub count_if: u32,
}

/// Handle on the shared counter bank.
pub struct ReferenceCounters {
    cfg: AnalogCfg,
}

impl ReferenceCounters {
    /// Create a new [`ReferenceCounters`] handle.
    ///
    /// # Safety
    ///
    /// `base_addr` MUST BE the base of the analog configuration bank.
    pub const unsafe fn new(base_addr: *const ()) -> ReferenceCounters {
        ReferenceCounters {
            cfg: AnalogCfg::new(base_addr),
        }
    }

    fn pair(&self, (low, high): (usize, usize)) -> u32 {
        self.cfg.read(low) + (self.cfg.read(high) << 16)
    }

    /// Gate all counters off.
    pub fn disable_all(&self) {
        self.cfg.write(0, CTRL_DISABLE_ALL);
    }

    /// Reset all counters and start them counting again.
    pub fn reset_and_enable_all(&self) {
        self.cfg.write(0, CTRL_RESET_ALL);
        self.cfg.write(0, CTRL_ENABLE_ALL);
    }

    /// Halt all counters without restarting them.
    pub fn halt(&self) {
        self.cfg.write(0, CTRL_RESET_ALL);
    }

    /// Take one coherent snapshot of all counters.
    ///
    /// Runs the disable -> read -> reset -> enable sequence as a single
    /// straight-line block. Must only be called from a context that cannot
    /// be interleaved with another reader, i.e. the reference-edge interrupt
    /// while calibration is armed.
    pub fn snapshot(&self) -> CounterSnapshot {
        self.disable_all();

        let snapshot = CounterSnapshot {
            count_32k: self.pair(PAIR_32K),
            count_hf: self.pair(PAIR_HF),
            count_2m: self.pair(PAIR_2M),
            count_lc: self.pair(PAIR_LC),
            count_if: self.pair(PAIR_IF),
        };

        self.reset_and_enable_all();

        snapshot
    }

    /// Estimate die temperature from the ratio of the 2 MHz RC and 32 kHz
    /// counters over a short busy-wait window.
    pub fn estimate_temperature_2m_32k(&self) -> u32 {
        self.reset_and_enable_all();

        // Count for an arbitrary but repeatable amount of time.
        cortex_m::asm::delay(50_000);

        self.disable_all();
        let count_2m = self.pair(PAIR_2M);
        let count_32k = self.pair(PAIR_32K);

        temperature_ratio(count_2m, count_32k)
    }
}

/// Temperature-proportional ratio of the 2 MHz RC count to the 32 kHz count.
pub fn temperature_ratio(count_2m: u32, count_32k: u32) -> u32 {
    if count_32k == 0 {
        return 0;
    }
    (count_2m << 13) / count_32k
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn temperature_ratio_scales_with_2m_count() {
        // 2 MHz and 32 kHz nominal counts over the same window keep the
        // ratio near 2e6/32768 << 13.
        let nominal = temperature_ratio(200_000, 3_277);
        let warmer = temperature_ratio(201_000, 3_277);
        assert!(warmer > nominal);
    }

    #[test]
    fn temperature_ratio_handles_dead_32k() {
        assert_eq!(temperature_ratio(200_000, 0), 0);
    }
}
