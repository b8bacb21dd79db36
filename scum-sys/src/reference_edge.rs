// SPDX-FileCopyrightText: 2025 SCuM Project Authors
//
// SPDX-License-Identifier: Apache-2.0

//! Reference edge sources for the calibration loop.
//!
//! The loop needs a 100 ms tick interrupt it can arm once, re-arm from
//! inside the handler, and disable when done. Two interchangeable sources
//! exist: an external optical receiver toggling an interrupt pin at a fixed
//! cadence, and a local RF timer compare channel clocked from a calibrated
//! secondary oscillator.

use scum_hal::irq::{self, Irq};
use scum_hal::rftimer::{RfTimer, TICKS_PER_MS};

/// RF timer ticks per 100 ms reference window.
pub const REFERENCE_PERIOD_TICKS: u32 = 100 * TICKS_PER_MS;

/// A periodic 100 ms tick source.
pub trait EdgeSource {
    /// Start delivering tick interrupts.
    fn arm(&mut self);
    /// Re-arm for the next tick. Called from the tick handler; must run
    /// before the handler returns or the edge chain stalls.
    fn rearm(&mut self);
    /// Stop delivering tick interrupts.
    fn disarm(&mut self);
}

/// Edges from the optical receiver's start-of-frame interrupt.
///
/// The cadence is fixed by the external light source; the chip only reacts.
pub struct OpticalEdge {
    _private: (),
}

impl OpticalEdge {
    /// # Safety
    ///
    /// Unmasking the optical interrupts hands control to their handlers;
    /// the caller must have installed handlers that drive the calibration
    /// loop.
    pub const unsafe fn new() -> OpticalEdge {
        OpticalEdge { _private: () }
    }
}

impl EdgeSource for OpticalEdge {
    fn arm(&mut self) {
        // SAFETY: per the constructor contract the handlers are installed.
        unsafe {
            irq::enable(Irq::Gpio8);
            irq::enable(Irq::OpticalSfd);
        }
    }

    fn rearm(&mut self) {
        // Nothing to do, the external source keeps pulsing.
    }

    fn disarm(&mut self) {
        irq::disable(Irq::Gpio8);
        irq::disable(Irq::OpticalSfd);
    }
}

/// Edges from an RF timer compare channel.
///
/// The deadline advances by a fixed period from the previous deadline, not
/// from the current counter value, so handler latency does not accumulate.
pub struct TimerEdge {
    timer: RfTimer,
    channel: usize,
    deadline: u32,
}

impl TimerEdge {
    /// # Safety
    ///
    /// Unmasking the RF timer interrupt hands control to its handler; the
    /// caller must have installed a handler that drives the calibration
    /// loop, and `channel` must not be shared with another user of the
    /// timer.
    pub const unsafe fn new(timer: RfTimer, channel: usize) -> TimerEdge {
        TimerEdge {
            timer,
            channel,
            deadline: 0,
        }
    }
}

impl EdgeSource for TimerEdge {
    fn arm(&mut self) {
        self.deadline = self
            .timer
            .counter()
            .wrapping_add(REFERENCE_PERIOD_TICKS);
        self.timer.set_compare(self.channel, self.deadline);
        self.timer.enable_compare(self.channel);
        // SAFETY: per the constructor contract the handler is installed.
        unsafe {
            irq::enable(Irq::RfTimer);
        }
    }

    fn rearm(&mut self) {
        self.timer.clear_channel(self.channel);
        self.deadline = self.deadline.wrapping_add(REFERENCE_PERIOD_TICKS);
        self.timer.set_compare(self.channel, self.deadline);
    }

    fn disarm(&mut self) {
        self.timer.disable_compare(self.channel);
        irq::disable(Irq::RfTimer);
    }
}
