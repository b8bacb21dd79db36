// SPDX-FileCopyrightText: 2025 SCuM Project Authors
//
// SPDX-License-Identifier: Apache-2.0

//! The debug UART.
//!
//! SCuM's UART is a single memory-mapped data register; there are no status
//! flags to poll, the bus write completes when the transmitter accepts the
//! byte. Output is best effort and carries the calibration diagnostics.

pub mod log;

/// `Uart` represents the debug serial port.
#[derive(Clone)]
pub struct Uart {
    data_addr: *mut u32,
}

impl Uart {
    /// Create a new [`Uart`] instance given a base address.
    ///
    /// # Safety
    ///
    /// The `base_addr` pointer MUST BE a valid pointer that is backed
    /// by the memory mapped UART data register.
    pub const unsafe fn new(base_addr: *const ()) -> Uart {
        Uart {
            data_addr: base_addr as *mut u32,
        }
    }

    /// Send one byte.
    pub fn send(&self, data: u8) {
        // SAFETY: valid address per the constructor contract.
        unsafe {
            self.data_addr.write_volatile(data as u32);
        }
    }
}

impl ufmt::uWrite for Uart {
    type Error = core::convert::Infallible;

    fn write_str(&mut self, s: &str) -> Result<(), Self::Error> {
        for b in s.bytes() {
            self.send(b);
        }
        Ok(())
    }
}

impl core::fmt::Write for Uart {
    fn write_str(&mut self, s: &str) -> core::fmt::Result {
        for b in s.bytes() {
            self.send(b);
        }
        Ok(())
    }
}
