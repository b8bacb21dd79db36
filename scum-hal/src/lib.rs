// SPDX-FileCopyrightText: 2025 SCuM Project Authors
//
// SPDX-License-Identifier: Apache-2.0

//! Memory-mapped peripheral wrappers for the SCuM (Single Chip Micro-mote)
//! SoC: the analog configuration register file, the free-running reference
//! counters, the analog scan-chain I/O port, the LC tuning registers, the RF
//! timer and the debug UART.
//!
//! All wrappers are thin raw-pointer structs; constructing one is `unsafe`
//! because the caller asserts the base address is backed by the real device.

#![no_std]

pub mod analog_cfg;
pub mod counters;
pub mod irq;
pub mod lo;
pub mod rftimer;
pub mod scan_port;
pub mod uart;

#[cfg(feature = "rt")]
pub mod vectors;
